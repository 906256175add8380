//! Picking the text that ships
//!
//! Priority: `ru_final`, then `ru_machine`, then `ru_native`, then `en`.
//! An entry with none of them resolves to an empty string (logged). A tag
//! with no entry at all means the extracted game text and the dataset have
//! drifted apart, which is fatal.

use tracing::{error, warn};

use crate::error::{Error, Result};
use crate::model::{TranslationEntry, TranslationScene};

/// Best available text of a single entry
pub fn best_text(entry: &TranslationEntry) -> &str {
    [
        entry.ru_final.as_str(),
        entry.ru_machine.as_str(),
        entry.ru_native.as_str(),
        entry.en.as_str(),
    ]
    .into_iter()
    .find(|text| !text.is_empty())
    .unwrap_or_else(|| {
        warn!(tag = %entry.tag, "tag found but no valid translation present in scene");
        ""
    })
}

/// Resolve `tag` against `scene`
///
/// # Errors
/// `Error::MissingData` if the scene has no entry with this tag.
pub fn resolve(tag: &str, scene: &TranslationScene) -> Result<String> {
    match scene.find(tag) {
        Some(entry) => Ok(best_text(entry).to_string()),
        None => {
            error!(tag, scene = %scene.scene, "could not find translation entry");
            Err(Error::MissingData {
                tag: tag.to_string(),
                scene: scene.scene.clone(),
            })
        }
    }
}
