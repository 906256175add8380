//! Tag to scene grouping
//!
//! Tags come in two shapes:
//! - `A1S1.ENTLIG_RILEY_0000`: the first `_`-separated part already is the
//!   scene id (`A1S1.ENTLIG`)
//! - `A2W2_01CONV_0003`: the scene id is the first two parts (`A2W2_01CONV`)

use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{EntrySet, TranslationMap, TranslationScene};

/// Map a tag to the id of the scene that owns it
///
/// # Errors
/// `Error::MalformedTag` if the tag has no `_`.
///
/// # Example
///
/// ```
/// use oxen_l10n::grouping::tag_to_scene;
/// assert_eq!(tag_to_scene("A1S1.ENTLIG_RILEY_0000").unwrap(), "A1S1.ENTLIG");
/// assert_eq!(tag_to_scene("A2W2_01CONV_0003").unwrap(), "A2W2_01CONV");
/// ```
pub fn tag_to_scene(tag: &str) -> Result<String> {
    let mut parts = tag.splitn(3, '_');
    let first = parts.next().unwrap_or_default();
    let Some(second) = parts.next() else {
        return Err(Error::MalformedTag(tag.to_string()));
    };

    if first.contains('.') {
        Ok(first.to_string())
    } else {
        Ok(format!("{}_{}", first, second))
    }
}

/// Group ingested entries into scenes
///
/// A scene takes the bundle of the first entry (in tag order) that lands
/// in it.
pub fn group_entries(entries: EntrySet) -> Result<TranslationMap> {
    let mut map = TranslationMap::new();
    for bundled in entries {
        let scene_id = tag_to_scene(bundled.tag())?;
        debug!(tag = %bundled.tag(), scene = %scene_id, "group");
        map.entry(scene_id.clone())
            .or_insert_with(|| TranslationScene::new(bundled.bundle.clone(), scene_id))
            .entries
            .push(bundled.entry);
    }
    Ok(map)
}
