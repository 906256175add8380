//! Error taxonomy for the reconciliation pipeline
//!
//! Everything here is fatal for the batch that raised it. Per-entry
//! problems that do not threaten dataset integrity (duplicate tags,
//! entries without English text, scenes missing from the translation
//! map) never become an `Error`; they are logged and skipped.

use std::path::PathBuf;

use thiserror::Error;

use crate::mt::MtError;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed CSV header/row or scene file
    #[error("format error in {source_name}: {message}")]
    Format {
        source_name: String,
        message: String,
    },

    /// A tag that cannot be mapped to a scene (no `_` separator)
    #[error("malformed tag {0:?}: expected at least one '_'")]
    MalformedTag(String),

    /// Extracted game text references a tag the translation dataset lacks
    #[error("no translation entry with tag {tag} in scene {scene}")]
    MissingData { tag: String, scene: String },

    /// A scene directory that must not be empty has no scene files
    #[error("no scene files in {}", .path.display())]
    EmptyDataset { path: PathBuf },

    /// Translation provider failed twice in a row
    #[error("machine translation failed: {0}")]
    Translation(#[from] MtError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    pub(crate) fn format(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Format {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
