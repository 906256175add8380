//! Translation dataset reconciliation for game dialogue and UI text.
//!
//! The dataset is a set of per-scene JSON files, each holding entries keyed
//! by tag with English source text and up to three Russian renditions
//! (native, machine, final). The modules here ingest spreadsheets and text
//! exports, fold updates into the dataset, fill gaps with machine
//! translation, and write the chosen text back into extracted game assets.

pub mod error;
pub mod extracted;
pub mod grouping;
pub mod ingest;
pub mod merge;
pub mod model;
pub mod mt;
pub mod resolve;
pub mod stats;
pub mod store;


pub use error::{Error, Result};
pub use model::{
    BundledTranslationEntry, EntrySet, MACHINE_MARKER, TranslationEntry, TranslationMap,
    TranslationScene,
};
