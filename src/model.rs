//! Translation record model
//!
//! A [`TranslationEntry`] is one localizable string with all of its known
//! renditions. Entries are grouped into a [`TranslationScene`] by the scene
//! their tag belongs to, and scenes are keyed by scene id in a
//! [`TranslationMap`], the unit every pipeline stage consumes and produces.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Literal marker that prefixes machine-translated text
pub const MACHINE_MARKER: &str = "{D}";

/// Marker embedded in the English text of structural stubs (choice placeholders)
pub const DO_NOT_DELETE: &str = "DO NOT DELETE";

/// One localizable string unit, joined across sources by `tag`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationEntry {
    pub tag: String,
    /// English source text
    pub en: String,
    /// Russian text shipped with the game itself
    pub ru_native: String,
    /// Machine translation, prefixed with [`MACHINE_MARKER`] once set
    pub ru_machine: String,
    /// Authoritative Russian text substituted into the game
    pub ru_final: String,
    /// Human-confirmed
    pub verified: bool,
    /// Ukrainian source text, reference only
    pub uk: String,
}

impl TranslationEntry {
    /// Create an entry carrying only its tag and English text
    pub fn new(tag: impl Into<String>, en: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            en: en.into(),
            ru_native: String::new(),
            ru_machine: String::new(),
            ru_final: String::new(),
            verified: false,
            uk: String::new(),
        }
    }

    /// True if any of the three Russian slots holds text
    pub fn has_russian(&self) -> bool {
        !(self.ru_machine.is_empty() && self.ru_native.is_empty() && self.ru_final.is_empty())
    }

    /// Whether `ru_machine` already carries the provenance marker
    pub fn is_machine_marked(&self) -> bool {
        self.ru_machine.starts_with(MACHINE_MARKER)
    }

    /// Structural stubs are verified automatically and ship their English text
    pub(crate) fn apply_stub_rule(&mut self) {
        if self.en.contains(DO_NOT_DELETE) {
            self.ru_final = self.en.clone();
            self.verified = true;
        }
    }
}

/// A named bundle of entries sharing a narrative or UI context
///
/// Equality compares the entry *set*: two scenes holding the same entries
/// in a different order are equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationScene {
    pub bundle: String,
    pub scene: String,
    pub entries: Vec<TranslationEntry>,
}

impl TranslationScene {
    pub fn new(bundle: impl Into<String>, scene: impl Into<String>) -> Self {
        Self {
            bundle: bundle.into(),
            scene: scene.into(),
            entries: Vec::new(),
        }
    }

    pub fn find(&self, tag: &str) -> Option<&TranslationEntry> {
        self.entries.iter().find(|e| e.tag == tag)
    }

    pub fn find_mut(&mut self, tag: &str) -> Option<&mut TranslationEntry> {
        self.entries.iter_mut().find(|e| e.tag == tag)
    }

    /// Entries ordered by tag, the persisted order
    pub fn sorted_entries(&self) -> Vec<&TranslationEntry> {
        let mut sorted: Vec<&TranslationEntry> = self.entries.iter().collect();
        sorted.sort_by(|a, b| a.tag.cmp(&b.tag));
        sorted
    }

    /// Insert or replace the entry with the same tag
    pub fn upsert(&mut self, entry: TranslationEntry) {
        match self.find_mut(&entry.tag) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }
}

impl PartialEq for TranslationScene {
    fn eq(&self, other: &Self) -> bool {
        self.bundle == other.bundle
            && self.scene == other.scene
            && self.sorted_entries() == other.sorted_entries()
    }
}

impl Eq for TranslationScene {}

/// Scene id to scene; ordered so every pass walks scenes deterministically
pub type TranslationMap = BTreeMap<String, TranslationScene>;

/// An ingested entry that still remembers the asset bundle it came from
///
/// Scenes only learn their bundle at grouping time, so ingestion carries it
/// alongside each entry until then.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundledTranslationEntry {
    pub bundle: String,
    pub entry: TranslationEntry,
}

impl BundledTranslationEntry {
    pub fn new(bundle: impl Into<String>, entry: TranslationEntry) -> Self {
        Self {
            bundle: bundle.into(),
            entry,
        }
    }

    pub fn tag(&self) -> &str {
        &self.entry.tag
    }
}

/// Scene-agnostic set of ingested entries, unique by tag
///
/// Later inserts win; a replaced tag is logged, never rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntrySet {
    entries: BTreeMap<String, BundledTranslationEntry>,
}

impl EntrySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry; returns true if it replaced an earlier one
    pub fn insert(&mut self, entry: BundledTranslationEntry) -> bool {
        match self.entries.entry(entry.tag().to_string()) {
            Entry::Occupied(mut slot) => {
                warn!(tag = %slot.key(), "duplicate tag in input; later source wins");
                slot.insert(entry);
                true
            }
            Entry::Vacant(slot) => {
                slot.insert(entry);
                false
            }
        }
    }

    /// Fold another set into this one, its entries winning on conflict
    pub fn extend(&mut self, other: EntrySet) {
        for (_, entry) in other.entries {
            self.insert(entry);
        }
    }

    pub fn get(&self, tag: &str) -> Option<&BundledTranslationEntry> {
        self.entries.get(tag)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in tag order
    pub fn iter(&self) -> impl Iterator<Item = &BundledTranslationEntry> {
        self.entries.values()
    }
}

impl FromIterator<BundledTranslationEntry> for EntrySet {
    fn from_iter<I: IntoIterator<Item = BundledTranslationEntry>>(iter: I) -> Self {
        let mut set = EntrySet::new();
        for entry in iter {
            set.insert(entry);
        }
        set
    }
}

impl IntoIterator for EntrySet {
    type Item = BundledTranslationEntry;
    type IntoIter = std::collections::btree_map::IntoValues<String, BundledTranslationEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(tag: &str) -> TranslationEntry {
        TranslationEntry::new(tag, format!("text of {}", tag))
    }

    #[test]
    fn test_scene_equality_ignores_order() {
        let mut a = TranslationScene::new("loc", "A1S1.ENTLIG");
        a.entries.push(entry("A1S1.ENTLIG_B"));
        a.entries.push(entry("A1S1.ENTLIG_A"));

        let mut b = TranslationScene::new("loc", "A1S1.ENTLIG");
        b.entries.push(entry("A1S1.ENTLIG_A"));
        b.entries.push(entry("A1S1.ENTLIG_B"));

        assert_eq!(a, b);
    }

    #[test]
    fn test_scene_equality_detects_field_change() {
        let mut a = TranslationScene::new("loc", "S");
        a.entries.push(entry("S_1"));
        let mut b = a.clone();
        b.entries[0].ru_final = "changed".to_string();
        assert_ne!(a, b);
    }

    #[test]
    fn test_has_russian() {
        let mut e = entry("S_1");
        assert!(!e.has_russian());
        e.ru_native = "привет".to_string();
        assert!(e.has_russian());
    }

    #[test]
    fn test_stub_rule_overrides_translation() {
        let mut e = TranslationEntry::new("S_CHOICE", "CHOICE - DO NOT DELETE");
        e.ru_final = "что-то".to_string();
        e.apply_stub_rule();
        assert!(e.verified);
        assert_eq!(e.ru_final, "CHOICE - DO NOT DELETE");
    }

    #[test]
    fn test_stub_rule_ignores_regular_text() {
        let mut e = entry("S_1");
        e.apply_stub_rule();
        assert!(!e.verified);
        assert!(e.ru_final.is_empty());
    }

    #[test]
    fn test_upsert_replaces_by_tag() {
        let mut scene = TranslationScene::new("loc", "S");
        scene.upsert(entry("S_1"));
        let mut replacement = entry("S_1");
        replacement.ru_final = "новый".to_string();
        scene.upsert(replacement);
        assert_eq!(scene.entries.len(), 1);
        assert_eq!(scene.find("S_1").unwrap().ru_final, "новый");
    }

    #[test]
    fn test_entry_set_later_insert_wins() {
        let mut set = EntrySet::new();
        assert!(!set.insert(BundledTranslationEntry::new("loc", entry("S_1"))));

        let mut newer = entry("S_1");
        newer.en = "newer".to_string();
        assert!(set.insert(BundledTranslationEntry::new("dialogue", newer)));

        assert_eq!(set.len(), 1);
        let kept = set.get("S_1").unwrap();
        assert_eq!(kept.bundle, "dialogue");
        assert_eq!(kept.entry.en, "newer");
    }

    #[test]
    fn test_entry_set_iterates_in_tag_order() {
        let set: EntrySet = ["S_3", "S_1", "S_2"]
            .iter()
            .map(|t| BundledTranslationEntry::new("loc", entry(t)))
            .collect();
        let tags: Vec<&str> = set.iter().map(|e| e.tag()).collect();
        assert_eq!(tags, vec!["S_1", "S_2", "S_3"]);
    }
}
