//! Coverage statistics over a translation map

use crate::model::TranslationMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DatasetStats {
    pub total: usize,
    pub with_en: usize,
    pub with_uk: usize,
    pub with_ru_native: usize,
    pub with_ru_machine: usize,
    pub verified: usize,
}

/// `part` as a whole percentage of `whole`, truncated; 0 for an empty whole
pub fn percent(part: usize, whole: usize) -> usize {
    if whole == 0 {
        return 0;
    }
    part * 100 / whole
}

impl DatasetStats {
    pub fn collect(map: &TranslationMap) -> Self {
        let mut stats = Self::default();
        for entry in map.values().flat_map(|scene| scene.entries.iter()) {
            stats.total += 1;
            stats.with_en += usize::from(!entry.en.is_empty());
            stats.with_uk += usize::from(!entry.uk.is_empty());
            stats.with_ru_native += usize::from(!entry.ru_native.is_empty());
            stats.with_ru_machine += usize::from(!entry.ru_machine.is_empty());
            stats.verified += usize::from(entry.verified);
        }
        stats
    }

    /// Entries the game itself ships no Russian for
    pub fn untranslated(&self) -> usize {
        self.total - self.with_ru_native
    }

    /// Machine coverage of the untranslated part
    pub fn machine_percent(&self) -> usize {
        percent(self.with_ru_machine, self.untranslated())
    }
}

/// Tags without final Russian text, sorted
pub fn untranslated_tags(map: &TranslationMap) -> Vec<&str> {
    let mut tags: Vec<&str> = map
        .values()
        .flat_map(|scene| scene.entries.iter())
        .filter(|entry| entry.ru_final.is_empty())
        .map(|entry| entry.tag.as_str())
        .collect();
    tags.sort_unstable();
    tags
}
