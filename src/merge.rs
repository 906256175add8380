//! Delta merge
//!
//! Folds a freshly ingested [`EntrySet`] (the delta) into an authoritative
//! [`TranslationMap`] without discarding accepted work. The input map is
//! never touched; the merge returns a new map.
//!
//! For each entry of the map with a matching delta tag, `ru_final` is
//! overwritten unless the delta text is already known to the entry (equal
//! to its `ru_final`, `ru_machine` or `ru_native`) and the merge is not
//! forced. An overwrite clears a stale `ru_machine` so the next fill pass
//! regenerates it.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::grouping::tag_to_scene;
use crate::model::{
    BundledTranslationEntry, EntrySet, TranslationEntry, TranslationMap, TranslationScene,
};

/// What to do with delta tags the authoritative map does not contain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnmatchedPolicy {
    /// Ignore them silently
    #[default]
    Drop,
    /// Add them to the scene derived from their tag
    Insert,
    /// Ignore them, logging each one
    Warn,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOptions {
    /// Overwrite even when the delta brings no new text
    pub force: bool,
    pub unmatched: UnmatchedPolicy,
}

/// Counters describing what a merge did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub updated: usize,
    pub unchanged: usize,
    pub machine_cleared: usize,
    pub inserted: usize,
    pub dropped: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub map: TranslationMap,
    pub report: MergeReport,
}

/// True if `text` is already one of the entry's Russian renditions
fn already_known(entry: &TranslationEntry, text: &str) -> bool {
    text == entry.ru_final || text == entry.ru_machine || text == entry.ru_native
}

/// Merge `delta` into a copy of `map`
pub fn merge(map: &TranslationMap, delta: &EntrySet, options: MergeOptions) -> MergeOutcome {
    info!(scenes = map.len(), delta = delta.len(), force = options.force, "applying delta");
    let mut result = map.clone();
    let mut report = MergeReport::default();
    let mut matched: HashSet<String> = HashSet::new();

    for scene in result.values_mut() {
        for entry in scene.entries.iter_mut() {
            let Some(update) = delta.get(&entry.tag) else {
                continue;
            };
            matched.insert(entry.tag.clone());
            let new_final = &update.entry.ru_final;

            if !options.force && already_known(entry, new_final) {
                report.unchanged += 1;
                continue;
            }

            debug!(tag = %entry.tag, "ru_final updated");
            entry.ru_final = new_final.clone();
            report.updated += 1;
            if !entry.ru_machine.is_empty() {
                entry.ru_machine.clear();
                report.machine_cleared += 1;
            }
        }
    }

    for update in delta.iter().filter(|u| !matched.contains(u.tag())) {
        handle_unmatched(&mut result, update, options.unmatched, &mut report);
    }

    info!(
        updated = report.updated,
        unchanged = report.unchanged,
        inserted = report.inserted,
        dropped = report.dropped,
        "delta applied"
    );
    MergeOutcome {
        map: result,
        report,
    }
}

fn handle_unmatched(
    result: &mut TranslationMap,
    update: &BundledTranslationEntry,
    policy: UnmatchedPolicy,
    report: &mut MergeReport,
) {
    match policy {
        UnmatchedPolicy::Drop => {
            debug!(tag = %update.tag(), "delta tag not in map; dropped");
            report.dropped += 1;
        }
        UnmatchedPolicy::Warn => {
            warn!(tag = %update.tag(), "delta tag not in map; dropped");
            report.dropped += 1;
        }
        UnmatchedPolicy::Insert => match tag_to_scene(update.tag()) {
            Ok(scene_id) => {
                debug!(tag = %update.tag(), scene = %scene_id, "delta tag inserted");
                result
                    .entry(scene_id.clone())
                    .or_insert_with(|| TranslationScene::new(update.bundle.clone(), scene_id))
                    .upsert(update.entry.clone());
                report.inserted += 1;
            }
            Err(e) => {
                warn!(tag = %update.tag(), error = %e, "delta tag has no scene; dropped");
                report.dropped += 1;
            }
        },
    }
}

/// Merge with the default unmatched-tag policy, returning only the map
///
/// Applying the same delta twice without `force` changes nothing the second
/// time.
pub fn apply_delta(map: &TranslationMap, delta: &EntrySet, force: bool) -> TranslationMap {
    let options = MergeOptions {
        force,
        ..Default::default()
    };
    merge(map, delta, options).map
}
