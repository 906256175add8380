//! Machine-translation fill-in pass
//!
//! Walks a [`TranslationMap`] and fills `ru_machine` for every entry that
//! has no Russian text at all. Requests go out one at a time. A failed
//! request is retried exactly once after a fixed backoff; a second failure
//! aborts the whole pass.
//!
//! Entries that already hold Russian text are left alone, except that an
//! unmarked `ru_machine` gets the provenance marker backfilled.

use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::model::{MACHINE_MARKER, TranslationEntry, TranslationMap};
use crate::mt::error::MtResult;
use crate::mt::translator::{Formality, MachineTranslator};

/// Pause before the single retry of a failed request
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct FillerConfig {
    pub source_lang: String,
    pub target_lang: String,
    pub formality: Formality,
    pub backoff: Duration,
    /// Scenes from these bundles are left untouched
    pub skip_bundles: Vec<String>,
}

impl Default for FillerConfig {
    fn default() -> Self {
        Self {
            source_lang: "EN".to_string(),
            target_lang: "RU".to_string(),
            formality: Formality::Informal,
            backoff: DEFAULT_BACKOFF,
            skip_bundles: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillReport {
    pub translated: usize,
    pub marker_backfilled: usize,
    pub skipped_existing: usize,
    pub skipped_no_source: usize,
    pub skipped_bundle: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillOutcome {
    pub map: TranslationMap,
    pub report: FillReport,
}

/// Prefix `text` with the provenance marker
pub fn mark_machine(text: &str) -> String {
    format!("{} {}", MACHINE_MARKER, text)
}

pub struct MachineTranslationFiller<'a, T: MachineTranslator + ?Sized> {
    translator: &'a T,
    config: FillerConfig,
}

impl<'a, T: MachineTranslator + ?Sized> MachineTranslationFiller<'a, T> {
    pub fn new(translator: &'a T, config: FillerConfig) -> Self {
        Self { translator, config }
    }

    /// Fill a copy of `map`
    ///
    /// # Errors
    /// `Error::Translation` when a request fails twice in a row. Nothing of
    /// the partially filled copy is returned in that case.
    pub async fn fill(&self, map: &TranslationMap) -> Result<FillOutcome> {
        info!(
            provider = self.translator.provider_name(),
            scenes = map.len(),
            "running machine translation"
        );
        let mut result = map.clone();
        let mut report = FillReport::default();

        for scene in result.values_mut() {
            if self.config.skip_bundles.iter().any(|b| *b == scene.bundle) {
                debug!(scene = %scene.scene, bundle = %scene.bundle, "bundle skipped");
                report.skipped_bundle += scene.entries.len();
                continue;
            }
            for entry in scene.entries.iter_mut() {
                self.fill_entry(entry, &mut report).await?;
            }
        }

        info!(
            translated = report.translated,
            backfilled = report.marker_backfilled,
            no_source = report.skipped_no_source,
            "translating done"
        );
        Ok(FillOutcome {
            map: result,
            report,
        })
    }

    async fn fill_entry(&self, entry: &mut TranslationEntry, report: &mut FillReport) -> MtResult<()> {
        debug!(tag = %entry.tag, "translate");

        if entry.has_russian() {
            debug!(tag = %entry.tag, "ru text exists");
            if !entry.ru_machine.is_empty() && !entry.is_machine_marked() {
                entry.ru_machine = mark_machine(&entry.ru_machine);
                report.marker_backfilled += 1;
            }
            report.skipped_existing += 1;
            return Ok(());
        }

        if entry.en.is_empty() {
            warn!(tag = %entry.tag, "no en text");
            report.skipped_no_source += 1;
            return Ok(());
        }

        let translated = self.translate_with_retry(&entry.en).await?;
        entry.ru_machine = mark_machine(&translated);
        report.translated += 1;
        debug!(tag = %entry.tag, result = %entry.ru_machine, "translated");
        Ok(())
    }

    async fn translate_once(&self, text: &str) -> MtResult<String> {
        self.translator
            .translate(
                text,
                &self.config.source_lang,
                &self.config.target_lang,
                self.config.formality,
            )
            .await
    }

    /// One attempt, then one more after the backoff; no further retries
    async fn translate_with_retry(&self, text: &str) -> MtResult<String> {
        match self.translate_once(text).await {
            Ok(translated) => Ok(translated),
            Err(e) => {
                error!(error = %e, "translation failed");
                info!(seconds = self.config.backoff.as_secs(), "sleeping before the single retry");
                tokio::time::sleep(self.config.backoff).await;
                self.translate_once(text).await
            }
        }
    }
}
