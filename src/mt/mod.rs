/// Machine Translation Module
///
/// This module fills missing Russian text in a translation map through an
/// external machine translation provider.
///
/// # Overview
///
/// The MT module consists of several components working together:
///
/// 1. **MT Trait & Providers** - Generic trait for MT systems with DeepL and Google Translate implementations
/// 2. **Mock Translator** - Deterministic, network-free provider for tests and dry runs
/// 3. **Filler** - Walks a map one entry at a time, stamps results with the provenance marker,
///    and retries a failed request once after a fixed backoff
///
/// # Example
///
/// ```ignore
/// use oxen_l10n::mt::{DeeplProvider, FillerConfig, MachineTranslationFiller};
/// use oxen_l10n::store;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let map = store::load_map("translations".as_ref())?;
///
///     let provider = DeeplProvider::from_env()?;
///     let filler = MachineTranslationFiller::new(&provider, FillerConfig::default());
///     let outcome = filler.fill(&map).await?;
///
///     store::save_map(&outcome.map, "translations_mt".as_ref())?;
///     Ok(())
/// }
/// ```
pub mod deepl;
pub mod error;
pub mod filler;
pub mod google_translate;
pub mod mock;
pub mod translator;

pub use deepl::DeeplProvider;
pub use error::{MtError, MtResult};
pub use filler::{
    DEFAULT_BACKOFF, FillOutcome, FillReport, FillerConfig, MachineTranslationFiller, mark_machine,
};
pub use google_translate::GoogleTranslateProvider;
pub use mock::{MockCall, MockMode, MockTranslator};
pub use translator::{Formality, MachineTranslator};
