//! Machine Translation trait and utilities
//!
//! This module defines the `MachineTranslator` trait for provider abstraction,
//! so the fill-in pass can run against DeepL, Google Translate or the mock
//! without knowing which one it talks to.
//!
//! # Example
//!
//! ```ignore
//! use oxen_l10n::mt::{DeeplProvider, Formality, MachineTranslator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = DeeplProvider::from_env()?;
//!     let result = provider.translate("Hello, world!", "en", "ru", Formality::Informal).await?;
//!     println!("{}", result);
//!     Ok(())
//! }
//! ```

use crate::mt::error::{MtError, MtResult};
use async_trait::async_trait;

/// Register the translation should be written in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Formality {
    /// Provider default
    #[default]
    Default,
    /// Informal "you" (ты in Russian)
    Informal,
    /// Formal "you" (вы in Russian)
    Formal,
}

/// Generic trait for machine translation providers
///
/// Implementations handle the actual translation work, whether through an
/// API or deterministic logic (Mock). Calls are made one at a time.
#[async_trait]
pub trait MachineTranslator: Send + Sync {
    /// Translate a single text string from source to target locale
    ///
    /// # Arguments
    ///
    /// * `text` - The text to translate
    /// * `source_locale` - Source language code (e.g., "en", "en-US")
    /// * `target_locale` - Target language code (e.g., "ru")
    /// * `formality` - Requested register; providers without support ignore it
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The translated text
    /// * `Err(MtError)` - If translation fails
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
        formality: Formality,
    ) -> MtResult<String>;

    /// Get the name of this translation provider, for logging
    fn provider_name(&self) -> &str;
}

/// Normalize a locale code by stripping region information
///
/// Converts locale codes from BCP 47 format to ISO 639-1 format:
/// - `en-US` → `en`
/// - `fr-FR` → `fr`
/// - `en` → `en` (unchanged)
pub fn normalize_locale(locale: &str) -> String {
    locale.split('-').next().unwrap_or(locale).to_lowercase()
}

/// Validate that a locale code is in acceptable format
///
/// Checks that the locale code contains only alphanumeric characters,
/// hyphens, and underscores (following ISO 639 conventions).
pub fn validate_locale(locale: &str) -> MtResult<()> {
    if locale.is_empty() {
        return Err(MtError::InvalidLocale("Locale code is empty".to_string()));
    }

    if !locale
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(MtError::InvalidLocale(format!(
            "Invalid characters in locale code: {}",
            locale
        )));
    }

    Ok(())
}
