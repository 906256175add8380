//! Mock Machine Translator for testing
//!
//! This module provides a deterministic, API-free translator for testing
//! the fill-in pass without requiring API keys or network access, and for
//! dry runs of the CLI.
//!
//! # Example
//!
//! ```ignore
//! use oxen_l10n::mt::{Formality, MachineTranslator, MockMode, MockTranslator};
//!
//! #[tokio::test]
//! async fn test_translation() {
//!     let mock = MockTranslator::new(MockMode::Suffix);
//!     let result = mock.translate("hello", "en", "ru", Formality::Informal).await.unwrap();
//!     assert_eq!(result, "hello_ru");
//! }
//! ```

use crate::mt::error::{MtError, MtResult};
use crate::mt::translator::{Formality, MachineTranslator};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Mock translation modes for testing different scenarios
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append locale suffix: "hello" → "hello_ru"
    Suffix,

    /// Use predefined mappings for realistic translations
    /// (text, target_locale) → translation
    Mappings(HashMap<(String, String), String>),

    /// Simulate API errors on every call
    Error(String),

    /// Fail the first `n` calls, then behave like `Suffix`
    FailTimes(usize),

    /// No-op: return input unchanged
    NoOp,
}

/// Arguments of one `translate` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub text: String,
    pub source_locale: String,
    pub target_locale: String,
    pub formality: Formality,
}

/// Mock translator that simulates various translation scenarios
///
/// Counts every call it receives and keeps the arguments of the latest
/// one, so tests can check retry behaviour and what was requested.
#[derive(Debug)]
pub struct MockTranslator {
    mode: MockMode,
    /// Optional simulated network delay (in milliseconds)
    delay_ms: u64,
    calls: AtomicUsize,
    last_call: Mutex<Option<MockCall>>,
}

impl MockTranslator {
    /// Create a new MockTranslator with the given mode
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            delay_ms: 0,
            calls: AtomicUsize::new(0),
            last_call: Mutex::new(None),
        }
    }

    /// Create a MockTranslator with simulated network delay
    pub fn with_delay(mode: MockMode, delay_ms: u64) -> Self {
        Self {
            mode,
            delay_ms,
            calls: AtomicUsize::new(0),
            last_call: Mutex::new(None),
        }
    }

    /// Number of `translate` calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Arguments of the most recent `translate` call
    pub fn last_call(&self) -> Option<MockCall> {
        match self.last_call.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn record(&self, call: MockCall) {
        match self.last_call.lock() {
            Ok(mut guard) => *guard = Some(call),
            Err(poisoned) => *poisoned.into_inner() = Some(call),
        }
    }

    async fn apply_delay(&self) {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
    }

    /// Apply translation logic based on the mode
    fn apply_translation(&self, text: &str, target: &str, call: usize) -> MtResult<String> {
        match &self.mode {
            MockMode::Suffix => Ok(format!("{}_{}", text, target)),
            MockMode::Mappings(map) => {
                let key = (text.to_string(), target.to_string());
                Ok(map
                    .get(&key)
                    .cloned()
                    .unwrap_or_else(|| format!("{}_{}", text, target)))
            }
            MockMode::Error(msg) => Err(MtError::TranslationError(msg.clone())),
            MockMode::FailTimes(n) if call < *n => Err(MtError::NetworkError(format!(
                "simulated failure {} of {}",
                call + 1,
                n
            ))),
            MockMode::FailTimes(_) => Ok(format!("{}_{}", text, target)),
            MockMode::NoOp => Ok(text.to_string()),
        }
    }
}

#[async_trait]
impl MachineTranslator for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
        formality: Formality,
    ) -> MtResult<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.record(MockCall {
            text: text.to_string(),
            source_locale: source_locale.to_string(),
            target_locale: target_locale.to_string(),
            formality,
        });
        self.apply_delay().await;
        self.apply_translation(text, target_locale, call)
    }

    fn provider_name(&self) -> &str {
        "Mock Translator"
    }
}
