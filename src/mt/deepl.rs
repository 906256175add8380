//! DeepL API provider for machine translation
//!
//! Talks to the DeepL v2 `translate` endpoint with a JSON body. DeepL
//! supports a formality setting, which is how the informal register the
//! game's dialogue needs gets requested.
//!
//! # Authentication
//!
//! The auth key comes from `DEEPL_AUTH_KEY`. Keys ending in `:fx` belong to
//! the free API and are routed to its host; `DEEPL_API_URL` overrides the
//! endpoint entirely.

use crate::mt::error::{MtError, MtResult};
use crate::mt::translator::{Formality, MachineTranslator, normalize_locale, validate_locale};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde_json::json;
use tracing::debug;

const FREE_API_URL: &str = "https://api-free.deepl.com/v2/translate";
const PRO_API_URL: &str = "https://api.deepl.com/v2/translate";

/// DeepL API v2 provider
#[derive(Clone)]
pub struct DeeplProvider {
    auth_key: String,
    client: reqwest::Client,
    base_url: String,
}

impl DeeplProvider {
    /// Maximum request body DeepL accepts is 128 KiB; stay well under it
    const MAX_CHARS_PER_STRING: usize = 30_000;

    /// Create a provider for an explicit auth key
    pub fn new(auth_key: String) -> MtResult<Self> {
        if auth_key.trim().is_empty() {
            return Err(MtError::ConfigError("auth key cannot be empty".to_string()));
        }

        let base_url = if auth_key.ends_with(":fx") {
            FREE_API_URL
        } else {
            PRO_API_URL
        };

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| MtError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            auth_key,
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Create a provider from `DEEPL_AUTH_KEY` (and optionally `DEEPL_API_URL`)
    pub fn from_env() -> MtResult<Self> {
        let auth_key = std::env::var("DEEPL_AUTH_KEY").map_err(|_| {
            MtError::ConfigError("DEEPL_AUTH_KEY environment variable not set".to_string())
        })?;

        let provider = Self::new(auth_key)?;
        match std::env::var("DEEPL_API_URL") {
            Ok(url) if !url.trim().is_empty() => Ok(provider.with_base_url(url)),
            _ => Ok(provider),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn formality_param(formality: Formality) -> Option<&'static str> {
        match formality {
            Formality::Default => None,
            // the prefer_ variants fall back silently for languages without formality
            Formality::Informal => Some("prefer_less"),
            Formality::Formal => Some("prefer_more"),
        }
    }

    fn request_body(
        text: &str,
        source_locale: &str,
        target_locale: &str,
        formality: Formality,
    ) -> serde_json::Value {
        let mut body = json!({
            "text": [text],
            "source_lang": normalize_locale(source_locale).to_uppercase(),
            "target_lang": normalize_locale(target_locale).to_uppercase(),
        });
        if let Some(value) = Self::formality_param(formality) {
            body["formality"] = json!(value);
        }
        body
    }
}

impl std::fmt::Debug for DeeplProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeeplProvider")
            .field("auth_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for DeeplProvider {
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
        formality: Formality,
    ) -> MtResult<String> {
        validate_locale(source_locale)?;
        validate_locale(target_locale)?;

        if text.is_empty() {
            return Ok(String::new());
        }
        if text.len() > Self::MAX_CHARS_PER_STRING {
            return Err(MtError::TranslationError(format!(
                "Text exceeds maximum length of {} characters",
                Self::MAX_CHARS_PER_STRING
            )));
        }

        let body = Self::request_body(text, source_locale, target_locale, formality);
        debug!(provider = "deepl", chars = text.len(), "request");

        let response = self
            .client
            .post(&self.base_url)
            .header(AUTHORIZATION, format!("DeepL-Auth-Key {}", self.auth_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(match status.as_u16() {
                401 | 403 => MtError::ConfigError(format!("API rejected credentials ({}): {}", status, error_text)),
                456 => MtError::TranslationError(format!("quota exceeded ({}): {}", status, error_text)),
                _ => MtError::TranslationError(format!("API error ({}): {}", status, error_text)),
            });
        }

        let json: serde_json::Value = response.json().await.map_err(|e| {
            MtError::TranslationError(format!("Failed to parse API response: {}", e))
        })?;

        json["translations"][0]["text"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| {
                MtError::TranslationError(
                    "Invalid API response: missing 'translations[0].text'".to_string(),
                )
            })
    }

    fn provider_name(&self) -> &str {
        "DeepL"
    }
}
