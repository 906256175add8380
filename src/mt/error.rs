use thiserror::Error;

/// Error types for the Machine Translation module
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MtError {
    /// Provider rejected or failed the translation
    #[error("Translation error: {0}")]
    TranslationError(String),
    /// Missing or invalid provider configuration (API key, endpoint)
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// Transport-level failure talking to the provider
    #[error("Network error: {0}")]
    NetworkError(String),
    /// Locale code with characters no provider accepts
    #[error("Invalid locale: {0}")]
    InvalidLocale(String),
    /// General error with context
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for MtError {
    fn from(err: reqwest::Error) -> Self {
        MtError::NetworkError(err.to_string())
    }
}

/// Result type for MT operations
pub type MtResult<T> = Result<T, MtError>;

#[cfg(test)]
mod tests {
    use super::*;

    // ========== Display Tests ==========

    #[test]
    fn test_display_prefixes_by_kind() {
        assert_eq!(
            MtError::TranslationError("quota".into()).to_string(),
            "Translation error: quota"
        );
        assert_eq!(
            MtError::ConfigError("DEEPL_API_KEY not set".into()).to_string(),
            "Configuration error: DEEPL_API_KEY not set"
        );
        assert_eq!(MtError::NetworkError("reset".into()).to_string(), "Network error: reset");
        assert_eq!(MtError::InvalidLocale("e n".into()).to_string(), "Invalid locale: e n");
        assert_eq!(MtError::Other("plain".into()).to_string(), "plain");
    }

    #[test]
    fn test_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(MtError::Other("x".into()));
        assert!(err.source().is_none());
    }
}
