//! Error types for rule resolution

use std::path::PathBuf;

/// Errors loading, validating or persisting rule sets
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// Language has no compiled-in rule set
    #[error("unsupported language: '{0}'")]
    UnsupportedLanguage(String),

    /// Compiled-in rule set failed to parse or is incomplete
    #[error("invalid built-in rules for {language}: {message}")]
    InvalidDefaults { language: String, message: String },

    /// Override blob is not valid JSON or does not match the override shape
    #[error("invalid rule override: {0}")]
    InvalidOverride(String),

    /// Override names a mode that does not exist
    #[error("unknown mode in rule override: '{0}'")]
    UnknownMode(String),

    /// Override store failed
    #[error("rule override store error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RuleError {
    /// Create invalid-defaults error
    pub fn invalid_defaults(language: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDefaults {
            language: language.into(),
            message: message.into(),
        }
    }

    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for rule operations
pub type RuleResult<T> = Result<T, RuleError>;
