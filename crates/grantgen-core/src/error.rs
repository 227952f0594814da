//! Error types for the generation pipeline
//!
//! Provides error handling for:
//! - Unknown sections and rule resolution
//! - Unusable generator output (malformed or wrongly shaped)
//! - Provider failures
//! - Cancellation
//! - Document persistence

use grantgen_document::DocumentError;
use grantgen_merge::MergeError;
use grantgen_response::ResponseError;
use grantgen_rules::RuleError;
use std::path::PathBuf;

/// Main pipeline error type
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Section key not registered
    #[error("unknown section: '{0}'")]
    UnknownSection(String),

    /// Generator output could not be parsed
    #[error("malformed response: {message}")]
    MalformedResponse {
        /// Parse failure
        message: String,
        /// Start of the raw text
        excerpt: String,
    },

    /// Parsed output has the wrong top-level kind
    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Kind the schema declares
        expected: &'static str,
        /// Kind the generator returned
        actual: &'static str,
    },

    /// Mode cannot apply to the section
    #[error("mode {mode} does not apply to section {section}")]
    UnsupportedMode {
        /// Section key
        section: String,
        /// Mode name
        mode: String,
    },

    /// Provider collaborator failed
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Internal guarantee broken
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// Caller abandoned the request
    #[error("generation cancelled")]
    Cancelled,

    /// Rule resolution failed
    #[error("rule resolution failed: {0}")]
    Rules(#[from] RuleError),

    /// Document data could not be read or written
    #[error("document error: {0}")]
    Document(DocumentError),

    /// Merge strategy failed
    #[error("merge failed: {0}")]
    Merge(#[from] MergeError),
}

impl GenerationError {
    /// Check if the caller may reasonably retry
    ///
    /// The pipeline itself never retries.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::MalformedResponse { .. } | Self::ShapeMismatch { .. } => true,
            Self::Provider(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Human-readable failure reason for the UI layer
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::UnknownSection(key) => format!("The section '{key}' cannot be generated."),
            Self::UnsupportedMode { section, mode } => {
                format!("The {mode} mode is not available for the section '{section}'.")
            }
            Self::MalformedResponse { .. } | Self::ShapeMismatch { .. } => {
                "The AI returned content in an unexpected format. Please try again.".to_string()
            }
            Self::Provider(e) => e.user_message(),
            Self::InvariantViolation(_) | Self::Merge(_) => {
                "Generated content could not be applied to the document.".to_string()
            }
            Self::Cancelled => "Generation was cancelled.".to_string(),
            Self::Rules(_) => "Generation rules could not be loaded.".to_string(),
            Self::Document(_) => "The document data is not in the expected format.".to_string(),
        }
    }
}

impl From<DocumentError> for GenerationError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::UnknownSection(key) => Self::UnknownSection(key),
            other => Self::Document(other),
        }
    }
}

impl From<ResponseError> for GenerationError {
    fn from(err: ResponseError) -> Self {
        match err {
            ResponseError::Malformed { message, excerpt } => {
                Self::MalformedResponse { message, excerpt }
            }
            ResponseError::ShapeMismatch { expected, actual } => {
                Self::ShapeMismatch { expected, actual }
            }
        }
    }
}

/// Provider collaborator failures
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Too many requests
    #[error("rate limited")]
    RateLimited {
        /// Suggested wait, if the provider gave one
        retry_after_secs: Option<u64>,
    },

    /// Credential rejected
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    /// Transport failure
    #[error("network failure: {0}")]
    Network(String),

    /// Provider envelope unreadable
    #[error("malformed provider response: {0}")]
    MalformedProviderResponse(String),

    /// Provider gave up waiting
    #[error("provider timed out after {duration_secs}s")]
    Timeout {
        /// Elapsed time
        duration_secs: u64,
    },
}

impl ProviderError {
    /// Check if error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Network(_) | Self::Timeout { .. }
        )
    }

    /// Human-readable failure reason
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::RateLimited { retry_after_secs: Some(secs) } => {
                format!("The AI service is busy. Please wait {secs} seconds and try again.")
            }
            Self::RateLimited { retry_after_secs: None } => {
                "The AI service is busy. Please wait a moment and try again.".to_string()
            }
            Self::InvalidCredential(_) => {
                "The AI service rejected the API key. Check your settings.".to_string()
            }
            Self::Network(_) => "The AI service could not be reached.".to_string(),
            Self::MalformedProviderResponse(_) => {
                "The AI service returned an unreadable reply. Please try again.".to_string()
            }
            Self::Timeout { .. } => "The AI service took too long to answer.".to_string(),
        }
    }
}

/// Document store failures
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// File system failure
    #[error("document store error at {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Stored document could not be decoded or encoded
    #[error("document {key} is not valid JSON: {source}")]
    Serialization {
        /// Document key
        key: String,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// Project identifier unusable as a storage key
    #[error("invalid project identifier: '{0}'")]
    InvalidKey(String),
}

impl StoreError {
    /// Create I/O error
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Configuration failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file unreadable
    #[error("cannot read config {path}: {source}")]
    Io {
        /// Config path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result alias for the pipeline
pub type GenerationResult<T> = Result<T, GenerationError>;

#[cfg(test)]
mod tests {
    use super::*;
    use grantgen_schema::TopLevel;

    #[test]
    fn response_errors_map_into_taxonomy() {
        let err: GenerationError = ResponseError::malformed("no JSON", "Sorry").into();
        assert!(matches!(err, GenerationError::MalformedResponse { ref excerpt, .. } if excerpt == "Sorry"));

        let err: GenerationError = ResponseError::shape_mismatch(TopLevel::Array, "object").into();
        assert!(matches!(
            err,
            GenerationError::ShapeMismatch { expected: "array", actual: "object" }
        ));
    }

    #[test]
    fn unknown_section_from_document_error() {
        let err: GenerationError = DocumentError::UnknownSection("budget".into()).into();
        assert!(matches!(err, GenerationError::UnknownSection(ref key) if key == "budget"));
        assert!(err.user_message().contains("budget"));
    }

    #[test]
    fn retryable_classification() {
        assert!(GenerationError::from(ProviderError::Network("reset".into())).is_retryable());
        assert!(GenerationError::from(ProviderError::RateLimited { retry_after_secs: None }).is_retryable());
        assert!(!GenerationError::from(ProviderError::InvalidCredential("bad".into())).is_retryable());
        assert!(!GenerationError::Cancelled.is_retryable());
        assert!(!GenerationError::UnknownSection("x".into()).is_retryable());
    }

    #[test]
    fn user_messages_are_plain_language() {
        let err = GenerationError::from(ProviderError::RateLimited { retry_after_secs: Some(30) });
        assert!(err.user_message().contains("30 seconds"));
        assert_eq!(GenerationError::Cancelled.user_message(), "Generation was cancelled.");
    }
}
