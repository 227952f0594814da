//! Response processing errors

use grantgen_schema::TopLevel;

/// Longest raw excerpt carried in an error
const EXCERPT_LEN: usize = 160;

/// Errors turning raw generator output into a section value
#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    /// Output is not parseable JSON
    #[error("malformed response: {message}")]
    Malformed {
        /// Parser message
        message: String,
        /// Start of the offending text
        excerpt: String,
    },

    /// Parsed payload has the wrong top-level kind
    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Kind declared by the schema
        expected: &'static str,
        /// Kind found in the payload
        actual: &'static str,
    },
}

impl ResponseError {
    /// Create malformed-response error with an excerpt of the raw text
    pub fn malformed(message: impl Into<String>, raw: &str) -> Self {
        Self::Malformed {
            message: message.into(),
            excerpt: raw.chars().take(EXCERPT_LEN).collect(),
        }
    }

    /// Create shape-mismatch error
    #[must_use]
    pub fn shape_mismatch(expected: TopLevel, actual: &'static str) -> Self {
        Self::ShapeMismatch {
            expected: expected.as_str(),
            actual,
        }
    }
}

/// Result alias for response processing
pub type ResponseResult<T> = Result<T, ResponseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_is_bounded() {
        let raw = "x".repeat(1000);
        match ResponseError::malformed("bad", &raw) {
            ResponseError::Malformed { excerpt, .. } => assert_eq!(excerpt.len(), EXCERPT_LEN),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn shape_mismatch_display() {
        let err = ResponseError::shape_mismatch(TopLevel::Array, "object");
        assert_eq!(err.to_string(), "shape mismatch: expected array, got object");
    }
}
