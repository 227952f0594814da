//! Merge strategy trait and core types

use grantgen_document::GenerationMode;
use serde_json::Value;

/// Strategy for combining generated data with existing section data
///
/// Implementations are deterministic and never mutate their inputs.
pub trait MergeStrategy: Send + Sync + std::fmt::Debug {
    /// Merge `generated` into `original`
    fn merge(
        &self,
        original: &Value,
        generated: &Value,
        mode: &GenerationMode,
    ) -> Result<Value, MergeError>;

    /// Whether non-empty user text always survives the merge
    fn preserves_user_text(&self) -> bool;

    /// Strategy name (for debugging/serialization)
    fn name(&self) -> &'static str;
}

/// Merge failure
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// Inputs have kinds the strategy cannot combine
    #[error("cannot merge {generated} into {original}")]
    ShapeMismatch {
        /// Kind of the existing value
        original: &'static str,
        /// Kind of the generated value
        generated: &'static str,
    },

    /// No strategy registered for the mode
    #[error("no merge strategy for mode '{0}'")]
    NoStrategy(String),
}

impl MergeError {
    /// Create shape mismatch from the two values
    #[must_use]
    pub fn shape_mismatch(original: &Value, generated: &Value) -> Self {
        Self::ShapeMismatch {
            original: kind_name(original),
            generated: kind_name(generated),
        }
    }
}

/// JSON kind name for messages
#[must_use]
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Whether a value counts as "not yet authored"
///
/// Null, whitespace-only strings and empty containers are blank. Numbers and
/// booleans never are.
#[must_use]
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_values() {
        assert!(is_blank(&Value::Null));
        assert!(is_blank(&json!("  ")));
        assert!(is_blank(&json!([])));
        assert!(is_blank(&json!({})));
        assert!(!is_blank(&json!(0)));
        assert!(!is_blank(&json!(false)));
        assert!(!is_blank(&json!("x")));
        assert!(!is_blank(&json!([""])));
    }

    #[test]
    fn shape_mismatch_message() {
        let err = MergeError::shape_mismatch(&json!([]), &json!({}));
        assert_eq!(err.to_string(), "cannot merge object into array");
    }
}
