//! Regenerate strategy

use crate::strategy::{MergeError, MergeStrategy};
use grantgen_document::GenerationMode;
use serde_json::Value;

/// Replace the section outright
#[derive(Debug, Clone, Copy, Default)]
pub struct RegenerateStrategy;

impl RegenerateStrategy {
    /// Create regenerate strategy
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl MergeStrategy for RegenerateStrategy {
    fn merge(
        &self,
        _original: &Value,
        generated: &Value,
        _mode: &GenerationMode,
    ) -> Result<Value, MergeError> {
        Ok(generated.clone())
    }

    fn preserves_user_text(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "regenerate"
    }
}

/// Carry over object keys the generator was never asked to produce
///
/// Sections hold settings that are not generated content, such as a
/// project's start date. A regenerated object keeps those values from the
/// original. Non-object values are returned unchanged.
#[must_use]
pub fn retain_undeclared_keys(original: &Value, mut generated: Value, declared: &[&str]) -> Value {
    if let (Value::Object(orig), Value::Object(gen)) = (original, &mut generated) {
        for (key, value) in orig {
            if !declared.contains(&key.as_str()) {
                gen.insert(key.clone(), value.clone());
            }
        }
    }
    generated
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn generated_replaces_original() {
        let merged = RegenerateStrategy::new()
            .merge(&json!([{"title": "Old"}]), &json!([{"title": "New"}]), &GenerationMode::Regenerate)
            .unwrap();
        assert_eq!(merged, json!([{"title": "New"}]));
    }

    #[test]
    fn undeclared_keys_survive() {
        let original = json!({"projectTitle": "Old", "startDate": "2026-01-01", "durationMonths": 24});
        let generated = json!({"projectTitle": "New", "startDate": "1999-01-01"});
        let kept = retain_undeclared_keys(&original, generated, &["projectTitle"]);
        assert_eq!(
            kept,
            json!({"projectTitle": "New", "startDate": "2026-01-01", "durationMonths": 24})
        );
    }

    #[test]
    fn arrays_untouched() {
        let kept = retain_undeclared_keys(&json!({"a": 1}), json!([1]), &[]);
        assert_eq!(kept, json!([1]));
    }
}
