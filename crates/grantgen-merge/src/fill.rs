//! Fill and enhance strategies
//!
//! Both are non-destructive: a non-empty value in the original is never
//! replaced. Blank values take the generated value. Arrays merge position by
//! position; positions past the shorter array come from the longer one.
//!
//! Positional pairing means a list reordered or shortened between generation
//! and merge pairs items by position, not identity.

use crate::strategy::{is_blank, MergeError, MergeStrategy};
use grantgen_document::GenerationMode;
use serde_json::Value;

/// Non-destructive recursive merge
///
/// `fill_merge(x, x) == x` for every `x`.
#[must_use]
pub fn fill_merge(original: &Value, generated: &Value) -> Value {
    match (original, generated) {
        (Value::Object(orig), Value::Object(gen)) => {
            let mut merged = orig.clone();
            for (key, gen_value) in gen {
                let value = match orig.get(key) {
                    Some(orig_value) => fill_merge(orig_value, gen_value),
                    None => gen_value.clone(),
                };
                merged.insert(key.clone(), value);
            }
            Value::Object(merged)
        }
        (Value::Array(orig), Value::Array(gen)) => {
            let len = orig.len().max(gen.len());
            let merged = (0..len)
                .map(|i| match (orig.get(i), gen.get(i)) {
                    (Some(o), Some(g)) => fill_merge(o, g),
                    (Some(o), None) => o.clone(),
                    (None, Some(g)) => g.clone(),
                    (None, None) => Value::Null,
                })
                .collect();
            Value::Array(merged)
        }
        (orig, gen) if is_blank(orig) => gen.clone(),
        (orig, _) => orig.clone(),
    }
}

/// Fill mode: generate only what is missing
#[derive(Debug, Clone, Copy, Default)]
pub struct FillStrategy;

impl FillStrategy {
    /// Create fill strategy
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl MergeStrategy for FillStrategy {
    fn merge(
        &self,
        original: &Value,
        generated: &Value,
        _mode: &GenerationMode,
    ) -> Result<Value, MergeError> {
        Ok(fill_merge(original, generated))
    }

    fn preserves_user_text(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "fill"
    }
}

/// Enhance mode
///
/// Merges like fill. The deepened text reaches the user through the
/// generation outcome, where accepting it is an explicit action.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnhanceStrategy;

impl EnhanceStrategy {
    /// Create enhance strategy
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl MergeStrategy for EnhanceStrategy {
    fn merge(
        &self,
        original: &Value,
        generated: &Value,
        _mode: &GenerationMode,
    ) -> Result<Value, MergeError> {
        Ok(fill_merge(original, generated))
    }

    fn preserves_user_text(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "enhance"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn empty_field_filled_existing_kept() {
        let original = json!({"title": "", "description": "Existing text"});
        let generated = json!({"title": "New Title", "description": "Generated text"});
        assert_eq!(
            fill_merge(&original, &generated),
            json!({"title": "New Title", "description": "Existing text"})
        );
    }

    #[test]
    fn arrays_positional_up_to_longer() {
        let original = json!([{"title": "A", "indicator": ""}, {"title": "B"}]);
        let generated = json!([{"title": "X", "indicator": "10"}, {"title": "Y"}, {"title": "Z"}]);
        assert_eq!(
            fill_merge(&original, &generated),
            json!([{"title": "A", "indicator": "10"}, {"title": "B"}, {"title": "Z"}])
        );

        let longer_original = json!(["a", "b", "c"]);
        assert_eq!(fill_merge(&longer_original, &json!([""])), json!(["a", "b", "c"]));
    }

    #[test]
    fn keys_only_in_original_survive() {
        let original = json!({"startDate": "2026-01-01", "projectTitle": ""});
        let generated = json!({"projectTitle": "Green Valleys"});
        assert_eq!(
            fill_merge(&original, &generated),
            json!({"startDate": "2026-01-01", "projectTitle": "Green Valleys"})
        );
    }

    #[test]
    fn nested_objects_merge_recursively() {
        let original = json!({"coreProblem": {"title": "Floods", "description": ""}});
        let generated = json!({"coreProblem": {"title": "Droughts", "description": "Rising"}});
        assert_eq!(
            fill_merge(&original, &generated),
            json!({"coreProblem": {"title": "Floods", "description": "Rising"}})
        );
    }

    #[test]
    fn numbers_are_never_blank() {
        assert_eq!(fill_merge(&json!(0), &json!(5)), json!(0));
        assert_eq!(fill_merge(&Value::Null, &json!(5)), json!(5));
    }

    #[test]
    fn enhance_never_overwrites_user_text() {
        let original = json!([{"title": "Short", "description": ""}]);
        let generated = json!([{"title": "Short, but deepened", "description": "Evidence"}, {"title": "New"}]);
        let merged = EnhanceStrategy::new()
            .merge(&original, &generated, &GenerationMode::Enhance)
            .unwrap();
        assert_eq!(
            merged,
            json!([{"title": "Short", "description": "Evidence"}, {"title": "New"}])
        );
    }
}
