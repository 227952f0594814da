//! Schema-guided leaf coercion
//!
//! Typed section decoding rejects nulls and scalars of the wrong type, and
//! generator output carries both routinely. Before decoding, every declared
//! field is folded to the type its schema gives it:
//!
//! - text and dates: null becomes `""`, numbers and booleans are stringified,
//!   lists of scalars are joined line by line
//! - enums: matched case-insensitively against the declared values
//! - objects: anything else becomes `{}`
//! - lists: null or a scalar becomes `[]`, a lone object is wrapped
//!
//! Keys the schema does not declare are dropped, so settings that live next
//! to generated content (the project start date and duration) can only change
//! through the user.

use grantgen_schema::{ArrayShape, FieldType, ObjectShape, Schema};
use serde_json::{Map, Value};

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Default)]
struct Coercer {
    changes: usize,
}

impl Coercer {
    fn note(&mut self, field: &str, what: &'static str) {
        tracing::debug!(field, what, "coerced generated value");
        self.changes += 1;
    }

    fn value(&mut self, value: &mut Value, ty: &FieldType, field: &str) {
        match ty {
            FieldType::String | FieldType::Date => self.text(value, field),
            FieldType::Enum(allowed) => {
                self.text(value, field);
                self.enumeration(value, allowed, field);
            }
            FieldType::Integer => self.integer(value, field),
            FieldType::Object(shape) => {
                if !value.is_object() {
                    self.note(field, "object");
                    *value = Value::Object(Map::new());
                }
                if let Value::Object(map) = value {
                    self.object(map, shape);
                }
            }
            FieldType::Array(shape) => {
                match value {
                    Value::Array(_) => {}
                    Value::Object(_) => {
                        self.note(field, "wrapped object in list");
                        *value = Value::Array(vec![value.take()]);
                    }
                    _ => {
                        self.note(field, "list");
                        *value = Value::Array(Vec::new());
                    }
                }
                if let Value::Array(items) = value {
                    self.items(items, shape, field);
                }
            }
        }
    }

    fn text(&mut self, value: &mut Value, field: &str) {
        let text = match value {
            Value::String(_) => return,
            Value::Null => String::new(),
            Value::Bool(_) | Value::Number(_) => scalar_text(value),
            Value::Array(items) => items.iter().map(scalar_text).collect::<Vec<_>>().join("\n"),
            Value::Object(_) => value.to_string(),
        };
        self.note(field, "text");
        *value = Value::String(text);
    }

    fn enumeration(&mut self, value: &mut Value, allowed: &[&str], field: &str) {
        let Value::String(raw) = value else { return };
        if allowed.contains(&raw.as_str()) {
            return;
        }
        if let Some(&canonical) = allowed.iter().find(|a| a.eq_ignore_ascii_case(raw.trim())) {
            self.note(field, "enum case");
            *raw = canonical.to_string();
        }
    }

    fn integer(&mut self, value: &mut Value, field: &str) {
        let replacement = match value {
            Value::Null => return,
            Value::Number(n) if n.is_u64() || n.is_i64() => return,
            Value::Number(n) => n
                .as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map_or(Value::Null, |f| Value::from(f.round() as u64)),
            Value::String(s) => s.trim().parse::<u64>().map_or(Value::Null, Value::from),
            Value::Bool(_) | Value::Array(_) | Value::Object(_) => Value::Null,
        };
        self.note(field, "integer");
        *value = replacement;
    }

    fn object(&mut self, map: &mut Map<String, Value>, shape: &ObjectShape) {
        let undeclared: Vec<String> = map
            .keys()
            .filter(|key| shape.field(key).is_none())
            .cloned()
            .collect();
        for key in undeclared {
            map.remove(&key);
            self.note(&key, "dropped undeclared key");
        }
        for field in &shape.fields {
            if let Some(value) = map.get_mut(field.name) {
                self.value(value, &field.ty, field.name);
            }
        }
    }

    fn items(&mut self, items: &mut Vec<Value>, shape: &ArrayShape, field: &str) {
        if let FieldType::Object(item_shape) = &shape.items {
            // A bare string in a list of objects is read as the item's first
            // text field.
            let lead = item_shape
                .fields
                .iter()
                .find(|f| f.name != "id" && f.ty == FieldType::String)
                .map(|f| f.name);
            let before = items.len();
            items.retain_mut(|item| match item {
                Value::Object(_) => true,
                Value::String(text) if !text.trim().is_empty() => match lead {
                    Some(name) => {
                        let mut map = Map::new();
                        map.insert(name.to_string(), Value::String(std::mem::take(text)));
                        *item = Value::Object(map);
                        true
                    }
                    None => false,
                },
                _ => false,
            });
            if items.len() != before {
                self.note(field, "dropped unusable list items");
            }
        }
        for item in items.iter_mut() {
            self.value(item, &shape.items, field);
        }
    }
}

/// Fold a parsed value onto a schema's declared types
///
/// Never fails. Returns the number of values changed.
pub fn coerce_to_schema(value: &mut Value, schema: &Schema) -> usize {
    let mut coercer = Coercer::default();
    match (schema, value) {
        (Schema::Object(shape), Value::Object(map)) => coercer.object(map, shape),
        (Schema::Array(shape), Value::Array(items)) => coercer.items(items, shape, "items"),
        _ => {}
    }
    coercer.changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use grantgen_document::{Document, SectionKind};
    use grantgen_schema::schema_for;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn coerced(section: SectionKind, mut value: Value) -> Value {
        coerce_to_schema(&mut value, &schema_for(section));
        value
    }

    #[test]
    fn null_and_scalar_leaves_become_text() {
        let value = coerced(
            SectionKind::Outputs,
            json!([{"title": "Toolkit", "description": null, "indicator": 3}]),
        );
        assert_eq!(value, json!([{"title": "Toolkit", "description": "", "indicator": "3"}]));
        Document::new().set_section_value(SectionKind::Outputs, value).unwrap();
    }

    #[test]
    fn enum_values_folded_to_declared_case() {
        let value = coerced(
            SectionKind::Risks,
            json!([{"category": "Technical", "likelihood": "HIGH", "impact": "moderate"}]),
        );
        assert_eq!(value[0]["category"], "technical");
        assert_eq!(value[0]["likelihood"], "high");
        assert_eq!(value[0]["impact"], "moderate");
    }

    #[test]
    fn activities_with_null_dates_and_odd_lists_decode() {
        let value = coerced(
            SectionKind::Activities,
            json!([{
                "id": "WP1",
                "title": null,
                "tasks": [{"id": "T1.1", "startDate": null, "endDate": 20260301,
                           "dependencies": {"predecessorId": "T1.0", "type": "fs"}}],
                "milestones": null,
                "deliverables": ["Final report"]
            }]),
        );
        let task = &value[0]["tasks"][0];
        assert_eq!(task["startDate"], "");
        assert_eq!(task["endDate"], "20260301");
        assert_eq!(task["dependencies"][0]["type"], "FS");
        assert_eq!(value[0]["milestones"], json!([]));
        assert_eq!(value[0]["deliverables"][0]["title"], "Final report");
        Document::new().set_section_value(SectionKind::Activities, value).unwrap();
    }

    #[test]
    fn undeclared_keys_dropped() {
        let value = coerced(
            SectionKind::ProjectIdea,
            json!({"projectTitle": "Rivers", "startDate": "2030-01-01", "durationMonths": "36"}),
        );
        assert_eq!(value, json!({"projectTitle": "Rivers"}));
    }

    #[test]
    fn conforming_value_untouched() {
        let mut value = json!([{"title": "A", "description": "a", "indicator": "1"}]);
        let before = value.clone();
        assert_eq!(coerce_to_schema(&mut value, &schema_for(SectionKind::Outcomes)), 0);
        assert_eq!(value, before);
    }

    #[test]
    fn unusable_list_items_dropped() {
        let value = coerced(SectionKind::Kers, json!([null, 7, {"title": "Licence"}, "  "]));
        assert_eq!(value, json!([{"title": "Licence"}]));
    }
}
