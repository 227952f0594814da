//! Declarative output shapes
//!
//! A [`Schema`] describes what the generator must return for one section. It
//! is rendered two ways: as a textual hint embedded in the instruction (for
//! providers without native structured output) and as a JSON Schema document
//! (for providers that enforce one).

use serde_json::{json, Map, Value};

/// Field type within a declared shape
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// Free text
    String,
    /// Whole number
    Integer,
    /// ISO `YYYY-MM-DD` date string
    Date,
    /// One of a fixed set of strings
    Enum(&'static [&'static str]),
    /// Nested object
    Object(ObjectShape),
    /// List of a shape
    Array(Box<ArrayShape>),
}

/// Named field of an object shape
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// JSON key
    pub name: &'static str,
    /// Value type
    pub ty: FieldType,
    /// Whether the generator must always produce this field
    pub required: bool,
    /// Short guidance shown in the textual hint
    pub description: &'static str,
}

impl Field {
    /// Required field
    #[inline]
    #[must_use]
    pub fn required(name: &'static str, ty: FieldType, description: &'static str) -> Self {
        Self {
            name,
            ty,
            required: true,
            description,
        }
    }

    /// Optional field
    #[inline]
    #[must_use]
    pub fn optional(name: &'static str, ty: FieldType, description: &'static str) -> Self {
        Self {
            name,
            ty,
            required: false,
            description,
        }
    }
}

/// Object with named fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectShape {
    /// Fields in declaration order
    pub fields: Vec<Field>,
}

impl ObjectShape {
    /// Create object shape from fields
    #[inline]
    #[must_use]
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Look up a field by name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// List of items of one shape
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayShape {
    /// Item type
    pub items: FieldType,
    /// Minimum number of items a complete section has
    pub min_items: usize,
}

impl ArrayShape {
    /// Create array shape
    #[inline]
    #[must_use]
    pub fn new(items: FieldType, min_items: usize) -> Self {
        Self { items, min_items }
    }
}

/// Top-level kind of a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopLevel {
    /// JSON object
    Object,
    /// JSON array
    Array,
}

impl TopLevel {
    /// Top-level kind of a parsed value, if it is an object or array
    #[inline]
    #[must_use]
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Object(_) => Some(Self::Object),
            Value::Array(_) => Some(Self::Array),
            _ => None,
        }
    }

    /// Lowercase name for messages
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Array => "array",
        }
    }
}

/// Output shape of one section
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    /// Single structured object
    Object(ObjectShape),
    /// Ordered list of structured items
    Array(ArrayShape),
}

impl Schema {
    /// Top-level kind
    #[inline]
    #[must_use]
    pub fn top_level(&self) -> TopLevel {
        match self {
            Self::Object(_) => TopLevel::Object,
            Self::Array(_) => TopLevel::Array,
        }
    }

    /// Minimum item count for list sections
    #[inline]
    #[must_use]
    pub fn min_items(&self) -> Option<usize> {
        match self {
            Self::Object(_) => None,
            Self::Array(shape) => Some(shape.min_items),
        }
    }

    /// Fields of the top-level object (or of each list item)
    #[must_use]
    pub fn top_fields(&self) -> &[Field] {
        match self {
            Self::Object(shape) => &shape.fields,
            Self::Array(shape) => match &shape.items {
                FieldType::Object(obj) => &obj.fields,
                _ => &[],
            },
        }
    }

    /// Every field name declared anywhere in the shape, in first-seen order
    #[must_use]
    pub fn field_names(&self) -> Vec<&'static str> {
        fn walk(ty: &FieldType, out: &mut Vec<&'static str>) {
            match ty {
                FieldType::Object(obj) => {
                    for field in &obj.fields {
                        if !out.contains(&field.name) {
                            out.push(field.name);
                        }
                        walk(&field.ty, out);
                    }
                }
                FieldType::Array(arr) => walk(&arr.items, out),
                FieldType::String | FieldType::Integer | FieldType::Date | FieldType::Enum(_) => {}
            }
        }

        let mut out = Vec::new();
        match self {
            Self::Object(obj) => walk(&FieldType::Object(obj.clone()), &mut out),
            Self::Array(arr) => walk(&arr.items, &mut out),
        }
        out
    }

    /// Textual hint: an annotated example of the expected JSON
    #[must_use]
    pub fn to_hint(&self) -> String {
        let example = match self {
            Self::Object(obj) => object_hint(obj),
            Self::Array(arr) => Value::Array(vec![type_hint(&arr.items, "")]),
        };
        // Values built from strings and maps always pretty-print.
        serde_json::to_string_pretty(&example).unwrap_or_default()
    }

    /// Native structured-output declaration (JSON Schema)
    #[must_use]
    pub fn to_json_schema(&self) -> Value {
        match self {
            Self::Object(obj) => object_schema(obj),
            Self::Array(arr) => array_schema(arr),
        }
    }
}

fn annotate(base: &str, description: &str) -> Value {
    if description.is_empty() {
        Value::String(base.to_string())
    } else {
        Value::String(format!("{base} - {description}"))
    }
}

fn type_hint(ty: &FieldType, description: &str) -> Value {
    match ty {
        FieldType::String => annotate("string", description),
        FieldType::Integer => annotate("integer", description),
        FieldType::Date => annotate("date YYYY-MM-DD", description),
        FieldType::Enum(values) => annotate(&format!("one of: {}", values.join(" | ")), description),
        FieldType::Object(obj) => object_hint(obj),
        FieldType::Array(arr) => Value::Array(vec![type_hint(&arr.items, description)]),
    }
}

fn object_hint(obj: &ObjectShape) -> Value {
    let mut map = Map::new();
    for field in &obj.fields {
        let hint = type_hint(&field.ty, field.description);
        let hint = match hint {
            Value::String(s) if field.required => Value::String(format!("{s} (required)")),
            other => other,
        };
        map.insert(field.name.to_string(), hint);
    }
    Value::Object(map)
}

fn field_schema(ty: &FieldType) -> Value {
    match ty {
        FieldType::String => json!({"type": "string"}),
        FieldType::Integer => json!({"type": "integer"}),
        FieldType::Date => json!({"type": "string", "description": "ISO date YYYY-MM-DD"}),
        FieldType::Enum(values) => json!({"type": "string", "enum": values}),
        FieldType::Object(obj) => object_schema(obj),
        FieldType::Array(arr) => array_schema(arr),
    }
}

fn object_schema(obj: &ObjectShape) -> Value {
    let properties: Map<String, Value> = obj
        .fields
        .iter()
        .map(|f| (f.name.to_string(), field_schema(&f.ty)))
        .collect();
    let required: Vec<&str> = obj.fields.iter().filter(|f| f.required).map(|f| f.name).collect();
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn array_schema(arr: &ArrayShape) -> Value {
    json!({
        "type": "array",
        "items": field_schema(&arr.items),
        "minItems": arr.min_items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Schema {
        Schema::Array(ArrayShape::new(
            FieldType::Object(ObjectShape::new(vec![
                Field::required("title", FieldType::String, "short name"),
                Field::optional("level", FieldType::Enum(&["low", "high"]), ""),
                Field::optional(
                    "steps",
                    FieldType::Array(Box::new(ArrayShape::new(
                        FieldType::Object(ObjectShape::new(vec![Field::required(
                            "date",
                            FieldType::Date,
                            "",
                        )])),
                        1,
                    ))),
                    "",
                ),
            ])),
            3,
        ))
    }

    #[test]
    fn top_level_and_min_items() {
        let schema = sample();
        assert_eq!(schema.top_level(), TopLevel::Array);
        assert_eq!(schema.min_items(), Some(3));
    }

    #[test]
    fn field_names_are_recursive_and_unique() {
        assert_eq!(sample().field_names(), vec!["title", "level", "steps", "date"]);
    }

    #[test]
    fn hint_marks_required_fields() {
        let hint = sample().to_hint();
        assert!(hint.contains("\"title\": \"string - short name (required)\""));
        assert!(hint.contains("one of: low | high"));
        assert!(hint.contains("date YYYY-MM-DD (required)"));
    }

    #[test]
    fn json_schema_shape() {
        let schema = sample().to_json_schema();
        assert_eq!(schema["type"], "array");
        assert_eq!(schema["minItems"], 3);
        assert_eq!(schema["items"]["required"], json!(["title"]));
        assert_eq!(schema["items"]["properties"]["level"]["enum"], json!(["low", "high"]));
        assert_eq!(
            schema["items"]["properties"]["steps"]["items"]["properties"]["date"]["type"],
            "string"
        );
    }

    #[test]
    fn top_level_of_value() {
        assert_eq!(TopLevel::of(&json!({})), Some(TopLevel::Object));
        assert_eq!(TopLevel::of(&json!([])), Some(TopLevel::Array));
        assert_eq!(TopLevel::of(&json!("x")), None);
    }
}
