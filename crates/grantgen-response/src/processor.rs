//! Response processor
//!
//! Raw text in, section value out: fence stripping, JSON extraction,
//! top-level shape check, formatting-marker stripping, schema diagnostics on
//! what the generator actually sent, leaf coercion, then the section's field
//! normalizers and dependency correction.

use crate::coerce::coerce_to_schema;
use crate::error::{ResponseError, ResponseResult};
use crate::fields::{apply_normalizers, DEFAULT_TITLE_MAX_LEN};
use crate::sanitize::{extract_json, strip_markers_deep};
use crate::temporal::repair_schedule_value;
use grantgen_document::SectionKind;
use grantgen_schema::{Schema, TopLevel};
use jsonschema::JSONSchema;
use serde_json::Value;

/// Processor settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessorOptions {
    /// Maximum project title length, in characters
    pub title_max_len: usize,
    /// Validate against the JSON Schema and report diagnostics
    pub schema_diagnostics: bool,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self {
            title_max_len: DEFAULT_TITLE_MAX_LEN,
            schema_diagnostics: true,
        }
    }
}

/// Processed section value with non-fatal findings
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedResponse {
    /// Sanitized value
    pub value: Value,
    /// Schema validation findings; never cause rejection
    pub diagnostics: Vec<String>,
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Parse and sanitize raw output against a schema
///
/// Section-independent steps only: extraction, shape check and marker
/// stripping.
pub fn process_response(raw: &str, schema: &Schema) -> ResponseResult<Value> {
    let mut value = extract_json(raw)?;
    let expected = schema.top_level();
    if TopLevel::of(&value) != Some(expected) {
        return Err(ResponseError::shape_mismatch(expected, kind_name(&value)));
    }
    strip_markers_deep(&mut value);
    Ok(value)
}

/// Validate a value against the schema's JSON Schema rendering
#[must_use]
pub fn schema_diagnostics(value: &Value, schema: &Schema) -> Vec<String> {
    let rendered = schema.to_json_schema();
    let compiled = match JSONSchema::compile(&rendered) {
        Ok(compiled) => compiled,
        Err(e) => return vec![format!("schema did not compile: {e}")],
    };
    let diagnostics = match compiled.validate(value) {
        Ok(()) => Vec::new(),
        Err(errors) => errors
            .map(|e| {
                let path = e.instance_path.to_string();
                if path.is_empty() {
                    e.to_string()
                } else {
                    format!("{path}: {e}")
                }
            })
            .collect(),
    };
    diagnostics
}

/// Section-aware response processor
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseProcessor {
    options: ProcessorOptions,
}

impl ResponseProcessor {
    /// Create processor with options
    #[inline]
    #[must_use]
    pub fn new(options: ProcessorOptions) -> Self {
        Self { options }
    }

    /// Processor options
    #[inline]
    #[must_use]
    pub fn options(&self) -> ProcessorOptions {
        self.options
    }

    /// Full processing for one section
    pub fn process(
        &self,
        raw: &str,
        section: SectionKind,
        schema: &Schema,
    ) -> ResponseResult<ProcessedResponse> {
        let mut value = process_response(raw, schema)?;

        let diagnostics = if self.options.schema_diagnostics {
            schema_diagnostics(&value, schema)
        } else {
            Vec::new()
        };
        for diagnostic in &diagnostics {
            tracing::debug!(section = %section, %diagnostic, "schema diagnostic");
        }
        if !diagnostics.is_empty() {
            tracing::warn!(
                section = %section,
                count = diagnostics.len(),
                "response deviates from schema"
            );
        }

        let coerced = coerce_to_schema(&mut value, schema);
        if coerced > 0 {
            tracing::debug!(section = %section, coerced, "coerced response values to schema types");
        }
        apply_normalizers(section, &mut value, self.options.title_max_len);

        if section == SectionKind::Activities {
            value = repair_schedule_value(value, None)?;
        }

        Ok(ProcessedResponse { value, diagnostics })
    }
}
