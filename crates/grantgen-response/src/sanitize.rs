//! Payload extraction and formatting-marker stripping
//!
//! The presentation layer owns all visual formatting, so every string leaf
//! is reduced to plain text. These functions never fail on odd input; only
//! JSON extraction can.

use crate::error::{ResponseError, ResponseResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*[ \t]*\r?\n(.*?)\r?\n?\s*```\s*$").expect("valid regex")
});
static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]{0,3}#{1,6}[ \t]+").expect("valid regex"));
static BOLD_STARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid regex"));
static BOLD_UNDERSCORES: Lazy<Regex> = Lazy::new(|| Regex::new(r"__(.+?)__").expect("valid regex"));
static ITALIC_STAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[^\w*])\*([^*\s](?:[^*\n]*[^*\s])?)\*($|[^\w*])").expect("valid regex"));
static ITALIC_UNDERSCORE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[^\w_])_([^_\s](?:[^_\n]*[^_\s])?)_($|[^\w_])").expect("valid regex"));

/// Remove a wrapping Markdown code fence, if present
#[must_use]
pub fn strip_code_fence(raw: &str) -> &str {
    FENCE
        .captures(raw)
        .and_then(|c| c.get(1))
        .map_or_else(|| raw.trim(), |m| m.as_str().trim())
}

/// Parse the JSON payload from raw generator output
///
/// Tries the fence-stripped text first, then the span between the first
/// opening and the last matching closing bracket.
pub fn extract_json(raw: &str) -> ResponseResult<Value> {
    let text = strip_code_fence(raw);
    if text.is_empty() {
        return Err(ResponseError::malformed("empty response", raw));
    }

    let first_error = match serde_json::from_str::<Value>(text) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    let open = text.find(['{', '[']);
    let candidate = open.and_then(|start| {
        let close = if text[start..].starts_with('{') { '}' } else { ']' };
        text.rfind(close)
            .filter(|&end| end > start)
            .map(|end| &text[start..=end])
    });
    if let Some(slice) = candidate {
        if let Ok(value) = serde_json::from_str::<Value>(slice) {
            tracing::debug!(
                skipped = text.len() - slice.len(),
                "parsed JSON embedded in surrounding text"
            );
            return Ok(value);
        }
    }
    Err(ResponseError::malformed(first_error.to_string(), raw))
}

/// Strip Markdown formatting markers from one string
#[must_use]
pub fn strip_markers(text: &str) -> String {
    if !text.contains(['*', '_', '#', '`']) {
        return text.to_string();
    }

    let mut out = HEADING.replace_all(text, "").into_owned();
    out = BOLD_STARS.replace_all(&out, "$1").into_owned();
    out = BOLD_UNDERSCORES.replace_all(&out, "$1").into_owned();
    // Adjacent italics share a delimiter character; a second pass catches them.
    for _ in 0..2 {
        out = ITALIC_STAR.replace_all(&out, "$1$2$3").into_owned();
        out = ITALIC_UNDERSCORE.replace_all(&out, "$1$2$3").into_owned();
    }
    out.retain(|c| c != '`');
    out.trim().to_string()
}

/// Strip formatting markers from every string leaf
pub fn strip_markers_deep(value: &mut Value) {
    match value {
        Value::String(s) => {
            let cleaned = strip_markers(s);
            if cleaned != *s {
                *s = cleaned;
            }
        }
        Value::Array(items) => items.iter_mut().for_each(strip_markers_deep),
        Value::Object(map) => map.values_mut().for_each(strip_markers_deep),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn fence_with_language_tag() {
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("  ```\n[1]\n```  "), "[1]");
        assert_eq!(strip_code_fence("{\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn extract_plain_and_fenced() {
        assert_eq!(extract_json("{\"a\": 1}").unwrap(), json!({"a": 1}));
        assert_eq!(extract_json("```json\n[{\"a\": 1}]\n```").unwrap(), json!([{"a": 1}]));
    }

    #[test]
    fn extract_from_surrounding_prose() {
        let raw = "Here is the section:\n[{\"title\": \"A\"}]\nLet me know if you need more.";
        assert_eq!(extract_json(raw).unwrap(), json!([{"title": "A"}]));
    }

    #[test]
    fn extract_rejects_garbage() {
        assert!(matches!(
            extract_json("I cannot help with that."),
            Err(ResponseError::Malformed { .. })
        ));
        assert!(matches!(extract_json("   "), Err(ResponseError::Malformed { .. })));
        assert!(matches!(
            extract_json("{\"title\": \"unterminated"),
            Err(ResponseError::Malformed { .. })
        ));
    }

    #[test]
    fn strips_bold_italic_heading_backticks() {
        assert_eq!(strip_markers("**Bold** and __strong__"), "Bold and strong");
        assert_eq!(strip_markers("an *italic* and _emph_ word"), "an italic and emph word");
        assert_eq!(strip_markers("## Heading"), "Heading");
        assert_eq!(strip_markers("use `cargo` here"), "use cargo here");
        assert_eq!(strip_markers("*a* *b*"), "a b");
    }

    #[test]
    fn keeps_non_marker_characters() {
        assert_eq!(strip_markers("snake_case_name stays"), "snake_case_name stays");
        assert_eq!(strip_markers("5 * 3 = 15"), "5 * 3 = 15");
        assert_eq!(strip_markers("Issue #42 remains"), "Issue #42 remains");
        assert_eq!(strip_markers("plain text"), "plain text");
    }

    #[test]
    fn deep_strip_reaches_nested_leaves() {
        let mut value = json!({
            "title": "**Title**",
            "items": [{"text": "`code`"}, 3, null],
        });
        strip_markers_deep(&mut value);
        assert_eq!(value, json!({"title": "Title", "items": [{"text": "code"}, 3, null]}));
    }
}
