//! Field-specific normalization
//!
//! A small table binds field names of a section to a normalizer. The table
//! is the only place that knows which fields get special treatment.

use grantgen_document::SectionKind;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Default maximum project title length, in characters
pub const DEFAULT_TITLE_MAX_LEN: usize = 200;

static TITLE_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:project\s+title|proposal\s+title|title|naslov\s+projekta|naslov)\s*[:\-–—]\s*")
        .expect("valid regex")
});
static ACRONYM_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Z0-9]{1,11}\s*(?::|\s[\-–—])\s*").expect("valid regex"));

const QUOTE_PAIRS: &[(char, char)] = &[
    ('"', '"'),
    ('\'', '\''),
    ('“', '”'),
    ('„', '“'),
    ('„', '”'),
    ('«', '»'),
    ('‘', '’'),
];

/// Normalization applied to one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldNormalizer {
    /// Project title: unquote, drop labels and acronym prefixes, cap length
    Title {
        /// Maximum length in characters
        max_len: usize,
    },
    /// Acronym: unquote, keep letters and digits, uppercase
    Acronym,
}

impl FieldNormalizer {
    /// Apply to a string value
    #[must_use]
    pub fn apply(self, text: &str) -> String {
        match self {
            Self::Title { max_len } => normalize_title(text, max_len),
            Self::Acronym => normalize_acronym(text),
        }
    }
}

/// Fields of a section that get a normalizer
#[must_use]
pub fn normalizers_for(section: SectionKind, title_max_len: usize) -> Vec<(&'static str, FieldNormalizer)> {
    match section {
        SectionKind::ProjectIdea => vec![
            ("projectTitle", FieldNormalizer::Title { max_len: title_max_len }),
            ("projectAcronym", FieldNormalizer::Acronym),
        ],
        _ => Vec::new(),
    }
}

/// Apply a section's normalizers to the top-level object fields
pub fn apply_normalizers(section: SectionKind, value: &mut Value, title_max_len: usize) {
    let Value::Object(map) = value else {
        return;
    };
    for (field, normalizer) in normalizers_for(section, title_max_len) {
        if let Some(Value::String(text)) = map.get_mut(field) {
            let normalized = normalizer.apply(text);
            if normalized != *text {
                tracing::debug!(field, "normalized field");
                *text = normalized;
            }
        }
    }
}

fn strip_quotes(text: &str) -> &str {
    let mut current = text.trim();
    loop {
        let mut chars = current.chars();
        let (Some(first), Some(last)) = (chars.next(), chars.next_back()) else {
            return current;
        };
        if !QUOTE_PAIRS.contains(&(first, last)) {
            return current;
        }
        current = current[first.len_utf8()..current.len() - last.len_utf8()].trim();
    }
}

fn truncate_words(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_len).collect();
    let boundary = cut
        .rfind(char::is_whitespace)
        .filter(|&i| i > 0)
        .unwrap_or(cut.len());
    cut[..boundary]
        .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':' | '-' | '–'))
        .to_string()
}

/// Normalize a generated project title
#[must_use]
pub fn normalize_title(raw: &str, max_len: usize) -> String {
    let mut title = strip_quotes(raw).to_string();

    if let Some(m) = TITLE_LABEL.find(&title) {
        title = strip_quotes(&title[m.end()..]).to_string();
    }
    if let Some(m) = ACRONYM_PREFIX.find(&title) {
        let rest = title[m.end()..].trim();
        if !rest.is_empty() {
            title = strip_quotes(rest).to_string();
        }
    }
    truncate_words(&title, max_len)
}

/// Normalize a generated acronym
#[must_use]
pub fn normalize_acronym(raw: &str) -> String {
    strip_quotes(raw)
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_uppercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn title_quotes_and_whitespace() {
        assert_eq!(normalize_title("  \"Green Valleys\"  ", 200), "Green Valleys");
        assert_eq!(normalize_title("“Green Valleys”", 200), "Green Valleys");
        assert_eq!(normalize_title("„Zelene doline“", 200), "Zelene doline");
    }

    #[test]
    fn title_label_removed() {
        assert_eq!(normalize_title("Project Title: Green Valleys", 200), "Green Valleys");
        assert_eq!(normalize_title("title - \"Green Valleys\"", 200), "Green Valleys");
        assert_eq!(normalize_title("Naslov projekta: Zelene doline", 200), "Zelene doline");
    }

    #[test]
    fn title_acronym_prefix_removed() {
        assert_eq!(normalize_title("GREENV: Green Valleys", 200), "Green Valleys");
        assert_eq!(normalize_title("GREENV – Green Valleys", 200), "Green Valleys");
        assert_eq!(normalize_title("Project title: GREENV - Green Valleys", 200), "Green Valleys");
    }

    #[test]
    fn title_without_prefix_untouched() {
        assert_eq!(normalize_title("EU-wide Green Valleys", 200), "EU-wide Green Valleys");
        assert_eq!(normalize_title("Green Valleys: a new approach", 200), "Green Valleys: a new approach");
        assert_eq!(normalize_title("ABC:", 200), "ABC:");
    }

    #[test]
    fn title_capped_on_word_boundary() {
        let title = normalize_title("Restoring river ecosystems across the Danube basin", 20);
        assert_eq!(title, "Restoring river");
        assert!(title.chars().count() <= 20);
    }

    #[test]
    fn acronym_normalized() {
        assert_eq!(normalize_acronym(" \"green-v\" "), "GREENV");
        assert_eq!(normalize_acronym("ČISTO"), "ČISTO");
    }

    #[test]
    fn normalizers_only_touch_designated_fields() {
        let mut value = json!({
            "projectTitle": "Title: \"Green Valleys\"",
            "projectAcronym": "gv",
            "mainAim": "\"Keep quotes\"",
        });
        apply_normalizers(SectionKind::ProjectIdea, &mut value, DEFAULT_TITLE_MAX_LEN);
        assert_eq!(
            value,
            json!({
                "projectTitle": "Green Valleys",
                "projectAcronym": "GV",
                "mainAim": "\"Keep quotes\"",
            })
        );

        let mut risks = json!([{"title": "\"Quoted\""}]);
        apply_normalizers(SectionKind::Risks, &mut risks, DEFAULT_TITLE_MAX_LEN);
        assert_eq!(risks, json!([{"title": "\"Quoted\""}]));
    }
}
