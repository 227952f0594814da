//! Context extraction
//!
//! Projects the document into the minimal summary the generator sees. A
//! section is exposed only when it carries user content; blank fields and
//! blank list items are pruned so absence never reads as a deliberate value.
//! Derived dates are computed here so the generator never does calendar
//! arithmetic.

use grantgen_document::{format_date, Document, SectionKind};
use serde_json::{Map, Value};

/// Key of the derived project end date inside the project idea
pub const PROJECT_END_DATE: &str = "projectEndDate";

/// Drop empty strings, empty containers and nulls, recursively
///
/// Returns `None` when nothing meaningful is left.
#[must_use]
pub fn prune(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::Array(items) => {
            let items: Vec<Value> = items.into_iter().filter_map(prune).collect();
            (!items.is_empty()).then_some(Value::Array(items))
        }
        Value::Object(map) => {
            let map: Map<String, Value> = map
                .into_iter()
                .filter_map(|(k, v)| prune(v).map(|v| (k, v)))
                .collect();
            (!map.is_empty()).then_some(Value::Object(map))
        }
        other => Some(other),
    }
}

fn section_context(document: &Document, section: SectionKind) -> Option<Value> {
    if !document.section_has_content(section) {
        return None;
    }
    let mut value = document.section_value(section);
    if let Value::Array(items) = &mut value {
        let blanks = document.empty_indices(section);
        let mut position = 0;
        items.retain(|_| {
            let keep = !blanks.contains(&position);
            position += 1;
            keep
        });
    }
    let mut value = prune(value)?;

    if section == SectionKind::ProjectIdea {
        if let (Some(end), Value::Object(map)) =
            (document.envelope().and_then(|e| e.end()), &mut value)
        {
            map.insert(PROJECT_END_DATE.to_string(), Value::String(format_date(end)));
        }
    }
    Some(value)
}

/// Context object restricted to the given sections
#[must_use]
pub fn extract_context(document: &Document, sections: &[SectionKind]) -> Map<String, Value> {
    sections
        .iter()
        .filter_map(|&section| {
            section_context(document, section).map(|v| (section.key().to_string(), v))
        })
        .collect()
}

fn render(map: Map<String, Value>) -> String {
    if map.is_empty() {
        return String::new();
    }
    // Maps of plain JSON values always serialize.
    serde_json::to_string_pretty(&Value::Object(map)).unwrap_or_default()
}

/// Context over the whole document
///
/// Empty string when no section has content.
#[must_use]
pub fn build_context(document: &Document) -> String {
    render(extract_context(document, &SectionKind::ALL))
}

/// Context relevant to generating `section`
///
/// The target section itself is excluded; its data travels with the mode
/// instruction.
#[must_use]
pub fn build_context_for(document: &Document, section: SectionKind) -> String {
    render(extract_context(document, section.context_sections()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use grantgen_document::{Objective, Risk};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn empty_document_has_empty_context() {
        assert_eq!(build_context(&Document::new()), "");
    }

    #[test]
    fn derived_end_date_is_injected() {
        let mut doc = Document::new();
        doc.project_idea.start_date = "2026-01-31".to_string();
        doc.project_idea.duration_months = Some(1);

        let ctx = extract_context(&doc, &[SectionKind::ProjectIdea]);
        assert_eq!(
            ctx["projectIdea"],
            json!({"startDate": "2026-01-31", "durationMonths": 1, "projectEndDate": "2026-02-27"})
        );
    }

    #[test]
    fn no_end_date_without_duration() {
        let mut doc = Document::new();
        doc.project_idea.project_title = "Clean rivers".to_string();
        doc.project_idea.start_date = "2026-01-01".to_string();
        let ctx = extract_context(&doc, &[SectionKind::ProjectIdea]);
        assert!(ctx["projectIdea"].get(PROJECT_END_DATE).is_none());
    }

    #[test]
    fn blank_items_and_fields_pruned() {
        let mut doc = Document::new();
        doc.risks = vec![
            Risk {
                id: "RISK1".into(),
                ..Risk::default()
            },
            Risk {
                id: "RISK2".into(),
                title: "Supplier delay".into(),
                ..Risk::default()
            },
        ];
        let ctx = extract_context(&doc, &[SectionKind::Risks]);
        assert_eq!(ctx["risks"], json!([{"id": "RISK2", "title": "Supplier delay"}]));
    }

    #[test]
    fn list_of_only_blank_items_is_omitted() {
        let mut doc = Document::new();
        doc.outputs = vec![Default::default(), Default::default()];
        assert!(extract_context(&doc, &[SectionKind::Outputs]).is_empty());
    }

    #[test]
    fn target_section_excluded() {
        let mut doc = Document::new();
        doc.general_objectives = vec![Objective {
            title: "To reduce waste".into(),
            ..Objective::default()
        }];
        doc.problem_analysis.core_problem.title = "Waste".into();

        let ctx = build_context_for(&doc, SectionKind::GeneralObjectives);
        assert!(ctx.contains("problemAnalysis"));
        assert!(!ctx.contains("generalObjectives"));

        let ctx = build_context_for(&doc, SectionKind::SpecificObjectives);
        assert!(ctx.contains("generalObjectives"));
    }

    proptest! {
        #[test]
        fn section_present_iff_content(
            title in prop_oneof![Just(String::new()), Just("  ".to_string()), "[a-z]{1,8}"],
            objectives in 0usize..3,
        ) {
            let mut doc = Document::new();
            doc.problem_analysis.core_problem.title = title.clone();
            doc.general_objectives = (0..objectives)
                .map(|i| Objective { title: format!("To act {i}"), ..Objective::default() })
                .collect();

            let ctx = extract_context(&doc, &SectionKind::ALL);
            prop_assert_eq!(ctx.contains_key("problemAnalysis"), !title.trim().is_empty());
            prop_assert_eq!(ctx.contains_key("generalObjectives"), objectives > 0);
            prop_assert!(!ctx.contains_key("risks"));
        }
    }
}
