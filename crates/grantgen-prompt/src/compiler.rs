//! Instruction assembly
//!
//! Blocks are emitted in a fixed order. The language directive and task come
//! first; the rule blocks come last. Sections with hard date constraints get
//! the timeframe restated at both ends.

use crate::context::build_context_for;
use grantgen_document::{format_date, Document, DocumentError, GenerationMode, SectionKind};
use grantgen_rules::RuleSet;
use grantgen_schema::{schema_for, FieldType, Schema};
use serde_json::Value;

/// Compiled instruction plus the schema it was built against
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPrompt {
    /// Section the prompt targets
    pub section: SectionKind,
    /// Full instruction text
    pub instruction: String,
    /// Expected output shape
    pub schema: Schema,
}

/// Named instruction block, in emission order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptBlock {
    /// Project timeframe restatement
    Temporal,
    /// Output language and register
    Language,
    /// Concrete task
    Task,
    /// Textual schema hint
    SchemaHint,
    /// Self-check list
    QualityGate,
    /// Extracted document context
    Context,
    /// Mode instruction
    Mode,
    /// Title rules
    TitleRules,
    /// Global rules
    GlobalRules,
    /// Section and field rules
    SectionRules,
}

/// Assembles instructions from a resolved rule set
#[derive(Debug, Clone)]
pub struct PromptCompiler<'a> {
    rules: &'a RuleSet,
    include_schema_hint: bool,
}

impl<'a> PromptCompiler<'a> {
    /// Compiler over resolved rules, embedding the schema hint
    #[inline]
    #[must_use]
    pub fn new(rules: &'a RuleSet) -> Self {
        Self {
            rules,
            include_schema_hint: true,
        }
    }

    /// Toggle the textual schema hint (off when the provider enforces the schema)
    #[inline]
    #[must_use]
    pub fn with_schema_hint(mut self, include: bool) -> Self {
        self.include_schema_hint = include;
        self
    }

    /// Compile for a section key
    pub fn compile_key(
        &self,
        section_key: &str,
        document: &Document,
        mode: &GenerationMode,
        current: &Value,
    ) -> Result<CompiledPrompt, DocumentError> {
        let section: SectionKind = section_key.parse()?;
        Ok(self.compile(section, document, mode, current))
    }

    /// Compile for a section
    #[must_use]
    pub fn compile(
        &self,
        section: SectionKind,
        document: &Document,
        mode: &GenerationMode,
        current: &Value,
    ) -> CompiledPrompt {
        let schema = schema_for(section);
        let blocks = self.blocks(section, document, mode, current, &schema);
        tracing::debug!(
            section = %section,
            mode = %mode,
            blocks = blocks.len(),
            "compiled prompt"
        );
        let instruction = blocks
            .into_iter()
            .map(|(_, text)| text)
            .collect::<Vec<_>>()
            .join("\n\n");
        CompiledPrompt {
            section,
            instruction,
            schema,
        }
    }

    /// Blocks in emission order, empty blocks skipped
    #[must_use]
    pub fn blocks(
        &self,
        section: SectionKind,
        document: &Document,
        mode: &GenerationMode,
        current: &Value,
        schema: &Schema,
    ) -> Vec<(PromptBlock, String)> {
        let rules = self.rules;
        let temporal = self.temporal_block(section, document);
        let mut out = Vec::new();

        if let Some(text) = &temporal {
            out.push((PromptBlock::Temporal, text.clone()));
        }
        out.push((PromptBlock::Language, rules.language_directive().to_string()));
        out.push((
            PromptBlock::Task,
            format!("TASK:\n{}", rules.task_instruction(section)),
        ));
        if self.include_schema_hint {
            out.push((
                PromptBlock::SchemaHint,
                format!(
                    "OUTPUT FORMAT: return a JSON {} with this structure:\n{}",
                    schema.top_level().as_str(),
                    schema.to_hint()
                ),
            ));
        }
        if let Some(text) = bullets("QUALITY CHECKLIST (verify before answering):", rules.quality_gate(section)) {
            out.push((PromptBlock::QualityGate, text));
        }
        let context = build_context_for(document, section);
        if !context.is_empty() {
            out.push((PromptBlock::Context, format!("PROJECT CONTEXT:\n{context}")));
        }
        out.push((
            PromptBlock::Mode,
            format!("MODE:\n{}", mode_instruction(rules, mode, current, schema)),
        ));
        if section == SectionKind::ProjectIdea {
            if let Some(text) = bullets("TITLE RULES:", rules.title_rules()) {
                out.push((PromptBlock::TitleRules, text));
            }
        }
        if let Some(text) = bullets("GENERAL RULES:", rules.global_rules()) {
            out.push((PromptBlock::GlobalRules, text));
        }
        if let Some(text) = section_rules_block(rules, section, schema) {
            out.push((PromptBlock::SectionRules, text));
        }
        if let Some(text) = temporal {
            out.push((PromptBlock::Temporal, text));
        }
        out
    }

    fn temporal_block(&self, section: SectionKind, document: &Document) -> Option<String> {
        if !section.has_temporal_constraints() {
            return None;
        }
        let envelope = document.envelope()?;
        let end = envelope.end()?;
        let months = document
            .project_idea
            .duration_months
            .map_or_else(String::new, |m| m.to_string());
        Some(
            self.rules
                .temporal_constraint()
                .replace("{start}", &format_date(envelope.start()))
                .replace("{end}", &format_date(end))
                .replace("{months}", &months),
        )
    }
}

fn bullets(heading: &str, lines: &[String]) -> Option<String> {
    if lines.is_empty() {
        return None;
    }
    let mut out = heading.to_string();
    for line in lines {
        out.push_str("\n- ");
        out.push_str(line);
    }
    Some(out)
}

fn section_rules_block(rules: &RuleSet, section: SectionKind, schema: &Schema) -> Option<String> {
    let mut lines: Vec<String> = rules.section_rules(section).to_vec();
    for field in schema.field_names() {
        if let Some(rule) = rules.field_rule(field) {
            lines.push(format!("{field}: {rule}"));
        }
    }
    bullets(&format!("RULES FOR {}:", section.key()), &lines)
}

/// Minimum list length the fill instruction asks for
///
/// Lists use their own minimum; objects use the largest minimum among their
/// list fields.
#[must_use]
pub fn fill_min_items(schema: &Schema) -> usize {
    schema.min_items().unwrap_or_else(|| {
        schema
            .top_fields()
            .iter()
            .filter_map(|f| match &f.ty {
                FieldType::Array(arr) => Some(arr.min_items),
                _ => None,
            })
            .max()
            .unwrap_or(1)
    })
}

/// Mode instruction with placeholders substituted
#[must_use]
pub fn mode_instruction(
    rules: &RuleSet,
    mode: &GenerationMode,
    current: &Value,
    schema: &Schema,
) -> String {
    // Plain JSON values always serialize.
    let current_text = serde_json::to_string_pretty(current).unwrap_or_default();
    let indices = mode
        .indices()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    rules
        .mode_instruction(mode.kind())
        .replace("{current}", &current_text)
        .replace("{min_items}", &fill_min_items(schema).to_string())
        .replace("{indices}", &indices)
        .replace("{count}", &mode.indices().len().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use grantgen_document::Objective;
    use grantgen_rules::{default_rules, Language};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn rules() -> RuleSet {
        default_rules(Language::En).unwrap().clone()
    }

    fn dated_document() -> Document {
        let mut doc = Document::new();
        doc.project_idea.project_title = "Clean rivers".into();
        doc.project_idea.start_date = "2026-01-31".into();
        doc.project_idea.duration_months = Some(1);
        doc
    }

    fn kinds(blocks: &[(PromptBlock, String)]) -> Vec<PromptBlock> {
        blocks.iter().map(|(k, _)| *k).collect()
    }

    #[test]
    fn activities_order_with_temporal_bookends() {
        let rules = rules();
        let compiler = PromptCompiler::new(&rules);
        let schema = schema_for(SectionKind::Activities);
        let blocks = compiler.blocks(
            SectionKind::Activities,
            &dated_document(),
            &GenerationMode::Regenerate,
            &json!([]),
            &schema,
        );
        assert_eq!(
            kinds(&blocks),
            vec![
                PromptBlock::Temporal,
                PromptBlock::Language,
                PromptBlock::Task,
                PromptBlock::SchemaHint,
                PromptBlock::QualityGate,
                PromptBlock::Context,
                PromptBlock::Mode,
                PromptBlock::GlobalRules,
                PromptBlock::SectionRules,
                PromptBlock::Temporal,
            ]
        );
        assert!(blocks[0].1.contains("2026-01-31"));
        assert!(blocks[0].1.contains("2026-02-27"));
        assert!(!blocks[0].1.contains("{months}"));
    }

    #[test]
    fn title_rules_only_for_project_idea() {
        let rules = rules();
        let compiler = PromptCompiler::new(&rules).with_schema_hint(false);
        let doc = Document::new();

        let idea = compiler.blocks(
            SectionKind::ProjectIdea,
            &doc,
            &GenerationMode::Regenerate,
            &json!({}),
            &schema_for(SectionKind::ProjectIdea),
        );
        assert_eq!(
            kinds(&idea),
            vec![
                PromptBlock::Language,
                PromptBlock::Task,
                PromptBlock::QualityGate,
                PromptBlock::Mode,
                PromptBlock::TitleRules,
                PromptBlock::GlobalRules,
                PromptBlock::SectionRules,
            ]
        );

        let risks = compiler.blocks(
            SectionKind::Risks,
            &doc,
            &GenerationMode::Regenerate,
            &json!([]),
            &schema_for(SectionKind::Risks),
        );
        assert!(!kinds(&risks).contains(&PromptBlock::TitleRules));
    }

    #[test]
    fn no_temporal_block_without_known_end() {
        let rules = rules();
        let mut doc = Document::new();
        doc.project_idea.start_date = "2026-01-01".into();
        let prompt = PromptCompiler::new(&rules).compile(
            SectionKind::Activities,
            &doc,
            &GenerationMode::Regenerate,
            &json!([]),
        );
        assert!(!prompt.instruction.contains("TIMEFRAME"));
    }

    #[test]
    fn instruction_starts_with_language_directive() {
        let rules = rules();
        let prompt = PromptCompiler::new(&rules).compile(
            SectionKind::Risks,
            &dated_document(),
            &GenerationMode::Regenerate,
            &json!([]),
        );
        assert!(prompt.instruction.starts_with(rules.language_directive()));
        assert!(prompt.instruction.contains("mitigation"));
        assert_eq!(prompt.schema, schema_for(SectionKind::Risks));
    }

    #[test]
    fn fill_mode_substitutes_current_and_min_items() {
        let rules = rules();
        let current = json!([{"title": "To reduce waste"}]);
        let text = mode_instruction(
            &rules,
            &GenerationMode::Fill,
            &current,
            &schema_for(SectionKind::GeneralObjectives),
        );
        assert!(text.contains("To reduce waste"));
        assert!(text.contains("at least 3"));
        assert!(!text.contains("{min_items}"));
    }

    #[test]
    fn targeted_mode_substitutes_indices_and_count() {
        let rules = rules();
        let text = mode_instruction(
            &rules,
            &GenerationMode::targeted([1, 3]),
            &json!([{}, {}, {}, {}]),
            &schema_for(SectionKind::Risks),
        );
        assert!(text.contains("positions 1, 3 (2 items)"));
        assert!(!text.contains("{indices}"));
        assert!(!text.contains("{count}"));
    }

    #[test]
    fn fill_min_items_for_objects_uses_list_fields() {
        assert_eq!(fill_min_items(&schema_for(SectionKind::ProblemAnalysis)), 3);
        assert_eq!(fill_min_items(&schema_for(SectionKind::ProjectIdea)), 2);
        assert_eq!(fill_min_items(&schema_for(SectionKind::Risks)), 5);
    }

    #[test]
    fn bullets_list_lines_under_heading() {
        assert_eq!(bullets("RULES:", &[]), None);
        assert_eq!(
            bullets("RULES:", &["be concise".to_string(), "cite data".to_string()]).as_deref(),
            Some("RULES:\n- be concise\n- cite data")
        );
    }

    #[test]
    fn field_rules_follow_section_rules() {
        let rules = rules();
        let text = section_rules_block(&rules, SectionKind::Risks, &schema_for(SectionKind::Risks))
            .unwrap();
        assert!(text.starts_with("RULES FOR risks:"));
        assert!(text.contains("- mitigation: "));
        assert!(!text.contains("projectTitle"));
    }

    #[test]
    fn target_section_not_in_context() {
        let rules = rules();
        let mut doc = dated_document();
        doc.general_objectives = vec![Objective {
            title: "To restore habitats".into(),
            ..Objective::default()
        }];
        let schema = schema_for(SectionKind::GeneralObjectives);
        let blocks = PromptCompiler::new(&rules).blocks(
            SectionKind::GeneralObjectives,
            &doc,
            &GenerationMode::Regenerate,
            &json!([]),
            &schema,
        );
        let context = &blocks
            .iter()
            .find(|(k, _)| *k == PromptBlock::Context)
            .unwrap()
            .1;
        assert!(context.contains("Clean rivers"));
        assert!(!context.contains("To restore habitats"));
    }

    #[test]
    fn unknown_section_key_fails() {
        let rules = rules();
        let err = PromptCompiler::new(&rules)
            .compile_key("budget", &Document::new(), &GenerationMode::Fill, &json!({}))
            .unwrap_err();
        assert!(matches!(err, DocumentError::UnknownSection(key) if key == "budget"));
    }
}
