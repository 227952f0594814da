//! Canonical rule set and compiled-in defaults

use crate::error::{RuleError, RuleResult};
use crate::language::Language;
use grantgen_document::{ModeKind, SectionKind};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rules bound to one section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SectionRules {
    /// Concrete task instruction
    pub task: String,
    /// Section-specific constraints
    pub rules: Vec<String>,
    /// Self-check list placed near the end of the instruction
    pub quality_gate: Vec<String>,
}

/// Versioned, language-keyed bundle of generation rules
///
/// Compiled-in rule sets are complete: every section and every mode has an
/// entry. Resolved rule sets keep that property because overrides only ever
/// replace entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSet {
    /// Monotonic version; overrides win when their version is not lower
    pub version: u32,
    /// Language these rules are written for
    pub language: Language,
    /// Opening directive naming the output language and register
    pub language_directive: String,
    /// Rules applied to every section
    pub global_rules: Vec<String>,
    /// Per-section task, rules and quality gate
    pub sections: BTreeMap<SectionKind, SectionRules>,
    /// Per-field rules keyed by JSON field name
    #[serde(default)]
    pub field_rules: BTreeMap<String, String>,
    /// Mode instructions with placeholders
    pub modes: BTreeMap<ModeKind, String>,
    /// Extra rules for the project title
    #[serde(default)]
    pub title_rules: Vec<String>,
    /// Date envelope template with `{start}`, `{end}` and `{months}`
    pub temporal_constraint: String,
}

impl RuleSet {
    /// Opening language directive
    #[inline]
    #[must_use]
    pub fn language_directive(&self) -> &str {
        &self.language_directive
    }

    /// Rules applied to every section
    #[inline]
    #[must_use]
    pub fn global_rules(&self) -> &[String] {
        &self.global_rules
    }

    /// Task instruction for a section
    #[must_use]
    pub fn task_instruction(&self, section: SectionKind) -> &str {
        self.sections.get(&section).map_or("", |s| s.task.as_str())
    }

    /// Section-specific rules
    #[must_use]
    pub fn section_rules(&self, section: SectionKind) -> &[String] {
        self.sections.get(&section).map_or(&[], |s| s.rules.as_slice())
    }

    /// Quality gate for a section
    #[must_use]
    pub fn quality_gate(&self, section: SectionKind) -> &[String] {
        self.sections
            .get(&section)
            .map_or(&[], |s| s.quality_gate.as_slice())
    }

    /// Rule for one field, if any
    #[must_use]
    pub fn field_rule(&self, field: &str) -> Option<&str> {
        self.field_rules.get(field).map(String::as_str)
    }

    /// Instruction template for a mode
    #[must_use]
    pub fn mode_instruction(&self, mode: ModeKind) -> &str {
        self.modes.get(&mode).map_or("", String::as_str)
    }

    /// Extra rules for the project title
    #[inline]
    #[must_use]
    pub fn title_rules(&self) -> &[String] {
        &self.title_rules
    }

    /// Date envelope template
    #[inline]
    #[must_use]
    pub fn temporal_constraint(&self) -> &str {
        &self.temporal_constraint
    }

    /// Check that every section and mode has a non-empty entry
    pub fn validate_complete(&self) -> RuleResult<()> {
        let fail = |message: String| -> RuleResult<()> {
            Err(RuleError::invalid_defaults(self.language.code(), message))
        };

        if self.version == 0 {
            return fail("version must be at least 1".to_string());
        }
        if self.language_directive.trim().is_empty() {
            return fail("empty language directive".to_string());
        }
        for section in SectionKind::ALL {
            match self.sections.get(&section) {
                Some(rules) if !rules.task.trim().is_empty() => {}
                _ => return fail(format!("missing task for section {section}")),
            }
        }
        for mode in ModeKind::ALL {
            if self.mode_instruction(mode).trim().is_empty() {
                return fail(format!("missing instruction for mode {mode}"));
            }
        }
        if self.temporal_constraint.trim().is_empty() {
            return fail("empty temporal constraint".to_string());
        }
        Ok(())
    }
}

const EN_RULES: &str = include_str!("../defaults/en.yaml");
const SI_RULES: &str = include_str!("../defaults/si.yaml");

fn load_defaults(language: Language, source: &str) -> RuleResult<RuleSet> {
    let rules: RuleSet = serde_yaml::from_str(source)
        .map_err(|e| RuleError::invalid_defaults(language.code(), e.to_string()))?;
    if rules.language != language {
        return Err(RuleError::invalid_defaults(
            language.code(),
            format!("file declares language {}", rules.language),
        ));
    }
    rules.validate_complete()?;
    Ok(rules)
}

static EN_DEFAULTS: Lazy<Result<RuleSet, String>> =
    Lazy::new(|| load_defaults(Language::En, EN_RULES).map_err(|e| e.to_string()));
static SI_DEFAULTS: Lazy<Result<RuleSet, String>> =
    Lazy::new(|| load_defaults(Language::Si, SI_RULES).map_err(|e| e.to_string()));

/// Compiled-in rule set for a language
pub fn default_rules(language: Language) -> RuleResult<&'static RuleSet> {
    let loaded = match language {
        Language::En => &*EN_DEFAULTS,
        Language::Si => &*SI_DEFAULTS,
    };
    loaded
        .as_ref()
        .map_err(|message| RuleError::invalid_defaults(language.code(), message.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_for_every_language() {
        for language in Language::ALL {
            let rules = default_rules(language).unwrap();
            assert_eq!(rules.language, language);
            assert!(rules.version >= 1);
            rules.validate_complete().unwrap();
        }
    }

    #[test]
    fn defaults_share_version_across_languages() {
        let en = default_rules(Language::En).unwrap();
        let si = default_rules(Language::Si).unwrap();
        assert_eq!(en.version, si.version);
    }

    #[test]
    fn defaults_cover_every_section_with_quality_gate() {
        let rules = default_rules(Language::En).unwrap();
        for section in SectionKind::ALL {
            assert!(!rules.task_instruction(section).is_empty(), "{section}");
            assert!(!rules.quality_gate(section).is_empty(), "{section}");
            assert!(!rules.section_rules(section).is_empty(), "{section}");
        }
    }

    #[test]
    fn mode_templates_carry_placeholders() {
        for language in Language::ALL {
            let rules = default_rules(language).unwrap();
            assert!(rules.mode_instruction(ModeKind::Fill).contains("{min_items}"));
            assert!(rules.mode_instruction(ModeKind::Fill).contains("{current}"));
            assert!(rules.mode_instruction(ModeKind::Enhance).contains("{current}"));
            let targeted = rules.mode_instruction(ModeKind::TargetedFill);
            assert!(targeted.contains("{indices}") && targeted.contains("{count}"));
            assert!(!rules.mode_instruction(ModeKind::Regenerate).contains("{current}"));
            let temporal = rules.temporal_constraint();
            assert!(temporal.contains("{start}") && temporal.contains("{end}"));
        }
    }

    #[test]
    fn field_rules_present() {
        let rules = default_rules(Language::En).unwrap();
        assert!(rules.field_rule("projectTitle").is_some());
        assert!(rules.field_rule("indicator").is_some());
        assert!(rules.field_rule("nonexistent").is_none());
    }

    #[test]
    fn incomplete_rules_rejected() {
        let mut rules = default_rules(Language::En).unwrap().clone();
        rules.sections.remove(&SectionKind::Risks);
        let err = rules.validate_complete().unwrap_err();
        assert!(err.to_string().contains("risks"));

        let mut rules = default_rules(Language::En).unwrap().clone();
        rules.modes.remove(&ModeKind::Enhance);
        assert!(rules.validate_complete().is_err());
    }

    #[test]
    fn language_mismatch_rejected() {
        assert!(load_defaults(Language::Si, EN_RULES).is_err());
    }
}
