//! Administrator rule overrides
//!
//! An override is a single JSON blob:
//!
//! ```json
//! { "version": 4, "languages": { "en": { "globalRules": ["..."], "sections": { "risks": "..." } } } }
//! ```
//!
//! Every block is optional. Older blobs stored section rules as a plain
//! string or a list of strings; [`RuleBlock`] and [`RuleLines`] adapt those
//! shapes to the canonical form. Validation happens once, when the blob is
//! parsed into a [`RuleOverride`]; unknown section keys are skipped, unknown
//! modes and languages are rejected.

use crate::error::{RuleError, RuleResult};
use crate::language::Language;
use crate::ruleset::{RuleSet, SectionRules};
use grantgen_document::{ModeKind, SectionKind};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Rule text stored either as one string or as a list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RuleLines {
    /// Newline-separated text, optionally bulleted
    Text(String),
    /// One rule per entry
    Lines(Vec<String>),
}

impl RuleLines {
    /// Canonical list form: trimmed, bullets removed, blanks dropped
    #[must_use]
    pub fn into_lines(self) -> Vec<String> {
        let raw = match self {
            Self::Text(text) => text.lines().map(str::to_string).collect(),
            Self::Lines(lines) => lines,
        };
        raw.into_iter()
            .map(|line| {
                let line = line.trim();
                line.strip_prefix("- ")
                    .or_else(|| line.strip_prefix("• "))
                    .or_else(|| line.strip_prefix("* "))
                    .unwrap_or(line)
                    .trim()
                    .to_string()
            })
            .filter(|line| !line.is_empty())
            .collect()
    }
}

/// Canonical per-section override entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionRulesPatch {
    /// Replacement task instruction
    pub task: Option<String>,
    /// Replacement section rules
    pub rules: Option<RuleLines>,
    /// Replacement quality gate
    pub quality_gate: Option<RuleLines>,
}

/// Per-section override in any accepted shape
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RuleBlock {
    /// Legacy: rules as one string
    Text(String),
    /// Legacy: rules as a list of strings
    Lines(Vec<String>),
    /// Canonical object form
    Structured(SectionRulesPatch),
}

impl RuleBlock {
    /// Adapt to the canonical patch
    #[must_use]
    pub fn into_patch(self) -> SectionRulesPatch {
        match self {
            Self::Text(text) => SectionRulesPatch {
                rules: Some(RuleLines::Text(text)),
                ..SectionRulesPatch::default()
            },
            Self::Lines(lines) => SectionRulesPatch {
                rules: Some(RuleLines::Lines(lines)),
                ..SectionRulesPatch::default()
            },
            Self::Structured(patch) => patch,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLanguagePatch {
    language_directive: Option<String>,
    global_rules: Option<RuleLines>,
    #[serde(default)]
    sections: BTreeMap<String, RuleBlock>,
    #[serde(default)]
    field_rules: BTreeMap<String, String>,
    #[serde(default)]
    modes: BTreeMap<String, String>,
    title_rules: Option<RuleLines>,
    temporal_constraint: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawOverride {
    version: u32,
    #[serde(default)]
    languages: BTreeMap<String, RawLanguagePatch>,
}

/// Validated partial rule set for one language
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguagePatch {
    /// Replacement language directive
    pub language_directive: Option<String>,
    /// Replacement global rules
    pub global_rules: Option<Vec<String>>,
    /// Per-section replacements
    pub sections: BTreeMap<SectionKind, SectionRulesPatch>,
    /// Per-field replacements
    pub field_rules: BTreeMap<String, String>,
    /// Per-mode replacements
    pub modes: BTreeMap<ModeKind, String>,
    /// Replacement title rules
    pub title_rules: Option<Vec<String>>,
    /// Replacement temporal template
    pub temporal_constraint: Option<String>,
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}

fn non_empty(lines: Option<RuleLines>) -> Option<Vec<String>> {
    lines.map(RuleLines::into_lines).filter(|l| !l.is_empty())
}

impl LanguagePatch {
    fn from_raw(raw: RawLanguagePatch) -> RuleResult<Self> {
        let mut sections = BTreeMap::new();
        for (key, block) in raw.sections {
            match key.parse::<SectionKind>() {
                Ok(section) => {
                    sections.insert(section, block.into_patch());
                }
                Err(_) => tracing::warn!(section = %key, "skipping rules for unknown section"),
            }
        }

        let mut modes = BTreeMap::new();
        for (key, text) in raw.modes {
            let mode = key.parse::<ModeKind>().map_err(|_| RuleError::UnknownMode(key))?;
            if let Some(text) = non_blank(Some(text)) {
                modes.insert(mode, text);
            }
        }

        Ok(Self {
            language_directive: non_blank(raw.language_directive),
            global_rules: non_empty(raw.global_rules),
            sections,
            field_rules: raw
                .field_rules
                .into_iter()
                .filter(|(_, rule)| !rule.trim().is_empty())
                .collect(),
            modes,
            title_rules: non_empty(raw.title_rules),
            temporal_constraint: non_blank(raw.temporal_constraint),
        })
    }

    /// Apply onto a complete rule set
    ///
    /// Absent blocks keep the base value; map entries are replaced one by one.
    pub fn apply_to(&self, base: &mut RuleSet) {
        if let Some(directive) = &self.language_directive {
            base.language_directive.clone_from(directive);
        }
        if let Some(global) = &self.global_rules {
            base.global_rules.clone_from(global);
        }
        for (section, patch) in &self.sections {
            let entry = base.sections.entry(*section).or_insert_with(SectionRules::default);
            if let Some(task) = non_blank(patch.task.clone()) {
                entry.task = task;
            }
            if let Some(rules) = non_empty(patch.rules.clone()) {
                entry.rules = rules;
            }
            if let Some(gate) = non_empty(patch.quality_gate.clone()) {
                entry.quality_gate = gate;
            }
        }
        for (field, rule) in &self.field_rules {
            base.field_rules.insert(field.clone(), rule.clone());
        }
        for (mode, text) in &self.modes {
            base.modes.insert(*mode, text.clone());
        }
        if let Some(title) = &self.title_rules {
            base.title_rules.clone_from(title);
        }
        if let Some(temporal) = &self.temporal_constraint {
            base.temporal_constraint.clone_from(temporal);
        }
    }
}

/// Validated override blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOverride {
    /// Override version
    pub version: u32,
    /// Per-language partial rule sets
    pub languages: BTreeMap<Language, LanguagePatch>,
}

impl RuleOverride {
    /// Parse and validate an override blob
    pub fn parse(blob: &str) -> RuleResult<Self> {
        let raw: RawOverride =
            serde_json::from_str(blob).map_err(|e| RuleError::InvalidOverride(e.to_string()))?;
        if raw.version == 0 {
            return Err(RuleError::InvalidOverride(
                "version must be at least 1".to_string(),
            ));
        }

        let mut languages = BTreeMap::new();
        for (code, patch) in raw.languages {
            let language: Language = code.parse()?;
            languages.insert(language, LanguagePatch::from_raw(patch)?);
        }

        Ok(Self {
            version: raw.version,
            languages,
        })
    }

    /// Partial rule set for a language, if the override has one
    #[inline]
    #[must_use]
    pub fn language(&self, language: Language) -> Option<&LanguagePatch> {
        self.languages.get(&language)
    }
}
