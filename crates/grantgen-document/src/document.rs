//! Proposal document
//!
//! The full proposal is a tree of named sections. Each section is either one
//! structured object (problem analysis, project idea) or an ordered list of
//! structured items. All text fields default to empty so partially authored
//! documents and partially generated payloads deserialize alike.

use crate::dates::ProjectEnvelope;
use crate::error::DocumentError;
use crate::section::SectionKind;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Whether a piece of section data carries user-meaningful content
pub trait HasContent {
    /// True if any primary text field is non-empty or any list is non-empty
    fn has_content(&self) -> bool;
}

fn filled(s: &str) -> bool {
    !s.trim().is_empty()
}

/// A problem statement (core problem, cause or consequence)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Problem {
    /// Short statement
    pub title: String,
    /// Supporting detail, ideally with figures
    pub description: String,
}

impl HasContent for Problem {
    fn has_content(&self) -> bool {
        filled(&self.title) || filled(&self.description)
    }
}

/// Problem analysis section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProblemAnalysis {
    /// The central problem the project addresses
    pub core_problem: Problem,
    /// Causes of the core problem
    pub causes: Vec<Problem>,
    /// Consequences if nothing changes
    pub consequences: Vec<Problem>,
}

impl HasContent for ProblemAnalysis {
    fn has_content(&self) -> bool {
        self.core_problem.has_content() || !self.causes.is_empty() || !self.consequences.is_empty()
    }
}

/// EU policy the project aligns with
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Policy {
    /// Policy or strategy name
    pub name: String,
    /// How the project contributes to it
    pub description: String,
}

impl HasContent for Policy {
    fn has_content(&self) -> bool {
        filled(&self.name) || filled(&self.description)
    }
}

/// Project idea section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectIdea {
    /// Full project title
    pub project_title: String,
    /// Project acronym
    pub project_acronym: String,
    /// One-sentence aim of the project
    pub main_aim: String,
    /// Current practice and its gaps
    pub state_of_the_art: String,
    /// What the project will do
    pub proposed_solution: String,
    /// Policies the project aligns with
    pub policies: Vec<Policy>,
    /// ISO date of the first project day
    pub start_date: String,
    /// Project length in months
    pub duration_months: Option<u32>,
}

impl ProjectIdea {
    /// Project time envelope, if a start date is known
    #[inline]
    #[must_use]
    pub fn envelope(&self) -> Option<ProjectEnvelope> {
        ProjectEnvelope::from_parts(&self.start_date, self.duration_months)
    }
}

impl HasContent for ProjectIdea {
    fn has_content(&self) -> bool {
        [
            &self.project_title,
            &self.project_acronym,
            &self.main_aim,
            &self.state_of_the_art,
            &self.proposed_solution,
            &self.start_date,
        ]
        .into_iter()
        .any(|s| filled(s))
            || !self.policies.is_empty()
            || self.duration_months.is_some()
    }
}

/// General or specific objective
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Objective {
    /// Identifier such as `GO1` or `SO2`
    pub id: String,
    /// Objective statement
    pub title: String,
    /// Elaboration
    pub description: String,
    /// Measurable success indicator
    pub indicator: String,
}

impl HasContent for Objective {
    fn has_content(&self) -> bool {
        filled(&self.title) || filled(&self.description) || filled(&self.indicator)
    }
}

/// Precedence relation between two tasks
///
/// Deserialization is lenient: codes and long names are accepted in any
/// case, and anything unreadable becomes finish-to-start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum DependencyType {
    /// Successor starts after predecessor finishes
    #[default]
    #[serde(rename = "FS")]
    FinishToStart,
    /// Successor starts when predecessor starts
    #[serde(rename = "SS")]
    StartToStart,
    /// Successor finishes when predecessor finishes
    #[serde(rename = "FF")]
    FinishToFinish,
    /// Successor finishes when predecessor starts
    #[serde(rename = "SF")]
    StartToFinish,
}

impl DependencyType {
    /// Read a dependency type from free-form text
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        let folded = raw.trim().to_ascii_uppercase().replace(['_', ' '], "-");
        match folded.as_str() {
            "FS" | "FINISH-TO-START" => Self::FinishToStart,
            "SS" | "START-TO-START" => Self::StartToStart,
            "FF" | "FINISH-TO-FINISH" => Self::FinishToFinish,
            "SF" | "START-TO-FINISH" => Self::StartToFinish,
            _ => {
                tracing::debug!(raw, "unknown dependency type, using FS");
                Self::FinishToStart
            }
        }
    }
}

impl<'de> Deserialize<'de> for DependencyType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(raw) => Self::parse_lenient(&raw),
            _ => Self::default(),
        })
    }
}

/// Dependency edge from a task to its predecessor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TaskDependency {
    /// Identifier of the predecessor task
    pub predecessor_id: String,
    /// Precedence relation
    #[serde(rename = "type")]
    pub kind: DependencyType,
}

/// Task within a work package
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Task {
    /// Identifier such as `T1.2`
    pub id: String,
    /// Task name
    pub title: String,
    /// What the task involves
    pub description: String,
    /// ISO start date
    pub start_date: String,
    /// ISO end date
    pub end_date: String,
    /// Predecessor tasks
    pub dependencies: Vec<TaskDependency>,
}

/// Milestone within a work package
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Milestone {
    /// Identifier such as `M1.1`
    pub id: String,
    /// What is reached
    pub description: String,
    /// ISO date
    pub date: String,
}

/// Deliverable within a work package
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Deliverable {
    /// Identifier such as `D1.1`
    pub id: String,
    /// Deliverable name
    pub title: String,
    /// Content of the deliverable
    pub description: String,
    /// Verification indicator
    pub indicator: String,
}

/// Work package
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkPackage {
    /// Identifier such as `WP1`
    pub id: String,
    /// Work package name
    pub title: String,
    /// Tasks
    pub tasks: Vec<Task>,
    /// Milestones
    pub milestones: Vec<Milestone>,
    /// Deliverables
    pub deliverables: Vec<Deliverable>,
}

impl HasContent for WorkPackage {
    fn has_content(&self) -> bool {
        filled(&self.title)
            || !self.tasks.is_empty()
            || !self.milestones.is_empty()
            || !self.deliverables.is_empty()
    }
}

/// Risk register entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Risk {
    /// Identifier such as `RISK1`
    pub id: String,
    /// `technical`, `social`, `economic` or `environmental`
    pub category: String,
    /// Short risk name
    pub title: String,
    /// How the risk could materialise
    pub description: String,
    /// `low`, `medium` or `high`
    pub likelihood: String,
    /// `low`, `medium` or `high`
    pub impact: String,
    /// Planned response
    pub mitigation: String,
}

impl HasContent for Risk {
    fn has_content(&self) -> bool {
        filled(&self.title) || filled(&self.description) || filled(&self.mitigation)
    }
}

/// Output, outcome or impact
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResultItem {
    /// Result name
    pub title: String,
    /// What changes and for whom
    pub description: String,
    /// Measurable indicator
    pub indicator: String,
}

impl HasContent for ResultItem {
    fn has_content(&self) -> bool {
        filled(&self.title) || filled(&self.description) || filled(&self.indicator)
    }
}

/// Key exploitable result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Ker {
    /// Identifier such as `KER1`
    pub id: String,
    /// Result name
    pub title: String,
    /// What the result is
    pub description: String,
    /// Who exploits it and how
    pub exploitation_strategy: String,
}

impl HasContent for Ker {
    fn has_content(&self) -> bool {
        filled(&self.title) || filled(&self.description) || filled(&self.exploitation_strategy)
    }
}

/// The full proposal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Document {
    /// Problem analysis
    pub problem_analysis: ProblemAnalysis,
    /// Project idea, including the schedule settings
    pub project_idea: ProjectIdea,
    /// General objectives
    pub general_objectives: Vec<Objective>,
    /// Specific objectives
    pub specific_objectives: Vec<Objective>,
    /// Work plan
    pub activities: Vec<WorkPackage>,
    /// Risk register
    pub risks: Vec<Risk>,
    /// Outputs
    pub outputs: Vec<ResultItem>,
    /// Outcomes
    pub outcomes: Vec<ResultItem>,
    /// Impacts
    pub impacts: Vec<ResultItem>,
    /// Key exploitable results
    pub kers: Vec<Ker>,
}

impl Document {
    /// Create empty document
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from JSON string
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        serde_json::from_str(json).map_err(|e| DocumentError::invalid_section("document", e))
    }

    /// Project time envelope, if a start date is known
    #[inline]
    #[must_use]
    pub fn envelope(&self) -> Option<ProjectEnvelope> {
        self.project_idea.envelope()
    }

    /// Whether a section carries user-meaningful content
    ///
    /// A list counts once any of its items has content; placeholder items
    /// holding only an identifier are not authored yet.
    #[must_use]
    pub fn section_has_content(&self, section: SectionKind) -> bool {
        fn any<T: HasContent>(items: &[T]) -> bool {
            items.iter().any(HasContent::has_content)
        }

        match section {
            SectionKind::ProblemAnalysis => self.problem_analysis.has_content(),
            SectionKind::ProjectIdea => self.project_idea.has_content(),
            SectionKind::GeneralObjectives => any(&self.general_objectives),
            SectionKind::SpecificObjectives => any(&self.specific_objectives),
            SectionKind::Activities => any(&self.activities),
            SectionKind::Risks => any(&self.risks),
            SectionKind::Outputs => any(&self.outputs),
            SectionKind::Outcomes => any(&self.outcomes),
            SectionKind::Impacts => any(&self.impacts),
            SectionKind::Kers => any(&self.kers),
        }
    }

    /// Positions of list items that carry no content yet
    ///
    /// These are the slots a targeted fill regenerates. Object sections have
    /// no positions and always return an empty list.
    #[must_use]
    pub fn empty_indices(&self, section: SectionKind) -> Vec<usize> {
        fn blanks<T: HasContent>(items: &[T]) -> Vec<usize> {
            items
                .iter()
                .enumerate()
                .filter(|(_, item)| !item.has_content())
                .map(|(i, _)| i)
                .collect()
        }

        match section {
            SectionKind::ProblemAnalysis | SectionKind::ProjectIdea => Vec::new(),
            SectionKind::GeneralObjectives => blanks(&self.general_objectives),
            SectionKind::SpecificObjectives => blanks(&self.specific_objectives),
            SectionKind::Activities => blanks(&self.activities),
            SectionKind::Risks => blanks(&self.risks),
            SectionKind::Outputs => blanks(&self.outputs),
            SectionKind::Outcomes => blanks(&self.outcomes),
            SectionKind::Impacts => blanks(&self.impacts),
            SectionKind::Kers => blanks(&self.kers),
        }
    }

    /// Section data as a JSON value
    #[must_use]
    pub fn section_value(&self, section: SectionKind) -> Value {
        let value = match section {
            SectionKind::ProblemAnalysis => serde_json::to_value(&self.problem_analysis),
            SectionKind::ProjectIdea => serde_json::to_value(&self.project_idea),
            SectionKind::GeneralObjectives => serde_json::to_value(&self.general_objectives),
            SectionKind::SpecificObjectives => serde_json::to_value(&self.specific_objectives),
            SectionKind::Activities => serde_json::to_value(&self.activities),
            SectionKind::Risks => serde_json::to_value(&self.risks),
            SectionKind::Outputs => serde_json::to_value(&self.outputs),
            SectionKind::Outcomes => serde_json::to_value(&self.outcomes),
            SectionKind::Impacts => serde_json::to_value(&self.impacts),
            SectionKind::Kers => serde_json::to_value(&self.kers),
        };
        // Plain data structs with string keys always serialize.
        value.unwrap_or(Value::Null)
    }

    /// Replace a section with new data
    ///
    /// The value is fully deserialized before anything is assigned, so a
    /// shape error leaves the document untouched.
    pub fn set_section_value(
        &mut self,
        section: SectionKind,
        value: Value,
    ) -> Result<(), DocumentError> {
        fn decode<T: DeserializeOwned>(section: SectionKind, value: Value) -> Result<T, DocumentError> {
            serde_json::from_value(value).map_err(|e| DocumentError::invalid_section(section.key(), e))
        }

        match section {
            SectionKind::ProblemAnalysis => self.problem_analysis = decode(section, value)?,
            SectionKind::ProjectIdea => self.project_idea = decode(section, value)?,
            SectionKind::GeneralObjectives => self.general_objectives = decode(section, value)?,
            SectionKind::SpecificObjectives => self.specific_objectives = decode(section, value)?,
            SectionKind::Activities => self.activities = decode(section, value)?,
            SectionKind::Risks => self.risks = decode(section, value)?,
            SectionKind::Outputs => self.outputs = decode(section, value)?,
            SectionKind::Outcomes => self.outcomes = decode(section, value)?,
            SectionKind::Impacts => self.impacts = decode(section, value)?,
            SectionKind::Kers => self.kers = decode(section, value)?,
        }
        Ok(())
    }
}
