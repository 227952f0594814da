//! Section kinds
//!
//! Provides [`SectionKind`], the exhaustive enumeration of generatable
//! sections. Every other crate binds its per-section behaviour (schema,
//! rules, sanitizers, identifier prefixes) by matching on this enum, so an
//! unmapped section cannot exist at runtime.

use crate::error::DocumentError;
use crate::ids::IdPrefix;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Named subtree of the proposal document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionKind {
    /// Core problem, causes and consequences
    ProblemAnalysis,
    /// Title, acronym, aim, solution and timing
    ProjectIdea,
    /// Long-term objectives the project contributes to
    GeneralObjectives,
    /// Measurable objectives the project achieves itself
    SpecificObjectives,
    /// Work packages with tasks, milestones and deliverables
    Activities,
    /// Risk register
    Risks,
    /// Direct products of the activities
    Outputs,
    /// Short and medium-term effects
    Outcomes,
    /// Long-term effects
    Impacts,
    /// Key exploitable results
    Kers,
}

impl SectionKind {
    /// All section kinds in document order
    pub const ALL: [SectionKind; 10] = [
        Self::ProblemAnalysis,
        Self::ProjectIdea,
        Self::GeneralObjectives,
        Self::SpecificObjectives,
        Self::Activities,
        Self::Risks,
        Self::Outputs,
        Self::Outcomes,
        Self::Impacts,
        Self::Kers,
    ];

    /// Stable key used in documents, rule sets and on the command line
    #[inline]
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::ProblemAnalysis => "problemAnalysis",
            Self::ProjectIdea => "projectIdea",
            Self::GeneralObjectives => "generalObjectives",
            Self::SpecificObjectives => "specificObjectives",
            Self::Activities => "activities",
            Self::Risks => "risks",
            Self::Outputs => "outputs",
            Self::Outcomes => "outcomes",
            Self::Impacts => "impacts",
            Self::Kers => "kers",
        }
    }

    /// Whether the section is an ordered list of items (as opposed to one object)
    #[inline]
    #[must_use]
    pub fn is_list(self) -> bool {
        !matches!(self, Self::ProblemAnalysis | Self::ProjectIdea)
    }

    /// Identifier prefix for the section's items, if items carry identifiers
    #[inline]
    #[must_use]
    pub fn id_prefix(self) -> Option<IdPrefix> {
        match self {
            Self::GeneralObjectives => Some(IdPrefix::GeneralObjective),
            Self::SpecificObjectives => Some(IdPrefix::SpecificObjective),
            Self::Activities => Some(IdPrefix::WorkPackage),
            Self::Risks => Some(IdPrefix::Risk),
            Self::Kers => Some(IdPrefix::Ker),
            Self::ProblemAnalysis
            | Self::ProjectIdea
            | Self::Outputs
            | Self::Outcomes
            | Self::Impacts => None,
        }
    }

    /// Whether generated content is bound by the project's time envelope
    #[inline]
    #[must_use]
    pub fn has_temporal_constraints(self) -> bool {
        matches!(self, Self::Activities)
    }

    /// Sections whose content is relevant context when generating this one
    ///
    /// The section itself is never listed; its current data travels with the
    /// mode instruction instead.
    #[must_use]
    pub fn context_sections(self) -> &'static [SectionKind] {
        use SectionKind::{
            Activities, GeneralObjectives, Impacts, Outcomes, Outputs, ProblemAnalysis,
            ProjectIdea, SpecificObjectives,
        };
        match self {
            Self::ProblemAnalysis => &[ProjectIdea],
            Self::ProjectIdea => &[ProblemAnalysis],
            Self::GeneralObjectives => &[ProblemAnalysis, ProjectIdea],
            Self::SpecificObjectives => &[ProblemAnalysis, ProjectIdea, GeneralObjectives],
            Self::Activities => &[ProjectIdea, GeneralObjectives, SpecificObjectives],
            Self::Risks => &[ProjectIdea, SpecificObjectives, Activities],
            Self::Outputs => &[ProjectIdea, SpecificObjectives, Activities],
            Self::Outcomes => &[ProblemAnalysis, ProjectIdea, SpecificObjectives, Outputs],
            Self::Impacts => &[ProblemAnalysis, ProjectIdea, GeneralObjectives, Outcomes],
            Self::Kers => &[ProjectIdea, Activities, Outputs, Outcomes],
        }
    }
}

impl Display for SectionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SectionKind {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.key() == s)
            .ok_or_else(|| DocumentError::UnknownSection(s.to_string()))
    }
}
