//! Grant proposal document model
//!
//! Typed sections of an EU grant proposal plus the invariants the generation
//! pipeline relies on.
//!
//! # Core Concepts
//!
//! - [`Document`]: The full proposal, owned by the user session
//! - [`SectionKind`]: Exhaustive enumeration of generatable sections
//! - [`ItemId`]: Per-kind sequential identifiers (`WP1`, `RISK3`, `M1.2`)
//! - [`ProjectEnvelope`]: The `[projectStart, projectEnd]` interval
//! - [`GenerationMode`]: How a section is generated and merged
//!
//! # Example
//!
//! ```rust
//! use grantgen_document::{Document, SectionKind};
//!
//! let mut doc = Document::new();
//! doc.project_idea.start_date = "2026-01-31".to_string();
//! doc.project_idea.duration_months = Some(1);
//!
//! let envelope = doc.envelope().unwrap();
//! assert_eq!(envelope.end().unwrap().to_string(), "2026-02-27");
//! assert!(doc.section_has_content(SectionKind::ProjectIdea));
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

pub mod dates;
mod document;
mod error;
pub mod ids;
mod mode;
mod section;

pub use dates::{add_months, format_date, parse_date, project_end_date, ProjectEnvelope};
pub use document::{
    Deliverable, DependencyType, Document, HasContent, Milestone, Objective, Policy, Problem,
    ProblemAnalysis, ProjectIdea, ResultItem, Risk, Task, TaskDependency, WorkPackage, Ker,
};
pub use error::DocumentError;
pub use ids::{assign_missing_ids, assign_section_ids, IdPrefix, ItemId};
pub use mode::{GenerationMode, ModeKind};
pub use section::SectionKind;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
