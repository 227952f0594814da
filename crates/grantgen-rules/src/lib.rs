//! Generation rule registry
//!
//! Versioned, language-keyed natural-language constraints used to assemble
//! generation instructions. Compiled-in defaults ship with the crate; an
//! administrator may store an override blob that replaces individual blocks.
//!
//! # Example
//!
//! ```rust
//! use grantgen_document::{ModeKind, SectionKind};
//! use grantgen_rules::{resolve_rules, Language, RuleOverride};
//!
//! let custom = RuleOverride::parse(
//!     r#"{"version": 99, "languages": {"en": {"sections": {"risks": "Cite EU sources."}}}}"#,
//! )
//! .unwrap();
//! let rules = resolve_rules(Language::En, Some(&custom)).unwrap();
//!
//! assert_eq!(rules.section_rules(SectionKind::Risks), ["Cite EU sources."]);
//! assert!(!rules.mode_instruction(ModeKind::Fill).is_empty());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod cache;
mod error;
mod language;
mod overrides;
mod registry;
mod ruleset;
mod store;

pub use cache::{blob_hash, OverrideCache};
pub use error::{RuleError, RuleResult};
pub use language::Language;
pub use overrides::{LanguagePatch, RuleBlock, RuleLines, RuleOverride, SectionRulesPatch};
pub use registry::{resolve_rules, RuleRegistry};
pub use ruleset::{default_rules, RuleSet, SectionRules};
pub use store::{FileOverrideStore, MemoryOverrideStore, RuleOverrideStore};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
