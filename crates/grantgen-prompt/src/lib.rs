//! Prompt compilation
//!
//! Turns a document, a resolved rule set and a generation mode into a single
//! instruction string, paired with the schema the response must match.
//!
//! # Example
//!
//! ```rust
//! use grantgen_document::{Document, GenerationMode, SectionKind};
//! use grantgen_prompt::PromptCompiler;
//! use grantgen_rules::{default_rules, Language};
//! use serde_json::json;
//!
//! let rules = default_rules(Language::En).unwrap();
//! let prompt = PromptCompiler::new(rules).compile(
//!     SectionKind::Outputs,
//!     &Document::new(),
//!     &GenerationMode::Regenerate,
//!     &json!([]),
//! );
//! assert!(prompt.instruction.starts_with(rules.language_directive()));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod compiler;
mod context;

pub use compiler::{fill_min_items, mode_instruction, CompiledPrompt, PromptBlock, PromptCompiler};
pub use context::{build_context, build_context_for, extract_context, prune, PROJECT_END_DATE};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
