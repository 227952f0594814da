//! Merge engine
//!
//! Reconciles generated section data with what the user already wrote.
//!
//! # Core Concepts
//!
//! - [`MergeStrategy`]: Core trait, one implementation per generation mode
//! - [`FillStrategy`] / [`EnhanceStrategy`]: Non-destructive recursive merge
//! - [`TargetedFillStrategy`]: Index-scoped merge over designated positions
//! - [`RegenerateStrategy`]: Generated value replaces the section
//! - [`MergeRegistry`]: Mode-keyed strategy lookup
//!
//! # Example
//!
//! ```rust
//! use grantgen_document::GenerationMode;
//! use serde_json::json;
//!
//! let original = json!({"title": "", "description": "Existing text"});
//! let generated = json!({"title": "New Title", "description": "Generated text"});
//! let merged = grantgen_merge::merge(&original, &generated, &GenerationMode::Fill).unwrap();
//! assert_eq!(merged, json!({"title": "New Title", "description": "Existing text"}));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod fill;
mod regenerate;
mod registry;
mod strategy;
mod targeted;

pub use fill::{fill_merge, EnhanceStrategy, FillStrategy};
pub use regenerate::{retain_undeclared_keys, RegenerateStrategy};
pub use registry::MergeRegistry;
pub use strategy::{is_blank, kind_name, MergeError, MergeStrategy};
pub use targeted::TargetedFillStrategy;

use grantgen_document::GenerationMode;
use once_cell::sync::Lazy;
use serde_json::Value;

static DEFAULT_REGISTRY: Lazy<MergeRegistry> = Lazy::new(MergeRegistry::with_defaults);

/// Merge with the built-in strategy for the mode
pub fn merge(original: &Value, generated: &Value, mode: &GenerationMode) -> Result<Value, MergeError> {
    DEFAULT_REGISTRY.merge(original, generated, mode)
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
