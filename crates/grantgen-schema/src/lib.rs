//! Schema declarations
//!
//! Each [`SectionKind`](grantgen_document::SectionKind) maps to exactly one
//! [`Schema`]. The schema instructs the generator (as a textual hint or a
//! native JSON Schema) and tells the response processor which top-level
//! shape to accept.
//!
//! # Example
//!
//! ```rust
//! use grantgen_document::SectionKind;
//! use grantgen_schema::{schema_for, TopLevel};
//!
//! let schema = schema_for(SectionKind::Risks);
//! assert_eq!(schema.top_level(), TopLevel::Array);
//! assert!(schema.to_hint().contains("mitigation"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod sections;
mod shape;

pub use sections::{schema_for, DEPENDENCY_TYPES, RISK_CATEGORIES, RISK_LEVELS};
pub use shape::{ArrayShape, Field, FieldType, ObjectShape, Schema, TopLevel};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
