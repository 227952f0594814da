//! Response processing and temporal integrity
//!
//! Generator output is untrusted. This crate turns raw text into a section
//! value that matches its schema's top-level shape and carries no formatting
//! markers, then repairs schedule data so every date respects the project
//! envelope.
//!
//! Only extraction and shape checking can fail. Leaf coercion, the
//! sanitizers and the temporal enforcer normalize silently.
//!
//! # Example
//!
//! ```rust
//! use grantgen_document::SectionKind;
//! use grantgen_response::ResponseProcessor;
//! use grantgen_schema::schema_for;
//!
//! let raw = "```json\n[{\"title\": \"**Toolkit**\"}]\n```";
//! let processed = ResponseProcessor::default()
//!     .process(raw, SectionKind::Outputs, &schema_for(SectionKind::Outputs))
//!     .unwrap();
//! assert_eq!(processed.value[0]["title"], "Toolkit");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod coerce;
mod error;
pub mod fields;
mod processor;
pub mod sanitize;
pub mod temporal;

pub use coerce::coerce_to_schema;
pub use error::{ResponseError, ResponseResult};
pub use fields::{normalize_acronym, normalize_title, FieldNormalizer, DEFAULT_TITLE_MAX_LEN};
pub use processor::{
    process_response, schema_diagnostics, ProcessedResponse, ProcessorOptions, ResponseProcessor,
};
pub use sanitize::{extract_json, strip_code_fence, strip_markers, strip_markers_deep};
pub use temporal::{
    correct_dependencies, enforce_envelope, enforce_envelope_value, repair_schedule_value,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
