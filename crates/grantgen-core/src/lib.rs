//! Grant proposal generation pipeline
//!
//! Turns a section request into a merged section value:
//! - Resolves language rules (defaults or administrator override)
//! - Compiles a deterministic instruction from document context
//! - Calls a generative-model provider, cancellably
//! - Sanitizes the untrusted answer and repairs schedule data
//! - Merges with user content according to the generation mode
//!
//! # Example
//!
//! ```rust
//! use grantgen_core::{GenerationRequest, ReplayProvider, SectionGenerator};
//! use grantgen_document::{Document, GenerationMode, SectionKind};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = Arc::new(ReplayProvider::new(
//!     r#"[{"title": "Toolkit", "description": "Open toolkit", "indicator": "1 release"}]"#,
//! ));
//! let generator = SectionGenerator::new(provider);
//!
//! let request = GenerationRequest::new(SectionKind::Outputs, GenerationMode::Fill);
//! let outcome = generator
//!     .generate(&request, &Document::new(), &CancellationToken::new())
//!     .await?;
//!
//! assert_eq!(outcome.merged[0]["title"], "Toolkit");
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod generator;
pub mod provider;
pub mod session;
pub mod store;

pub use config::GeneratorConfig;
pub use error::{ConfigError, GenerationError, GenerationResult, ProviderError, StoreError};
pub use generator::{GenerationOutcome, GenerationRequest, SectionGenerator};
pub use provider::{GenerationProvider, ProviderRequest, ProviderResponse, ReplayProvider};
pub use session::DocumentSession;
pub use store::{DocumentKey, DocumentStore, FileDocumentStore, MemoryDocumentStore};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running generations
    pub use crate::{
        DocumentSession, GenerationError, GenerationOutcome, GenerationProvider,
        GenerationRequest, GeneratorConfig, SectionGenerator,
    };
    pub use grantgen_document::{Document, GenerationMode, SectionKind};
    pub use tokio_util::sync::CancellationToken;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
