//! Document session
//!
//! Owns the shared document while generations run against it. Generations
//! targeting the same section are serialized; different sections proceed
//! concurrently. Each outcome is applied atomically to its section, and a
//! failed or cancelled request leaves the document exactly as it was.

use crate::error::{GenerationError, GenerationResult};
use crate::generator::{GenerationOutcome, GenerationRequest, SectionGenerator};
use dashmap::DashMap;
use futures::future::join_all;
use grantgen_document::{Document, SectionKind};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Shared document plus the generator working on it
#[derive(Debug)]
pub struct DocumentSession {
    document: RwLock<Document>,
    section_locks: DashMap<SectionKind, Arc<Mutex<()>>>,
    generator: SectionGenerator,
}

impl DocumentSession {
    /// Create session over a document
    #[must_use]
    pub fn new(document: Document, generator: SectionGenerator) -> Self {
        Self {
            document: RwLock::new(document),
            section_locks: DashMap::new(),
            generator,
        }
    }

    /// Snapshot of the current document
    #[must_use]
    pub fn document(&self) -> Document {
        self.document.read().clone()
    }

    /// Consume the session, returning the document
    #[must_use]
    pub fn into_document(self) -> Document {
        self.document.into_inner()
    }

    /// Generator used by this session
    #[inline]
    #[must_use]
    pub fn generator(&self) -> &SectionGenerator {
        &self.generator
    }

    fn section_lock(&self, section: SectionKind) -> Arc<Mutex<()>> {
        self.section_locks.entry(section).or_default().clone()
    }

    /// Generate one section and apply the outcome
    ///
    /// Waits for any running generation of the same section, so the merge
    /// always starts from the latest applied data.
    pub async fn generate(
        &self,
        request: GenerationRequest,
        cancel: &CancellationToken,
    ) -> GenerationResult<GenerationOutcome> {
        let lock = self.section_lock(request.section);
        let _guard = lock.lock().await;

        let snapshot = self.document();
        let outcome = match self.generator.generate(&request, &snapshot, cancel).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(section = %request.section, error = %e, "generation discarded");
                return Err(e);
            }
        };

        if cancel.is_cancelled() {
            tracing::debug!(section = %request.section, "cancelled before apply, outcome discarded");
            return Err(GenerationError::Cancelled);
        }

        outcome.apply_to(&mut self.document.write())?;
        Ok(outcome)
    }

    /// Generate several sections concurrently
    ///
    /// Results are returned in request order. Requests for the same section
    /// run one after the other.
    pub async fn generate_many(
        &self,
        requests: Vec<GenerationRequest>,
        cancel: &CancellationToken,
    ) -> Vec<GenerationResult<GenerationOutcome>> {
        join_all(requests.into_iter().map(|request| self.generate(request, cancel))).await
    }
}
