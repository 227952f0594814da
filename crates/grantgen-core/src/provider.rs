//! Generative-model provider collaborator
//!
//! Providers either enforce an output schema natively or receive it as a
//! textual hint inside the instruction. Output is parsed and validated
//! locally in both cases.

use crate::error::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request sent to a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRequest {
    /// Full instruction text
    pub instruction: String,
    /// JSON Schema of the expected output, when enforced natively
    pub output_shape: Option<Value>,
    /// Whether the provider should use native structured output
    pub structured_output_requested: bool,
}

impl ProviderRequest {
    /// Plain-text request; the schema travels inside the instruction
    #[must_use]
    pub fn text(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            output_shape: None,
            structured_output_requested: false,
        }
    }

    /// Structured request carrying the output schema
    #[must_use]
    pub fn structured(instruction: impl Into<String>, output_shape: Value) -> Self {
        Self {
            instruction: instruction.into(),
            output_shape: Some(output_shape),
            structured_output_requested: true,
        }
    }
}

/// Raw provider answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// Generated text, expected to contain JSON
    pub text: String,
}

impl ProviderResponse {
    /// Wrap generated text
    #[inline]
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Generative-model provider
///
/// Timeouts are the provider's responsibility and surface as
/// [`ProviderError::Timeout`].
#[async_trait]
pub trait GenerationProvider: Send + Sync + std::fmt::Debug {
    /// Provider name (for logging)
    fn name(&self) -> &str;

    /// Whether the provider enforces an output schema natively
    fn supports_structured_output(&self) -> bool;

    /// Generate text for a request
    async fn generate(&self, request: &ProviderRequest) -> Result<ProviderResponse, ProviderError>;
}

/// Provider that answers every request with the same captured text
///
/// Runs the pipeline offline on a model response saved earlier.
#[derive(Debug, Clone)]
pub struct ReplayProvider {
    text: String,
}

impl ReplayProvider {
    /// Create provider replaying `text`
    #[inline]
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl GenerationProvider for ReplayProvider {
    fn name(&self) -> &str {
        "replay"
    }

    fn supports_structured_output(&self) -> bool {
        false
    }

    async fn generate(&self, request: &ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        tracing::debug!(
            instruction_len = request.instruction.len(),
            "replaying captured response"
        );
        Ok(ProviderResponse::new(self.text.clone()))
    }
}
