//! Section generator
//!
//! One request runs every pipeline stage in order:
//!
//! 1. Resolve rules for the language
//! 2. Compile the instruction (context extraction included)
//! 3. Call the provider, racing the cancellation token
//! 4. Process the response (parse, shape check, sanitize, normalize)
//! 5. Enforce the project envelope on schedule data
//! 6. Merge with the section's current data
//! 7. Repair the merged schedule, where user and generated tasks meet
//! 8. Assign missing identifiers
//!
//! The document is only read. Applying the outcome is the caller's decision.

use crate::config::GeneratorConfig;
use crate::error::{GenerationError, GenerationResult};
use crate::provider::{GenerationProvider, ProviderRequest};
use grantgen_document::{
    assign_section_ids, Document, DocumentError, GenerationMode, ModeKind, SectionKind,
};
use grantgen_merge::{retain_undeclared_keys, MergeRegistry};
use grantgen_prompt::PromptCompiler;
use grantgen_response::{enforce_envelope_value, repair_schedule_value, ResponseProcessor};
use grantgen_rules::{Language, RuleRegistry};
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

const EXCERPT_LEN: usize = 160;

/// What to generate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Target section
    pub section: SectionKind,
    /// Generation mode
    pub mode: GenerationMode,
    /// Output language; the configured default when `None`
    pub language: Option<Language>,
}

impl GenerationRequest {
    /// Create request in the configured language
    #[inline]
    #[must_use]
    pub fn new(section: SectionKind, mode: GenerationMode) -> Self {
        Self {
            section,
            mode,
            language: None,
        }
    }

    /// Create request from a section key
    pub fn for_key(section_key: &str, mode: GenerationMode) -> GenerationResult<Self> {
        let section: SectionKind = section_key.parse()?;
        Ok(Self::new(section, mode))
    }

    /// With explicit language
    #[inline]
    #[must_use]
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }
}

/// Result of one generation, not yet applied to any document
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutcome {
    /// Target section
    pub section: SectionKind,
    /// Mode actually used (targeted positions resolved)
    pub mode: GenerationMode,
    /// New section value after merging
    pub merged: Value,
    /// Sanitized generator output before merging
    pub generated: Value,
    /// Non-fatal schema findings
    pub diagnostics: Vec<String>,
    /// Instruction length in bytes
    pub prompt_len: usize,
    /// Identifiers assigned to new items
    pub assigned_ids: usize,
    /// Targeted positions that are still empty after the merge
    pub unfilled: Vec<usize>,
}

impl GenerationOutcome {
    /// Outcome that leaves the section as it is
    fn unchanged(section: SectionKind, mode: GenerationMode, current: Value) -> Self {
        Self {
            section,
            mode,
            merged: current,
            generated: Value::Array(Vec::new()),
            diagnostics: Vec::new(),
            prompt_len: 0,
            assigned_ids: 0,
            unfilled: Vec::new(),
        }
    }

    /// Write the merged value into a document
    ///
    /// A decode failure leaves the document untouched.
    pub fn apply_to(&self, document: &mut Document) -> Result<(), DocumentError> {
        document.set_section_value(self.section, self.merged.clone())
    }
}

/// Pipeline orchestrator for single-section generation
#[derive(Debug, Clone)]
pub struct SectionGenerator {
    provider: Arc<dyn GenerationProvider>,
    rules: RuleRegistry,
    merges: MergeRegistry,
    config: GeneratorConfig,
}

impl SectionGenerator {
    /// Create generator with default rules, merges and config
    #[must_use]
    pub fn new(provider: Arc<dyn GenerationProvider>) -> Self {
        Self {
            provider,
            rules: RuleRegistry::default(),
            merges: MergeRegistry::with_defaults(),
            config: GeneratorConfig::default(),
        }
    }

    /// With rule registry
    #[inline]
    #[must_use]
    pub fn with_rules(mut self, rules: RuleRegistry) -> Self {
        self.rules = rules;
        self
    }

    /// With merge registry
    #[inline]
    #[must_use]
    pub fn with_merges(mut self, merges: MergeRegistry) -> Self {
        self.merges = merges;
        self
    }

    /// With configuration
    #[inline]
    #[must_use]
    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Rule registry
    #[inline]
    #[must_use]
    pub fn rules(&self) -> &RuleRegistry {
        &self.rules
    }

    /// Language a request resolves to
    #[inline]
    #[must_use]
    pub fn language_for(&self, request: &GenerationRequest) -> Language {
        request.language.unwrap_or(self.config.language)
    }

    /// Run the pipeline for one section
    ///
    /// Never mutates `document`. Fails with [`GenerationError::Cancelled`]
    /// if the token fires before the outcome is ready.
    #[instrument(
        skip(self, request, document, cancel),
        fields(
            section = %request.section,
            mode = %request.mode,
            language = %self.language_for(request),
        )
    )]
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        document: &Document,
        cancel: &CancellationToken,
    ) -> GenerationResult<GenerationOutcome> {
        if cancel.is_cancelled() {
            return Err(GenerationError::Cancelled);
        }

        let section = request.section;
        let mode = resolve_mode(request, document)?;
        let current = document.section_value(section);

        if mode.kind() == ModeKind::TargetedFill && mode.indices().is_empty() {
            tracing::debug!("no empty positions to fill");
            return Ok(GenerationOutcome::unchanged(section, mode, current));
        }

        let rules = self.rules.resolve(self.language_for(request)).await?;

        let structured =
            self.config.prefer_structured_output && self.provider.supports_structured_output();
        let prompt = PromptCompiler::new(&rules)
            .with_schema_hint(!structured)
            .compile(section, document, &mode, &current);
        let provider_request = if structured {
            ProviderRequest::structured(&prompt.instruction, prompt.schema.to_json_schema())
        } else {
            ProviderRequest::text(&prompt.instruction)
        };
        tracing::debug!(
            provider = self.provider.name(),
            structured,
            prompt_len = prompt.instruction.len(),
            "calling provider"
        );

        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(GenerationError::Cancelled),
            response = self.provider.generate(&provider_request) => response?,
        };

        let processed = ResponseProcessor::new(self.config.processor_options()).process(
            &response.text,
            section,
            &prompt.schema,
        )?;

        let generated = if section.has_temporal_constraints() {
            enforce_envelope_value(processed.value, document.envelope())?
        } else {
            processed.value
        };

        let mut merged = self.merges.merge(&current, &generated, &mode)?;
        if mode.kind() == ModeKind::Regenerate {
            let declared: Vec<&str> = prompt.schema.top_fields().iter().map(|f| f.name).collect();
            merged = retain_undeclared_keys(&current, merged, &declared);
        }
        if section.has_temporal_constraints() {
            merged = repair_schedule_value(merged, document.envelope())?;
        }
        let assigned_ids = assign_section_ids(section, &mut merged);

        // Decode into a scratch document so the outcome is known to apply.
        let mut scratch = Document::new();
        scratch
            .set_section_value(section, merged.clone())
            .map_err(|e| GenerationError::MalformedResponse {
                message: e.to_string(),
                excerpt: response.text.chars().take(EXCERPT_LEN).collect(),
            })?;
        let unfilled: Vec<usize> = scratch
            .empty_indices(section)
            .into_iter()
            .filter(|idx| mode.indices().contains(idx))
            .collect();
        if !unfilled.is_empty() {
            tracing::warn!(positions = ?unfilled, "targeted positions left empty");
        }

        if cancel.is_cancelled() {
            return Err(GenerationError::Cancelled);
        }

        tracing::info!(
            diagnostics = processed.diagnostics.len(),
            assigned_ids,
            "section generated"
        );

        Ok(GenerationOutcome {
            section,
            mode,
            merged,
            generated,
            diagnostics: processed.diagnostics,
            prompt_len: prompt.instruction.len(),
            assigned_ids,
            unfilled,
        })
    }
}

/// Validate the mode against the section and resolve targeted positions
///
/// A targeted fill without explicit positions targets every empty item.
fn resolve_mode(request: &GenerationRequest, document: &Document) -> GenerationResult<GenerationMode> {
    if request.mode.kind() != ModeKind::TargetedFill {
        return Ok(request.mode.clone());
    }
    if !request.section.is_list() {
        return Err(GenerationError::UnsupportedMode {
            section: request.section.key().to_string(),
            mode: request.mode.kind().to_string(),
        });
    }
    if request.mode.indices().is_empty() {
        Ok(GenerationMode::targeted(document.empty_indices(request.section)))
    } else {
        Ok(request.mode.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grantgen_document::Risk;

    #[test]
    fn request_from_key() {
        let request = GenerationRequest::for_key("risks", GenerationMode::Fill).unwrap();
        assert_eq!(request.section, SectionKind::Risks);
        assert!(matches!(
            GenerationRequest::for_key("budget", GenerationMode::Fill),
            Err(GenerationError::UnknownSection(_))
        ));
    }

    #[test]
    fn targeted_without_positions_uses_empty_items() {
        let mut doc = Document::new();
        doc.risks = vec![
            Risk { title: "Delay".into(), ..Risk::default() },
            Risk::default(),
            Risk { title: "Cost".into(), ..Risk::default() },
            Risk::default(),
        ];
        let request = GenerationRequest::new(
            SectionKind::Risks,
            GenerationMode::TargetedFill { indices: Vec::new() },
        );
        let mode = resolve_mode(&request, &doc).unwrap();
        assert_eq!(mode.indices(), &[1, 3]);
    }

    #[test]
    fn targeted_on_object_section_rejected() {
        let request = GenerationRequest::new(SectionKind::ProjectIdea, GenerationMode::targeted([0]));
        assert!(matches!(
            resolve_mode(&request, &Document::new()),
            Err(GenerationError::UnsupportedMode { .. })
        ));
    }

    #[test]
    fn explicit_positions_kept() {
        let request = GenerationRequest::new(SectionKind::Outputs, GenerationMode::targeted([2]));
        assert_eq!(resolve_mode(&request, &Document::new()).unwrap().indices(), &[2]);
    }
}
