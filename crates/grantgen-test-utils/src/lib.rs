//! Testing utilities for the grantgen workspace
//!
//! Shared document fixtures and a scripted provider.

#![warn(missing_docs)]

use async_trait::async_trait;
use grantgen_core::{GenerationProvider, ProviderError, ProviderRequest, ProviderResponse};
use grantgen_document::{
    Deliverable, Document, Milestone, Objective, Policy, Problem, ProblemAnalysis, ProjectIdea,
    ResultItem, Risk, Task, WorkPackage,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;

/// Document with every section empty
pub fn empty_document() -> Document {
    Document::new()
}

fn problem(title: &str, description: &str) -> Problem {
    Problem {
        title: title.to_string(),
        description: description.to_string(),
    }
}

/// Partially authored proposal starting 2026-01-01, running 24 months
///
/// Risks have blank entries at positions 1 and 3. Outputs, outcomes,
/// impacts and KERs are empty.
pub fn sample_document() -> Document {
    Document {
        problem_analysis: ProblemAnalysis {
            core_problem: problem(
                "Degradation of alpine river valleys",
                "Erosion and drought have reduced biodiversity by 30% since 2000.",
            ),
            causes: vec![
                problem("Unregulated water extraction", "Abstraction exceeds recharge."),
                problem("Climate-driven droughts", "Summer flows fell by 25%."),
            ],
            consequences: vec![problem("Loss of farmland", "Yields dropped 15%.")],
        },
        project_idea: ProjectIdea {
            project_title: "Green Valleys".to_string(),
            project_acronym: "GV".to_string(),
            main_aim: "To restore degraded alpine river valleys through community stewardship."
                .to_string(),
            state_of_the_art: String::new(),
            proposed_solution: "Joint restoration plans with local municipalities.".to_string(),
            policies: vec![Policy {
                name: "EU Biodiversity Strategy for 2030".to_string(),
                description: "Restoring freshwater ecosystems.".to_string(),
            }],
            start_date: "2026-01-01".to_string(),
            duration_months: Some(24),
        },
        general_objectives: vec![Objective {
            id: "GO1".to_string(),
            title: "To improve ecological status of alpine rivers".to_string(),
            description: String::new(),
            indicator: "5 river sections in good status by 2027".to_string(),
        }],
        activities: vec![WorkPackage {
            id: "WP1".to_string(),
            title: "Project management".to_string(),
            tasks: vec![Task {
                id: "T1.1".to_string(),
                title: "Coordination".to_string(),
                start_date: "2026-01-01".to_string(),
                end_date: "2027-12-31".to_string(),
                ..Task::default()
            }],
            milestones: vec![Milestone {
                id: "M1.1".to_string(),
                description: "Kick-off meeting".to_string(),
                date: "2026-01-15".to_string(),
            }],
            deliverables: vec![Deliverable {
                id: "D1.1".to_string(),
                title: "Management handbook".to_string(),
                ..Deliverable::default()
            }],
        }],
        risks: vec![
            Risk {
                id: "RISK1".to_string(),
                category: "technical".to_string(),
                title: "Sensor failure".to_string(),
                description: "Monitoring stations break down.".to_string(),
                likelihood: "low".to_string(),
                impact: "medium".to_string(),
                mitigation: "Spare units on site.".to_string(),
            },
            Risk {
                id: "RISK2".to_string(),
                ..Risk::default()
            },
            Risk {
                id: "RISK3".to_string(),
                category: "social".to_string(),
                title: "Low community uptake".to_string(),
                description: "Residents do not join.".to_string(),
                likelihood: "medium".to_string(),
                impact: "high".to_string(),
                mitigation: "Early engagement events.".to_string(),
            },
            Risk {
                id: "RISK4".to_string(),
                ..Risk::default()
            },
        ],
        ..Document::default()
    }
}

/// Result items numbered 1..=count, for scripting list answers
pub fn result_items(prefix: &str, count: usize) -> Vec<ResultItem> {
    (1..=count)
        .map(|i| ResultItem {
            title: format!("{prefix} {i}"),
            description: format!("{prefix} description {i}"),
            indicator: format!("{i} units"),
        })
        .collect()
}

/// Scripted provider
///
/// Answers come from, in order: the first keyed response whose key occurs in
/// the instruction, the queue of scripted results, then the fallback text.
/// Every request is recorded.
#[derive(Debug, Default)]
pub struct MockProvider {
    keyed: Mutex<Vec<(String, String)>>,
    queue: Mutex<VecDeque<Result<String, ProviderError>>>,
    fallback: Option<String>,
    delay: Option<Duration>,
    structured: bool,
    calls: Mutex<Vec<ProviderRequest>>,
}

impl MockProvider {
    /// Provider with nothing scripted
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful answer
    #[must_use]
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.queue.lock().push_back(Ok(text.into()));
        self
    }

    /// Queue a failure
    #[must_use]
    pub fn with_error(self, error: ProviderError) -> Self {
        self.queue.lock().push_back(Err(error));
        self
    }

    /// Answer any instruction containing `key` with `text`
    #[must_use]
    pub fn with_keyed_response(self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.keyed.lock().push((key.into(), text.into()));
        self
    }

    /// Answer used once keyed responses and the queue are exhausted
    #[must_use]
    pub fn with_fallback(mut self, text: impl Into<String>) -> Self {
        self.fallback = Some(text.into());
        self
    }

    /// Sleep before answering
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Report native structured-output support
    #[must_use]
    pub fn with_structured_output(mut self, supported: bool) -> Self {
        self.structured = supported;
        self
    }

    /// Requests received so far, oldest first
    #[must_use]
    pub fn calls(&self) -> Vec<ProviderRequest> {
        self.calls.lock().clone()
    }

    /// Number of requests received
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn next_answer(&self, instruction: &str) -> Result<String, ProviderError> {
        let keyed = self
            .keyed
            .lock()
            .iter()
            .find(|(key, _)| instruction.contains(key.as_str()))
            .map(|(_, text)| text.clone());
        if let Some(text) = keyed {
            return Ok(text);
        }
        if let Some(next) = self.queue.lock().pop_front() {
            return next;
        }
        self.fallback
            .clone()
            .ok_or_else(|| ProviderError::MalformedProviderResponse("no scripted answer".into()))
    }
}

#[async_trait]
impl GenerationProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn supports_structured_output(&self) -> bool {
        self.structured
    }

    async fn generate(&self, request: &ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.calls.lock().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.next_answer(&request.instruction).map(ProviderResponse::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grantgen_document::SectionKind;

    #[test]
    fn sample_document_shape() {
        let doc = sample_document();
        assert_eq!(doc.empty_indices(SectionKind::Risks), vec![1, 3]);
        assert!(!doc.section_has_content(SectionKind::Outputs));
        assert_eq!(doc.envelope().unwrap().end().unwrap().to_string(), "2027-12-31");
        assert!(!empty_document().section_has_content(SectionKind::ProjectIdea));
    }

    #[tokio::test]
    async fn mock_answers_in_order() {
        let provider = MockProvider::new()
            .with_keyed_response("RISKS", "[1]")
            .with_response("first")
            .with_error(ProviderError::Network("down".into()))
            .with_fallback("fallback");

        let ask = |text: &str| ProviderRequest::text(text);
        assert_eq!(provider.generate(&ask("about RISKS")).await.unwrap().text, "[1]");
        assert_eq!(provider.generate(&ask("a")).await.unwrap().text, "first");
        assert!(provider.generate(&ask("b")).await.is_err());
        assert_eq!(provider.generate(&ask("c")).await.unwrap().text, "fallback");
        assert_eq!(provider.call_count(), 4);
        assert_eq!(provider.calls()[1].instruction, "a");
    }

    #[tokio::test]
    async fn exhausted_script_fails() {
        let provider = MockProvider::new();
        assert!(matches!(
            provider.generate(&ProviderRequest::text("x")).await,
            Err(ProviderError::MalformedProviderResponse(_))
        ));
    }
}
