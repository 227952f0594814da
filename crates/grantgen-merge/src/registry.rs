//! Strategy registry keyed by generation mode
//!
//! Provides [`MergeRegistry`] for looking up the strategy that reconciles a
//! mode's output with existing data.

use crate::fill::{EnhanceStrategy, FillStrategy};
use crate::regenerate::RegenerateStrategy;
use crate::strategy::{MergeError, MergeStrategy};
use crate::targeted::TargetedFillStrategy;
use grantgen_document::{GenerationMode, ModeKind};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of merge strategies
#[derive(Debug, Default, Clone)]
pub struct MergeRegistry {
    strategies: HashMap<ModeKind, Arc<dyn MergeStrategy>>,
}

impl MergeRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// Create registry with built-in strategies for every mode
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(ModeKind::Regenerate, RegenerateStrategy::new());
        registry.register(ModeKind::Fill, FillStrategy::new());
        registry.register(ModeKind::Enhance, EnhanceStrategy::new());
        registry.register(ModeKind::TargetedFill, TargetedFillStrategy::new());
        registry
    }

    /// Register a strategy, replacing any previous one for the mode
    pub fn register(&mut self, mode: ModeKind, strategy: impl MergeStrategy + 'static) {
        self.strategies.insert(mode, Arc::new(strategy));
    }

    /// Strategy for a mode
    #[inline]
    #[must_use]
    pub fn get(&self, mode: ModeKind) -> Option<&Arc<dyn MergeStrategy>> {
        self.strategies.get(&mode)
    }

    /// Check if a mode has a strategy
    #[inline]
    #[must_use]
    pub fn contains(&self, mode: ModeKind) -> bool {
        self.strategies.contains_key(&mode)
    }

    /// Get number of registered strategies
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Merge with the strategy registered for the mode
    pub fn merge(
        &self,
        original: &Value,
        generated: &Value,
        mode: &GenerationMode,
    ) -> Result<Value, MergeError> {
        let strategy = self
            .get(mode.kind())
            .ok_or_else(|| MergeError::NoStrategy(mode.kind().to_string()))?;
        tracing::debug!(strategy = strategy.name(), %mode, "merging section");
        strategy.merge(original, generated, mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_cover_every_mode() {
        let registry = MergeRegistry::with_defaults();
        assert_eq!(registry.len(), ModeKind::ALL.len());
        for mode in ModeKind::ALL {
            assert!(registry.contains(mode), "{mode}");
        }
        assert_eq!(registry.get(ModeKind::Fill).unwrap().name(), "fill");
        assert!(!registry.get(ModeKind::Regenerate).unwrap().preserves_user_text());
    }

    #[test]
    fn empty_registry_reports_missing_strategy() {
        let registry = MergeRegistry::new();
        assert!(registry.is_empty());
        let err = registry
            .merge(&json!({}), &json!({}), &GenerationMode::Fill)
            .unwrap_err();
        assert!(matches!(err, MergeError::NoStrategy(ref mode) if mode == "fill"));
    }

    #[test]
    fn custom_strategy_replaces_default() {
        let mut registry = MergeRegistry::with_defaults();
        registry.register(ModeKind::Enhance, RegenerateStrategy::new());
        let merged = registry
            .merge(&json!({"a": "kept?"}), &json!({"a": "new"}), &GenerationMode::Enhance)
            .unwrap();
        assert_eq!(merged, json!({"a": "new"}));
    }
}
