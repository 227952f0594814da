//! Rule resolution
//!
//! Precedence: a stored override whose version is greater than or equal to
//! the compiled-in version wins, block by block. Anything else resolves to
//! the compiled-in defaults.

use crate::cache::OverrideCache;
use crate::error::RuleResult;
use crate::language::Language;
use crate::overrides::RuleOverride;
use crate::ruleset::{default_rules, RuleSet};
use crate::store::{MemoryOverrideStore, RuleOverrideStore};
use std::sync::Arc;
use tracing::instrument;

/// Resolve the rule set for a language against an optional override
///
/// Pure: the caller supplies the already-loaded override.
pub fn resolve_rules(language: Language, custom: Option<&RuleOverride>) -> RuleResult<RuleSet> {
    let defaults = default_rules(language)?;
    let mut rules = defaults.clone();

    let Some(custom) = custom else {
        return Ok(rules);
    };
    if custom.version < defaults.version {
        tracing::debug!(
            override_version = custom.version,
            default_version = defaults.version,
            "ignoring outdated rule override"
        );
        return Ok(rules);
    }

    rules.version = custom.version;
    if let Some(patch) = custom.language(language) {
        patch.apply_to(&mut rules);
    }
    Ok(rules)
}

/// Rule registry backed by an override store
#[derive(Debug, Clone)]
pub struct RuleRegistry {
    store: Arc<dyn RuleOverrideStore>,
    cache: OverrideCache,
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new(Arc::new(MemoryOverrideStore::new()))
    }
}

impl RuleRegistry {
    /// Create registry over a store
    #[must_use]
    pub fn new(store: Arc<dyn RuleOverrideStore>) -> Self {
        Self {
            store,
            cache: OverrideCache::default(),
        }
    }

    /// Resolve rules, re-reading the store
    #[instrument(skip(self))]
    pub async fn resolve(&self, language: Language) -> RuleResult<RuleSet> {
        let custom = match self.store.load().await? {
            Some(blob) => Some(self.cache.get_or_parse(&blob).await?),
            None => None,
        };
        let rules = resolve_rules(language, custom.as_deref())?;
        tracing::debug!(version = rules.version, "resolved rules");
        Ok(rules)
    }

    /// Validate and persist an override blob
    pub async fn save_override(&self, blob: &str) -> RuleResult<()> {
        let parsed = self.cache.get_or_parse(blob).await?;
        self.store.save(blob).await?;
        tracing::info!(version = parsed.version, "saved rule override");
        Ok(())
    }

    /// Remove the stored override
    pub async fn clear_override(&self) -> RuleResult<()> {
        self.store.clear().await?;
        tracing::info!("cleared rule override");
        Ok(())
    }

    /// Underlying store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<dyn RuleOverrideStore> {
        &self.store
    }
}
