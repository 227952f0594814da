//! Content-addressed cache of validated overrides
//!
//! The store is re-read on every resolution; the blake3 hash of the blob text
//! decides whether it has to be validated again.

use crate::error::RuleResult;
use crate::overrides::RuleOverride;
use moka::future::Cache;
use std::sync::Arc;

/// Hash of an override blob
#[inline]
#[must_use]
pub fn blob_hash(blob: &str) -> blake3::Hash {
    blake3::hash(blob.as_bytes())
}

/// Validated overrides keyed by blob hash
#[derive(Debug, Clone)]
pub struct OverrideCache {
    inner: Cache<blake3::Hash, Arc<RuleOverride>>,
}

impl Default for OverrideCache {
    fn default() -> Self {
        Self::new(16)
    }
}

impl OverrideCache {
    /// Create cache with max capacity
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::new(max_capacity),
        }
    }

    /// Validated override for a blob, parsing it on first sight
    pub async fn get_or_parse(&self, blob: &str) -> RuleResult<Arc<RuleOverride>> {
        let hash = blob_hash(blob);
        if let Some(cached) = self.inner.get(&hash).await {
            return Ok(cached);
        }

        let parsed = Arc::new(RuleOverride::parse(blob)?);
        self.inner.insert(hash, Arc::clone(&parsed)).await;
        tracing::debug!(version = parsed.version, hash = %hash, "validated rule override");
        Ok(parsed)
    }

    /// Check if a blob has been validated
    #[must_use]
    pub async fn contains(&self, blob: &str) -> bool {
        self.inner.get(&blob_hash(blob)).await.is_some()
    }

    /// Invalidate all entries
    #[inline]
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn parses_once_per_blob() {
        let cache = OverrideCache::default();
        let blob = r#"{"version": 4}"#;
        assert!(!cache.contains(blob).await);

        let first = cache.get_or_parse(blob).await.unwrap();
        assert!(cache.contains(blob).await);
        let second = cache.get_or_parse(blob).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn invalid_blob_not_cached() {
        let cache = OverrideCache::default();
        assert!(cache.get_or_parse("{").await.is_err());
        assert!(!cache.contains("{").await);
    }

    #[test]
    fn hash_is_content_addressed() {
        assert_eq!(blob_hash("a"), blob_hash("a"));
        assert_ne!(blob_hash("a"), blob_hash("b"));
    }
}
