//! Override persistence
//!
//! The store holds a single opaque JSON blob. Absence means "use the
//! compiled-in defaults" and is not an error.

use crate::error::{RuleError, RuleResult};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::fmt::Debug;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Key-value persistence for the override blob
#[async_trait]
pub trait RuleOverrideStore: Send + Sync + Debug {
    /// Current blob, or `None` when no override is stored
    async fn load(&self) -> RuleResult<Option<String>>;

    /// Replace the stored blob
    async fn save(&self, blob: &str) -> RuleResult<()>;

    /// Remove the stored blob
    async fn clear(&self) -> RuleResult<()>;
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryOverrideStore {
    blob: RwLock<Option<String>>,
}

impl MemoryOverrideStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create store holding a blob
    #[must_use]
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: RwLock::new(Some(blob.into())),
        }
    }
}

#[async_trait]
impl RuleOverrideStore for MemoryOverrideStore {
    async fn load(&self) -> RuleResult<Option<String>> {
        Ok(self.blob.read().clone())
    }

    async fn save(&self, blob: &str) -> RuleResult<()> {
        *self.blob.write() = Some(blob.to_string());
        Ok(())
    }

    async fn clear(&self) -> RuleResult<()> {
        *self.blob.write() = None;
        Ok(())
    }
}

/// JSON file store
#[derive(Debug, Clone)]
pub struct FileOverrideStore {
    path: PathBuf,
}

impl FileOverrideStore {
    /// Store backed by the file at `path`
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RuleOverrideStore for FileOverrideStore {
    async fn load(&self) -> RuleResult<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(blob) if blob.trim().is_empty() => Ok(None),
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RuleError::io_error(&self.path, e)),
        }
    }

    async fn save(&self, blob: &str) -> RuleResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RuleError::io_error(parent, e))?;
        }
        tokio::fs::write(&self.path, blob)
            .await
            .map_err(|e| RuleError::io_error(&self.path, e))
    }

    async fn clear(&self) -> RuleResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RuleError::io_error(&self.path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn memory_store_roundtrip() {
        let store = MemoryOverrideStore::new();
        assert_eq!(store.load().await.unwrap(), None);

        store.save(r#"{"version": 1}"#).await.unwrap();
        assert_eq!(store.load().await.unwrap().as_deref(), Some(r#"{"version": 1}"#));

        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_store_missing_file_is_absent() {
        let dir = TempDir::new().unwrap();
        let store = FileOverrideStore::new(dir.path().join("rules.json"));
        assert_eq!(store.load().await.unwrap(), None);
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn file_store_save_creates_parent() {
        let dir = TempDir::new().unwrap();
        let store = FileOverrideStore::new(dir.path().join("admin").join("rules.json"));
        store.save(r#"{"version": 7}"#).await.unwrap();
        assert_eq!(store.load().await.unwrap().as_deref(), Some(r#"{"version": 7}"#));

        store.clear().await.unwrap();
        assert!(!store.path().exists());
    }
}
