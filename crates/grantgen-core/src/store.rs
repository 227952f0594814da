//! Document store collaborator
//!
//! Documents are keyed by project identifier and language variant. The
//! pipeline never saves on its own; callers persist merged results.

use crate::error::StoreError;
use async_trait::async_trait;
use dashmap::DashMap;
use grantgen_document::Document;
use grantgen_rules::Language;
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};

/// Storage key of one document variant
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentKey {
    project: String,
    language: Language,
}

impl DocumentKey {
    /// Create key; the project identifier must be a plain name
    pub fn new(project: impl Into<String>, language: Language) -> Result<Self, StoreError> {
        let project = project.into();
        let valid = !project.is_empty()
            && project
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'));
        if !valid {
            return Err(StoreError::InvalidKey(project));
        }
        Ok(Self { project, language })
    }

    /// Project identifier
    #[inline]
    #[must_use]
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Language variant
    #[inline]
    #[must_use]
    pub fn language(&self) -> Language {
        self.language
    }

    /// File name: `<project>.<language>.json`
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.{}.json", self.project, self.language)
    }
}

impl Display for DocumentKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.project, self.language)
    }
}

/// Persistence for proposal documents
#[async_trait]
pub trait DocumentStore: Send + Sync + std::fmt::Debug {
    /// Load a document; `None` if it was never saved
    async fn load(&self, key: &DocumentKey) -> Result<Option<Document>, StoreError>;

    /// Save a document, replacing any previous version
    async fn save(&self, key: &DocumentKey, document: &Document) -> Result<(), StoreError>;
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: DashMap<DocumentKey, Document>,
}

impl MemoryDocumentStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Check if store is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn load(&self, key: &DocumentKey) -> Result<Option<Document>, StoreError> {
        Ok(self.documents.get(key).map(|doc| doc.value().clone()))
    }

    async fn save(&self, key: &DocumentKey, document: &Document) -> Result<(), StoreError> {
        self.documents.insert(key.clone(), document.clone());
        Ok(())
    }
}

/// JSON files under a directory
#[derive(Debug, Clone)]
pub struct FileDocumentStore {
    dir: PathBuf,
}

impl FileDocumentStore {
    /// Create store rooted at `dir`
    #[inline]
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing a key
    #[must_use]
    pub fn path_for(&self, key: &DocumentKey) -> PathBuf {
        self.dir.join(key.file_name())
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn load(&self, key: &DocumentKey) -> Result<Option<Document>, StoreError> {
        let path = self.path_for(key);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io_error(path, e)),
        };
        let document = serde_json::from_str(&text).map_err(|source| StoreError::Serialization {
            key: key.to_string(),
            source,
        })?;
        Ok(Some(document))
    }

    async fn save(&self, key: &DocumentKey, document: &Document) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(document).map_err(|source| {
            StoreError::Serialization {
                key: key.to_string(),
                source,
            }
        })?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StoreError::io_error(&self.dir, e))?;
        let path = self.path_for(key);
        tokio::fs::write(&path, text)
            .await
            .map_err(|e| StoreError::io_error(path, e))?;
        tracing::debug!(key = %key, "document saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(project: &str) -> DocumentKey {
        DocumentKey::new(project, Language::En).unwrap()
    }

    #[test]
    fn key_validation() {
        assert!(DocumentKey::new("green-valleys_2", Language::Si).is_ok());
        assert!(matches!(DocumentKey::new("", Language::En), Err(StoreError::InvalidKey(_))));
        assert!(DocumentKey::new("../etc", Language::En).is_err());
        assert_eq!(key("gv").file_name(), "gv.en.json");
        assert_eq!(key("gv").to_string(), "gv/en");
    }

    #[tokio::test]
    async fn memory_store_roundtrip() {
        let store = MemoryDocumentStore::new();
        assert!(store.load(&key("gv")).await.unwrap().is_none());

        let mut doc = Document::new();
        doc.project_idea.project_title = "Green Valleys".into();
        store.save(&key("gv"), &doc).await.unwrap();

        assert_eq!(store.load(&key("gv")).await.unwrap(), Some(doc));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn file_store_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDocumentStore::new(dir.path());
        assert!(store.load(&key("gv")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn file_store_saves_per_language() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDocumentStore::new(dir.path().join("projects"));

        let mut doc = Document::new();
        doc.project_idea.main_aim = "Restore valleys".into();
        store.save(&key("gv"), &doc).await.unwrap();

        assert!(dir.path().join("projects/gv.en.json").exists());
        assert_eq!(store.load(&key("gv")).await.unwrap(), Some(doc));

        let si = DocumentKey::new("gv", Language::Si).unwrap();
        assert!(store.load(&si).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn file_store_rejects_corrupt_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("gv.en.json"), "{not json").unwrap();
        let store = FileDocumentStore::new(dir.path());
        assert!(matches!(
            store.load(&key("gv")).await,
            Err(StoreError::Serialization { .. })
        ));
    }
}
