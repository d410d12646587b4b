//! Index provider contract and the in-process provider

use crate::indexing::IndexingError;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Storage backend holding the search indexes
#[async_trait]
pub trait IndexProvider: Send + Sync {
    /// Provider name for logging and the admin listing
    fn name(&self) -> &str;

    async fn exists(&self, index: &str) -> bool;

    async fn create_index(&self, index: &str) -> Result<(), IndexingError>;

    async fn delete_index(&self, index: &str) -> Result<(), IndexingError>;

    /// Names of all indexes, sorted
    async fn list(&self) -> Vec<String>;

    async fn documents_count(&self, index: &str) -> Result<usize, IndexingError>;

    async fn fields(&self, index: &str) -> Result<Vec<String>, IndexingError>;
}

/// Locates the configured index provider, if any
#[derive(Clone, Default)]
pub struct IndexManager {
    provider: Option<Arc<dyn IndexProvider>>,
}

impl IndexManager {
    pub fn new(provider: Option<Arc<dyn IndexProvider>>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> Result<Arc<dyn IndexProvider>, IndexingError> {
        self.provider.clone().ok_or(IndexingError::NoProvider)
    }
}

/// Field name to value
pub type Document = BTreeMap<String, String>;

#[derive(Debug, Default)]
struct MemoryIndex {
    documents: HashMap<String, Document>,
}

/// Index provider keeping every index in memory
pub struct MemoryIndexProvider {
    indexes: Arc<RwLock<HashMap<String, MemoryIndex>>>,
}

impl MemoryIndexProvider {
    pub fn new() -> Self {
        Self {
            indexes: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Add or replace a document in an index
    #[cfg(test)]
    pub async fn store(
        &self,
        index: &str,
        id: &str,
        document: Document,
    ) -> Result<(), IndexingError> {
        let mut indexes = self.indexes.write().await;
        let target = indexes
            .get_mut(index)
            .ok_or_else(|| IndexingError::NotFound(index.to_string()))?;
        target.documents.insert(id.to_string(), document);
        Ok(())
    }
}

impl Default for MemoryIndexProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IndexProvider for MemoryIndexProvider {
    fn name(&self) -> &str {
        "memory"
    }

    async fn exists(&self, index: &str) -> bool {
        self.indexes.read().await.contains_key(index)
    }

    async fn create_index(&self, index: &str) -> Result<(), IndexingError> {
        let mut indexes = self.indexes.write().await;
        if indexes.contains_key(index) {
            return Err(IndexingError::AlreadyExists(index.to_string()));
        }
        indexes.insert(index.to_string(), MemoryIndex::default());
        info!(index, "Created search index");
        Ok(())
    }

    async fn delete_index(&self, index: &str) -> Result<(), IndexingError> {
        if self.indexes.write().await.remove(index).is_some() {
            info!(index, "Deleted search index");
        } else {
            debug!(index, "Delete requested for missing index");
        }
        Ok(())
    }

    async fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.indexes.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    async fn documents_count(&self, index: &str) -> Result<usize, IndexingError> {
        self.indexes
            .read()
            .await
            .get(index)
            .map(|i| i.documents.len())
            .ok_or_else(|| IndexingError::NotFound(index.to_string()))
    }

    async fn fields(&self, index: &str) -> Result<Vec<String>, IndexingError> {
        let indexes = self.indexes.read().await;
        let target = indexes
            .get(index)
            .ok_or_else(|| IndexingError::NotFound(index.to_string()))?;

        let fields: BTreeSet<&String> = target.documents.values().flat_map(|d| d.keys()).collect();
        Ok(fields.into_iter().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_list() {
        let provider = MemoryIndexProvider::new();
        provider.create_index("Search").await.unwrap();
        provider.create_index("Admin").await.unwrap();

        assert!(provider.exists("Search").await);
        assert_eq!(provider.list().await, vec!["Admin", "Search"]);
    }

    #[tokio::test]
    async fn test_duplicate_create_fails() {
        let provider = MemoryIndexProvider::new();
        provider.create_index("Search").await.unwrap();

        let result = provider.create_index("Search").await;
        assert_eq!(result, Err(IndexingError::AlreadyExists("Search".to_string())));
    }

    #[tokio::test]
    async fn test_fields_are_collected_across_documents() {
        let provider = MemoryIndexProvider::new();
        provider.create_index("Search").await.unwrap();

        let mut page = Document::new();
        page.insert("title".to_string(), "Home".to_string());
        let mut post = Document::new();
        post.insert("title".to_string(), "Hello".to_string());
        post.insert("body".to_string(), "World".to_string());

        provider.store("Search", "1", page).await.unwrap();
        provider.store("Search", "2", post).await.unwrap();

        assert_eq!(provider.documents_count("Search").await.unwrap(), 2);
        assert_eq!(provider.fields("Search").await.unwrap(), vec!["body", "title"]);
    }

    #[tokio::test]
    async fn test_missing_index_cannot_be_read() {
        let provider = MemoryIndexProvider::new();
        assert!(provider.documents_count("nope").await.is_err());
    }

    #[test]
    fn test_manager_without_provider() {
        let manager = IndexManager::default();
        assert!(matches!(manager.provider(), Err(IndexingError::NoProvider)));
    }
}
