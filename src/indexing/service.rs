//! Indexing service contract and its default implementation

use crate::indexing::{IndexEntry, IndexManager, IndexingError, IndexingStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::info;

/// Operations the admin facade delegates to
#[async_trait]
pub trait IndexingService: Send + Sync {
    /// Read the listing entry of one index. May fail per index.
    async fn get_index_entry(&self, index: &str) -> Result<IndexEntry, IndexingError>;

    async fn update_index(&self, index: &str) -> Result<(), IndexingError>;

    /// The index reads as `Rebuilding` until it has been re-created and updated.
    async fn rebuild_index(&self, index: &str) -> Result<(), IndexingError>;

    async fn delete_index(&self, index: &str) -> Result<(), IndexingError>;
}

#[derive(Debug, Clone, Copy, Default)]
struct IndexTask {
    last_update_utc: Option<DateTime<Utc>>,
    status: IndexingStatus,
}

/// Indexing service tracking per-index task state over the configured provider
pub struct DefaultIndexingService {
    manager: IndexManager,
    tasks: RwLock<HashMap<String, IndexTask>>,
}

impl DefaultIndexingService {
    pub fn new(manager: IndexManager) -> Self {
        Self {
            manager,
            tasks: RwLock::new(HashMap::new()),
        }
    }

    async fn set_status(&self, index: &str, status: IndexingStatus) {
        self.tasks
            .write()
            .await
            .entry(index.to_string())
            .or_default()
            .status = status;
    }
}

#[async_trait]
impl IndexingService for DefaultIndexingService {
    async fn get_index_entry(&self, index: &str) -> Result<IndexEntry, IndexingError> {
        let provider = self.manager.provider()?;
        let documents_count = provider.documents_count(index).await?;
        let fields = provider.fields(index).await?;
        let task = self.tasks.read().await.get(index).copied().unwrap_or_default();

        Ok(IndexEntry {
            index_name: index.to_string(),
            documents_count,
            fields,
            last_update_utc: task.last_update_utc,
            indexing_status: task.status,
        })
    }

    async fn update_index(&self, index: &str) -> Result<(), IndexingError> {
        let provider = self.manager.provider()?;
        if !provider.exists(index).await {
            return Err(IndexingError::NotFound(index.to_string()));
        }

        self.set_status(index, IndexingStatus::Updating).await;
        let processed = provider.documents_count(index).await;

        let now = Utc::now();
        let mut tasks = self.tasks.write().await;
        let task = tasks.entry(index.to_string()).or_default();
        task.status = IndexingStatus::Idle;
        let documents = processed?;
        task.last_update_utc = Some(now);

        info!(index, documents, updated_at = %now, "Search index updated");
        Ok(())
    }

    async fn rebuild_index(&self, index: &str) -> Result<(), IndexingError> {
        let provider = self.manager.provider()?;

        self.tasks.write().await.insert(
            index.to_string(),
            IndexTask {
                last_update_utc: None,
                status: IndexingStatus::Rebuilding,
            },
        );

        let recreated = async {
            if provider.exists(index).await {
                provider.delete_index(index).await?;
            }
            provider.create_index(index).await
        }
        .await;
        if let Err(e) = recreated {
            self.set_status(index, IndexingStatus::Idle).await;
            return Err(e);
        }
        info!(index, "Search index rebuilt");

        self.update_index(index).await
    }

    async fn delete_index(&self, index: &str) -> Result<(), IndexingError> {
        let provider = self.manager.provider()?;
        provider.delete_index(index).await?;
        self.tasks.write().await.remove(index);
        Ok(())
    }
}
