//! Admin facade over the index manager and indexing service
//!
//! Validation, per-item failure handling and notifications live here so
//! the HTTP handlers only translate outcomes into responses. Authorization
//! is applied in front of the handlers by the route guard.

use crate::indexing::{
    is_valid_index_name, IndexEntry, IndexManager, IndexingError, IndexingService, Notification,
    Notifier,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

const INVALID_NAME: &str = "Invalid index name.";

/// Listing view model
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexListing {
    pub index_provider: Option<String>,
    pub index_entries: Vec<IndexEntry>,
    pub notifications: Vec<Notification>,
}

/// Result of a create request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    InvalidName,
    AlreadyExists,
    Failed,
}

pub struct IndexAdmin {
    manager: IndexManager,
    service: Arc<dyn IndexingService>,
    notifier: Notifier,
}

impl IndexAdmin {
    pub fn new(manager: IndexManager, service: Arc<dyn IndexingService>) -> Self {
        Self {
            manager,
            service,
            notifier: Notifier::new(),
        }
    }

    /// Every index known to the provider. An index that cannot be read is
    /// listed as unavailable instead of failing the listing.
    pub async fn list(&self, user: Uuid) -> IndexListing {
        let mut listing = IndexListing {
            index_provider: None,
            index_entries: Vec::new(),
            notifications: Vec::new(),
        };

        if let Ok(provider) = self.manager.provider() {
            listing.index_provider = Some(provider.name().to_string());

            for name in provider.list().await {
                let entry = match self.service.get_index_entry(&name).await {
                    Ok(entry) => entry,
                    Err(e) => {
                        error!(index = %name, error = %e, "Index couldn't be read");
                        IndexEntry::unavailable(name)
                    }
                };
                listing.index_entries.push(entry);
            }
        }

        listing.notifications = self.notifier.drain(user).await;
        listing
    }

    /// Notifications to render with the create form
    pub async fn pending_notifications(&self, user: Uuid) -> Vec<Notification> {
        self.notifier.drain(user).await
    }

    pub async fn create(&self, user: Uuid, id: &str) -> CreateOutcome {
        if !is_valid_index_name(id) {
            self.notifier.error(user, INVALID_NAME).await;
            return CreateOutcome::InvalidName;
        }

        let provider = match self.manager.provider() {
            Ok(provider) => provider,
            Err(e) => {
                self.notifier.error(user, e.to_string()).await;
                return CreateOutcome::Failed;
            }
        };

        if provider.exists(id).await {
            self.notifier
                .error(user, IndexingError::AlreadyExists(id.to_string()).to_string())
                .await;
            return CreateOutcome::AlreadyExists;
        }

        match provider.create_index(id).await {
            Ok(()) => {
                self.notifier
                    .success(user, format!("Index named {} created successfully", id))
                    .await;
                CreateOutcome::Created
            }
            Err(e) => {
                error!(index = id, error = %e, "An error occurred while creating the index");
                self.notifier
                    .error(user, format!("An error occurred while creating the index: {}", id))
                    .await;
                CreateOutcome::Failed
            }
        }
    }

    pub async fn update(&self, user: Uuid, id: &str) {
        if !self.check_name(user, id).await {
            return;
        }
        match self.service.update_index(id).await {
            Ok(()) => {
                self.notifier.success(user, "The search index has been updated.").await;
            }
            Err(e) => self.report_failure(user, "updating", id, e).await,
        }
    }

    pub async fn rebuild(&self, user: Uuid, id: &str) {
        if !self.check_name(user, id).await {
            return;
        }
        match self.service.rebuild_index(id).await {
            Ok(()) => {
                self.notifier
                    .success(user, format!("The index {} has been rebuilt.", id))
                    .await;
            }
            Err(e) => self.report_failure(user, "rebuilding", id, e).await,
        }
    }

    pub async fn delete(&self, user: Uuid, id: &str) {
        if !self.check_name(user, id).await {
            return;
        }
        match self.service.delete_index(id).await {
            Ok(()) => {
                info!(index = id, "Index deleted from admin");
                self.notifier
                    .success(user, format!("The index {} has been deleted.", id))
                    .await;
            }
            Err(e) => self.report_failure(user, "deleting", id, e).await,
        }
    }

    async fn check_name(&self, user: Uuid, id: &str) -> bool {
        let valid = is_valid_index_name(id);
        if !valid {
            self.notifier.error(user, INVALID_NAME).await;
        }
        valid
    }

    async fn report_failure(&self, user: Uuid, action: &str, id: &str, e: IndexingError) {
        error!(index = id, error = %e, "An error occurred while {} the index", action);
        self.notifier
            .error(user, format!("An error occurred while {} the index: {}", action, id))
            .await;
    }
}
