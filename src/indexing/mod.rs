//! Search index administration
//!
//! Index provider and indexing service contracts, their in-process
//! implementations, user notifications, and the admin facade that ties
//! them together.

mod admin;
mod notify;
mod provider;
mod safe_name;
mod service;

pub use admin::{CreateOutcome, IndexAdmin, IndexListing};
pub use notify::{Notification, Notifier};
pub use provider::{IndexManager, IndexProvider, MemoryIndexProvider};
pub use safe_name::is_valid_index_name;
pub use service::{DefaultIndexingService, IndexingService};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Errors raised by index providers and the indexing service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexingError {
    #[error("Index not found: {0}")]
    NotFound(String),

    #[error("An index with the same name already exists: {0}")]
    AlreadyExists(String),

    #[error("No search index provider is configured")]
    NoProvider,
}

/// Indexing state of a single index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IndexingStatus {
    #[default]
    Idle,
    Updating,
    Rebuilding,
    Unavailable,
}

/// What the admin listing shows for one index
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub index_name: String,
    pub documents_count: usize,
    pub fields: Vec<String>,
    pub last_update_utc: Option<DateTime<Utc>>,
    pub indexing_status: IndexingStatus,
}

impl IndexEntry {
    /// Placeholder for an index that could not be read
    pub fn unavailable(index_name: impl Into<String>) -> Self {
        Self {
            index_name: index_name.into(),
            documents_count: 0,
            fields: Vec::new(),
            last_update_utc: None,
            indexing_status: IndexingStatus::Unavailable,
        }
    }
}
