//! Application state management
//!
//! Contains shared state accessible across all handlers.

use crate::indexing::IndexAdmin;
use crate::migration::MigrationRunner;
use std::sync::Arc;

/// Application state shared across all handlers
pub struct AppState {
    /// Search index administration
    pub index_admin: IndexAdmin,

    /// Migration statement builder and runner; absent when the configured
    /// data provider needs a database that is not configured
    pub migrations: Option<MigrationRunner>,

    /// JWT secret key for token validation
    pub jwt_secret: String,
}

impl AppState {
    pub fn new(
        index_admin: IndexAdmin,
        migrations: Option<MigrationRunner>,
        jwt_secret: String,
    ) -> Self {
        Self {
            index_admin,
            migrations,
            jwt_secret,
        }
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;
