//! Authentication and authorization module
//!
//! Provides JWT-based authentication and role-based access control.

mod jwt;
mod middleware;

#[cfg(test)]
pub use jwt::create_token;
pub use jwt::{decode_token, Claims};
pub use middleware::{auth_middleware, require_manage_index, require_run_migrations};

use serde::{Deserialize, Serialize};

/// User roles for authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Can browse the admin listing
    #[default]
    Viewer,
    /// Can manage content but not site infrastructure
    Editor,
    /// Site owner, may manage search indexes and run migrations
    Owner,
}

/// Permissions checked by the admin surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    ManageSearchIndex,
    RunMigrations,
}

impl Permission {
    /// Message shown when the permission is missing
    pub fn denial_message(&self) -> &'static str {
        match self {
            Permission::ManageSearchIndex => "Not allowed to manage the search index.",
            Permission::RunMigrations => "Not allowed to run data migrations.",
        }
    }
}

impl Role {
    pub fn grants(&self, permission: Permission) -> bool {
        match permission {
            Permission::ManageSearchIndex | Permission::RunMigrations => {
                matches!(self, Role::Owner)
            }
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Viewer => write!(f, "viewer"),
            Role::Editor => write!(f, "editor"),
            Role::Owner => write!(f, "owner"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_owner_manages_indexes() {
        assert!(Role::Owner.grants(Permission::ManageSearchIndex));
        assert!(!Role::Editor.grants(Permission::ManageSearchIndex));
        assert!(!Role::Viewer.grants(Permission::ManageSearchIndex));
    }

    #[test]
    fn test_only_owner_runs_migrations() {
        assert!(Role::Owner.grants(Permission::RunMigrations));
        assert!(!Role::Editor.grants(Permission::RunMigrations));
    }
}
