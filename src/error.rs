//! Error handling module
//!
//! Provides unified error types and handling for the entire application.

use crate::migration::MigrationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),

    #[error("Connection not established: {0}")]
    NotConnected(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String, Option<String>) {
        match self {
            AppError::Migration(e) => match e {
                MigrationError::MissingColumnType { .. } | MigrationError::EmptyIndex { .. } => (
                    StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    e.to_string(),
                    None,
                ),
                MigrationError::IndexKeyTooLong { .. }
                | MigrationError::UnknownCatalogColumn { .. } => {
                    error!("Migration aborted: {}", e);
                    (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        "MIGRATION_ABORTED",
                        "The migration was aborted".to_string(),
                        Some(e.to_string()),
                    )
                }
                MigrationError::NotConnected => {
                    (StatusCode::BAD_REQUEST, "NOT_CONNECTED", e.to_string(), None)
                }
                MigrationError::Database(inner) => {
                    error!("Database error: {:?}", inner);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "DATABASE_ERROR",
                        "A database error occurred".to_string(),
                        Some(inner.to_string()),
                    )
                }
                MigrationError::Partial { executed, source } => {
                    error!(?executed, "Migration partially applied: {}", source);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "MIGRATION_PARTIALLY_APPLIED",
                        format!(
                            "The migration stopped after {} statement(s) were applied",
                            executed.len()
                        ),
                        Some(e.to_string()),
                    )
                }
            },
            AppError::NotConnected(msg) => {
                (StatusCode::BAD_REQUEST, "NOT_CONNECTED", msg.clone(), None)
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
            }
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone(), None)
            }
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone(), None),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = self.parts();

        let body = Json(ErrorResponse {
            success: false,
            message,
            error: details,
            code: Some(error_code.to_string()),
        });

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, AppError>;

/// Helper function to create a validation error
pub fn validation_error(msg: impl Into<String>) -> AppError {
    AppError::Validation(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_limit_maps_to_unprocessable() {
        let err = AppError::from(MigrationError::IndexKeyTooLong {
            table: "t".to_string(),
            index: "idx".to_string(),
            declared: 900,
            maximum: 767,
        });
        assert_eq!(err.parts().0, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_missing_type_is_validation_error() {
        let err = AppError::from(MigrationError::MissingColumnType {
            table: "t".to_string(),
            column: "c".to_string(),
        });
        assert_eq!(err.parts().0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_partial_migration_lists_applied_statements() {
        let err = AppError::from(MigrationError::Partial {
            executed: vec!["alter table `T` modify column `a` VARCHAR(2000)".to_string()],
            source: Box::new(MigrationError::EmptyIndex {
                index: "I".to_string(),
            }),
        });

        let (status, code, message, details) = err.parts();

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "MIGRATION_PARTIALLY_APPLIED");
        assert_eq!(message, "The migration stopped after 1 statement(s) were applied");
        assert!(details.unwrap().contains("Index I has no columns"));
    }
}
