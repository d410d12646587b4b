//! Authentication middleware
//!
//! Extracts and validates JWT tokens from requests, and guards routes
//! behind a permission.

use crate::auth::{decode_token, Claims, Permission};
use crate::error::AppError;
use crate::state::SharedState;
use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

/// Extract claims from request
pub async fn auth_middleware(
    State(state): State<SharedState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid authorization format".to_string()))?;

    let claims = decode_token(&state.jwt_secret, token)?;

    // Insert claims into request extensions for handlers to use
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// Guard for every mutating search index action
pub async fn require_manage_index(request: Request, next: Next) -> Result<Response, AppError> {
    authorize(Permission::ManageSearchIndex, request, next).await
}

/// Guard for the migration endpoints
pub async fn require_run_migrations(request: Request, next: Next) -> Result<Response, AppError> {
    authorize(Permission::RunMigrations, request, next).await
}

async fn authorize(
    permission: Permission,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = request
        .extensions()
        .get::<Claims>()
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

    if !claims.role.grants(permission) {
        warn!(user = %claims.sub, role = %claims.role, ?permission, "Permission denied");
        return Err(AppError::Forbidden(permission.denial_message().to_string()));
    }

    Ok(next.run(request).await)
}
