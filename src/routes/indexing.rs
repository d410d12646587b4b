//! Search index admin route handlers
//!
//! Mutating handlers sit behind the `ManageSearchIndex` guard and always
//! answer with a redirect to the listing, except a failed create which
//! re-renders the create form.

use crate::auth::Claims;
use crate::indexing::{CreateOutcome, IndexListing};
use crate::models::{CreateIndexView, IndexIdForm, SuccessResponse};
use crate::state::SharedState;
use axum::{
    extract::{Extension, Form, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use tracing::debug;

/// Path of the listing view every action returns to
pub const LIST_PATH: &str = "/admin/indexing/index";

/// List all indexes
pub async fn index(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
) -> Json<SuccessResponse<IndexListing>> {
    let listing = state.index_admin.list(claims.sub).await;
    debug!("Listed {} indexes", listing.index_entries.len());

    Json(SuccessResponse::with_data("Indexes fetched successfully.", listing))
}

/// Empty create form
pub async fn create_form(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
) -> Json<SuccessResponse<CreateIndexView>> {
    let notifications = state.index_admin.pending_notifications(claims.sub).await;

    Json(SuccessResponse::with_data(
        "Create a new index.",
        CreateIndexView {
            id: None,
            notifications,
        },
    ))
}

/// Create an index
pub async fn create(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Form(form): Form<IndexIdForm>,
) -> Response {
    let status = match state.index_admin.create(claims.sub, &form.id).await {
        CreateOutcome::Created => return Redirect::to(LIST_PATH).into_response(),
        CreateOutcome::InvalidName => StatusCode::BAD_REQUEST,
        CreateOutcome::AlreadyExists => StatusCode::CONFLICT,
        CreateOutcome::Failed => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let notifications = state.index_admin.pending_notifications(claims.sub).await;
    (
        status,
        Json(CreateIndexView {
            id: Some(form.id),
            notifications,
        }),
    )
        .into_response()
}

/// Process pending changes of an index
pub async fn update(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Form(form): Form<IndexIdForm>,
) -> Redirect {
    state.index_admin.update(claims.sub, &form.id).await;
    Redirect::to(LIST_PATH)
}

/// Drop and re-create an index
pub async fn rebuild(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Form(form): Form<IndexIdForm>,
) -> Redirect {
    state.index_admin.rebuild(claims.sub, &form.id).await;
    Redirect::to(LIST_PATH)
}

/// Delete an index
pub async fn delete(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Form(form): Form<IndexIdForm>,
) -> Redirect {
    state.index_admin.delete(claims.sub, &form.id).await;
    Redirect::to(LIST_PATH)
}
