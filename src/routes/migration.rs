//! Migration route handlers

use crate::auth::Claims;
use crate::error::{validation_error, ApiResult, AppError};
use crate::migration::MigrationRunner;
use crate::models::{MigrationRequest, MigrationResponse, SuccessResponse};
use crate::state::SharedState;
use axum::{
    extract::{Extension, State},
    Json,
};
use tracing::info;
use validator::Validate;

fn runner(state: &SharedState) -> Result<&MigrationRunner, AppError> {
    state.migrations.as_ref().ok_or_else(|| {
        AppError::NotConnected(
            "The configured data provider needs DATABASE_URL to build migration statements."
                .to_string(),
        )
    })
}

fn validate(payload: &MigrationRequest) -> Result<(), AppError> {
    payload.validate().map_err(|e| validation_error(e.to_string()))?;
    for command in &payload.commands {
        command.validate().map_err(|e| validation_error(e.to_string()))?;
    }
    Ok(())
}

/// Generate the SQL for a list of commands without executing it
pub async fn statements(
    State(state): State<SharedState>,
    Json(payload): Json<MigrationRequest>,
) -> ApiResult<Json<SuccessResponse<MigrationResponse>>> {
    validate(&payload)?;
    let runner = runner(&state)?;

    let statements = runner.statements(&payload.commands).await?;

    Ok(Json(SuccessResponse::with_data(
        format!("Generated {} statement(s).", statements.len()),
        MigrationResponse {
            data_provider: runner.data_provider().to_string(),
            statements,
            executed: false,
        },
    )))
}

/// Generate and execute the SQL for a list of commands
pub async fn apply(
    State(state): State<SharedState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<MigrationRequest>,
) -> ApiResult<Json<SuccessResponse<MigrationResponse>>> {
    validate(&payload)?;
    let runner = runner(&state)?;

    info!(user = %claims.sub, commands = payload.commands.len(), "Applying migration");
    let statements = runner.apply(&payload.commands).await?;

    Ok(Json(SuccessResponse::with_data(
        format!("Executed {} statement(s).", statements.len()),
        MigrationResponse {
            data_provider: runner.data_provider().to_string(),
            statements,
            executed: true,
        },
    )))
}
