//! Migration request/response models

use crate::migration::MigrationCommand;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Commands to turn into SQL, in execution order
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MigrationRequest {
    #[validate(length(min = 1, message = "At least one command is required"))]
    pub commands: Vec<MigrationCommand>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationResponse {
    pub data_provider: String,
    pub statements: Vec<String>,
    pub executed: bool,
}
