//! Search index admin models

use crate::indexing::Notification;
use serde::{Deserialize, Serialize};

/// Form posted by every index action
#[derive(Debug, Deserialize)]
pub struct IndexIdForm {
    #[serde(default)]
    pub id: String,
}

/// Create form view model, re-rendered with the submitted name on failure
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIndexView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub notifications: Vec<Notification>,
}
