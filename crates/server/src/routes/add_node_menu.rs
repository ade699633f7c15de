use axum::{extract::{rejection::JsonRejection, State}, Json};
use serde_json::{Map, Value};

use common::types::WriteStatus;
use service::menus::add_node;

use super::{persist, AppState};
use crate::errors::ApiError;

/// `{pins, quick, last_category}`; always 200, unreadable documents come back as defaults.
pub async fn data(State(state): State<AppState>) -> Json<Map<String, Value>> {
    Json(state.menus.add_node.snapshot().await)
}

pub async fn update_pins(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<WriteStatus>, ApiError> {
    persist(&state.menus.add_node, add_node::PINS, payload).await
}

/// Writes the shared quick-items document; the Quick menu sees it on its next read.
pub async fn update_quick(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<WriteStatus>, ApiError> {
    persist(&state.menus.add_node, add_node::QUICK, payload).await
}

pub async fn update_last_category(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<WriteStatus>, ApiError> {
    persist(&state.menus.add_node, add_node::LAST_CATEGORY, payload).await
}
