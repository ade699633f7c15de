use axum::{extract::{rejection::JsonRejection, State}, Json};
use serde_json::{Map, Value};

use common::types::WriteStatus;
use service::menus::quick;

use super::{persist, AppState};
use crate::errors::ApiError;

/// `{quick_list, pins, last_category}`.
pub async fn data(State(state): State<AppState>) -> Json<Map<String, Value>> {
    Json(state.menus.quick.snapshot().await)
}

/// Cross-menu write: replaces the quick items the Add Node menu reads too.
pub async fn update_list(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<WriteStatus>, ApiError> {
    persist(&state.menus.quick, quick::QUICK_LIST, payload).await
}

pub async fn update_pins(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<WriteStatus>, ApiError> {
    persist(&state.menus.quick, quick::PINS, payload).await
}

pub async fn update_last_category(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<WriteStatus>, ApiError> {
    persist(&state.menus.quick, quick::LAST_CATEGORY, payload).await
}
