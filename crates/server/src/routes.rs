pub mod add_node_menu;
pub mod quick_menu;

use std::any::Any;

use axum::{
    extract::rejection::JsonRejection,
    http::{header, StatusCode},
    middleware::map_response,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, Level};

use common::types::{Health, WriteStatus};
use service::menus::{MenuService, Menus};

use crate::errors::ApiError;

/// Shared handler state: both menu services over one document store.
#[derive(Clone)]
pub struct AppState {
    pub menus: Menus,
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Persist a request body into the document behind `key`.
pub(crate) async fn persist(
    service: &MenuService,
    key: &str,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<WriteStatus>, ApiError> {
    let Json(value) = payload?;
    service.update(key, &value).await?;
    Ok(Json(WriteStatus::success()))
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| err.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "unknown panic".to_string());
    error!(error = %detail, "request handler panicked");
    ApiError::internal(format!("internal error: {detail}")).into_response()
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(WriteStatus::error("no such endpoint")))
}

/// Give axum's bodiless 405 the same error body as every other failure, keeping `Allow`.
async fn method_not_allowed(resp: Response) -> Response {
    if resp.status() != StatusCode::METHOD_NOT_ALLOWED {
        return resp;
    }
    let allow = resp.headers().get(header::ALLOW).cloned();
    let mut out = ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "method not allowed").into_response();
    if let Some(allow) = allow {
        out.headers_mut().insert(header::ALLOW, allow);
    }
    out
}

/// Build the full application router for both menus, plus the legacy paths
/// the bundled frontend scripts still call.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let add_node = Router::new()
        .route("/add-node-menu/data", get(add_node_menu::data))
        .route("/add-node-menu/pins", post(add_node_menu::update_pins))
        .route("/add-node-menu/quick", post(add_node_menu::update_quick))
        .route("/add-node-menu/last-category", post(add_node_menu::update_last_category));

    let quick = Router::new()
        .route("/quick-menu/data", get(quick_menu::data))
        .route("/quick-menu/update-list", post(quick_menu::update_list))
        .route("/quick-menu/pins", post(quick_menu::update_pins))
        .route("/quick-menu/last-category", post(quick_menu::update_last_category));

    let legacy = Router::new()
        .route("/align-layout/data", get(add_node_menu::data))
        .route("/align-layout/pins", post(add_node_menu::update_pins))
        .route("/align-layout/quick", post(add_node_menu::update_quick))
        .route("/align-layout/last_category", post(add_node_menu::update_last_category))
        .route("/quick-menu/update_list", post(quick_menu::update_list))
        .route("/quick-menu/last_category", post(quick_menu::update_last_category));

    Router::new()
        .route("/health", get(health))
        .merge(add_node)
        .merge(quick)
        .merge(legacy)
        .fallback(not_found)
        .with_state(state)
        .layer(map_response(method_not_allowed))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
