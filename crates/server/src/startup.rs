use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use configs::{AppConfig, ServerConfig, StorageConfig};
use service::{menus::Menus, storage::DocumentStore};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes::{self, AppState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn load_bind_addr(server: &ServerConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", server.host, server.port).parse()?)
}

/// Create the storage root and wire both menus to one document store.
pub async fn build_state(storage: &StorageConfig) -> Result<AppState, StartupError> {
    let store = DocumentStore::new(storage.root());
    store.ensure_root().await?;
    info!(root = %store.root().display(), "document store ready");
    let menus = Menus::new(Arc::new(store))?;
    Ok(AppState { menus })
}

/// Router with production CORS for the given storage settings.
pub async fn build_app(storage: &StorageConfig) -> Result<Router, StartupError> {
    let state = build_state(storage).await?;
    Ok(routes::build_router(state, build_cors()))
}

/// Read and validate `config.toml` / `CONFIG_PATH` once for the whole process.
pub fn load_config() -> Result<AppConfig, StartupError> {
    AppConfig::load_and_validate().map_err(|e| StartupError::InvalidConfig(format!("{e:#}")))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl+C; running until killed");
        std::future::pending::<()>().await;
    }
    info!("received Ctrl+C, draining in-flight requests");
}

/// Serve both menus until Ctrl+C. In-flight writes finish before returning.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_app(&cfg.storage).await?;

    let addr = load_bind_addr(&cfg.server)?;
    info!(%addr, root = %cfg.storage.root().display(), "starting menu preferences server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}
