//! Environment/runtime helpers
//!
//! Bootstraps the preference storage directory before the store accepts requests.

use std::path::Path;

use tracing::{debug, info};

/// Create the storage root (and parents) if missing. Safe to call repeatedly.
pub async fn ensure_env(data_dir: &Path) -> anyhow::Result<()> {
    if tokio::fs::metadata(data_dir).await.map(|m| m.is_dir()).unwrap_or(false) {
        debug!(data_dir = %data_dir.display(), "storage root already present");
        return Ok(());
    }
    tokio::fs::create_dir_all(data_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", data_dir.display()))?;
    info!(data_dir = %data_dir.display(), "created storage root");
    Ok(())
}
