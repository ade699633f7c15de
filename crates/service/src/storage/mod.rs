//! Storage abstractions for the service layer
//!
//! `DocumentStorage` is the seam menu services talk to; `DocumentStore` is the
//! file-backed implementation used in production.

pub mod document_store;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::ServiceError;

pub use document_store::{DocumentRead, DocumentStore, StagedWrite};

/// Named JSON documents with defaulting reads and all-or-nothing writes.
#[async_trait]
pub trait DocumentStorage: Send + Sync {
    /// Stored value, or `default` when missing or unreadable. Never fails.
    async fn read(&self, name: &str, default: &Value) -> Value;
    async fn write(&self, name: &str, value: &Value) -> Result<(), ServiceError>;
}
