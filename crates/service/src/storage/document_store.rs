use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{ser::PrettyFormatter, Serializer, Value};
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, error, warn};
use uuid::Uuid;

use super::DocumentStorage;
use crate::errors::ServiceError;

const MAX_NAME_LEN: usize = 64;

/// Outcome of loading a document from disk.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentRead {
    /// File present and parsed.
    Stored(Value),
    /// No file yet.
    Missing,
    /// File present but unusable; the caller should serve the default.
    Fallback { reason: String },
}

impl DocumentRead {
    pub fn into_value(self, default: &Value) -> Value {
        match self {
            DocumentRead::Stored(v) => v,
            DocumentRead::Missing | DocumentRead::Fallback { .. } => default.clone(),
        }
    }
}

/// File-backed JSON document store.
///
/// Each document `name` lives at `<root>/<name>.json`. Reads fall back to the
/// caller's default; writes go to a sibling temp file and are renamed into
/// place, so readers see either the old or the new content. Concurrent writers
/// to the same name are not serialized: whichever rename lands last wins.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root directory if absent. Idempotent.
    pub async fn ensure_root(&self) -> Result<(), ServiceError> {
        common::env::ensure_env(&self.root)
            .await
            .map_err(|e| ServiceError::Root(e.to_string()))
    }

    /// Resolve a document name to its file. Names are `[A-Za-z0-9_-]{1,64}`.
    pub fn location(&self, name: &str) -> Result<PathBuf, ServiceError> {
        validate_name(name)?;
        Ok(self.root.join(format!("{name}.json")))
    }

    pub async fn load(&self, name: &str) -> DocumentRead {
        let path = match self.location(name) {
            Ok(path) => path,
            Err(e) => return DocumentRead::Fallback { reason: e.to_string() },
        };
        match fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<Value>(&bytes) {
                Ok(value) => DocumentRead::Stored(value),
                Err(e) => DocumentRead::Fallback { reason: format!("malformed JSON: {e}") },
            },
            Err(e) if e.kind() == ErrorKind::NotFound => DocumentRead::Missing,
            Err(e) => DocumentRead::Fallback { reason: format!("unreadable: {e}") },
        }
    }

    pub async fn read(&self, name: &str, default: &Value) -> Value {
        let outcome = self.load(name).await;
        match &outcome {
            DocumentRead::Stored(_) => {}
            DocumentRead::Missing => debug!(document = name, "document not created yet; serving default"),
            DocumentRead::Fallback { reason } => warn!(
                document = name,
                path = %self.root.join(format!("{name}.json")).display(),
                %reason,
                "failed to load document; serving default"
            ),
        }
        outcome.into_value(default)
    }

    /// First half of a write: serialize and durably write a temp file next to
    /// the target. Nothing is visible to readers until [`StagedWrite::commit`].
    pub async fn stage(&self, name: &str, value: &Value) -> Result<StagedWrite, ServiceError> {
        let target = self.location(name)?;
        let bytes = encode(value).map_err(|e| ServiceError::Serialize {
            name: name.to_string(),
            message: e.to_string(),
        })?;

        let staged = StagedWrite {
            name: name.to_string(),
            temp: self.root.join(format!(".{name}.{}.tmp", Uuid::new_v4().simple())),
            target,
            committed: false,
        };

        let mut file = fs::File::create(&staged.temp)
            .await
            .map_err(|e| ServiceError::persist(name, format!("failed to create temp file: {e}")))?;
        file.write_all(&bytes)
            .await
            .map_err(|e| ServiceError::persist(name, format!("failed to write temp file: {e}")))?;
        file.sync_all()
            .await
            .map_err(|e| ServiceError::persist(name, format!("failed to sync temp file: {e}")))?;

        Ok(staged)
    }

    pub async fn write(&self, name: &str, value: &Value) -> Result<(), ServiceError> {
        let result = match self.stage(name, value).await {
            Ok(staged) => staged.commit().await,
            Err(e) => Err(e),
        };
        match &result {
            Ok(()) => debug!(document = name, "document persisted"),
            Err(e) => error!(document = name, error = %e, "failed to persist document"),
        }
        result
    }
}

#[async_trait]
impl DocumentStorage for DocumentStore {
    async fn read(&self, name: &str, default: &Value) -> Value { self.read(name, default).await }
    async fn write(&self, name: &str, value: &Value) -> Result<(), ServiceError> { self.write(name, value).await }
}

/// A fully written temp file waiting to replace its document.
///
/// Dropping it without committing removes the temp file and leaves the
/// document untouched.
#[must_use = "a staged write is invisible until committed"]
#[derive(Debug)]
pub struct StagedWrite {
    name: String,
    temp: PathBuf,
    target: PathBuf,
    committed: bool,
}

impl StagedWrite {
    pub fn temp_path(&self) -> &Path {
        &self.temp
    }

    /// Atomically replace the document with the staged content.
    pub async fn commit(mut self) -> Result<(), ServiceError> {
        fs::rename(&self.temp, &self.target)
            .await
            .map_err(|e| ServiceError::persist(&self.name, format!("failed to replace document: {e}")))?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedWrite {
    fn drop(&mut self) {
        if !self.committed {
            let _ = std::fs::remove_file(&self.temp);
        }
    }
}

fn validate_name(name: &str) -> Result<(), ServiceError> {
    let ok = !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if ok { Ok(()) } else { Err(ServiceError::InvalidName(name.to_string())) }
}

/// Four-space indented JSON, non-ASCII kept as-is, trailing newline.
fn encode(value: &Value) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::with_capacity(128);
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    async fn temp_store() -> Result<DocumentStore, anyhow::Error> {
        let root = std::env::temp_dir().join(format!("document_store_{}", Uuid::new_v4()));
        let store = DocumentStore::new(root);
        store.ensure_root().await?;
        Ok(store)
    }

    async fn cleanup(store: &DocumentStore) {
        let _ = fs::remove_dir_all(store.root()).await;
    }

    async fn temp_files(store: &DocumentStore) -> Result<Vec<String>, anyhow::Error> {
        let mut names = Vec::new();
        let mut entries = fs::read_dir(store.root()).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(".tmp") {
                names.push(name);
            }
        }
        Ok(names)
    }

    #[tokio::test]
    async fn write_then_read_round_trips() -> Result<(), anyhow::Error> {
        let store = temp_store().await?;
        let values = [
            json!({"nodeA": true, "__global__": ["KSampler", "VAEDecode"]}),
            json!(["节点", "LoadImage", 3.5, null]),
            json!("Sampling"),
            json!(null),
        ];
        for value in &values {
            store.write("pins", value).await?;
            assert_eq!(&store.read("pins", &json!({})).await, value);
            assert_eq!(&store.read("pins", &json!(42)).await, value);
        }
        cleanup(&store).await;
        Ok(())
    }

    #[tokio::test]
    async fn missing_document_returns_default() -> Result<(), anyhow::Error> {
        let store = temp_store().await?;
        assert_eq!(store.load("quick-shared").await, DocumentRead::Missing);
        assert_eq!(store.read("quick-shared", &json!([])).await, json!([]));
        assert_eq!(store.read("last-category-addmenu", &Value::Null).await, Value::Null);
        cleanup(&store).await;
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_document_degrades_to_default() -> Result<(), anyhow::Error> {
        let store = temp_store().await?;
        store.write("pins", &json!({"a": 1})).await?;
        fs::write(store.location("pins")?, b"{\"a\": 1,").await?;

        assert!(matches!(store.load("pins").await, DocumentRead::Fallback { .. }));
        assert_eq!(store.read("pins", &json!({})).await, json!({}));
        cleanup(&store).await;
        Ok(())
    }

    #[tokio::test]
    async fn persisted_file_is_indented_and_keeps_unicode() -> Result<(), anyhow::Error> {
        let store = temp_store().await?;
        store.write("last-category-addmenu", &json!({"category": "采样"})).await?;
        let raw = fs::read_to_string(store.location("last-category-addmenu")?).await?;
        assert_eq!(raw, "{\n    \"category\": \"采样\"\n}\n");
        cleanup(&store).await;
        Ok(())
    }

    #[tokio::test]
    async fn invalid_names_never_touch_disk() -> Result<(), anyhow::Error> {
        let store = temp_store().await?;
        for name in ["", "../escape", "a/b", ".hidden", "pins.json"] {
            assert!(matches!(store.write(name, &json!(1)).await, Err(ServiceError::InvalidName(_))));
            assert_eq!(store.read(name, &json!("default")).await, json!("default"));
        }
        assert!(store.location(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
        cleanup(&store).await;
        Ok(())
    }

    #[tokio::test]
    async fn aborted_write_keeps_prior_value() -> Result<(), anyhow::Error> {
        let store = temp_store().await?;
        store.write("quick-shared", &json!(["nodeA"])).await?;

        let staged = store.stage("quick-shared", &json!(["nodeB", "nodeC"])).await?;
        let temp = staged.temp_path().to_path_buf();
        assert!(fs::metadata(&temp).await.is_ok());
        assert_eq!(store.read("quick-shared", &json!([])).await, json!(["nodeA"]));

        drop(staged);
        assert!(fs::metadata(&temp).await.is_err());
        assert_eq!(store.read("quick-shared", &json!([])).await, json!(["nodeA"]));
        cleanup(&store).await;
        Ok(())
    }

    #[tokio::test]
    async fn leftover_partial_temp_file_is_ignored() -> Result<(), anyhow::Error> {
        let store = temp_store().await?;
        store.write("pins", &json!({"nodeA": true})).await?;
        fs::write(store.root().join(".pins.deadbeef.tmp"), b"{\"nodeA\": tr").await?;
        assert_eq!(store.read("pins", &json!({})).await, json!({"nodeA": true}));
        cleanup(&store).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_commit_reports_error_and_cleans_up() -> Result<(), anyhow::Error> {
        let store = temp_store().await?;
        // A non-empty directory where the document file should be makes rename fail.
        let blocker = store.location("pins")?;
        fs::create_dir_all(blocker.join("occupied")).await?;

        let err = store.write("pins", &json!({"nodeA": true})).await.unwrap_err();
        assert!(matches!(err, ServiceError::Persist { .. }));
        assert!(!err.to_string().is_empty());
        assert!(temp_files(&store).await?.is_empty());
        assert_eq!(store.read("pins", &json!({})).await, json!({}));
        cleanup(&store).await;
        Ok(())
    }

    #[tokio::test]
    async fn write_without_root_fails() -> Result<(), anyhow::Error> {
        let root = std::env::temp_dir().join(format!("document_store_missing_{}", Uuid::new_v4()));
        let store = DocumentStore::new(&root);
        let err = store.write("pins", &json!({})).await.unwrap_err();
        assert!(matches!(err, ServiceError::Persist { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_writers_last_one_wins_cleanly() -> Result<(), anyhow::Error> {
        let store = Arc::new(temp_store().await?);
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.write("quick-shared", &json!([format!("node{i}"), i])).await
            }));
        }
        for handle in handles {
            handle.await??;
        }

        let stored = match store.load("quick-shared").await {
            DocumentRead::Stored(v) => v,
            other => panic!("expected a parseable document, got {other:?}"),
        };
        let i = stored[1].as_u64().unwrap_or(u64::MAX);
        assert!(i < 16);
        assert_eq!(stored, json!([format!("node{i}"), i]));
        assert!(temp_files(&store).await?.is_empty());
        cleanup(&store).await;
        Ok(())
    }
}
