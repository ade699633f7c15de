//! Menu services: a catalog plus a document store.

pub mod add_node;
pub mod quick;

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::instrument;

use crate::catalog::Catalog;
use crate::errors::ServiceError;
use crate::storage::DocumentStorage;

/// One menu's read/write surface over its catalog.
#[derive(Clone)]
pub struct MenuService {
    catalog: Arc<Catalog>,
    store: Arc<dyn DocumentStorage>,
}

impl MenuService {
    pub fn new(catalog: Catalog, store: Arc<dyn DocumentStorage>) -> Result<Self, ServiceError> {
        catalog.validate()?;
        Ok(Self { catalog: Arc::new(catalog), store })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Every catalog entry, read independently and keyed by its catalog key.
    pub async fn snapshot(&self) -> Map<String, Value> {
        let mut out = Map::new();
        for entry in self.catalog.entries() {
            let value = self.store.read(entry.document.file, &entry.document.default_value()).await;
            out.insert(entry.key.to_string(), value);
        }
        out
    }

    /// Replace the document behind `key` with `value` verbatim.
    #[instrument(skip(self, value), fields(menu = self.catalog.menu()))]
    pub async fn update(&self, key: &str, value: &Value) -> Result<(), ServiceError> {
        let document = self
            .catalog
            .get(key)
            .ok_or_else(|| ServiceError::UnknownDocument(key.to_string()))?;
        self.store.write(document.file, value).await
    }
}

/// Both menus wired to one store.
#[derive(Clone)]
pub struct Menus {
    pub add_node: MenuService,
    pub quick: MenuService,
}

impl Menus {
    pub fn new(store: Arc<dyn DocumentStorage>) -> Result<Self, ServiceError> {
        Ok(Self {
            add_node: add_node::service(Arc::clone(&store))?,
            quick: quick::service(store)?,
        })
    }
}
