//! The "Add Node" menu: its pins, the shared quick items and its last category.

use std::sync::Arc;

use crate::catalog::{documents, Catalog};
use crate::errors::ServiceError;
use crate::storage::DocumentStorage;

use super::MenuService;

pub const PINS: &str = "pins";
pub const QUICK: &str = "quick";
pub const LAST_CATEGORY: &str = "last_category";

pub fn catalog() -> Catalog {
    Catalog::new("add-node-menu")
        .with(PINS, documents::ADD_NODE_PINS)
        .with(QUICK, documents::QUICK_SHARED)
        .with(LAST_CATEGORY, documents::ADD_NODE_LAST_CATEGORY)
}

pub fn service(store: Arc<dyn DocumentStorage>) -> Result<MenuService, ServiceError> {
    MenuService::new(catalog(), store)
}
