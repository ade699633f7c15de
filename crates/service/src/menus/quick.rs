//! The Quick menu: the shared quick items plus its own pins and last category.
//!
//! Writes to [`QUICK_LIST`] change what the Add Node menu shows on its next read.

use std::sync::Arc;

use crate::catalog::{documents, Catalog};
use crate::errors::ServiceError;
use crate::storage::DocumentStorage;

use super::MenuService;

pub const QUICK_LIST: &str = "quick_list";
pub const PINS: &str = "pins";
pub const LAST_CATEGORY: &str = "last_category";

pub fn catalog() -> Catalog {
    Catalog::new("quick-menu")
        .with(QUICK_LIST, documents::QUICK_SHARED)
        .with(PINS, documents::QUICK_MENU_PINS)
        .with(LAST_CATEGORY, documents::QUICK_MENU_LAST_CATEGORY)
}

pub fn service(store: Arc<dyn DocumentStorage>) -> Result<MenuService, ServiceError> {
    MenuService::new(catalog(), store)
}
