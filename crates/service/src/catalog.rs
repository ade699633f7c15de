//! Declarative tables of the documents each menu reads and writes.
//!
//! A document registered in more than one catalog is shared between those
//! menus. That is the only sharing mechanism; there is no locking between
//! the writers.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::errors::ServiceError;

/// Value served for a document that has not been written (or cannot be read).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentDefault {
    EmptyMap,
    EmptyList,
    Null,
}

impl DocumentDefault {
    pub fn value(self) -> Value {
        match self {
            DocumentDefault::EmptyMap => Value::Object(Map::new()),
            DocumentDefault::EmptyList => Value::Array(Vec::new()),
            DocumentDefault::Null => Value::Null,
        }
    }
}

/// A logical document and the store name (file stem) it persists under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Document {
    pub name: &'static str,
    pub file: &'static str,
    pub default: DocumentDefault,
}

impl Document {
    pub const fn new(name: &'static str, file: &'static str, default: DocumentDefault) -> Self {
        Self { name, file, default }
    }

    pub fn default_value(&self) -> Value {
        self.default.value()
    }
}

/// Every document the menus know about.
///
/// File stems match the files existing installs already keep under
/// `user/AlignLayout`, so upgrading picks up saved pins and quick items.
pub mod documents {
    use super::{Document, DocumentDefault};

    /// Quick/favorite items, read and written by both menus.
    pub const QUICK_SHARED: Document =
        Document::new("quick-shared", "add_node_menu_quick", DocumentDefault::EmptyList);

    pub const ADD_NODE_PINS: Document =
        Document::new("pins", "add_node_menu_pins", DocumentDefault::EmptyMap);
    pub const ADD_NODE_LAST_CATEGORY: Document =
        Document::new("last-category-addmenu", "add_node_menu_last_category", DocumentDefault::Null);

    pub const QUICK_MENU_PINS: Document =
        Document::new("quick-pins", "quick_menu_pins", DocumentDefault::EmptyMap);
    pub const QUICK_MENU_LAST_CATEGORY: Document =
        Document::new("last-category-quickmenu", "quick_menu_last_category", DocumentDefault::Null);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Field name in the menu's aggregate response.
    pub key: &'static str,
    pub document: Document,
}

/// Ordered `(key, document)` table owned by one menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    menu: &'static str,
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(menu: &'static str) -> Self {
        Self { menu, entries: Vec::new() }
    }

    pub fn with(mut self, key: &'static str, document: Document) -> Self {
        self.entries.push(CatalogEntry { key, document });
        self
    }

    pub fn menu(&self) -> &'static str {
        self.menu
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, key: &str) -> Option<&Document> {
        self.entries.iter().find(|e| e.key == key).map(|e| &e.document)
    }

    /// Documents registered in both catalogs.
    pub fn shared_with(&self, other: &Catalog) -> Vec<Document> {
        self.entries
            .iter()
            .filter(|e| other.entries.iter().any(|o| o.document.file == e.document.file))
            .map(|e| e.document)
            .collect()
    }

    /// Keys must be unique, and two keys of one menu must not alias one file.
    pub fn validate(&self) -> Result<(), ServiceError> {
        let mut keys = HashSet::new();
        let mut files = HashSet::new();
        for entry in &self.entries {
            if !keys.insert(entry.key) {
                return Err(ServiceError::Catalog(format!("{}: duplicate key {}", self.menu, entry.key)));
            }
            if !files.insert(entry.document.file) {
                return Err(ServiceError::Catalog(format!(
                    "{}: file {} registered twice",
                    self.menu, entry.document.file
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_match_declared_shapes() {
        assert_eq!(documents::ADD_NODE_PINS.default_value(), json!({}));
        assert_eq!(documents::QUICK_SHARED.default_value(), json!([]));
        assert_eq!(documents::QUICK_MENU_LAST_CATEGORY.default_value(), Value::Null);
    }

    #[test]
    fn every_document_has_its_own_file() {
        let all = [
            documents::QUICK_SHARED,
            documents::ADD_NODE_PINS,
            documents::ADD_NODE_LAST_CATEGORY,
            documents::QUICK_MENU_PINS,
            documents::QUICK_MENU_LAST_CATEGORY,
        ];
        let files: HashSet<_> = all.iter().map(|d| d.file).collect();
        assert_eq!(files.len(), all.len());
        assert_eq!(documents::ADD_NODE_PINS.file, "add_node_menu_pins");
        assert_eq!(documents::QUICK_SHARED.file, "add_node_menu_quick");
    }

    #[test]
    fn shared_with_lists_common_documents_only() {
        let a = Catalog::new("a")
            .with("pins", documents::ADD_NODE_PINS)
            .with("quick", documents::QUICK_SHARED);
        let b = Catalog::new("b")
            .with("quick_list", documents::QUICK_SHARED)
            .with("pins", documents::QUICK_MENU_PINS);
        assert_eq!(a.shared_with(&b), vec![documents::QUICK_SHARED]);
        assert_eq!(b.shared_with(&a), vec![documents::QUICK_SHARED]);
    }

    #[test]
    fn validate_rejects_duplicates() {
        let dup_key = Catalog::new("m")
            .with("pins", documents::ADD_NODE_PINS)
            .with("pins", documents::QUICK_MENU_PINS);
        assert!(matches!(dup_key.validate(), Err(ServiceError::Catalog(_))));

        let alias = Catalog::new("m")
            .with("quick", documents::QUICK_SHARED)
            .with("favorites", documents::QUICK_SHARED);
        assert!(matches!(alias.validate(), Err(ServiceError::Catalog(_))));

        let ok = Catalog::new("m").with("pins", documents::ADD_NODE_PINS);
        assert!(ok.validate().is_ok());
        assert_eq!(ok.get("pins"), Some(&documents::ADD_NODE_PINS));
        assert_eq!(ok.get("quick"), None);
    }
}
