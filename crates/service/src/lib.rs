//! Preference document store and the two menu services built on top of it.
//! - `storage` maps document names to JSON files with defaulting reads and atomic writes.
//! - `catalog` declares which documents a menu owns and which ones it shares.
//! - `menus` aggregates a catalog into one read surface and per-document writes.

pub mod errors;
pub mod storage;
pub mod catalog;
pub mod menus;
