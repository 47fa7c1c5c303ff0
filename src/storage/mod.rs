//! Storage module for the product catalog
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Site listing
//! - Product and variant upserts keyed by business code
//! - Variant price/availability resolution

mod schema;
mod sqlite;
mod traits;
mod variants;

pub use sqlite::{SqliteConnector, SqliteStorage};
pub use traits::{CatalogStore, StorageError, StorageResult, StoreConnector};
pub use variants::{resolve_variants, VariantValues};

use std::path::Path;

/// Opens (creating if needed) the catalog database at `path`
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// A registered remote site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    pub id: i64,
    /// Host (optionally `host:port`) the feeds are served from
    pub name: String,
    pub niche_id: Option<i64>,
    pub feed: Option<String>,
    pub filename: Option<String>,
    pub time_load: Option<String>,
    pub user_load: Option<String>,
}

impl Site {
    /// A site known only by name, as used for single-site runs
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            niche_id: None,
            feed: None,
            filename: None,
            time_load: None,
            user_load: None,
        }
    }
}

/// A stored product row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRecord {
    pub id: i64,
    pub code: String,
    pub available: bool,
    pub name: Option<String>,
    pub url: Option<String>,
    pub price: i64,
    pub price_old: i64,
    pub currency: Option<String>,
    pub img_small: Option<String>,
    pub img_large: Option<String>,
    pub site: String,
    pub time_load: String,
    pub time_xml: Option<i64>,
    pub path_img_small: String,
    pub path_img_large: String,
    pub user_load: Option<String>,
}

/// A stored product variant row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantRecord {
    pub id: i64,
    pub code: String,
    pub param_name: Option<String>,
    pub available: bool,
    pub name: Option<String>,
    pub url: Option<String>,
    pub price: i64,
    pub price_old: i64,
    pub site: String,
    pub time_load: String,
    pub time_xml: Option<i64>,
    pub user_load: Option<String>,
    pub param_available: Option<bool>,
    pub param_price: i64,
    pub param_price_old: i64,
}

/// Whether an upsert created or overwrote a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}
