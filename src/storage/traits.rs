//! Storage traits and error types
//!
//! This module defines the trait interface for catalog backends and
//! associated error types.

use crate::feed::{CatalogEntry, ProductDetail};
use crate::storage::{ProductRecord, Site, UpsertOutcome, VariantRecord};
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Catalog entry has no code")]
    MissingCode,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for catalog backend implementations
///
/// Upserts are read-then-write: each site is owned by exactly one worker,
/// so no two writers race on the same key within a run.
pub trait CatalogStore {
    // ===== Sites =====

    /// Lists every registered site
    fn list_sites(&self) -> StorageResult<Vec<Site>>;

    // ===== Products =====

    /// Codes of the products already stored for `site`
    fn list_processed_codes(&self, site: &str) -> StorageResult<HashSet<String>>;

    /// Inserts or overwrites the product with the entry's code
    ///
    /// The lookup is by code alone, so two sites publishing the same code
    /// share one row (the last writer's `site` wins).
    fn upsert_product(
        &mut self,
        site: &str,
        entry: &CatalogEntry,
        batch_timestamp: Option<i64>,
        small_path: &str,
        large_path: &str,
    ) -> StorageResult<UpsertOutcome>;

    /// Gets a product by code
    fn get_product(&self, code: &str) -> StorageResult<Option<ProductRecord>>;

    // ===== Variants =====

    /// Inserts or overwrites one row per variant of the detail document
    ///
    /// Returns the number of rows written.
    fn upsert_variants(
        &mut self,
        site: &str,
        detail: &ProductDetail,
        batch_timestamp: Option<i64>,
    ) -> StorageResult<usize>;

    /// Gets all variant rows of a product, base row (no name) first
    fn get_variants(&self, code: &str) -> StorageResult<Vec<VariantRecord>>;

    // ===== Statistics =====

    /// Product and variant counts per site, ordered by site name
    fn count_by_site(&self) -> StorageResult<Vec<(String, u64, u64)>>;
}

/// Opens a fresh store for each worker
///
/// Workers never share a connection; each one connects on start and drops
/// its store when it finishes, whatever the outcome.
pub trait StoreConnector: Send + Sync + 'static {
    type Store: CatalogStore + Send + 'static;

    fn connect(&self) -> StorageResult<Self::Store>;
}
