//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the CatalogStore trait.

use crate::feed::{CatalogEntry, ProductDetail};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{CatalogStore, StorageError, StorageResult, StoreConnector};
use crate::storage::variants::resolve_variants;
use crate::storage::{ProductRecord, Site, UpsertOutcome, VariantRecord};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How long a writer waits on another worker's write lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

const PRODUCT_COLUMNS: &str = "id, code, available, name, url, price, price_old, currency,
     img_small, img_large, site, time_load, time_xml, path_img_small, path_img_large, user_load";

const VARIANT_COLUMNS: &str = "id, code, param_name, available, name, url, price, price_old,
     site, time_load, time_xml, user_load, param_available, param_price, param_price_old";

/// SQLite storage backend
///
/// One instance wraps one connection. Workers each open their own on the
/// same file; WAL mode and the busy timeout let their writes interleave.
pub struct SqliteStorage {
    conn: Connection,

    /// Written to `user_load` on every row this store touches
    operator: Option<String>,
}

impl SqliteStorage {
    /// Opens or creates the database at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Connection with pragmas set and schema created
    /// * `Err(StorageError)` - The file could not be opened or initialized
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        // Several workers write to the same file concurrently
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn,
            operator: None,
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn,
            operator: None,
        })
    }

    /// Tags every row written through this store with `operator`
    pub fn with_operator(mut self, operator: Option<String>) -> Self {
        self.operator = operator;
        self
    }

    /// Registers a site, returning its id (existing id if already present)
    ///
    /// Site registration normally belongs to external tooling; this is used
    /// by tests and by operators seeding a fresh database.
    ///
    /// # Arguments
    ///
    /// * `name` - Host (optionally `host:port`) of the site
    /// * `niche_id` - Optional category the site belongs to
    pub fn insert_site(&mut self, name: &str, niche_id: Option<i64>) -> StorageResult<i64> {
        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT site_id FROM site WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing {
            return Ok(id);
        }

        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO site (name, niche_id, time_load, user_load) VALUES (?1, ?2, ?3, ?4)",
            params![name, niche_id, now, self.operator],
        )?;
        Ok(self.conn.last_insert_rowid())
    }
}

fn product_from_row(row: &Row<'_>) -> rusqlite::Result<ProductRecord> {
    Ok(ProductRecord {
        id: row.get(0)?,
        code: row.get(1)?,
        available: row.get(2)?,
        name: row.get(3)?,
        url: row.get(4)?,
        price: row.get(5)?,
        price_old: row.get(6)?,
        currency: row.get(7)?,
        img_small: row.get(8)?,
        img_large: row.get(9)?,
        site: row.get(10)?,
        time_load: row.get(11)?,
        time_xml: row.get(12)?,
        path_img_small: row.get(13)?,
        path_img_large: row.get(14)?,
        user_load: row.get(15)?,
    })
}

fn variant_from_row(row: &Row<'_>) -> rusqlite::Result<VariantRecord> {
    Ok(VariantRecord {
        id: row.get(0)?,
        code: row.get(1)?,
        param_name: row.get(2)?,
        available: row.get(3)?,
        name: row.get(4)?,
        url: row.get(5)?,
        price: row.get(6)?,
        price_old: row.get(7)?,
        site: row.get(8)?,
        time_load: row.get(9)?,
        time_xml: row.get(10)?,
        user_load: row.get(11)?,
        param_available: row.get(12)?,
        param_price: row.get(13)?,
        param_price_old: row.get(14)?,
    })
}

impl CatalogStore for SqliteStorage {
    // ===== Sites =====

    fn list_sites(&self) -> StorageResult<Vec<Site>> {
        let mut stmt = self.conn.prepare(
            "SELECT site_id, name, niche_id, feed, filename, time_load, user_load
             FROM site ORDER BY site_id",
        )?;

        let sites = stmt
            .query_map([], |row| {
                Ok(Site {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    niche_id: row.get(2)?,
                    feed: row.get(3)?,
                    filename: row.get(4)?,
                    time_load: row.get(5)?,
                    user_load: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(sites)
    }

    // ===== Products =====

    fn list_processed_codes(&self, site: &str) -> StorageResult<HashSet<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT code FROM product WHERE site = ?1")?;

        let codes = stmt
            .query_map(params![site], |row| row.get::<_, String>(0))?
            .collect::<Result<HashSet<_>, _>>()?;

        Ok(codes)
    }

    fn upsert_product(
        &mut self,
        site: &str,
        entry: &CatalogEntry,
        batch_timestamp: Option<i64>,
        small_path: &str,
        large_path: &str,
    ) -> StorageResult<UpsertOutcome> {
        let code = entry.code.as_deref().ok_or(StorageError::MissingCode)?;

        // Keyed by code alone, whichever site published it
        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM product WHERE code = ?1",
                params![code],
                |row| row.get(0),
            )
            .optional()?;

        let now = Utc::now().to_rfc3339();
        let available = entry.available.is_true();
        let price = entry.price.value_or(0);
        let price_old = entry.price_old.value_or(0);

        match existing {
            Some(id) => {
                self.conn.execute(
                    "UPDATE product SET available = ?1, name = ?2, url = ?3, price = ?4,
                     price_old = ?5, currency = ?6, img_small = ?7, img_large = ?8, site = ?9,
                     time_load = ?10, time_xml = ?11, path_img_small = ?12,
                     path_img_large = ?13, user_load = ?14
                     WHERE id = ?15",
                    params![
                        available,
                        entry.name,
                        entry.url,
                        price,
                        price_old,
                        entry.currency,
                        entry.img_small,
                        entry.img_large,
                        site,
                        now,
                        batch_timestamp,
                        small_path,
                        large_path,
                        self.operator,
                        id
                    ],
                )?;
                Ok(UpsertOutcome::Updated)
            }
            None => {
                self.conn.execute(
                    "INSERT INTO product (code, available, name, url, price, price_old, currency,
                     img_small, img_large, site, time_load, time_xml, path_img_small,
                     path_img_large, user_load)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                    params![
                        code,
                        available,
                        entry.name,
                        entry.url,
                        price,
                        price_old,
                        entry.currency,
                        entry.img_small,
                        entry.img_large,
                        site,
                        now,
                        batch_timestamp,
                        small_path,
                        large_path,
                        self.operator
                    ],
                )?;
                Ok(UpsertOutcome::Inserted)
            }
        }
    }

    fn get_product(&self, code: &str) -> StorageResult<Option<ProductRecord>> {
        let sql = format!("SELECT {} FROM product WHERE code = ?1", PRODUCT_COLUMNS);
        let product = self
            .conn
            .query_row(&sql, params![code], product_from_row)
            .optional()?;
        Ok(product)
    }

    // ===== Variants =====

    fn upsert_variants(
        &mut self,
        site: &str,
        detail: &ProductDetail,
        batch_timestamp: Option<i64>,
    ) -> StorageResult<usize> {
        let code = detail.code.as_deref().ok_or(StorageError::MissingCode)?;

        let now = Utc::now().to_rfc3339();
        let available = detail.available.is_true();
        let price = detail.price.value_or(0);
        let price_old = detail.price_old.value_or(0);
        let rows = resolve_variants(detail);

        let tx = self.conn.transaction()?;
        for row in &rows {
            // `IS` so that the unnamed base row matches itself
            let existing: Option<i64> = tx
                .query_row(
                    "SELECT id FROM product_variant WHERE code = ?1 AND param_name IS ?2",
                    params![code, row.param_name],
                    |r| r.get(0),
                )
                .optional()?;

            match existing {
                Some(id) => {
                    tx.execute(
                        "UPDATE product_variant SET available = ?1, name = ?2, url = ?3,
                         price = ?4, price_old = ?5, site = ?6, time_load = ?7, time_xml = ?8,
                         user_load = ?9, param_available = ?10, param_price = ?11,
                         param_price_old = ?12
                         WHERE id = ?13",
                        params![
                            available,
                            detail.name,
                            detail.url,
                            price,
                            price_old,
                            site,
                            now,
                            batch_timestamp,
                            self.operator,
                            row.param_available,
                            row.param_price,
                            row.param_price_old,
                            id
                        ],
                    )?;
                }
                None => {
                    tx.execute(
                        "INSERT INTO product_variant (code, param_name, available, name, url,
                         price, price_old, site, time_load, time_xml, user_load,
                         param_available, param_price, param_price_old)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                        params![
                            code,
                            row.param_name,
                            available,
                            detail.name,
                            detail.url,
                            price,
                            price_old,
                            site,
                            now,
                            batch_timestamp,
                            self.operator,
                            row.param_available,
                            row.param_price,
                            row.param_price_old
                        ],
                    )?;
                }
            }
        }
        tx.commit()?;

        Ok(rows.len())
    }

    fn get_variants(&self, code: &str) -> StorageResult<Vec<VariantRecord>> {
        let sql = format!(
            "SELECT {} FROM product_variant WHERE code = ?1
             ORDER BY param_name IS NOT NULL, param_name, id",
            VARIANT_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let variants = stmt
            .query_map(params![code], variant_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(variants)
    }

    // ===== Statistics =====

    fn count_by_site(&self) -> StorageResult<Vec<(String, u64, u64)>> {
        // Variants are counted by their own `site` column
        let mut stmt = self.conn.prepare(
            "SELECT p.site, COUNT(*),
                    (SELECT COUNT(*) FROM product_variant v WHERE v.site = p.site)
             FROM product p
             GROUP BY p.site
             ORDER BY p.site",
        )?;

        let counts = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)? as u64,
                    row.get::<_, i64>(2)? as u64,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(counts)
    }
}

/// Opens a [`SqliteStorage`] on the same database file for every worker
#[derive(Debug, Clone)]
pub struct SqliteConnector {
    path: PathBuf,
    operator: Option<String>,
}

impl SqliteConnector {
    /// Creates a connector; nothing is opened until [`StoreConnector::connect`]
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the shared SQLite database file
    /// * `operator` - Operator tag applied to every store it opens
    pub fn new(path: impl Into<PathBuf>, operator: Option<String>) -> Self {
        Self {
            path: path.into(),
            operator,
        }
    }

    /// Database file the connector opens
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StoreConnector for SqliteConnector {
    type Store = SqliteStorage;

    fn connect(&self) -> StorageResult<SqliteStorage> {
        Ok(SqliteStorage::new(&self.path)?.with_operator(self.operator.clone()))
    }
}
