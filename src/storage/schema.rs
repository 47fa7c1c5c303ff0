//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the catalog database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Remote sites, maintained by registration tooling
CREATE TABLE IF NOT EXISTS site (
    site_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    niche_id INTEGER,
    time_load TEXT,
    user_load TEXT,
    feed TEXT,
    filename TEXT
);

-- One row per business code (site is a plain column, not part of the key)
CREATE TABLE IF NOT EXISTS product (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    code TEXT NOT NULL UNIQUE,
    available INTEGER NOT NULL,
    name TEXT,
    url TEXT,
    price INTEGER NOT NULL,
    price_old INTEGER NOT NULL,
    currency TEXT,
    img_small TEXT,
    img_large TEXT,
    site TEXT NOT NULL,
    time_load TEXT NOT NULL,
    time_xml INTEGER,
    path_img_small TEXT NOT NULL DEFAULT '',
    path_img_large TEXT NOT NULL DEFAULT '',
    user_load TEXT
);

CREATE INDEX IF NOT EXISTS idx_product_site ON product(site);

-- One row per (code, param_name); a NULL param_name is the base product
CREATE TABLE IF NOT EXISTS product_variant (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    code TEXT NOT NULL,
    param_name TEXT,
    available INTEGER NOT NULL,
    name TEXT,
    url TEXT,
    price INTEGER NOT NULL,
    price_old INTEGER NOT NULL,
    site TEXT NOT NULL,
    time_load TEXT NOT NULL,
    time_xml INTEGER,
    user_load TEXT,
    param_available INTEGER,
    param_price INTEGER NOT NULL,
    param_price_old INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_product_variant_key ON product_variant(code, param_name);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
