//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the export database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track exports
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    exported_at TEXT NOT NULL,
    config_hash TEXT NOT NULL,
    feature_count INTEGER NOT NULL,
    product_count INTEGER NOT NULL
);

-- Features (filter tags)
CREATE TABLE IF NOT EXISTS features (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

-- Feature to product-name links
CREATE TABLE IF NOT EXISTS features_prod_join (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    feature_id INTEGER NOT NULL REFERENCES features(id),
    product_name TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_features_prod_join_feature ON features_prod_join(feature_id);

-- Names shared by all variants of a product
CREATE TABLE IF NOT EXISTS general_product_names (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

-- One row per purchasable variant, named "name type option"
CREATE TABLE IF NOT EXISTS all_products (
    id INTEGER PRIMARY KEY,
    general_id INTEGER NOT NULL REFERENCES general_product_names(id),
    name TEXT NOT NULL,
    price REAL NOT NULL,
    is_sold_out INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_all_products_general ON all_products(general_id);
"#;

/// Tables refreshed on every export, children first
pub const DATA_TABLES: [&str; 4] = [
    "features_prod_join",
    "features",
    "all_products",
    "general_product_names",
];

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
