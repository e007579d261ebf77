//! SQLite sink
//!
//! Each export replaces the feature and product tables inside a single
//! transaction and appends a row to `runs`.

use super::schema::{initialize_schema, DATA_TABLES};
use super::traits::{OutputResult, OutputSink};
use crate::catalog::GeneralProductNames;
use crate::correlate::Correlation;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

/// Writes the correlation to a SQLite database
#[derive(Debug, Clone)]
pub struct SqliteSink {
    path: PathBuf,
    config_hash: String,
}

impl SqliteSink {
    /// Creates a sink for the database at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `config_hash` - Hash of the configuration, recorded with each export
    pub fn new(path: impl Into<PathBuf>, config_hash: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            config_hash: config_hash.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> OutputResult<Connection> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&self.path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;
        initialize_schema(&conn)?;
        Ok(conn)
    }
}

impl OutputSink for SqliteSink {
    fn name(&self) -> &'static str {
        "db"
    }

    fn write(&self, result: &Correlation) -> OutputResult<()> {
        let mut conn = self.open()?;
        let tx = conn.transaction()?;

        for table in DATA_TABLES {
            tx.execute(&format!("DELETE FROM {}", table), [])?;
        }

        {
            let mut insert_feature =
                tx.prepare("INSERT INTO features (id, name) VALUES (?1, ?2)")?;
            let mut insert_link = tx
                .prepare("INSERT INTO features_prod_join (feature_id, product_name) VALUES (?1, ?2)")?;
            for entry in &result.features {
                insert_feature.execute(params![entry.feature.id, entry.feature.name])?;
                for product in &entry.products {
                    insert_link.execute(params![entry.feature.id, product])?;
                }
            }

            let names = GeneralProductNames::from_products(&result.products);
            let mut insert_name =
                tx.prepare("INSERT INTO general_product_names (id, name) VALUES (?1, ?2)")?;
            for (id, name) in names.iter() {
                insert_name.execute(params![id, name])?;
            }

            let mut insert_product = tx.prepare(
                "INSERT INTO all_products (id, general_id, name, price, is_sold_out)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (id, product) in result.products.iter().enumerate() {
                // Every product name was registered above
                let general_id = names.id_of(&product.name).unwrap_or_default();
                insert_product.execute(params![
                    id as i64,
                    general_id,
                    product.full_name(),
                    product.effective_price(),
                    product.is_sold_out
                ])?;
            }
        }

        tx.execute(
            "INSERT INTO runs (exported_at, config_hash, feature_count, product_count)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                Utc::now().to_rfc3339(),
                self.config_hash,
                result.features.len() as i64,
                result.products.len() as i64
            ],
        )?;

        tx.commit()?;

        tracing::info!(
            "Exported {} products and {} features to {}",
            result.products.len(),
            result.features.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Feature, Product};
    use crate::correlate::FeatureEntry;
    use tempfile::TempDir;

    fn correlation() -> Correlation {
        Correlation {
            features: vec![FeatureEntry {
                feature: Feature {
                    id: 3,
                    name: "indoor-plants".to_string(),
                },
                products: vec!["Fern".to_string(), "Monstera".to_string()],
            }],
            products: vec![
                Product::simple("Fern", Some(15.0), false),
                Product::variant("Monstera", "Size", "Small", Some(30.0), false),
                Product::variant("Monstera", "Size", "Large", None, true),
            ],
            break_down: false,
        }
    }

    fn count(conn: &Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
            row.get(0)
        })
        .unwrap()
    }

    #[test]
    fn test_export_writes_all_tables() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.db");
        SqliteSink::new(&path, "abc123").write(&correlation()).unwrap();

        let conn = Connection::open(&path).unwrap();
        assert_eq!(count(&conn, "features"), 1);
        assert_eq!(count(&conn, "features_prod_join"), 2);
        assert_eq!(count(&conn, "general_product_names"), 2);
        assert_eq!(count(&conn, "all_products"), 3);

        let (general_id, price, sold_out): (i64, f64, bool) = conn
            .query_row(
                "SELECT general_id, price, is_sold_out FROM all_products
                 WHERE name = 'Monstera Size Large'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap();
        assert_eq!(general_id, 1);
        assert_eq!(price, 0.0);
        assert!(sold_out);

        let hash: String = conn
            .query_row("SELECT config_hash FROM runs", [], |row| row.get(0))
            .unwrap();
        assert_eq!(hash, "abc123");
    }

    #[test]
    fn test_export_refreshes_tables() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.db");
        let sink = SqliteSink::new(&path, "abc123");

        sink.write(&correlation()).unwrap();
        sink.write(&correlation()).unwrap();

        let conn = Connection::open(&path).unwrap();
        assert_eq!(count(&conn, "all_products"), 3);
        assert_eq!(count(&conn, "features_prod_join"), 2);
        assert_eq!(count(&conn, "runs"), 2);
    }
}
