//! Local input: the unfiltered tables saved after every crawl
//!
//! Used instead of crawling. Feature ids are reassigned in first-seen order.

use crate::catalog::{FeatureProductLink, FeatureTable, Product, ProductTable};
use crate::output::{write_tables, FeatureRecord, FEATURES_FILE, PRODUCTS_FILE};
use crate::{HarvestError, Result};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

/// Tables read from disk
#[derive(Debug, Clone, Default)]
pub struct LocalTables {
    pub features: FeatureTable,
    pub links: Vec<FeatureProductLink>,
    pub products: ProductTable,
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => HarvestError::MissingInput {
            path: path.display().to_string(),
        },
        _ => HarvestError::Io(e),
    })
}

/// Deserializes every well-formed row of a CSV file, skipping the others
fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_reader(open(path)?);

    reader.headers().map_err(|e| HarvestError::InputFormat {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let mut rows = Vec::new();
    for (index, record) in reader.deserialize::<T>().enumerate() {
        match record {
            Ok(row) => rows.push(row),
            Err(e) => tracing::warn!(
                "Skipping malformed row {} of {}: {}",
                index + 2,
                path.display(),
                e
            ),
        }
    }
    Ok(rows)
}

/// Saves the crawled tables into `dir` for later runs without crawling
pub fn save_local(
    dir: &Path,
    features: &FeatureTable,
    links: &[FeatureProductLink],
    products: &ProductTable,
) -> Result<()> {
    write_tables(dir, features, links, products)?;
    Ok(())
}

/// Loads `features.csv` and `products.csv` from `dir`
///
/// # Returns
///
/// * `Ok(LocalTables)` - The tables, without the malformed rows
/// * `Err(HarvestError::MissingInput)` - One of the files does not exist
pub fn load_local(dir: &Path) -> Result<LocalTables> {
    let features_path = dir.join(FEATURES_FILE);
    let products_path = dir.join(PRODUCTS_FILE);

    let feature_rows: Vec<FeatureRecord> = read_rows(&features_path)?;
    let product_rows: Vec<Product> = read_rows(&products_path)?;

    let mut tables = LocalTables::default();
    for row in feature_rows {
        let feature_id = tables.features.intern(&row.feature);
        if !row.product.is_empty() {
            tables.links.push(FeatureProductLink {
                feature_id,
                product_name: row.product,
            });
        }
    }
    tables.products.extend(product_rows);

    tracing::info!(
        "Loaded {} features, {} links and {} products from {}",
        tables.features.len(),
        tables.links.len(),
        tables.products.len(),
        dir.display()
    );
    Ok(tables)
}
