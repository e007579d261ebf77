//! CSV sink
//!
//! Writes `products.csv` and `features.csv`, either for a correlation result
//! or for the raw crawled tables. The raw tables are read back by
//! [`crate::input::load_local`] when crawling is disabled.

use super::traits::{OutputResult, OutputSink};
use crate::catalog::{FeatureProductLink, FeatureTable, Product, ProductTable};
use crate::correlate::Correlation;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const PRODUCTS_FILE: &str = "products.csv";
pub const FEATURES_FILE: &str = "features.csv";

const PRODUCT_HEADERS: [&str; 5] = ["name", "type", "option", "price", "is_sold_out"];
const FEATURE_HEADERS: [&str; 2] = ["feature", "product"];

/// One row of `features.csv`
///
/// A feature without products is written with an empty product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub feature: String,
    #[serde(default)]
    pub product: String,
}

/// Writes CSV files into a directory
#[derive(Debug, Clone)]
pub struct CsvSink {
    directory: PathBuf,
}

impl CsvSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

fn writer(
    directory: &Path,
    file: &str,
    headers: &[&str],
) -> OutputResult<csv::Writer<std::fs::File>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(directory.join(file))?;
    writer.write_record(headers)?;
    Ok(writer)
}

/// Writes both files into `directory`, creating it when needed
fn write_files<'a>(
    directory: &Path,
    products: impl IntoIterator<Item = &'a Product>,
    features: impl IntoIterator<Item = FeatureRecord>,
) -> OutputResult<()> {
    std::fs::create_dir_all(directory)?;

    let mut product_writer = writer(directory, PRODUCTS_FILE, &PRODUCT_HEADERS)?;
    for product in products {
        product_writer.serialize(product)?;
    }
    product_writer.flush()?;

    let mut feature_writer = writer(directory, FEATURES_FILE, &FEATURE_HEADERS)?;
    for record in features {
        feature_writer.serialize(record)?;
    }
    feature_writer.flush()?;

    Ok(())
}

/// One record per product name, or a single record with an empty product
fn feature_records(feature: &str, products: &[&str]) -> Vec<FeatureRecord> {
    if products.is_empty() {
        return vec![FeatureRecord {
            feature: feature.to_string(),
            product: String::new(),
        }];
    }
    products
        .iter()
        .map(|product| FeatureRecord {
            feature: feature.to_string(),
            product: product.to_string(),
        })
        .collect()
}

/// Writes the unfiltered crawl tables into `directory`
///
/// Features are written in id order with their links in crawl order, so
/// reading the files back assigns the same ids.
pub fn write_tables(
    directory: &Path,
    features: &FeatureTable,
    links: &[FeatureProductLink],
    products: &ProductTable,
) -> OutputResult<()> {
    let mut by_feature: HashMap<u32, Vec<&str>> = HashMap::new();
    for link in links {
        by_feature
            .entry(link.feature_id)
            .or_default()
            .push(link.product_name.as_str());
    }

    let records = features.iter().flat_map(|feature| {
        let names = by_feature.remove(&feature.id).unwrap_or_default();
        feature_records(&feature.name, &names)
    });
    write_files(directory, products, records)?;

    tracing::info!(
        "Saved {} features, {} links and {} products to {}",
        features.len(),
        links.len(),
        products.len(),
        directory.display()
    );
    Ok(())
}

impl OutputSink for CsvSink {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn write(&self, result: &Correlation) -> OutputResult<()> {
        let records = result.features.iter().flat_map(|entry| {
            let names: Vec<&str> = entry.products.iter().map(String::as_str).collect();
            feature_records(&entry.feature.name, &names)
        });
        write_files(&self.directory, &result.products, records)?;

        tracing::info!(
            "Wrote {} products and {} features to {}",
            result.products.len(),
            result.features.len(),
            self.directory.display()
        );
        Ok(())
    }
}
