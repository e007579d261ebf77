//! Feature filtering, the feature-product join, row predicates and sorting

use super::query::{Query, SortKey};
use crate::catalog::{Feature, FeatureProductLink, FeatureTable, Product, ProductKey, ProductTable};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// A surviving feature with its filtered product names
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureEntry {
    #[serde(flatten)]
    pub feature: Feature,
    pub products: Vec<String>,
}

/// Result of correlating features with products
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Correlation {
    /// Features left after the feature and product-name filters
    pub features: Vec<FeatureEntry>,

    /// Product rows after the join, the row predicates and the sort
    pub products: Vec<Product>,

    /// Whether the result is meant to be read per feature
    pub break_down: bool,
}

impl Correlation {
    /// `(feature, product name)` pairs of the surviving features
    pub fn links(&self) -> impl Iterator<Item = (&Feature, &str)> {
        self.features.iter().flat_map(|entry| {
            entry
                .products
                .iter()
                .map(move |name| (&entry.feature, name.as_str()))
        })
    }

    /// Each surviving feature with the result rows of its product names
    ///
    /// Names without a matching row are skipped.
    pub fn breakdown(&self) -> Vec<(&FeatureEntry, Vec<&Product>)> {
        let by_name = index_by_name(&self.products);

        self.features
            .iter()
            .map(|entry| {
                let rows: Vec<&Product> = entry
                    .products
                    .iter()
                    .filter_map(|name| by_name.get(name.as_str()))
                    .flatten()
                    .copied()
                    .collect();
                (entry, rows)
            })
            .collect()
    }
}

fn index_by_name<'a, I>(products: I) -> HashMap<&'a str, Vec<&'a Product>>
where
    I: IntoIterator<Item = &'a Product>,
{
    let mut index: HashMap<&str, Vec<&Product>> = HashMap::new();
    for product in products {
        index.entry(product.name.as_str()).or_default().push(product);
    }
    index
}

/// Keeps the features matching the feature filter, each with the product
/// names matching the product filter
///
/// Features are returned in id order; a feature left without names is
/// removed.
pub fn filter_features(
    features: &FeatureTable,
    links: &[FeatureProductLink],
    query: &Query,
) -> Vec<FeatureEntry> {
    let mut names: HashMap<u32, Vec<String>> = HashMap::new();
    for link in links {
        if query.matches_product_name(&link.product_name) {
            names
                .entry(link.feature_id)
                .or_default()
                .push(link.product_name.clone());
        }
    }

    features
        .iter()
        .filter(|feature| query.matches_feature(&feature.name))
        .filter_map(|feature| {
            let products = names.remove(&feature.id)?;
            Some(FeatureEntry {
                feature: feature.clone(),
                products,
            })
        })
        .collect()
}

/// Inner join of the feature links against the product table on name
///
/// Rows keep the order of the links; a row reached through several links
/// appears once, at its first occurrence.
pub fn join(features: &[FeatureEntry], products: &ProductTable) -> Vec<Product> {
    let by_name = index_by_name(products);
    let mut seen: HashSet<ProductKey> = HashSet::new();
    let mut rows = Vec::new();

    for entry in features {
        for name in &entry.products {
            let Some(matches) = by_name.get(name.as_str()) else {
                continue;
            };
            for product in matches {
                if seen.insert(product.key()) {
                    rows.push((*product).clone());
                }
            }
        }
    }

    rows
}

/// Sorts the result in place
///
/// Sorting is stable, so equal keys keep their join order.
pub fn sort(correlation: &mut Correlation, query: &Query) {
    let direction = query.direction;

    match query.sort_key {
        SortKey::Name => {
            correlation.products.sort_by(|a, b| {
                direction.apply(
                    (&a.name, &a.option_type, &a.option).cmp(&(&b.name, &b.option_type, &b.option)),
                )
            });

            if correlation.break_down {
                correlation
                    .features
                    .sort_by(|a, b| direction.apply(a.feature.name.cmp(&b.feature.name)));
                for entry in &mut correlation.features {
                    entry.products.sort_by(|a, b| direction.apply(a.cmp(b)));
                }
            }
        }
        SortKey::Price => {
            correlation.products.sort_by(|a, b| {
                direction.apply(a.effective_price().total_cmp(&b.effective_price()))
            });
        }
    }
}

/// Correlates features with products
///
/// # Arguments
///
/// * `features` - The feature table
/// * `links` - Feature to product-name links
/// * `products` - The product table
/// * `query` - Filters and sort order
///
/// # Returns
///
/// The surviving features and the matching product rows. Without a feature
/// filter or breakdown every product row is a candidate; otherwise only rows
/// linked to a surviving feature are.
pub fn correlate(
    features: &FeatureTable,
    links: &[FeatureProductLink],
    products: &ProductTable,
    query: &Query,
) -> Correlation {
    let feature_entries = filter_features(features, links, query);

    let candidates = if query.is_feature_scoped() {
        join(&feature_entries, products)
    } else {
        products.rows().to_vec()
    };

    let mut correlation = Correlation {
        features: feature_entries,
        products: candidates
            .into_iter()
            .filter(|product| query.matches(product))
            .collect(),
        break_down: query.break_down,
    };
    sort(&mut correlation, query);

    tracing::debug!(
        "Correlation kept {} features and {} product rows",
        correlation.features.len(),
        correlation.products.len()
    );
    correlation
}
