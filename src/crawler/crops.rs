//! Crop database enrichment
//!
//! Reads the crop list of a public gardening API and merges every crop into
//! the tables as a product, tagged with one of two features depending on
//! whether the crop is perennial.

use super::fetcher::{build_http_client, Fetcher, RetryPolicy};
use crate::catalog::{FeatureProductLink, FeatureTable, Product, ProductTable};
use crate::config::{ApiConfig, Config};
use crate::{ConfigError, HarvestError, Result};
use serde::Deserialize;
use url::Url;

#[derive(Debug, Deserialize)]
struct CropList {
    #[serde(default)]
    data: Vec<CropEntry>,
}

#[derive(Debug, Deserialize)]
struct CropEntry {
    attributes: CropAttributes,
}

#[derive(Debug, Deserialize)]
struct CropAttributes {
    name: String,
    #[serde(default)]
    perennial: Option<bool>,
}

/// A crop of the API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crop {
    pub name: String,

    /// Only an explicit `false` from the API makes a crop non-perennial
    pub perennial: bool,
}

/// Parses the JSON crop list
///
/// Crops with a blank name are skipped.
pub fn parse_crops(body: &str) -> Result<Vec<Crop>> {
    let list: CropList = serde_json::from_str(body)?;

    Ok(list
        .data
        .into_iter()
        .filter_map(|entry| {
            let name = entry.attributes.name.trim();
            if name.is_empty() {
                tracing::debug!("Crop without a name skipped");
                return None;
            }
            Some(Crop {
                name: name.to_string(),
                perennial: entry.attributes.perennial != Some(false),
            })
        })
        .collect())
}

/// Adds `crops` to the tables
///
/// Each crop becomes a sold-out product without a price and one link to
/// the perennial or the other feature; both features are created on first
/// use. Crops already present as products are linked but not inserted again.
///
/// # Returns
///
/// The number of product rows added
pub fn merge_crops(
    crops: &[Crop],
    api: &ApiConfig,
    features: &mut FeatureTable,
    links: &mut Vec<FeatureProductLink>,
    products: &mut ProductTable,
) -> usize {
    let mut added = 0;

    for crop in crops {
        let feature = if crop.perennial {
            &api.perennial_feature
        } else {
            &api.other_feature
        };
        let feature_id = features.intern(feature);

        links.push(FeatureProductLink {
            feature_id,
            product_name: crop.name.clone(),
        });
        if products.insert(Product::simple(crop.name.clone(), None, true)) {
            added += 1;
        }
    }

    added
}

/// Fetches the crop list with the crawler's retry budget
#[derive(Debug, Clone)]
pub struct CropSource {
    fetcher: Fetcher,
    url: Url,
}

impl CropSource {
    /// Creates a source from a validated configuration
    pub fn new(config: &Config) -> Result<Self> {
        let url = Url::parse(&config.api.crops_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", config.api.crops_url, e)))?;
        let client = build_http_client(&config.site, &config.fetch)?;

        Ok(Self {
            fetcher: Fetcher::new(client, RetryPolicy::from_config(&config.fetch)),
            url,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Downloads and parses the crop list
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<Crop>)` - The crops in API order
    /// * `Err(HarvestError::Unavailable)` - Every attempt failed
    /// * `Err(HarvestError::Json)` - The body is not a crop list
    pub async fn fetch(&self) -> Result<Vec<Crop>> {
        let body = self
            .fetcher
            .fetch(&self.url)
            .await
            .into_body()
            .ok_or_else(|| HarvestError::Unavailable {
                url: self.url.to_string(),
            })?;

        let crops = parse_crops(&body)?;
        tracing::info!("Retrieved {} crops from {}", crops.len(), self.url);
        Ok(crops)
    }
}
