//! Crawler module for catalog page fetching and extraction
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with a retry budget
//! - Feature discovery and the bounded concurrent feature pass
//! - The sequential catalog cursor loop and variant expansion
//! - Overall crawl orchestration
//! - The crop API enrichment

mod catalog;
mod crops;
mod document;
mod features;
mod fetcher;
mod harvester;
mod layout;
mod pagination;
mod report;
mod variants;

pub use catalog::{
    parse_catalog_page, parse_price, CardListing, CatalogCrawl, CatalogCrawler, CatalogPage,
    ProductCard,
};
pub use crops::{merge_crops, parse_crops, Crop, CropSource};
pub use document::Document;
pub use features::{
    extract_features, parse_feature_page, FeatureCrawl, FeatureCrawler, FeatureLink, FeaturePage,
};
pub use fetcher::{build_http_client, FetchFailure, FetchOutcome, Fetcher, RetryPolicy};
pub use harvester::{Harvest, Harvester};
pub use layout::PageLayout;
pub use pagination::{page_count, with_page};
pub use report::CrawlReport;
pub use variants::{parse_option_entry, parse_variants, OptionEntry, VariantExpander};

use crate::config::Config;
use crate::Result;

/// Runs a complete crawl
///
/// This is the main entry point for crawling. It will:
/// 1. Compile the page layout and build the HTTP client
/// 2. Extract the features and crawl their listings
/// 3. Walk the catalog and expand multi-option products
/// 4. Log a summary
///
/// # Arguments
///
/// * `config` - The validated configuration
///
/// # Returns
///
/// * `Ok(Harvest)` - The collected tables (possibly partial)
/// * `Err(HarvestError)` - The crawler could not be set up
pub async fn harvest(config: &Config) -> Result<Harvest> {
    let harvester = Harvester::new(config)?;
    Ok(harvester.run().await)
}
