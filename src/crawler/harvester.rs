//! Crawl orchestration
//!
//! A harvest runs the feature pass, then the catalog pass, and returns the
//! three tables the correlation engine works on.

use super::catalog::CatalogCrawler;
use super::features::FeatureCrawler;
use super::fetcher::{build_http_client, Fetcher, RetryPolicy};
use super::layout::PageLayout;
use super::pagination::with_page;
use super::report::CrawlReport;
use crate::catalog::{FeatureProductLink, FeatureTable, ProductTable};
use crate::config::Config;
use crate::{ConfigError, Result};
use std::sync::Arc;
use url::Url;

/// Tables collected by a crawl
#[derive(Debug, Clone, Default)]
pub struct Harvest {
    pub features: FeatureTable,
    pub links: Vec<FeatureProductLink>,
    pub products: ProductTable,
    pub report: CrawlReport,
}

/// Runs both crawl passes against one shop
pub struct Harvester {
    catalog_url: Url,
    features: FeatureCrawler,
    catalog: CatalogCrawler,
    layout: Arc<PageLayout>,
}

impl Harvester {
    /// Creates a harvester from a validated configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Harvester)` - Selectors compiled and HTTP client built
    /// * `Err(HarvestError)` - Invalid URL or selector, or client setup failure
    pub fn new(config: &Config) -> Result<Self> {
        let base = Url::parse(&config.site.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", config.site.base_url, e)))?;
        let catalog_url = base.join(&config.site.catalog_path)?;

        let layout = Arc::new(PageLayout::from_config(config)?);
        let client = build_http_client(&config.site, &config.fetch)?;
        let fetcher = Fetcher::new(client, RetryPolicy::from_config(&config.fetch));

        Ok(Self {
            catalog_url,
            features: FeatureCrawler::new(
                fetcher.clone(),
                Arc::clone(&layout),
                config.fetch.feature_batch_size,
            ),
            catalog: CatalogCrawler::new(fetcher, Arc::clone(&layout)),
            layout,
        })
    }

    /// First catalog page, which also lists the filter tags
    pub fn landing_url(&self) -> Url {
        with_page(&self.catalog_url, &self.layout.page_param, 1)
    }

    /// Crawls features then products
    pub async fn run(&self) -> Harvest {
        let landing = self.landing_url();

        tracing::info!("Extracting features from {}", landing);
        let feature_links = self.features.discover(&landing).await;
        let feature_crawl = self.features.crawl(&feature_links).await;

        tracing::info!("Extracting products from {}", landing);
        let catalog_crawl = self.catalog.crawl(&landing).await;

        let report = CrawlReport {
            features_found: feature_links.len(),
            features_unavailable: feature_crawl.unavailable,
            links_collected: feature_crawl.links.len(),
            catalog_pages: catalog_crawl.pages_fetched,
            cards_dropped: catalog_crawl.cards_dropped,
            products_disregarded: catalog_crawl.products_disregarded,
            product_rows: catalog_crawl.products.len(),
        };
        report.log();

        Harvest {
            features: feature_crawl.features,
            links: feature_crawl.links,
            products: catalog_crawl.products,
            report,
        }
    }
}
