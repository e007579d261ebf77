//! Feature discovery and per-feature product listings
//!
//! The landing page lists every filter tag. Each tag's own listing is
//! paginated; its first pages are fetched as one bounded concurrent batch and
//! the remaining pages sequentially per feature.

use super::document::{attr, element_text, first, Document};
use super::fetcher::Fetcher;
use super::layout::PageLayout;
use super::pagination::{page_count, with_page};
use crate::catalog::{clean_product_name, FeatureProductLink, FeatureTable};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

/// A filter tag and the first page of its listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureLink {
    pub name: String,
    pub url: Url,
}

/// Reads the filter tags of the landing page
///
/// Links are resolved against `page_url` and always carry page number 1.
/// Tags without a handle or an href are skipped; a repeated handle is kept
/// once.
pub fn extract_features(html: &str, page_url: &Url, layout: &PageLayout) -> Vec<FeatureLink> {
    let document = Document::parse(html);
    let mut seen = HashSet::new();
    let mut features = Vec::new();

    for item in document.select(&layout.feature_item) {
        let Some(handle) = attr(item, &layout.feature_handle_attr) else {
            tracing::debug!(
                "Filter tag without a {} attribute skipped",
                layout.feature_handle_attr
            );
            continue;
        };
        let name = handle.trim();
        if name.is_empty() {
            tracing::debug!("Filter tag with an empty handle skipped");
            continue;
        }

        let Some(href) = first(item, &layout.feature_link).and_then(|link| attr(link, "href"))
        else {
            tracing::debug!("Filter tag '{}' has no link, skipped", name);
            continue;
        };

        let url = match page_url.join(href) {
            Ok(url) => with_page(&url, &layout.page_param, 1),
            Err(e) => {
                tracing::debug!("Filter tag '{}' has an invalid link '{}': {}", name, href, e);
                continue;
            }
        };

        if !seen.insert(name.to_string()) {
            tracing::debug!("Repeated filter tag '{}' ignored", name);
            continue;
        }

        features.push(FeatureLink {
            name: name.to_string(),
            url,
        });
    }

    features
}

/// What one page of a feature listing holds
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeaturePage {
    /// Total number of pages of the listing, at least 1
    pub page_count: u32,

    /// Cleaned product names in page order
    pub product_names: Vec<String>,
}

/// Reads the page count and the product names of a feature listing page
pub fn parse_feature_page(html: &str, layout: &PageLayout) -> FeaturePage {
    let document = Document::parse(html);
    let strip = layout.strip_chars();

    let controls: Vec<String> = document
        .select(&layout.pagination_item)
        .map(|control| element_text(control, strip))
        .collect();

    let product_names = document
        .select(&layout.feature_product)
        .filter_map(|item| match first(item, &layout.feature_product_name) {
            Some(title) => Some(clean_product_name(&element_text(title, strip), strip)),
            None => {
                tracing::debug!("Listing item without a product title skipped");
                None
            }
        })
        .filter(|name| !name.is_empty())
        .collect();

    FeaturePage {
        page_count: page_count(&controls, layout.page_count_index),
        product_names,
    }
}

/// Everything the feature pass collected
#[derive(Debug, Clone, Default)]
pub struct FeatureCrawl {
    pub features: FeatureTable,
    pub links: Vec<FeatureProductLink>,

    /// Features whose first listing page could not be fetched
    pub unavailable: usize,
}

/// Crawls the listings of every feature
#[derive(Debug, Clone)]
pub struct FeatureCrawler {
    fetcher: Fetcher,
    layout: Arc<PageLayout>,
    batch_size: usize,
}

impl FeatureCrawler {
    pub fn new(fetcher: Fetcher, layout: Arc<PageLayout>, batch_size: usize) -> Self {
        Self {
            fetcher,
            layout,
            batch_size: batch_size.max(1),
        }
    }

    /// Fetches the landing page and extracts its filter tags
    ///
    /// A landing page that cannot be fetched yields no features.
    pub async fn discover(&self, landing: &Url) -> Vec<FeatureLink> {
        match self.fetcher.fetch(landing).await.into_body() {
            Some(body) => {
                let features = extract_features(&body, landing, &self.layout);
                tracing::info!("Found {} features on {}", features.len(), landing);
                features
            }
            None => {
                tracing::error!("Landing page {} unavailable, no features extracted", landing);
                Vec::new()
            }
        }
    }

    /// Collects the product names of every feature
    ///
    /// Features are interned in input order, so ids follow the landing page
    /// even though first pages complete in any order.
    pub async fn crawl(&self, features: &[FeatureLink]) -> FeatureCrawl {
        let first_pages = self.fetch_first_pages(features).await;

        let mut crawl = FeatureCrawl::default();
        for (feature, first_page) in features.iter().zip(first_pages) {
            let feature_id = crawl.features.intern(&feature.name);

            let Some(first_page) = first_page else {
                tracing::error!("Feature '{}' unavailable at {}", feature.name, feature.url);
                crawl.unavailable += 1;
                continue;
            };

            let names = self.collect_names(feature, first_page).await;
            tracing::info!("Feature '{}': {} products", feature.name, names.len());

            crawl
                .links
                .extend(names.into_iter().map(|product_name| FeatureProductLink {
                    feature_id,
                    product_name,
                }));
        }

        crawl
    }

    /// Fetches page 1 of every feature, at most `batch_size` at a time
    ///
    /// The result has one slot per feature, in input order.
    async fn fetch_first_pages(&self, features: &[FeatureLink]) -> Vec<Option<FeaturePage>> {
        let mut slots: Vec<Option<FeaturePage>> = vec![None; features.len()];

        let mut pages = stream::iter(features.iter().enumerate())
            .map(|(index, feature)| {
                let fetcher = self.fetcher.clone();
                let layout = Arc::clone(&self.layout);
                async move {
                    let page = fetcher
                        .fetch(&feature.url)
                        .await
                        .into_body()
                        .map(|body| parse_feature_page(&body, &layout));
                    (index, page)
                }
            })
            .buffer_unordered(self.batch_size);

        while let Some((index, page)) = pages.next().await {
            slots[index] = page;
        }

        slots
    }

    /// Names of page 1 followed by those of pages 2..N
    ///
    /// A page that cannot be fetched is skipped; the pages after it are still
    /// requested.
    async fn collect_names(&self, feature: &FeatureLink, first_page: FeaturePage) -> Vec<String> {
        let mut names = first_page.product_names;

        for page in 2..=first_page.page_count {
            let url = with_page(&feature.url, &self.layout.page_param, page);
            tracing::debug!(
                "Feature '{}': fetching page {} of {}",
                feature.name,
                page,
                first_page.page_count
            );

            match self.fetcher.fetch(&url).await.into_body() {
                Some(body) => names.extend(parse_feature_page(&body, &self.layout).product_names),
                None => {
                    tracing::warn!(
                        "Feature '{}': page {} of {} unavailable, skipped",
                        feature.name,
                        page,
                        first_page.page_count
                    );
                }
            }
        }

        names
    }
}
