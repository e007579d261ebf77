//! Crawl summary

/// Counters gathered over one crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Number of features found on the landing page
    pub features_found: usize,

    /// Features whose first listing page could not be fetched
    pub features_unavailable: usize,

    /// Total feature to product-name links collected
    pub links_collected: usize,

    /// Catalog pages downloaded
    pub catalog_pages: usize,

    /// Product cards skipped for structure or price problems
    pub cards_dropped: usize,

    /// Multi-option products whose detail page could not be fetched
    pub products_disregarded: usize,

    /// Product rows in the final table
    pub product_rows: usize,
}

impl CrawlReport {
    /// Logs the summary at info level
    pub fn log(&self) {
        tracing::info!(
            "Features: {} found, {} unavailable, {} product links",
            self.features_found,
            self.features_unavailable,
            self.links_collected
        );
        tracing::info!(
            "Catalog: {} pages, {} product rows, {} cards dropped, {} products disregarded",
            self.catalog_pages,
            self.product_rows,
            self.cards_dropped,
            self.products_disregarded
        );
    }

    /// True when nothing was skipped
    pub fn is_complete(&self) -> bool {
        self.features_unavailable == 0 && self.cards_dropped == 0 && self.products_disregarded == 0
    }
}
