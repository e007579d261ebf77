//! Catalog pagination and product card extraction
//!
//! The catalog is walked with a single cursor: each page names the next one
//! through its last pagination control. Cards listing several options are
//! handed to the [`VariantExpander`].

use super::document::{attr, element_text, first, Document};
use super::fetcher::Fetcher;
use super::layout::PageLayout;
use super::variants::VariantExpander;
use crate::catalog::{clean_product_name, Product, ProductTable};
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

/// Parses the price following the last `currency` sign of `raw`
///
/// Thousands separators are ignored. Text without the sign is parsed whole.
/// Negative or non-finite values are rejected.
pub fn parse_price(raw: &str, currency: &str) -> Option<f64> {
    let amount = match raw.rfind(currency) {
        Some(at) if !currency.is_empty() => &raw[at + currency.len()..],
        _ => raw,
    };

    let price: f64 = amount.trim().replace(',', "").parse().ok()?;
    (price.is_finite() && price >= 0.0).then_some(price)
}

/// How a card lists its price
#[derive(Debug, Clone, PartialEq)]
pub enum CardListing {
    /// A single price; `None` for a sold-out card without a price
    Priced { price: Option<f64> },

    /// Several options, priced on the detail page
    Variants,
}

/// A product card of a catalog page
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCard {
    pub name: String,
    pub url: Url,
    pub listing: CardListing,
    pub is_sold_out: bool,
}

/// Cards and cursor of one catalog page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogPage {
    pub cards: Vec<ProductCard>,

    /// Cards skipped for a missing title or link or an unreadable price
    pub dropped: usize,

    /// Next page, when the last pagination control is the "next" control
    pub next: Option<Url>,
}

/// Extracts the product cards and the next cursor of a catalog page
pub fn parse_catalog_page(html: &str, page_url: &Url, layout: &PageLayout) -> CatalogPage {
    let document = Document::parse(html);
    let strip = layout.strip_chars();
    let markers = &layout.markers;
    let mut page = CatalogPage::default();

    let scope = document.scope(&layout.collection_root);
    for card in scope.select(&layout.product_card) {
        let title = first(card, &layout.product_title);
        let href = first(card, &layout.product_link).and_then(|link| attr(link, "href"));

        let (Some(title), Some(href)) = (title, href) else {
            tracing::warn!("Product card without a title or link skipped on {}", page_url);
            page.dropped += 1;
            continue;
        };

        let name = clean_product_name(&element_text(title, strip), strip);
        let url = match page_url.join(href) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Product '{}' has an invalid link '{}': {}", name, href, e);
                page.dropped += 1;
                continue;
            }
        };

        // The card renders its price twice; the first rendering is the one read
        let raw_price = first(card, &layout.product_price)
            .map(|price| element_text(price, strip))
            .unwrap_or_default();
        let is_sold_out = card.text().collect::<String>().contains(&markers.sold_out);

        let listing = if raw_price.contains(&markers.has_options) {
            CardListing::Variants
        } else {
            match parse_price(&raw_price, &markers.currency_sign) {
                Some(price) => CardListing::Priced { price: Some(price) },
                None if is_sold_out => CardListing::Priced { price: None },
                None => {
                    tracing::error!("Product '{}': cannot read price '{}'", name, raw_price);
                    page.dropped += 1;
                    continue;
                }
            }
        };

        page.cards.push(ProductCard {
            name,
            url,
            listing,
            is_sold_out,
        });
    }

    page.next = document
        .select(&layout.pagination_item)
        .last()
        .filter(|control| element_text(*control, strip) == layout.next_label)
        .and_then(|control| attr(control, "href"))
        .and_then(|href| match page_url.join(href) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!("Invalid next page link '{}': {}", href, e);
                None
            }
        });

    page
}

/// Everything the catalog pass collected
#[derive(Debug, Clone, Default)]
pub struct CatalogCrawl {
    pub products: ProductTable,
    pub pages_fetched: usize,
    pub cards_dropped: usize,

    /// Multi-option products whose detail page could not be fetched
    pub products_disregarded: usize,
}

/// Walks the catalog pages in order
#[derive(Debug, Clone)]
pub struct CatalogCrawler {
    fetcher: Fetcher,
    layout: Arc<PageLayout>,
    expander: VariantExpander,
}

impl CatalogCrawler {
    pub fn new(fetcher: Fetcher, layout: Arc<PageLayout>) -> Self {
        let expander = VariantExpander::new(fetcher.clone(), Arc::clone(&layout));
        Self {
            fetcher,
            layout,
            expander,
        }
    }

    /// Follows the cursor from `start` until there is no next page
    ///
    /// The crawl also stops when a page cannot be fetched or a cursor points
    /// back to a page already visited; rows gathered so far are kept.
    pub async fn crawl(&self, start: &Url) -> CatalogCrawl {
        let mut crawl = CatalogCrawl::default();
        let mut visited = HashSet::new();
        let mut cursor = Some(start.clone());

        while let Some(url) = cursor.take() {
            if !visited.insert(url.clone()) {
                tracing::warn!("Catalog page {} already visited, stopping", url);
                break;
            }

            tracing::info!("Processing page {}", url);
            let Some(body) = self.fetcher.fetch(&url).await.into_body() else {
                tracing::error!("Catalog page {} unavailable, stopping", url);
                break;
            };
            crawl.pages_fetched += 1;

            let page = parse_catalog_page(&body, &url, &self.layout);
            crawl.cards_dropped += page.dropped;

            for card in page.cards {
                self.collect(card, &mut crawl).await;
            }

            cursor = page.next;
        }

        crawl
    }

    async fn collect(&self, card: ProductCard, crawl: &mut CatalogCrawl) {
        match card.listing {
            CardListing::Priced { price } => {
                crawl
                    .products
                    .insert(Product::simple(card.name, price, card.is_sold_out));
            }
            CardListing::Variants => match self.expander.expand(&card.name, &card.url).await {
                Some(rows) => crawl.products.extend(rows),
                None => crawl.products_disregarded += 1,
            },
        }
    }
}
