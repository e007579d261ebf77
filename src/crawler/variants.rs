//! Expansion of multi-option products into one row per variant

use super::catalog::parse_price;
use super::document::{element_text, first, strip_text, Document};
use super::fetcher::Fetcher;
use super::layout::PageLayout;
use crate::catalog::Product;
use crate::config::MarkerConfig;
use std::sync::Arc;
use url::Url;

/// One line of the option selector
#[derive(Debug, Clone, PartialEq)]
pub struct OptionEntry {
    pub label: String,
    pub price: Option<f64>,
    pub is_sold_out: bool,
}

/// Parses an option line such as `Small - $12.00` or `Large - sold_out`
///
/// Sold-out entries carry no price. Returns `None` when an available entry
/// has no parseable price.
pub fn parse_option_entry(entry: &str, markers: &MarkerConfig) -> Option<OptionEntry> {
    let (label, rest) = match entry.find(&markers.option_separator) {
        Some(at) => (&entry[..at], &entry[at + markers.option_separator.len()..]),
        None => (entry, ""),
    };
    let label = label.trim().to_string();

    if entry.contains(&markers.option_sold_out) {
        return Some(OptionEntry {
            label,
            price: None,
            is_sold_out: true,
        });
    }

    let price = parse_price(rest, &markers.currency_sign)?;
    Some(OptionEntry {
        label,
        price: Some(price),
        is_sold_out: false,
    })
}

/// Option axes of a detail page, joined with the type separator
fn option_types(document: &Document, layout: &PageLayout) -> String {
    let scope = document.scope(&layout.detail_root);
    let strip = layout.strip_chars();

    scope
        .select(&layout.option_name)
        .map(|header| {
            let text = element_text(header, strip);
            match text.find(':') {
                Some(colon) => text[..colon].trim().to_string(),
                None => text,
            }
        })
        .filter(|axis| !axis.is_empty())
        .collect::<Vec<_>>()
        .join(&layout.markers.option_type_separator)
}

/// Reads every variant of a product detail page
///
/// Rows share `name` and the page's option types. Entries whose price cannot
/// be parsed are skipped.
pub fn parse_variants(html: &str, name: &str, layout: &PageLayout) -> Vec<Product> {
    let document = Document::parse(html);
    let option_type = option_types(&document, layout);
    let scope = document.scope(&layout.detail_root);

    let Some(select) = first(scope, &layout.option_select) else {
        tracing::warn!("Product '{}' has no option selector", name);
        return Vec::new();
    };

    let text = select.text().collect::<String>();
    let text = strip_text(&text, layout.strip_chars());

    text.split('\n')
        .skip(layout.markers.option_header_lines)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match parse_option_entry(line, &layout.markers) {
            Some(entry) => Some(Product::variant(
                name,
                option_type.as_str(),
                entry.label,
                entry.price,
                entry.is_sold_out,
            )),
            None => {
                tracing::error!("Product '{}': cannot read a price from option '{}'", name, line);
                None
            }
        })
        .collect()
}

/// Fetches detail pages of multi-option products
#[derive(Debug, Clone)]
pub struct VariantExpander {
    fetcher: Fetcher,
    layout: Arc<PageLayout>,
}

impl VariantExpander {
    pub fn new(fetcher: Fetcher, layout: Arc<PageLayout>) -> Self {
        Self { fetcher, layout }
    }

    /// Variant rows of the product at `url`
    ///
    /// Returns `None` when the detail page cannot be fetched; the product is
    /// then disregarded.
    pub async fn expand(&self, name: &str, url: &Url) -> Option<Vec<Product>> {
        tracing::debug!("Processing product page {} (with options)", url);

        match self.fetcher.fetch(url).await.into_body() {
            Some(body) => Some(parse_variants(&body, name, &self.layout)),
            None => {
                tracing::error!("Product '{}' disregarded: {} unavailable", name, url);
                None
            }
        }
    }
}
