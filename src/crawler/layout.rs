//! Compiled page layout shared by the extractors
//!
//! Selectors are compiled once from the configuration and shared between
//! the feature, catalog and variant passes.

use crate::config::{compile_selector, Config, MarkerConfig};
use crate::ConfigResult;
use scraper::Selector;

/// Selectors and markers describing the shop's markup
#[derive(Debug, Clone)]
pub struct PageLayout {
    pub feature_item: Selector,
    pub feature_handle_attr: String,
    pub feature_link: Selector,
    pub pagination_item: Selector,
    pub page_count_index: i32,
    pub next_label: String,
    pub collection_root: Selector,
    pub product_card: Selector,
    pub product_title: Selector,
    pub product_link: Selector,
    pub product_price: Selector,
    pub feature_product: Selector,
    pub feature_product_name: Selector,
    pub detail_root: Selector,
    pub option_name: Selector,
    pub option_select: Selector,
    pub page_param: String,
    pub markers: MarkerConfig,
}

impl PageLayout {
    /// Compiles every selector of the configuration
    pub fn from_config(config: &Config) -> ConfigResult<Self> {
        let s = &config.selectors;
        Ok(Self {
            feature_item: compile_selector("feature-item", &s.feature_item)?,
            feature_handle_attr: s.feature_handle_attr.clone(),
            feature_link: compile_selector("feature-link", &s.feature_link)?,
            pagination_item: compile_selector("pagination-item", &s.pagination_item)?,
            page_count_index: s.page_count_index,
            next_label: s.next_label.clone(),
            collection_root: compile_selector("collection-root", &s.collection_root)?,
            product_card: compile_selector("product-card", &s.product_card)?,
            product_title: compile_selector("product-title", &s.product_title)?,
            product_link: compile_selector("product-link", &s.product_link)?,
            product_price: compile_selector("product-price", &s.product_price)?,
            feature_product: compile_selector("feature-product", &s.feature_product)?,
            feature_product_name: compile_selector(
                "feature-product-name",
                &s.feature_product_name,
            )?,
            detail_root: compile_selector("detail-root", &s.detail_root)?,
            option_name: compile_selector("option-name", &s.option_name)?,
            option_select: compile_selector("option-select", &s.option_select)?,
            page_param: config.site.page_param.clone(),
            markers: config.markers.clone(),
        })
    }

    /// Decoration characters stripped from extracted text
    pub fn strip_chars(&self) -> &str {
        &self.markers.strip_chars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_compiles() {
        let layout = PageLayout::from_config(&Config::default()).unwrap();
        assert_eq!(layout.page_param, "page");
        assert_eq!(layout.page_count_index, -2);
        assert_eq!(layout.strip_chars(), " \n\t\r");
    }
}
