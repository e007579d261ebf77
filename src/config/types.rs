use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Catalog-Harvest
///
/// Every section has defaults, so an empty file (or no file at all) yields a
/// usable configuration for the reference shop layout.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub selectors: SelectorConfig,
    pub markers: MarkerConfig,
    pub fetch: FetchConfig,
    pub output: OutputConfig,
    pub api: ApiConfig,
}

/// Where the catalog lives and how its pages are addressed
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SiteConfig {
    /// Scheme and host every relative link is resolved against
    pub base_url: String,

    /// Path of the first catalog page (also the feature landing page)
    pub catalog_path: String,

    /// Query parameter carrying the page number
    pub page_param: String,

    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://shop.example.com".to_string(),
            catalog_path: "/collections/all".to_string(),
            page_param: "page".to_string(),
            user_agent: concat!("catalog-harvest/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// CSS selectors and attribute names used to read the shop's pages
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SelectorConfig {
    /// One filter tag on the landing page
    pub feature_item: String,

    /// Attribute of a filter tag holding its handle (the feature name)
    pub feature_handle_attr: String,

    /// Link inside a filter tag
    pub feature_link: String,

    /// Pagination controls (numbered pages and "Next")
    pub pagination_item: String,

    /// Position of the page-count indicator among the pagination controls;
    /// negative values count from the end
    pub page_count_index: i32,

    /// Text of the pagination control leading to the next catalog page
    pub next_label: String,

    /// Container of the product grid on a catalog page
    pub collection_root: String,

    /// One product card on a catalog page
    pub product_card: String,

    /// Title element of a product card
    pub product_title: String,

    /// Link to the product's detail page
    pub product_link: String,

    /// Price (or "options") text of a product card
    pub product_price: String,

    /// One product on a feature listing page
    pub feature_product: String,

    /// Name element of a product on a feature listing page
    pub feature_product_name: String,

    /// Container of the option controls on a detail page
    pub detail_root: String,

    /// Option-group header ("Size:", "Color:")
    pub option_name: String,

    /// Combined option selector listing every variant
    pub option_select: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            feature_item: "li.filter-item".to_string(),
            feature_handle_attr: "data-handle".to_string(),
            feature_link: "a[href]".to_string(),
            pagination_item: "a.pagination--item".to_string(),
            page_count_index: -2,
            next_label: "Next".to_string(),
            collection_root: "#shopify-section-static-collection".to_string(),
            product_card: ".productitem".to_string(),
            product_title: ".productitem--title".to_string(),
            product_link: ".productitem--title a".to_string(),
            product_price: ".price--main".to_string(),
            feature_product: "li.productgrid--item".to_string(),
            feature_product_name: ".productitem--title a".to_string(),
            detail_root: "#shopify-section-static-product".to_string(),
            option_name: ".option-name".to_string(),
            option_select: "select[name=id]".to_string(),
        }
    }
}

/// Text markers and separators found in the shop's markup
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MarkerConfig {
    /// Decoration characters stripped from both ends of extracted text
    pub strip_chars: String,

    /// Currency sign preceding every price
    pub currency_sign: String,

    /// Marker in a card's price text meaning the product has variants
    pub has_options: String,

    /// Marker anywhere in a card's text meaning the product is sold out
    pub sold_out: String,

    /// Marker in an option entry meaning the variant is sold out
    pub option_sold_out: String,

    /// Separator between an option's label and its price
    pub option_separator: String,

    /// Separator joining several option types ("Size / Color")
    pub option_type_separator: String,

    /// Number of leading lines of the option selector that are not options
    pub option_header_lines: usize,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            strip_chars: " \n\t\r".to_string(),
            currency_sign: "$".to_string(),
            has_options: "options".to_string(),
            sold_out: "Sold out".to_string(),
            option_sold_out: "sold_out".to_string(),
            option_separator: " - ".to_string(),
            option_type_separator: " / ".to_string(),
            option_header_lines: 2,
        }
    }
}

/// Retry and concurrency settings for page fetches
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FetchConfig {
    /// Attempts per page or product fetch
    pub attempts: u32,

    /// Seconds to wait between two attempts
    pub wait_seconds: f64,

    /// Number of feature first pages fetched concurrently
    pub feature_batch_size: usize,

    /// Per-request timeout of the HTTP client
    pub timeout_seconds: u64,
}

impl FetchConfig {
    /// Wait between attempts as a Duration
    ///
    /// A value `validate` rejects maps to no wait.
    pub fn wait(&self) -> Duration {
        Duration::try_from_secs_f64(self.wait_seconds).unwrap_or_default()
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            wait_seconds: 2.0,
            feature_batch_size: 10,
            timeout_seconds: 30,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory receiving the CSV/JSON result files
    pub directory: String,

    /// Directory holding the unfiltered tables of the last crawl
    /// (read by `--no-scrape`)
    pub snapshot_directory: String,

    /// Path to the SQLite database file
    pub database_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
            snapshot_directory: "snapshot".to_string(),
            database_path: "catalog.db".to_string(),
        }
    }
}

/// Crop database used by the `--api` enrichment
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ApiConfig {
    /// Endpoint returning the crop list as JSON
    pub crops_url: String,

    /// Feature given to perennial crops
    pub perennial_feature: String,

    /// Feature given to every other crop
    pub other_feature: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            crops_url: "https://www.growstuff.org/api/v1/crops".to_string(),
            perennial_feature: "perennial".to_string(),
            other_feature: "no feature".to_string(),
        }
    }
}
