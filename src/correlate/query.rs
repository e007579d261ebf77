//! Filter and sort parameters of a correlation

use crate::catalog::Product;
use crate::{HarvestError, Result};
use std::fmt;
use std::str::FromStr;

/// Inclusive price bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    lower: f64,
    upper: f64,
}

impl PriceRange {
    /// Creates a range, rejecting NaN bounds and `lower > upper`
    pub fn new(lower: f64, upper: f64) -> Result<Self> {
        if lower.is_nan() || upper.is_nan() {
            return Err(HarvestError::InvalidQuery(
                "price bounds must be numbers".to_string(),
            ));
        }
        if lower > upper {
            return Err(HarvestError::InvalidQuery(format!(
                "price lower bound {} is above upper bound {}",
                lower, upper
            )));
        }
        Ok(Self { lower, upper })
    }

    pub fn contains(&self, price: f64) -> bool {
        self.lower <= price && price <= self.upper
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self {
            lower: 0.0,
            upper: f64::INFINITY,
        }
    }
}

/// Column the result is sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Name,
    Price,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "name" | "n" => Ok(Self::Name),
            "price" | "p" => Ok(Self::Price),
            other => Err(format!("unknown sort key '{}' (expected name or price)", other)),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Price => write!(f, "price"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn apply(self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "a" | "ascending" => Ok(Self::Ascending),
            "desc" | "d" | "descending" => Ok(Self::Descending),
            other => Err(format!("unknown sort order '{}' (expected asc or desc)", other)),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "asc"),
            Self::Descending => write!(f, "desc"),
        }
    }
}

/// Everything that shapes a correlation result
///
/// The default query keeps every product and sorts by name ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Substring a feature name must contain (case-insensitive)
    pub feature: String,

    /// Substring a product name must contain (case-insensitive)
    pub product: String,

    pub price: PriceRange,

    /// `None` keeps sold-out and available products alike
    pub sold_out: Option<bool>,

    pub sort_key: SortKey,
    pub direction: SortDirection,

    /// Report products per feature
    pub break_down: bool,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.feature = feature.into();
        self
    }

    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = product.into();
        self
    }

    pub fn with_price(mut self, price: PriceRange) -> Self {
        self.price = price;
        self
    }

    pub fn with_sold_out(mut self, sold_out: Option<bool>) -> Self {
        self.sold_out = sold_out;
        self
    }

    pub fn sorted_by(mut self, key: SortKey, direction: SortDirection) -> Self {
        self.sort_key = key;
        self.direction = direction;
        self
    }

    pub fn with_break_down(mut self, break_down: bool) -> Self {
        self.break_down = break_down;
        self
    }

    /// Whether products are restricted to those linked to surviving features
    pub fn is_feature_scoped(&self) -> bool {
        !self.feature.is_empty() || self.break_down
    }

    pub fn matches_feature(&self, name: &str) -> bool {
        contains_ignore_case(name, &self.feature)
    }

    pub fn matches_product_name(&self, name: &str) -> bool {
        contains_ignore_case(name, &self.product)
    }

    /// Row predicates: name, price range and sold-out state
    pub fn matches(&self, product: &Product) -> bool {
        self.matches_product_name(&product.name)
            && self.price.contains(product.effective_price())
            && self.sold_out.map_or(true, |sold_out| product.is_sold_out == sold_out)
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}
