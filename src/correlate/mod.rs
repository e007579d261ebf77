//! Correlation of features with products
//!
//! Features are filtered first, then joined with the product table, the row
//! predicates applied and the result sorted.

mod engine;
mod query;

pub use engine::{correlate, filter_features, join, sort, Correlation, FeatureEntry};
pub use query::{PriceRange, Query, SortDirection, SortKey};
