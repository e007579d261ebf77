//! Catalog tables produced by a crawl
//!
//! - `Feature` / `FeatureTable`: filter tags with sequential ids
//! - `FeatureProductLink`: feature to product-name associations
//! - `Product` / `ProductTable`: product rows keyed by `(name, type, option)`
//! - `GeneralProductNames`: stable ids for shared product names

mod feature;
mod names;
mod product;

pub use feature::{Feature, FeatureProductLink, FeatureTable};
pub use names::clean_product_name;
pub use product::{GeneralProductNames, Product, ProductKey, ProductTable, NO_PRICE};
