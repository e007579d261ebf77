//! Product rows and the product table

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Price recorded for a variant that is sold out and lists no price
pub const NO_PRICE: f64 = 0.0;

/// One purchasable row of the catalog
///
/// Products without variants have empty `option_type` and `option`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,

    /// Option axes of the product ("Size", "Size / Color")
    #[serde(rename = "type", default)]
    pub option_type: String,

    /// Label of this variant ("Small")
    #[serde(default)]
    pub option: String,

    /// Listed price; `None` is the "no price" sentinel of a sold-out item
    pub price: Option<f64>,

    pub is_sold_out: bool,
}

/// Composite key of a product row
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductKey {
    pub name: String,
    pub option_type: String,
    pub option: String,
}

impl Product {
    /// Creates a product without variants
    pub fn simple(name: impl Into<String>, price: Option<f64>, is_sold_out: bool) -> Self {
        Self {
            name: name.into(),
            option_type: String::new(),
            option: String::new(),
            price,
            is_sold_out,
        }
    }

    /// Creates one variant row of a multi-option product
    pub fn variant(
        name: impl Into<String>,
        option_type: impl Into<String>,
        option: impl Into<String>,
        price: Option<f64>,
        is_sold_out: bool,
    ) -> Self {
        Self {
            name: name.into(),
            option_type: option_type.into(),
            option: option.into(),
            price,
            is_sold_out,
        }
    }

    pub fn key(&self) -> ProductKey {
        ProductKey {
            name: self.name.clone(),
            option_type: self.option_type.clone(),
            option: self.option.clone(),
        }
    }

    /// Price used for range filters, price sorting and the database,
    /// with the sentinel mapped to [`NO_PRICE`]
    pub fn effective_price(&self) -> f64 {
        self.price.unwrap_or(NO_PRICE)
    }

    /// "name type option", as stored in the flattened product table
    pub fn full_name(&self) -> String {
        [&self.name, &self.option_type, &self.option]
            .iter()
            .filter(|part| !part.is_empty())
            .map(|part| part.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Product table with a unique composite key
///
/// Rows keep their insertion order; a second row with an existing key is
/// rejected.
#[derive(Debug, Clone, Default)]
pub struct ProductTable {
    rows: Vec<Product>,
    keys: HashSet<ProductKey>,
}

impl ProductTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a row, returning false when its key is already present
    pub fn insert(&mut self, product: Product) -> bool {
        if !self.keys.insert(product.key()) {
            tracing::debug!(
                "Duplicate product row ignored: {}",
                product.full_name()
            );
            return false;
        }
        self.rows.push(product);
        true
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Product> {
        self.rows.iter()
    }

    pub fn rows(&self) -> &[Product] {
        &self.rows
    }

}

impl Extend<Product> for ProductTable {
    fn extend<I: IntoIterator<Item = Product>>(&mut self, iter: I) {
        for product in iter {
            self.insert(product);
        }
    }
}

impl FromIterator<Product> for ProductTable {
    fn from_iter<I: IntoIterator<Item = Product>>(iter: I) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

impl<'a> IntoIterator for &'a ProductTable {
    type Item = &'a Product;
    type IntoIter = std::slice::Iter<'a, Product>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Stable integer ids for general product names
///
/// Ids are assigned in iteration order on first encounter, starting at 0.
#[derive(Debug, Clone, Default)]
pub struct GeneralProductNames {
    ordered: Vec<String>,
    ids: HashMap<String, i64>,
}

impl GeneralProductNames {
    pub fn from_products<'a>(products: impl IntoIterator<Item = &'a Product>) -> Self {
        let mut names = Self::default();
        for product in products {
            if !names.ids.contains_key(&product.name) {
                names
                    .ids
                    .insert(product.name.clone(), names.ordered.len() as i64);
                names.ordered.push(product.name.clone());
            }
        }
        names
    }

    pub fn id_of(&self, name: &str) -> Option<i64> {
        self.ids.get(name).copied()
    }

    /// `(id, name)` pairs in id order
    pub fn iter(&self) -> impl Iterator<Item = (i64, &str)> {
        self.ordered
            .iter()
            .enumerate()
            .map(|(id, name)| (id as i64, name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}
