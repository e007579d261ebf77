//! Features (filter tags) and their links to product names

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A filter tag of the shop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub id: u32,
    pub name: String,
}

/// Association between a feature and a general product name
///
/// Links are not deduplicated and may name products that the catalog crawl
/// never saw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureProductLink {
    pub feature_id: u32,
    pub product_name: String,
}

/// Feature table with unique names and sequential ids
#[derive(Debug, Clone, Default)]
pub struct FeatureTable {
    features: Vec<Feature>,
    by_name: HashMap<String, u32>,
}

impl FeatureTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of `name`, creating the feature on first sight
    pub fn intern(&mut self, name: &str) -> u32 {
        if let Some(id) = self.by_name.get(name) {
            return *id;
        }
        let id = self.features.len() as u32;
        self.features.push(Feature {
            id,
            name: name.to_string(),
        });
        self.by_name.insert(name.to_string(), id);
        id
    }

    pub fn get(&self, id: u32) -> Option<&Feature> {
        self.features.get(id as usize)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Feature> {
        self.features.iter()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl<'a> IntoIterator for &'a FeatureTable {
    type Item = &'a Feature;
    type IntoIter = std::slice::Iter<'a, Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.iter()
    }
}
