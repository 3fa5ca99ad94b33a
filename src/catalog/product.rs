use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A product record extracted from one listing card
///
/// Serializes to exactly the JSON Lines output fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Id embedded in the product URL
    pub id: u64,

    /// Trimmed display name
    pub name: String,

    /// Absolute product detail URL
    pub url: String,

    /// Price in whole currency units
    pub price: u64,

    /// Id of the category the product was listed under
    pub category_id: u64,

    /// Listing URL the product was found under
    pub category_url: String,

    /// Sold by weight. Never populated by listing extraction.
    #[serde(default)]
    pub per_kg: bool,

    /// Barcode recovered from the detail page, if enrichment succeeded
    #[serde(default)]
    pub sku: Option<String>,
}

/// A discovered category
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CategoryRef {
    pub id: u64,
    pub url: String,
}

/// Session-scoped mapping of discovered category ids to their URLs
#[derive(Debug, Clone, Default)]
pub struct CategoryRegistry {
    entries: BTreeMap<u64, String>,
}

impl CategoryRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a category, replacing any URL previously seen for its id
    pub fn register(&mut self, category: &CategoryRef) {
        if let Some(previous) = self.entries.insert(category.id, category.url.clone()) {
            if previous != category.url {
                tracing::debug!(
                    "Category {} re-registered: {} -> {}",
                    category.id,
                    previous,
                    category.url
                );
            }
        }
    }

    /// Looks up the URL of a registered category
    pub fn get(&self, id: u64) -> Option<&str> {
        self.entries.get(&id).map(String::as_str)
    }

    /// Number of registered categories
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no category has been registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the registered categories in id order
    pub fn iter(&self) -> impl Iterator<Item = CategoryRef> + '_ {
        self.entries.iter().map(|(id, url)| CategoryRef {
            id: *id,
            url: url.clone(),
        })
    }
}
