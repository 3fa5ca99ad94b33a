//! Catalog data model and value extraction helpers
//!
//! This module provides the product record emitted by the crawler, the
//! category registry, and the pure helpers that turn storefront text into
//! typed values:
//! - numeric ids embedded in product and category URLs
//! - localized price strings normalized to integer amounts

mod ids;
mod price;
mod product;

// Re-export main types and functions
pub use ids::{category_id, extract_id, product_id, IdKind};
pub use price::{normalize_price, PriceFormat};
pub use product::{CategoryRef, CategoryRegistry, Product};
