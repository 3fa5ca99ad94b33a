//! Identifier extraction from canonical storefront URLs
//!
//! Product and category URLs embed their numeric id as the leading part of a
//! path segment, e.g. `/products/1234-leche-entera` or `/category/77-lacteos`.

use crate::ExtractError;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// The kind of id embedded in a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    Product,
    Category,
}

impl IdKind {
    fn pattern(&self) -> &'static Regex {
        static PRODUCT: OnceLock<Regex> = OnceLock::new();
        static CATEGORY: OnceLock<Regex> = OnceLock::new();

        match self {
            Self::Product => PRODUCT
                .get_or_init(|| Regex::new(r"/products/(\d+)-").expect("valid product id regex")),
            Self::Category => CATEGORY
                .get_or_init(|| Regex::new(r"/category/(\d+)-").expect("valid category id regex")),
        }
    }
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Product => write!(f, "product"),
            Self::Category => write!(f, "category"),
        }
    }
}

/// Extracts the numeric id of the given kind from a URL
///
/// # Arguments
///
/// * `url` - The product or category URL
/// * `kind` - Which path segment to look for
///
/// # Returns
///
/// * `Ok(u64)` - The embedded id
/// * `Err(ExtractError::MalformedUrl)` - The segment is absent or the id does
///   not fit in a `u64`
///
/// # Example
///
/// ```
/// use vitrina::catalog::{extract_id, IdKind};
///
/// let id = extract_id("https://shop.example/products/42-cafe", IdKind::Product).unwrap();
/// assert_eq!(id, 42);
/// ```
pub fn extract_id(url: &str, kind: IdKind) -> Result<u64, ExtractError> {
    let malformed = || ExtractError::MalformedUrl {
        url: url.to_string(),
        kind,
    };

    let captures = kind.pattern().captures(url).ok_or_else(malformed)?;
    captures[1].parse::<u64>().map_err(|_| malformed())
}

/// Extracts a product id from a product URL
pub fn product_id(url: &str) -> Result<u64, ExtractError> {
    extract_id(url, IdKind::Product)
}

/// Extracts a category id from a category URL
pub fn category_id(url: &str) -> Result<u64, ExtractError> {
    extract_id(url, IdKind::Category)
}
