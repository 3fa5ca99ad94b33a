//! Price normalization for localized currency strings

use crate::ExtractError;
use serde::Deserialize;

/// How a storefront formats its prices
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PriceFormat {
    /// Currency glyph printed next to the amount (e.g. "₲")
    #[serde(rename = "currency-symbol", default = "default_currency_symbol")]
    pub currency_symbol: String,

    /// Digit group separator (e.g. '.' in "12.500")
    #[serde(rename = "thousands-separator", default = "default_thousands_separator")]
    pub thousands_separator: char,
}

fn default_currency_symbol() -> String {
    "₲".to_string()
}

fn default_thousands_separator() -> char {
    '.'
}

impl Default for PriceFormat {
    fn default() -> Self {
        Self {
            currency_symbol: default_currency_symbol(),
            thousands_separator: default_thousands_separator(),
        }
    }
}

/// Converts the text of a price element into an integer amount
///
/// Thousands separators, whitespace (including non-breaking spaces) and the
/// currency glyph are stripped, and the remainder is parsed as a base-10
/// non-negative integer.
///
/// # Arguments
///
/// * `text` - Raw text content of the price element
/// * `format` - The storefront's price format
///
/// # Returns
///
/// * `Ok(u64)` - The normalized amount
/// * `Err(ExtractError::InvalidPrice)` - Nothing numeric remained after stripping
///
/// # Example
///
/// ```
/// use vitrina::catalog::{normalize_price, PriceFormat};
///
/// let price = normalize_price("12.500 ₲", &PriceFormat::default()).unwrap();
/// assert_eq!(price, 12500);
/// ```
pub fn normalize_price(text: &str, format: &PriceFormat) -> Result<u64, ExtractError> {
    let without_symbol = if format.currency_symbol.is_empty() {
        text.to_string()
    } else {
        text.replace(format.currency_symbol.as_str(), "")
    };

    let digits: String = without_symbol
        .chars()
        .filter(|c| *c != format.thousands_separator && !c.is_whitespace())
        .collect();

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ExtractError::InvalidPrice {
            text: text.to_string(),
        });
    }

    digits.parse::<u64>().map_err(|_| ExtractError::InvalidPrice {
        text: text.to_string(),
    })
}
