//! SKU enrichment from product detail pages
//!
//! The lookup runs in an isolated browsing context so the crawl keeps its
//! position on the listing page. The isolated context is closed and the
//! primary one restored on every exit path.

use crate::config::SiteSelectors;
use crate::dom::{DomAccessor, DomResult};
use std::time::Duration;

/// Recovers the barcode of a product from its detail page
#[derive(Debug, Clone)]
pub struct SkuEnricher {
    selector: String,
    label: String,
    timeout: Duration,
}

impl SkuEnricher {
    /// Creates an enricher for a site layout
    ///
    /// # Arguments
    ///
    /// * `selectors` - The site's selectors (SKU element and label)
    /// * `timeout` - How long to wait for the SKU element
    pub fn new(selectors: &SiteSelectors, timeout: Duration) -> Self {
        Self {
            selector: selectors.sku.clone(),
            label: selectors.sku_label.clone(),
            timeout,
        }
    }

    /// Looks up the SKU of the product at `product_url`
    ///
    /// Returns `None` when the element never appears, when its text lacks the
    /// barcode label, or when the browser fails. Never returns an error: a
    /// missing SKU does not affect the surrounding crawl.
    pub async fn lookup<D: DomAccessor>(&self, dom: &D, product_url: &str) -> Option<String> {
        if let Err(e) = dom.open_isolated_context().await {
            tracing::warn!("Could not open detail page for {}: {}", product_url, e);
            self.restore(dom, product_url).await;
            return None;
        }

        let result = self.read_sku(dom, product_url).await;
        self.restore(dom, product_url).await;

        match result {
            Ok(Some(sku)) => Some(sku),
            Ok(None) => {
                tracing::debug!("No barcode label in SKU element of {}", product_url);
                None
            }
            Err(e) => {
                tracing::warn!("Could not get SKU for {}: {}", product_url, e);
                None
            }
        }
    }

    async fn read_sku<D: DomAccessor>(&self, dom: &D, product_url: &str) -> DomResult<Option<String>> {
        dom.navigate(product_url).await?;
        let element = dom.wait_for(&self.selector, self.timeout).await?;
        let text = dom.text(&element).await?;
        Ok(parse_sku_text(&text, &self.label))
    }

    async fn restore<D: DomAccessor>(&self, dom: &D, product_url: &str) {
        if let Err(e) = dom.close_isolated_context().await {
            tracing::warn!(
                "Failed to close detail page context for {}: {}",
                product_url,
                e
            );
        }
    }
}

/// Extracts the barcode from the text of a SKU element
///
/// The value is whatever follows the `:` after `label`, trimmed, e.g.
/// `"Código de Barras:7840064137020"` yields `"7840064137020"`.
pub fn parse_sku_text(text: &str, label: &str) -> Option<String> {
    let start = text.find(label)?;
    let after_label = &text[start + label.len()..];
    let value = after_label.split(':').nth(1)?.trim();

    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
