//! Product extraction from listing cards
//!
//! Turns one listing element into a validated [`Product`] and pushes it to
//! the output sink. A card that cannot be extracted is logged and skipped;
//! it never produces a partial record.

use crate::catalog::{normalize_price, product_id, CategoryRef, PriceFormat, Product};
use crate::config::{SiteConfig, SiteSelectors};
use crate::crawler::enricher::SkuEnricher;
use crate::dom::DomAccessor;
use crate::output::{OutputResult, ProductSink};
use crate::{ExtractError, ExtractResult};
use url::Url;

/// Extracts products from listing cards of one site
#[derive(Debug, Clone)]
pub struct ProductExtractor {
    selectors: SiteSelectors,
    price_format: PriceFormat,
    enricher: Option<SkuEnricher>,
}

impl ProductExtractor {
    /// Creates an extractor for a site
    ///
    /// # Arguments
    ///
    /// * `site` - The site layout and price format
    /// * `enricher` - SKU lookup to run per product, if enabled
    pub fn new(site: &SiteConfig, enricher: Option<SkuEnricher>) -> Self {
        Self {
            selectors: site.selectors.clone(),
            price_format: site.price.clone(),
            enricher,
        }
    }

    /// Extracts one product and emits it to the sink
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Product))` - The product was extracted and emitted
    /// * `Ok(None)` - The card was malformed; the failure was logged
    /// * `Err(OutputError)` - The sink could not accept the product
    pub async fn process<D: DomAccessor>(
        &self,
        dom: &D,
        element: &D::Element,
        category: &CategoryRef,
        sink: &mut dyn ProductSink,
    ) -> OutputResult<Option<Product>> {
        match self.extract(dom, element, category).await {
            Ok(product) => {
                sink.emit(&product)?;
                Ok(Some(product))
            }
            Err(e) => {
                tracing::error!(
                    "Error processing product in category {} ({}): {} [element: {:?}]",
                    category.id,
                    category.url,
                    e,
                    element
                );
                Ok(None)
            }
        }
    }

    /// Extracts one product from a listing card
    pub async fn extract<D: DomAccessor>(
        &self,
        dom: &D,
        element: &D::Element,
        category: &CategoryRef,
    ) -> ExtractResult<Product> {
        let title = find(dom, element, &self.selectors.title).await?;
        let price_label = find(dom, element, &self.selectors.price).await?;
        let link = find(dom, element, &self.selectors.link).await?;

        let href = dom
            .attribute(&link, "href")
            .await?
            .filter(|href| !href.trim().is_empty())
            .ok_or_else(|| ExtractError::MissingAttribute {
                selector: self.selectors.link.clone(),
                attribute: "href".to_string(),
            })?;
        let url = resolve_url(&category.url, href.trim());

        let id = product_id(&url)?;

        let price_text = dom.text(&price_label).await?;
        let price = normalize_price(price_text.trim(), &self.price_format)?;

        let name = dom.text(&title).await?.trim().to_string();

        let sku = match &self.enricher {
            Some(enricher) => enricher.lookup(dom, &url).await,
            None => None,
        };

        Ok(Product {
            id,
            name,
            url,
            price,
            category_id: category.id,
            category_url: category.url.clone(),
            per_kg: false,
            sku,
        })
    }
}

/// Finds a sub-element of a card, mapping "no match" to `ElementNotFound`
async fn find<D: DomAccessor>(
    dom: &D,
    element: &D::Element,
    selector: &str,
) -> ExtractResult<D::Element> {
    dom.query_within(element, selector).await.map_err(|e| {
        if e.is_not_found() {
            ExtractError::ElementNotFound {
                selector: selector.to_string(),
            }
        } else {
            ExtractError::Dom(e)
        }
    })
}

/// Resolves a possibly relative href against a base URL
///
/// Returns the href unchanged if either side fails to parse.
pub fn resolve_url(base: &str, href: &str) -> String {
    Url::parse(base)
        .and_then(|base| base.join(href))
        .map(|url| url.to_string())
        .unwrap_or_else(|_| href.to_string())
}
