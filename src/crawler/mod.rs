//! Crawler module for storefront catalog extraction
//!
//! This module contains the core crawling logic, including:
//! - Product extraction from listing cards
//! - SKU enrichment from detail pages in an isolated context
//! - Category pagination with bounded timeout recovery
//! - Overall crawl orchestration

mod enricher;
mod extractor;
mod orchestrator;
mod pagination;

pub use enricher::{parse_sku_text, SkuEnricher};
pub use extractor::{resolve_url, ProductExtractor};
pub use orchestrator::{CrawlSession, RetailScraper};
pub use pagination::CategorySweep;

use crate::output::{CrawlStatistics, ProductSink};
use crate::VitrinaError;
use async_trait::async_trait;

/// A storefront scraper
///
/// `init` opens the session on the site; `fetch` streams every product to
/// the sink and closes the session whatever the outcome. A failed `init`
/// closes the session itself.
#[async_trait]
pub trait Scraper: Send {
    /// Opens the browser session on the site's home page
    async fn init(&mut self) -> Result<(), VitrinaError>;

    /// Crawls the whole catalog, emitting products as they are extracted
    async fn fetch(&mut self, sink: &mut dyn ProductSink) -> Result<CrawlStatistics, VitrinaError>;
}
