//! Crawl orchestrator - main crawl orchestration logic
//!
//! This module contains the crawl loop for one storefront session:
//! - Opening the session on the home page
//! - Discovering category URLs
//! - Sweeping each category and streaming its products to the sink
//! - Returning home between categories
//! - Closing the browser exactly once, on every exit path

use crate::catalog::{category_id, CategoryRef, CategoryRegistry};
use crate::config::{CrawlerConfig, SiteConfig, SkuMode};
use crate::crawler::enricher::SkuEnricher;
use crate::crawler::extractor::{resolve_url, ProductExtractor};
use crate::crawler::pagination::CategorySweep;
use crate::crawler::Scraper;
use crate::dom::DomAccessor;
use crate::output::{CategoryOutcome, CrawlStatistics, ProductSink};
use crate::VitrinaError;
use async_trait::async_trait;
use std::collections::HashSet;

/// State of one browser session against one storefront
pub struct CrawlSession<D: DomAccessor> {
    dom: D,
    home_url: String,
    categories: CategoryRegistry,
    closed: bool,
}

impl<D: DomAccessor> CrawlSession<D> {
    /// Wraps an open browser session
    pub fn new(dom: D, home_url: &str) -> Self {
        Self {
            dom,
            home_url: home_url.to_string(),
            categories: CategoryRegistry::new(),
            closed: false,
        }
    }

    /// Categories registered so far
    pub fn categories(&self) -> &CategoryRegistry {
        &self.categories
    }

    /// Returns true once the browser has been closed
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Navigates back to the home page
    pub async fn return_home(&self) -> Result<(), VitrinaError> {
        self.dom.navigate(&self.home_url).await?;
        Ok(())
    }

    /// Closes the browser; later calls do nothing
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let Err(e) = self.dom.close().await {
            tracing::warn!("Error closing browser session: {}", e);
        }
    }
}

/// Scraper for storefronts built on the retail catalog layout
///
/// Category links on the home page lead to paginated listings of product
/// cards; each card links to a detail page carrying the barcode.
pub struct RetailScraper<D: DomAccessor> {
    session: CrawlSession<D>,
    site: SiteConfig,
    settings: CrawlerConfig,
    extractor: ProductExtractor,
    last_run: Option<CrawlStatistics>,
}

impl<D: DomAccessor> RetailScraper<D> {
    /// Creates a scraper for a site over an open browser session
    ///
    /// # Arguments
    ///
    /// * `dom` - The browser session to drive
    /// * `site` - The target site
    /// * `settings` - Crawl timings, retry budget and SKU mode
    pub fn new(dom: D, site: SiteConfig, settings: CrawlerConfig) -> Self {
        let enricher = match settings.sku_mode {
            SkuMode::Inline => Some(SkuEnricher::new(
                &site.selectors,
                settings.sku_timeout(),
            )),
            SkuMode::Disabled => None,
        };
        let extractor = ProductExtractor::new(&site, enricher);

        Self {
            session: CrawlSession::new(dom, &site.home_url),
            site,
            settings,
            extractor,
            last_run: None,
        }
    }

    /// The underlying session
    pub fn session(&self) -> &CrawlSession<D> {
        &self.session
    }

    /// Statistics of the last `fetch`, kept when the run failed part way
    pub fn statistics(&self) -> Option<&CrawlStatistics> {
        self.last_run.as_ref()
    }

    /// Closes the browser if it is still open
    pub async fn close(&mut self) {
        self.session.close().await;
    }

    /// Opens the home page and waits for the category links
    async fn open_home(&self) -> Result<(), VitrinaError> {
        self.session.dom.navigate(&self.site.home_url).await?;
        self.session
            .dom
            .wait_for(&self.site.selectors.category, self.settings.startup_timeout())
            .await?;
        Ok(())
    }

    /// Collects the absolute category URLs on the current page
    ///
    /// URLs are deduplicated keeping their first-seen order; links without
    /// an href are skipped.
    async fn discover_categories(&self) -> Result<Vec<String>, VitrinaError> {
        let dom = &self.session.dom;
        let links = dom
            .query(&self.site.selectors.category)
            .await
            .map_err(|e| VitrinaError::Discovery(e.to_string()))?;

        let mut seen = HashSet::new();
        let mut urls = Vec::new();
        for link in &links {
            let href = dom
                .attribute(link, "href")
                .await
                .map_err(|e| VitrinaError::Discovery(e.to_string()))?;

            let Some(href) = href.filter(|href| !href.trim().is_empty()) else {
                continue;
            };

            let url = resolve_url(&self.session.home_url, href.trim());
            if seen.insert(url.clone()) {
                urls.push(url);
            }
        }

        Ok(urls)
    }

    /// Runs discovery and every category sweep
    async fn crawl_categories(
        &mut self,
        sink: &mut dyn ProductSink,
        stats: &mut CrawlStatistics,
    ) -> Result<(), VitrinaError> {
        let category_urls = self.discover_categories().await?;
        stats.categories_discovered = category_urls.len() as u64;
        tracing::info!("Found {} categories to process", category_urls.len());

        for category_url in &category_urls {
            tracing::info!("Processing category: {}", category_url);

            match self.sweep_category(category_url, sink, stats).await {
                Ok(outcome) => stats.record_category(outcome),
                Err(e) if e.is_session_fatal() => {
                    tracing::error!("Fatal error in category {}: {}", category_url, e);
                    return Err(e);
                }
                Err(e) => {
                    tracing::error!("Error processing category {}: {}", category_url, e);
                    stats.record_failed_category(category_url, &e.to_string());
                }
            }

            // Reset navigation state before the next category
            if let Err(e) = self.session.return_home().await {
                tracing::warn!(
                    "Failed to return to {} after {}: {}",
                    self.session.home_url,
                    category_url,
                    e
                );
            }
        }

        tracing::info!(
            "Crawl finished: {} products from {} categories ({} abandoned, {} stalled, {} failed)",
            stats.products_emitted,
            stats.categories_discovered,
            stats.categories_abandoned,
            stats.categories_stalled,
            stats.categories_failed
        );

        Ok(())
    }

    /// Sweeps one category, streaming every extracted product to the sink
    async fn sweep_category(
        &mut self,
        category_url: &str,
        sink: &mut dyn ProductSink,
        stats: &mut CrawlStatistics,
    ) -> Result<CategoryOutcome, VitrinaError> {
        self.session.dom.navigate(category_url).await?;

        let category = CategoryRef {
            id: category_id(category_url)?,
            url: category_url.to_string(),
        };
        self.session.categories.register(&category);

        let dom = &self.session.dom;
        let mut sweep =
            CategorySweep::new(dom, category_url, &self.site.selectors, &self.settings);

        let extractor = &self.extractor;
        let mut emitted = 0u64;
        let swept = async {
            while let Some(element) = sweep.next_element().await? {
                match extractor.process(dom, &element, &category, sink).await? {
                    Some(product) => {
                        emitted += 1;
                        stats.products_emitted += 1;
                        if product.sku.is_some() {
                            stats.skus_found += 1;
                        }
                    }
                    None => stats.products_failed += 1,
                }
            }
            Ok::<(), VitrinaError>(())
        }
        .await;

        // Pages walked before a failure still count
        stats.pages_listed += sweep.pages_listed();
        stats.listing_retries += sweep.retries();
        swept?;

        let outcome = if sweep.is_abandoned() {
            CategoryOutcome::Abandoned
        } else if sweep.is_stalled() {
            CategoryOutcome::Stalled
        } else {
            CategoryOutcome::Completed
        };
        tracing::info!(
            "Category {} done: {} products over {} pages ({:?})",
            category.id,
            emitted,
            sweep.pages_listed(),
            outcome
        );

        Ok(outcome)
    }
}

#[async_trait]
impl<D: DomAccessor> Scraper for RetailScraper<D> {
    async fn init(&mut self) -> Result<(), VitrinaError> {
        if let Err(e) = self.open_home().await {
            tracing::error!("Error initializing browser session: {}", e);
            self.session.close().await;
            return Err(e);
        }

        tracing::info!("Session opened on {}", self.site.home_url);
        Ok(())
    }

    async fn fetch(&mut self, sink: &mut dyn ProductSink) -> Result<CrawlStatistics, VitrinaError> {
        let mut stats = CrawlStatistics::new();
        let result = self.crawl_categories(sink, &mut stats).await;
        stats.finish();

        if let Err(e) = &result {
            tracing::error!("Fatal error during crawl: {}", e);
        }
        self.session.close().await;

        self.last_run = Some(stats.clone());
        result.map(|()| stats)
    }
}
