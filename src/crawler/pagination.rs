//! Pagination engine
//!
//! A [`CategorySweep`] walks one category page by page and hands out its
//! listing elements one at a time:
//!
//! 1. `Listing`: wait for the listing elements of the current page
//! 2. `Paginating`: once they are consumed, click the pager's "next" control
//!    and wait for the old pager to go stale
//! 3. `ErrorRecovery`: after the listing wait timed out, reload and retry a
//!    bounded number of times before giving up on the category
//! 4. `Done`: no pager, no "next" control, a "next" click that did not change
//!    the page, or retries exhausted
//!
//! The sweep expects the browser to already be on the category's first page.

use crate::config::{CrawlerConfig, SiteSelectors};
use crate::dom::{DomAccessor, DomError};
use crate::state::SweepState;
use crate::VitrinaError;
use std::collections::VecDeque;

/// Lazy, finite sequence of the listing elements of one category
pub struct CategorySweep<'a, D: DomAccessor> {
    dom: &'a D,
    category_url: String,
    selectors: &'a SiteSelectors,
    settings: &'a CrawlerConfig,
    state: SweepState,
    pending: VecDeque<D::Element>,
    pages_listed: u64,
    retries: u64,
    abandoned: bool,
    stalled: bool,
}

impl<'a, D: DomAccessor> CategorySweep<'a, D> {
    /// Starts a sweep in the `Listing` state
    ///
    /// # Arguments
    ///
    /// * `dom` - The browser, positioned on the category's first page
    /// * `category_url` - The category being swept (used for logging)
    /// * `selectors` - The site's listing and pager selectors
    /// * `settings` - Timeouts, pauses and the retry budget
    pub fn new(
        dom: &'a D,
        category_url: &str,
        selectors: &'a SiteSelectors,
        settings: &'a CrawlerConfig,
    ) -> Self {
        Self {
            dom,
            category_url: category_url.to_string(),
            selectors,
            settings,
            state: SweepState::Listing,
            pending: VecDeque::new(),
            pages_listed: 0,
            retries: 0,
            abandoned: false,
            stalled: false,
        }
    }

    /// Current state of the sweep
    pub fn state(&self) -> SweepState {
        self.state
    }

    /// Number of pages whose listing elements were obtained
    pub fn pages_listed(&self) -> u64 {
        self.pages_listed
    }

    /// Number of reload-and-retry attempts made so far
    pub fn retries(&self) -> u64 {
        self.retries
    }

    /// Returns true if the sweep ended because retries ran out
    pub fn is_abandoned(&self) -> bool {
        self.abandoned
    }

    /// Returns true if the sweep ended because a "next" click did not change
    /// the page, so later pages may have been skipped
    pub fn is_stalled(&self) -> bool {
        self.stalled
    }

    /// Returns the next listing element, or `None` once the sweep is done
    ///
    /// Pagination happens lazily: the "next" control is clicked only after
    /// every element of the current page was returned.
    ///
    /// # Errors
    ///
    /// `VitrinaError::CategoryFatal` for any browser failure other than a
    /// wait timeout or a missing pager.
    pub async fn next_element(&mut self) -> Result<Option<D::Element>, VitrinaError> {
        loop {
            if let Some(element) = self.pending.pop_front() {
                return Ok(Some(element));
            }

            match self.state {
                SweepState::Listing => self.list_page().await?,
                SweepState::Paginating => self.advance().await?,
                SweepState::ErrorRecovery => self.recover().await?,
                SweepState::Done => return Ok(None),
            }
        }
    }

    /// Waits for the current page's listing elements
    async fn list_page(&mut self) -> Result<(), VitrinaError> {
        match self
            .dom
            .wait_for_all(&self.selectors.product, self.settings.listing_timeout())
            .await
        {
            Ok(elements) => self.accept_page(elements),
            Err(e) if e.is_timeout() => {
                tracing::warn!("Timeout loading products on {}", self.category_url);
                self.transition(SweepState::ErrorRecovery)
            }
            Err(e) => Err(self.fatal(e)),
        }
    }

    /// Moves to the next page, or finishes when there is none
    async fn advance(&mut self) -> Result<(), VitrinaError> {
        let pager = match self.dom.query_one(&self.selectors.pager).await {
            Ok(pager) => pager,
            Err(e) if e.is_not_found() => {
                tracing::debug!("No pager on {}, last page reached", self.category_url);
                return self.transition(SweepState::Done);
            }
            Err(e) => return Err(self.fatal(e)),
        };

        let next = match self
            .dom
            .find_by_text_within(&pager, &self.selectors.next_page_text)
            .await
        {
            Ok(next) => next,
            Err(e) if e.is_not_found() => {
                tracing::debug!(
                    "No '{}' control on {}, last page reached",
                    self.selectors.next_page_text,
                    self.category_url
                );
                return self.transition(SweepState::Done);
            }
            Err(e) => return Err(self.fatal(e)),
        };

        self.dom.click(&next).await.map_err(|e| self.fatal(e))?;

        match self
            .dom
            .wait_for_stale(&pager, self.settings.pager_stale_timeout())
            .await
        {
            Ok(()) => {}
            Err(e) if e.is_timeout() => {
                // A "next" control that does not navigate (e.g. disabled on
                // the last page) would otherwise re-list the same page forever
                tracing::warn!(
                    "Page did not change after clicking '{}' on {}, ending category",
                    self.selectors.next_page_text,
                    self.category_url
                );
                self.stalled = true;
                return self.transition(SweepState::Done);
            }
            Err(e) => return Err(self.fatal(e)),
        }

        tokio::time::sleep(self.settings.stabilization_pause()).await;
        self.transition(SweepState::Listing)
    }

    /// Reloads and retries the listing wait a bounded number of times
    async fn recover(&mut self) -> Result<(), VitrinaError> {
        self.reload().await?;

        let max_retries = self.settings.max_listing_retries;
        for attempt in 1..=max_retries {
            self.retries += 1;
            match self
                .dom
                .wait_for_all(&self.selectors.product, self.settings.listing_timeout())
                .await
            {
                Ok(elements) => {
                    tracing::info!(
                        "Products loaded on {} after {} retr{}",
                        self.category_url,
                        attempt,
                        if attempt == 1 { "y" } else { "ies" }
                    );
                    return self.accept_page(elements);
                }
                Err(e) if e.is_timeout() => {
                    tracing::warn!(
                        "Timeout loading products on {}, retrying ({}/{})",
                        self.category_url,
                        attempt,
                        max_retries
                    );
                    self.reload().await?;
                }
                Err(e) => return Err(self.fatal(e)),
            }
        }

        tracing::error!(
            "Could not load products on {} after {} retries, abandoning category",
            self.category_url,
            max_retries
        );
        self.abandoned = true;
        self.transition(SweepState::Done)
    }

    fn accept_page(&mut self, elements: Vec<D::Element>) -> Result<(), VitrinaError> {
        self.pages_listed += 1;
        tracing::debug!(
            "Page {} of {}: {} products",
            self.pages_listed,
            self.category_url,
            elements.len()
        );
        self.pending.extend(elements);
        self.transition(SweepState::Paginating)
    }

    async fn reload(&self) -> Result<(), VitrinaError> {
        self.dom.reload().await.map_err(|e| self.fatal(e))?;
        tokio::time::sleep(self.settings.reload_pause()).await;
        Ok(())
    }

    fn transition(&mut self, next: SweepState) -> Result<(), VitrinaError> {
        if !self.state.can_transition_to(next) {
            return Err(VitrinaError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::trace!("{}: {} -> {}", self.category_url, self.state, next);
        self.state = next;
        Ok(())
    }

    fn fatal(&self, error: DomError) -> VitrinaError {
        VitrinaError::CategoryFatal {
            url: self.category_url.clone(),
            reason: error.to_string(),
        }
    }
}
