//! Chrome DevTools implementation of the DOM accessor
//!
//! Launches a Chrome/Chromium process, keeps one primary tab for the crawl,
//! and opens a second tab as the isolated context. Waits are implemented by
//! polling the DOM until the condition holds or the deadline passes.

use crate::config::BrowserConfig;
use crate::dom::{DomAccessor, DomError, DomResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as LaunchConfig};
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Interval between DOM polls inside bounded waits
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Reports whether the element is still attached, evaluated on the element itself
const IS_CONNECTED_FN: &str = "function() { return this.isConnected; }";

fn driver_error(error: CdpError) -> DomError {
    DomError::Driver(error.to_string())
}

/// First element of a lookup; an empty result is `NotFound`, a protocol
/// failure stays a driver error
fn first_match<T>(found: Result<Vec<T>, CdpError>, selector: &str) -> DomResult<T> {
    found
        .map_err(driver_error)?
        .into_iter()
        .next()
        .ok_or_else(|| DomError::NotFound {
            selector: selector.to_string(),
        })
}

/// A browser session driven over the Chrome DevTools Protocol
pub struct ChromiumDom {
    browser: Mutex<Option<Browser>>,
    handler: Mutex<Option<JoinHandle<()>>>,
    primary: Page,
    isolated: Mutex<Option<Page>>,
}

impl ChromiumDom {
    /// Launches a browser and opens the primary crawl tab
    ///
    /// # Arguments
    ///
    /// * `config` - Browser launch configuration
    ///
    /// # Returns
    ///
    /// * `Ok(ChromiumDom)` - Browser running with a blank primary tab
    /// * `Err(DomError::Launch)` - The browser could not be started
    pub async fn launch(config: &BrowserConfig) -> DomResult<Self> {
        let mut builder = LaunchConfig::builder()
            .window_size(config.window_width, config.window_height)
            .args(config.args.clone());

        if !config.headless {
            builder = builder.with_head();
        }

        if let Some(executable) = &config.executable {
            builder = builder.chrome_executable(executable);
        }

        let launch_config = builder.build().map_err(DomError::Launch)?;

        let (browser, mut handler) = Browser::launch(launch_config)
            .await
            .map_err(|e| DomError::Launch(e.to_string()))?;

        // The CDP connection only makes progress while its handler is polled
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser handler error: {}", e);
                }
            }
            tracing::debug!("Browser handler finished");
        });

        let primary = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler_task.abort();
                return Err(DomError::Launch(format!("failed to open primary tab: {}", e)));
            }
        };

        tracing::info!(
            "Browser launched ({}, {}x{})",
            if config.headless { "headless" } else { "headed" },
            config.window_width,
            config.window_height
        );

        Ok(Self {
            browser: Mutex::new(Some(browser)),
            handler: Mutex::new(Some(handler_task)),
            primary,
            isolated: Mutex::new(None),
        })
    }

    /// Returns the page of the active context
    async fn active_page(&self) -> Page {
        self.isolated
            .lock()
            .await
            .clone()
            .unwrap_or_else(|| self.primary.clone())
    }

    /// Polls for matching elements until at least one exists or time runs out
    async fn poll_elements(&self, selector: &str, timeout: Duration) -> DomResult<Vec<Element>> {
        let page = self.active_page().await;
        let deadline = Instant::now() + timeout;

        loop {
            // A failed lookup is indistinguishable from "not rendered yet"
            if let Ok(found) = page.find_elements(selector).await {
                if !found.is_empty() {
                    return Ok(found);
                }
            }

            if Instant::now() >= deadline {
                return Err(DomError::Timeout {
                    waiting_for: selector.to_string(),
                    after: timeout,
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

#[async_trait]
impl DomAccessor for ChromiumDom {
    type Element = Arc<Element>;

    async fn navigate(&self, url: &str) -> DomResult<()> {
        let page = self.active_page().await;
        page.goto(url).await.map_err(driver_error)?;
        Ok(())
    }

    async fn reload(&self) -> DomResult<()> {
        let page = self.active_page().await;
        page.reload().await.map_err(driver_error)?;
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> DomResult<Self::Element> {
        let mut found = self.poll_elements(selector, timeout).await?;
        Ok(Arc::new(found.swap_remove(0)))
    }

    async fn wait_for_all(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> DomResult<Vec<Self::Element>> {
        let found = self.poll_elements(selector, timeout).await?;
        Ok(found.into_iter().map(Arc::new).collect())
    }

    async fn query(&self, selector: &str) -> DomResult<Vec<Self::Element>> {
        let page = self.active_page().await;
        let found = page.find_elements(selector).await.map_err(driver_error)?;
        Ok(found.into_iter().map(Arc::new).collect())
    }

    async fn query_one(&self, selector: &str) -> DomResult<Self::Element> {
        let page = self.active_page().await;
        first_match(page.find_elements(selector).await, selector).map(Arc::new)
    }

    async fn query_within(
        &self,
        element: &Self::Element,
        selector: &str,
    ) -> DomResult<Self::Element> {
        first_match(element.find_elements(selector).await, selector).map(Arc::new)
    }

    async fn find_by_text_within(
        &self,
        element: &Self::Element,
        text: &str,
    ) -> DomResult<Self::Element> {
        let descendants = element.find_elements("*").await.map_err(driver_error)?;

        // The innermost match carries the shortest text
        let mut best: Option<(usize, Element)> = None;
        for candidate in descendants {
            let Some(inner) = candidate.inner_text().await.map_err(driver_error)? else {
                continue;
            };
            if !inner.contains(text) {
                continue;
            }
            let len = inner.trim().len();
            if best.as_ref().map_or(true, |(best_len, _)| len < *best_len) {
                best = Some((len, candidate));
            }
        }

        best.map(|(_, element)| Arc::new(element))
            .ok_or_else(|| DomError::NotFound {
                selector: format!("text '{}'", text),
            })
    }

    async fn attribute(&self, element: &Self::Element, name: &str) -> DomResult<Option<String>> {
        element.attribute(name).await.map_err(driver_error)
    }

    async fn text(&self, element: &Self::Element) -> DomResult<String> {
        let text = element.inner_text().await.map_err(driver_error)?;
        Ok(text.unwrap_or_default())
    }

    async fn click(&self, element: &Self::Element) -> DomResult<()> {
        element.click().await.map_err(driver_error)?;
        Ok(())
    }

    async fn wait_for_stale(&self, element: &Self::Element, timeout: Duration) -> DomResult<()> {
        let deadline = Instant::now() + timeout;

        loop {
            match element.call_js_fn(IS_CONNECTED_FN, false).await {
                Ok(returns) => {
                    let connected = returns
                        .result
                        .value
                        .as_ref()
                        .and_then(serde_json::Value::as_bool);
                    if connected == Some(false) {
                        return Ok(());
                    }
                }
                // The remote object died with its document
                Err(_) => return Ok(()),
            }

            if Instant::now() >= deadline {
                return Err(DomError::Timeout {
                    waiting_for: "element to go stale".to_string(),
                    after: timeout,
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn open_isolated_context(&self) -> DomResult<()> {
        let mut isolated = self.isolated.lock().await;
        if isolated.is_some() {
            return Err(DomError::Driver(
                "an isolated context is already open".to_string(),
            ));
        }

        let browser = self.browser.lock().await;
        let browser = browser
            .as_ref()
            .ok_or_else(|| DomError::Driver("browser is closed".to_string()))?;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(driver_error)?;

        *isolated = Some(page);
        Ok(())
    }

    async fn close_isolated_context(&self) -> DomResult<()> {
        // Taking the page re-activates the primary context regardless of
        // whether the tab closes cleanly
        let page = self.isolated.lock().await.take();
        match page {
            Some(page) => page.close().await.map_err(driver_error),
            None => Ok(()),
        }
    }

    async fn close(&self) -> DomResult<()> {
        if let Some(page) = self.isolated.lock().await.take() {
            if let Err(e) = page.close().await {
                tracing::warn!("Failed to close isolated tab: {}", e);
            }
        }

        let result = match self.browser.lock().await.take() {
            Some(mut browser) => {
                let closed = browser.close().await.map(|_| ()).map_err(driver_error);
                if let Err(e) = browser.wait().await {
                    tracing::warn!("Failed to reap browser process: {}", e);
                }
                closed
            }
            None => Ok(()),
        };

        if let Some(handler) = self.handler.lock().await.take() {
            handler.abort();
        }

        tracing::info!("Browser closed");
        result
    }
}
