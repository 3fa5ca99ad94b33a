//! DOM accessor boundary
//!
//! The crawler never talks to a browser directly. Everything it needs from a
//! rendered page goes through [`DomAccessor`]: navigation, bounded waits,
//! element queries, text/attribute reads, clicks, and an isolated browsing
//! context for detail-page lookups.
//!
//! [`ChromiumDom`] is the production implementation over the Chrome DevTools
//! Protocol.

mod chromium;

pub use chromium::ChromiumDom;

use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Duration;
use thiserror::Error;

/// Errors produced by a DOM accessor
#[derive(Debug, Error)]
pub enum DomError {
    /// A bounded wait expired before its condition held
    #[error("timed out after {after:?} waiting for {waiting_for}")]
    Timeout {
        waiting_for: String,
        after: Duration,
    },

    /// A query matched no element
    #[error("no element matches {selector}")]
    NotFound { selector: String },

    /// The element no longer belongs to the current document
    #[error("element is no longer attached to the document")]
    Stale,

    /// The browser could not be started
    #[error("failed to launch browser: {0}")]
    Launch(String),

    /// Any other driver or protocol failure
    #[error("driver error: {0}")]
    Driver(String),
}

impl DomError {
    /// Returns true for an expired bounded wait
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns true when a query matched nothing
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// Access to one browser session's DOM
///
/// All operations act on the *active* context: the primary crawl context,
/// or the isolated context while one is open. Implementations use interior
/// mutability; a single task drives the accessor at a time.
#[async_trait]
pub trait DomAccessor: Send + Sync {
    /// Handle to an element in the active context
    type Element: Clone + Debug + Send + Sync;

    /// Navigates the active context to a URL
    async fn navigate(&self, url: &str) -> DomResult<()>;

    /// Forces a reload of the active context's current page
    async fn reload(&self) -> DomResult<()>;

    /// Waits until at least one element matches, returning the first
    ///
    /// Fails with [`DomError::Timeout`] when nothing matched in time.
    async fn wait_for(&self, selector: &str, timeout: Duration) -> DomResult<Self::Element>;

    /// Waits until at least one element matches, returning all matches in
    /// document order
    ///
    /// Fails with [`DomError::Timeout`] when nothing matched in time.
    async fn wait_for_all(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> DomResult<Vec<Self::Element>>;

    /// Returns every element currently matching, possibly none
    async fn query(&self, selector: &str) -> DomResult<Vec<Self::Element>>;

    /// Returns the first element currently matching
    ///
    /// Fails with [`DomError::NotFound`] when nothing matches.
    async fn query_one(&self, selector: &str) -> DomResult<Self::Element>;

    /// Returns the first element matching within an element's subtree
    ///
    /// Fails with [`DomError::NotFound`] when nothing matches.
    async fn query_within(
        &self,
        element: &Self::Element,
        selector: &str,
    ) -> DomResult<Self::Element>;

    /// Returns the innermost descendant whose text contains `text`
    ///
    /// Fails with [`DomError::NotFound`] when no descendant carries the text.
    async fn find_by_text_within(
        &self,
        element: &Self::Element,
        text: &str,
    ) -> DomResult<Self::Element>;

    /// Reads an attribute, `None` if absent
    async fn attribute(&self, element: &Self::Element, name: &str) -> DomResult<Option<String>>;

    /// Reads the rendered text of an element
    async fn text(&self, element: &Self::Element) -> DomResult<String>;

    /// Clicks an element
    async fn click(&self, element: &Self::Element) -> DomResult<()>;

    /// Waits until an element is detached from the document
    ///
    /// Fails with [`DomError::Timeout`] if it is still attached in time.
    async fn wait_for_stale(&self, element: &Self::Element, timeout: Duration) -> DomResult<()>;

    /// Opens an isolated browsing context and makes it active
    ///
    /// The primary context keeps its page and position.
    async fn open_isolated_context(&self) -> DomResult<()>;

    /// Closes the isolated context and re-activates the primary one
    ///
    /// The primary context is active again when this returns, even on error.
    async fn close_isolated_context(&self) -> DomResult<()>;

    /// Ends the browser session
    async fn close(&self) -> DomResult<()>;
}
