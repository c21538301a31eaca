//! Browser collaborator interface
//!
//! The engine never talks to a browser directly; it drives everything
//! through the narrow [`BrowserDriver`] trait. A CDP-backed implementation
//! lives in [`cdp`] (behind the `browser` feature), and an in-memory
//! [`fixture::FixtureDriver`] backs the test suite and dry runs.
//!
//! Every call blocks (awaits) until it completes or the driver's own
//! timeout fires; the engine assumes exclusive, sequential ownership of
//! one browser session.

#[cfg(feature = "browser")]
pub mod cdp;
pub mod fixture;

#[cfg(feature = "browser")]
pub use cdp::CdpDriver;
pub use fixture::FixtureDriver;

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Opaque reference to a DOM element held by the driver.
///
/// Handles are only meaningful to the driver that produced them and may go
/// stale when the page changes; [`BrowserDriver::is_stale`] reports that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle(u64);

impl ElementHandle {
    /// Wrap a driver-assigned element id
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The driver-assigned id
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Narrow interface to the browser session consumed by the engine
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// URL of the current page
    async fn current_url(&self) -> Result<String>;

    /// All elements matching a CSS selector (comma lists allowed)
    async fn query_all(&self, selector: &str) -> Result<Vec<ElementHandle>>;

    /// First element matching a CSS selector, if any
    async fn query_one(&self, selector: &str) -> Result<Option<ElementHandle>>;

    /// Read an attribute of an element
    async fn attr(&self, el: &ElementHandle, name: &str) -> Result<Option<String>>;

    /// Visible text of an element
    async fn text(&self, el: &ElementHandle) -> Result<String>;

    /// Whether an element is enabled (not `disabled`, not `aria-disabled`)
    async fn is_enabled(&self, el: &ElementHandle) -> Result<bool>;

    /// Scroll an element into the viewport
    async fn scroll_into_view(&self, el: &ElementHandle) -> Result<()>;

    /// Click an element
    async fn click(&self, el: &ElementHandle) -> Result<()>;

    /// Navigate the session to a URL
    async fn goto(&self, url: &str) -> Result<()>;

    /// Execute a script in the page, returning its JSON result
    async fn execute_script(&self, script: &str) -> Result<serde_json::Value>;

    /// Wait until a selector is present; false on timeout
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<bool>;

    /// Whether a previously obtained handle no longer refers to a live node
    async fn is_stale(&self, el: &ElementHandle) -> Result<bool>;

    /// Scroll the window to the bottom of the document
    async fn scroll_to_bottom(&self) -> Result<()>;

    /// Current document height in pixels
    async fn document_height(&self) -> Result<i64>;
}
