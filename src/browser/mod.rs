//! Browser engine abstraction
//!
//! The crawler only needs a narrow slice of a browser: open tabs, navigate,
//! evaluate scripts, wait for elements and read back the rendered markup.
//! `BrowserEngine` and `PageSession` capture that slice so the scroll loop can
//! be driven by headless Chromium in production and by scripted pages in tests.

pub mod chromium;

pub use chromium::ChromiumEngine;

use crate::BrowserResult;
use async_trait::async_trait;
use std::time::Duration;

/// Script returning the scrollable content height of the page body
pub const SCROLL_HEIGHT_SCRIPT: &str = "document.body.scrollHeight";

/// Script scrolling the window to the current bottom of the page
pub const SCROLL_TO_BOTTOM_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight)";

/// A running browser instance shared by every crawl task
#[async_trait]
pub trait BrowserEngine: Send + Sync {
    /// Opens a new, independent page (tab)
    async fn open_page(&self) -> BrowserResult<Box<dyn PageSession>>;

    /// Shuts the browser down; pages opened afterwards fail
    async fn close(&self) -> BrowserResult<()>;
}

/// A single page owned by one crawl task
#[async_trait]
pub trait PageSession: Send {
    /// Overrides the User-Agent header for all requests from this page
    async fn set_user_agent(&mut self, user_agent: &str) -> BrowserResult<()>;

    /// Loads `url` and returns once the DOM content has been parsed
    async fn navigate(&mut self, url: &str, timeout: Duration) -> BrowserResult<()>;

    /// Evaluates a script in the page and returns its JSON value (`Null` for undefined)
    async fn evaluate(&mut self, script: &str) -> BrowserResult<serde_json::Value>;

    /// Waits until an element matching `selector` is visible
    async fn wait_for_visible(&mut self, selector: &str, timeout: Duration) -> BrowserResult<()>;

    /// Returns the serialized markup of the current document
    async fn content(&mut self) -> BrowserResult<String>;

    /// Closes the page and releases its browser resources
    async fn close(self: Box<Self>) -> BrowserResult<()>;
}
