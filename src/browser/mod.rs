//! Browser automation seam.
//!
//! The scan pipeline drives a real browser through three traits:
//! - [`BrowserLauncher`] starts an isolated session per scan
//! - [`BrowserSession`] hands out pages that share the session
//! - [`BrowserPage`] navigates, evaluates scripts, captures screenshots and
//!   reports outbound requests
//!
//! [`ChromiumLauncher`] is the production implementation (headless Chromium
//! over the DevTools protocol). Tests substitute scripted implementations.
//!
//! Every page is a scoped acquisition: callers close it on success, failure
//! and timeout paths alike, and the session is closed when the scan ends.

mod chromium;
mod types;

use std::time::Duration;

use async_trait::async_trait;

use crate::error_handling::BrowserError;

pub use chromium::{ChromiumLauncher, ChromiumPage, ChromiumSession};
pub use types::{
    LaunchConfig, NavigationResponse, RequestEvent, RequestHandler, RequestNode,
    ScreenshotFormat, WaitPolicy,
};

/// Starts browser sessions.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    type Session: BrowserSession;

    async fn launch(&self, config: &LaunchConfig) -> Result<Self::Session, BrowserError>;
}

/// One isolated browser session (cookies, cache and storage are per session).
#[async_trait]
pub trait BrowserSession: Send + Sync {
    type Page: BrowserPage;

    /// Opens a blank page. The caller must `close` it.
    async fn new_page(&self) -> Result<Self::Page, BrowserError>;

    /// Shuts the session down, closing any page still open.
    async fn close(&self) -> Result<(), BrowserError>;
}

/// A single page (tab) in a session.
#[async_trait]
pub trait BrowserPage: Send + Sync {
    /// Navigates to `url`, waiting per `wait` for at most `timeout`.
    ///
    /// Returns `Ok(None)` when the navigation completed without producing a
    /// response object.
    async fn goto(
        &self,
        url: &str,
        wait: WaitPolicy,
        timeout: Duration,
    ) -> Result<Option<NavigationResponse>, BrowserError>;

    /// Registers `handler` for every outbound request made by this page from
    /// now until it is closed.
    async fn on_request(&self, handler: RequestHandler) -> Result<(), BrowserError>;

    /// Evaluates a script expression and returns its JSON value.
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, BrowserError>;

    /// Serialized markup of the current document.
    async fn content(&self) -> Result<String, BrowserError>;

    /// Current URL of the page.
    async fn url(&self) -> Result<String, BrowserError>;

    async fn screenshot(
        &self,
        format: ScreenshotFormat,
        quality: u8,
    ) -> Result<Vec<u8>, BrowserError>;

    async fn close(&self) -> Result<(), BrowserError>;
}
