//! Headless Chromium implementation of the browser seam (DevTools protocol).
//!
//! Redirect ancestry is rebuilt from `Network.requestWillBeSent` events: Chromium
//! reuses the navigation's request id for every hop of an HTTP redirect chain,
//! so the document events sharing the first document request id, in arrival
//! order, are the hops.
//!
//! Navigation completion follows the requested [`WaitPolicy`]: the page's
//! `domContentEventFired` or `loadEventFired` event, and for network idle a
//! further window with no request activity.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent, EventResponseReceived,
    ResourceType,
};
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, EventDomContentEventFired, EventLoadEventFired, NavigateParams,
};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::stream::{self, BoxStream};
use futures::{FutureExt, Stream, StreamExt};
use log::{debug, info};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::{
    BrowserLauncher, BrowserPage, BrowserSession, LaunchConfig, NavigationResponse,
    RequestEvent, RequestHandler, RequestNode, ScreenshotFormat, WaitPolicy,
};
use crate::config::NETWORK_IDLE_SETTLE;
use crate::error_handling::BrowserError;

fn protocol_error(e: impl std::fmt::Display) -> BrowserError {
    BrowserError::Protocol(e.to_string())
}

/// Launches one headless Chromium process per session.
#[derive(Debug, Clone, Default)]
pub struct ChromiumLauncher;

impl ChromiumLauncher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    type Session = ChromiumSession;

    async fn launch(&self, config: &LaunchConfig) -> Result<ChromiumSession, BrowserError> {
        let (width, height) = config.viewport;
        let mut builder = BrowserConfig::builder()
            .window_size(width, height)
            .viewport(None)
            .no_sandbox()
            .arg(format!("--user-agent={}", config.user_agent))
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage");
        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &config.executable {
            builder = builder.chrome_executable(path);
        }
        let browser_config = builder.build().map_err(BrowserError::Launch)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        // The handler drives the CDP connection; it must be polled for the
        // browser to make progress.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler event error: {e}");
                }
            }
        });

        info!("Browser session launched ({width}x{height})");
        Ok(ChromiumSession {
            browser: Mutex::new(browser),
            handler_task,
        })
    }
}

/// A running Chromium process and its CDP connection.
pub struct ChromiumSession {
    browser: Mutex<Browser>,
    handler_task: JoinHandle<()>,
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    type Page = ChromiumPage;

    async fn new_page(&self) -> Result<ChromiumPage, BrowserError> {
        let browser = self.browser.lock().await;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::Page(e.to_string()))?;
        Ok(ChromiumPage::new(page))
    }

    async fn close(&self) -> Result<(), BrowserError> {
        let mut browser = self.browser.lock().await;
        let closed = browser.close().await.map_err(protocol_error);
        // Reap the child process even if the polite close failed
        if let Err(e) = browser.wait().await {
            debug!("Waiting for browser exit failed: {e}");
        }
        self.handler_task.abort();
        closed.map(|_| ())
    }
}

/// One Chromium tab.
pub struct ChromiumPage {
    page: Page,
    listeners: std::sync::Mutex<Vec<JoinHandle<()>>>,
}

impl ChromiumPage {
    fn new(page: Page) -> Self {
        Self {
            page,
            listeners: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Every request start or completion on this page, as a unit stream.
    async fn network_activity(&self) -> Result<BoxStream<'static, ()>, BrowserError> {
        let started = self
            .page
            .event_listener::<EventRequestWillBeSent>()
            .await
            .map_err(protocol_error)?;
        let finished = self
            .page
            .event_listener::<EventLoadingFinished>()
            .await
            .map_err(protocol_error)?;
        let failed = self
            .page
            .event_listener::<EventLoadingFailed>()
            .await
            .map_err(protocol_error)?;
        Ok(stream::select_all([
            started.map(|_| ()).boxed(),
            finished.map(|_| ()).boxed(),
            failed.map(|_| ()).boxed(),
        ])
        .boxed())
    }

    /// Issues the navigation and resolves when `wait` is satisfied.
    async fn navigate(&self, url: &str, wait: WaitPolicy) -> Result<(), BrowserError> {
        let mut dom_ready = self
            .page
            .event_listener::<EventDomContentEventFired>()
            .await
            .map_err(protocol_error)?;
        let mut loaded = self
            .page
            .event_listener::<EventLoadEventFired>()
            .await
            .map_err(protocol_error)?;
        let activity = match wait {
            WaitPolicy::NetworkIdle => Some(self.network_activity().await?),
            WaitPolicy::DomContentLoaded | WaitPolicy::Load => None,
        };

        let navigated = self
            .page
            .execute(NavigateParams::new(url))
            .await
            .map_err(|e| BrowserError::Navigation(e.to_string()))?;
        if let Some(error) = navigated.result.error_text.clone() {
            return Err(BrowserError::Navigation(error));
        }

        let fired = match wait {
            WaitPolicy::DomContentLoaded => dom_ready.next().await.is_some(),
            WaitPolicy::Load | WaitPolicy::NetworkIdle => loaded.next().await.is_some(),
        };
        if !fired {
            return Err(BrowserError::Page(format!("page went away while loading {url}")));
        }
        if let Some(activity) = activity {
            wait_for_quiet(activity, NETWORK_IDLE_SETTLE).await;
        }
        Ok(())
    }

    fn abort_listeners(&self) {
        let mut listeners = match self.listeners.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        for task in listeners.drain(..) {
            task.abort();
        }
    }
}

/// Resolves once `activity` has yielded nothing for `quiet`, or has ended.
async fn wait_for_quiet<S>(mut activity: S, quiet: Duration)
where
    S: Stream + Unpin,
{
    while let Ok(Some(_)) = tokio::time::timeout(quiet, activity.next()).await {}
}

fn resource_type_label(resource_type: Option<&ResourceType>) -> String {
    resource_type
        .map(|t| format!("{t:?}"))
        .unwrap_or_else(|| "Other".to_string())
}

fn headers_to_map(headers: &serde_json::Value) -> HashMap<String, String> {
    headers
        .as_object()
        .map(|object| {
            object
                .iter()
                .map(|(name, value)| {
                    let value = value
                        .as_str()
                        .map(str::to_string)
                        .unwrap_or_else(|| value.to_string());
                    (name.to_ascii_lowercase(), value)
                })
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl BrowserPage for ChromiumPage {
    async fn goto(
        &self,
        url: &str,
        wait: WaitPolicy,
        timeout: Duration,
    ) -> Result<Option<NavigationResponse>, BrowserError> {
        let mut requests = self
            .page
            .event_listener::<EventRequestWillBeSent>()
            .await
            .map_err(protocol_error)?;
        let mut responses = self
            .page
            .event_listener::<EventResponseReceived>()
            .await
            .map_err(protocol_error)?;

        match tokio::time::timeout(timeout, self.navigate(url, wait)).await {
            Err(_) => return Err(BrowserError::Timeout(timeout)),
            Ok(Err(e)) => return Err(e),
            Ok(Ok(())) => {}
        }

        // Events for a completed navigation are already queued; drain without waiting.
        let mut navigation_id: Option<String> = None;
        let mut hops: Vec<String> = Vec::new();
        while let Some(Some(event)) = requests.next().now_or_never() {
            if !matches!(event.r#type, Some(ResourceType::Document)) {
                continue;
            }
            let id = event.request_id.inner().clone();
            match &navigation_id {
                None => navigation_id = Some(id),
                Some(current) if *current == id => {}
                Some(_) => continue,
            }
            hops.push(event.request.url.clone());
        }

        let Some(navigation_id) = navigation_id else {
            debug!("Navigation to {url} produced no document request");
            return Ok(None);
        };

        let mut terminal = None;
        while let Some(Some(event)) = responses.next().now_or_never() {
            if *event.request_id.inner() == navigation_id {
                terminal = Some(event.response.clone());
            }
        }
        let Some(response) = terminal else {
            debug!("Navigation to {url} produced no response");
            return Ok(None);
        };
        let Some(request) = RequestNode::from_hops(hops) else {
            return Ok(None);
        };

        Ok(Some(NavigationResponse {
            url: response.url.clone(),
            status: u16::try_from(response.status).unwrap_or(0),
            headers: headers_to_map(response.headers.inner()),
            request,
        }))
    }

    async fn on_request(&self, handler: RequestHandler) -> Result<(), BrowserError> {
        let mut events = self
            .page
            .event_listener::<EventRequestWillBeSent>()
            .await
            .map_err(protocol_error)?;

        let task = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                handler(RequestEvent {
                    url: event.request.url.clone(),
                    method: event.request.method.clone(),
                    resource_type: resource_type_label(event.r#type.as_ref()),
                });
            }
        });

        match self.listeners.lock() {
            Ok(mut listeners) => listeners.push(task),
            Err(poisoned) => poisoned.into_inner().push(task),
        }
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, BrowserError> {
        self.page
            .evaluate_expression(script)
            .await
            .map_err(|e| BrowserError::Evaluation(e.to_string()))?
            .into_value::<serde_json::Value>()
            .map_err(|e| BrowserError::Evaluation(e.to_string()))
    }

    async fn content(&self) -> Result<String, BrowserError> {
        self.page.content().await.map_err(protocol_error)
    }

    async fn url(&self) -> Result<String, BrowserError> {
        self.page
            .url()
            .await
            .map_err(protocol_error)?
            .ok_or_else(|| BrowserError::Page("page has no URL".to_string()))
    }

    async fn screenshot(
        &self,
        format: ScreenshotFormat,
        quality: u8,
    ) -> Result<Vec<u8>, BrowserError> {
        let params = match format {
            ScreenshotFormat::Jpeg => ScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Jpeg)
                .quality(i64::from(quality)),
            ScreenshotFormat::Png => {
                ScreenshotParams::builder().format(CaptureScreenshotFormat::Png)
            }
        };
        self.page
            .screenshot(params.build())
            .await
            .map_err(protocol_error)
    }

    async fn close(&self) -> Result<(), BrowserError> {
        self.abort_listeners();
        self.page
            .clone()
            .close()
            .await
            .map_err(|e| BrowserError::Page(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_to_map_lowercases_names() {
        let headers = serde_json::json!({
            "Content-Security-Policy": "default-src 'self'",
            "X-Count": 3
        });
        let map = headers_to_map(&headers);
        assert_eq!(
            map.get("content-security-policy").map(String::as_str),
            Some("default-src 'self'")
        );
        assert_eq!(map.get("x-count").map(String::as_str), Some("3"));
    }

    #[test]
    fn test_headers_to_map_non_object() {
        assert!(headers_to_map(&serde_json::Value::Null).is_empty());
    }

    #[tokio::test]
    async fn test_wait_for_quiet_restarts_window_on_activity() {
        let (tx, rx) = futures::channel::mpsc::unbounded::<()>();
        let feeder = tokio::spawn(async move {
            for _ in 0..4 {
                tokio::time::sleep(Duration::from_millis(30)).await;
                if tx.unbounded_send(()).is_err() {
                    return;
                }
            }
            // Keep the stream open past the quiet window
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(tx);
        });

        let started = std::time::Instant::now();
        wait_for_quiet(rx, Duration::from_millis(100)).await;
        let elapsed = started.elapsed();
        feeder.abort();

        // Four events 30ms apart, then a full quiet window
        assert!(elapsed >= Duration::from_millis(220), "{elapsed:?}");
        assert!(elapsed < Duration::from_secs(5), "{elapsed:?}");
    }

    #[tokio::test]
    async fn test_wait_for_quiet_on_silent_stream_waits_one_window() {
        let (_tx, rx) = futures::channel::mpsc::unbounded::<()>();
        let started = std::time::Instant::now();
        wait_for_quiet(rx, Duration::from_millis(80)).await;
        assert!(started.elapsed() >= Duration::from_millis(80));
    }

    #[tokio::test]
    async fn test_wait_for_quiet_returns_when_stream_ends() {
        let started = std::time::Instant::now();
        wait_for_quiet(futures::stream::iter([(), ()]), Duration::from_secs(5)).await;
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_resource_type_label() {
        assert_eq!(resource_type_label(Some(&ResourceType::Script)), "Script");
        assert_eq!(resource_type_label(None), "Other");
    }

    #[tokio::test]
    #[ignore] // Requires a local Chrome/Chromium: cargo test -- --ignored chromium
    async fn test_chromium_session_navigates() {
        let session = ChromiumLauncher::new()
            .launch(&LaunchConfig::default())
            .await
            .expect("Chromium should launch");
        let page = session.new_page().await.expect("page should open");
        let response = page
            .goto(
                "https://example.com",
                WaitPolicy::Load,
                Duration::from_secs(15),
            )
            .await;
        let _ = page.close().await;
        let _ = session.close().await;
        let response = response.expect("navigation should succeed");
        assert!(response.is_some());
    }
}
