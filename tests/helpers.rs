// Shared test helpers: a scripted in-memory browser and canned threat feeds.
//
// The fake browser serves pages from a route table keyed by requested URL, so
// pipeline tests run without Chromium and without network access.

#![allow(dead_code)] // Each test file uses a different subset

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use redirect_detector::analysis::dom::INSPECTION_SCRIPT;
use redirect_detector::browser::{
    BrowserLauncher, BrowserPage, BrowserSession, LaunchConfig, NavigationResponse, RequestEvent,
    RequestHandler, RequestNode, ScreenshotFormat, WaitPolicy,
};
use redirect_detector::initialization::init_resolver;
use redirect_detector::server_info::ServerIntel;
use redirect_detector::threat::{ThreatFeed, ThreatVerdict};
use redirect_detector::{BrowserError, ScanSettings};

/// Geolocation endpoint nobody listens on (discard port).
pub const UNREACHABLE_ENDPOINT: &str = "http://127.0.0.1:9";

/// What the fake browser serves for one requested URL.
#[derive(Debug, Clone)]
pub struct Route {
    /// URLs the navigation visits; the last one is the landing URL.
    pub hops: Vec<String>,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    /// Result of evaluating the DOM inspection script.
    pub dom: Result<Value, BrowserError>,
    pub markup: String,
    pub requests: Vec<RequestEvent>,
    /// Time the navigation takes.
    pub delay: Duration,
    /// Navigation fails with this error instead of loading.
    pub failure: Option<BrowserError>,
}

impl Route {
    /// A page that loads directly with a 200 and an empty DOM.
    pub fn page(url: &str) -> Self {
        Self {
            hops: vec![url.to_string()],
            status: 200,
            headers: Vec::new(),
            dom: Ok(dom_payload(json!([]))),
            markup: "<html><body></body></html>".to_string(),
            requests: Vec::new(),
            delay: Duration::ZERO,
            failure: None,
        }
    }

    /// A navigation that starts at `from` and is redirected through `via`.
    pub fn redirecting(from: &str, via: &[&str]) -> Self {
        let mut route = Self::page(from);
        route.hops.extend(via.iter().map(|url| url.to_string()));
        route
    }

    pub fn with_dom(mut self, dom: Result<Value, BrowserError>) -> Self {
        self.dom = dom;
        self
    }

    pub fn with_markup(mut self, markup: &str) -> Self {
        self.markup = markup.to_string();
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_ascii_lowercase(), value.to_string()));
        self
    }

    pub fn with_request(mut self, url: &str, resource_type: &str) -> Self {
        self.requests.push(RequestEvent {
            url: url.to_string(),
            method: "GET".to_string(),
            resource_type: resource_type.to_string(),
        });
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing(mut self, error: BrowserError) -> Self {
        self.failure = Some(error);
        self
    }
}

/// An inspection payload with the given links and no deception signals.
pub fn dom_payload(links: Value) -> Value {
    json!({
        "hiddenIframes": [],
        "overlayRisks": [],
        "crossDomainForms": [],
        "links": links,
        "storage": { "cookiesCount": 0, "localStorageEntries": 0, "sessionStorageEntries": 0 }
    })
}

/// Counters shared by every session and page of one fake browser.
#[derive(Default)]
pub struct BrowserState {
    routes: HashMap<String, Route>,
    pub launches: AtomicUsize,
    pub sessions_closed: AtomicUsize,
    pub pages_opened: AtomicUsize,
    pub pages_closed: AtomicUsize,
    open_pages: AtomicUsize,
    pub max_open_pages: AtomicUsize,
    visited: Mutex<Vec<String>>,
    page_requests: AtomicUsize,
    /// Zero-based `new_page` calls that never complete.
    stalled_opens: Mutex<HashSet<usize>>,
}

impl BrowserState {
    /// Requested URLs in navigation order.
    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// Launches sessions over a fixed route table.
#[derive(Clone)]
pub struct FakeLauncher {
    pub state: Arc<BrowserState>,
    launch_error: Option<BrowserError>,
}

impl FakeLauncher {
    pub fn new(routes: impl IntoIterator<Item = (&'static str, Route)>) -> Self {
        let state = BrowserState {
            routes: routes
                .into_iter()
                .map(|(url, route)| (url.to_string(), route))
                .collect(),
            ..Default::default()
        };
        Self {
            state: Arc::new(state),
            launch_error: None,
        }
    }

    /// Makes the `nth` page request (counting from zero, primary page first) hang.
    pub fn stalling_page_open(self, nth: usize) -> Self {
        self.state.stalled_opens.lock().unwrap().insert(nth);
        self
    }

    pub fn failing_launch(error: BrowserError) -> Self {
        let mut launcher = Self::new(Vec::<(&'static str, Route)>::new());
        launcher.launch_error = Some(error);
        launcher
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    type Session = FakeSession;

    async fn launch(&self, _config: &LaunchConfig) -> Result<FakeSession, BrowserError> {
        if let Some(error) = &self.launch_error {
            return Err(error.clone());
        }
        self.state.launches.fetch_add(1, Ordering::SeqCst);
        Ok(FakeSession {
            state: self.state.clone(),
        })
    }
}

pub struct FakeSession {
    state: Arc<BrowserState>,
}

#[async_trait]
impl BrowserSession for FakeSession {
    type Page = FakePage;

    async fn new_page(&self) -> Result<FakePage, BrowserError> {
        let nth = self.state.page_requests.fetch_add(1, Ordering::SeqCst);
        let stalled = self.state.stalled_opens.lock().unwrap().contains(&nth);
        if stalled {
            std::future::pending::<()>().await;
        }
        self.state.pages_opened.fetch_add(1, Ordering::SeqCst);
        let open = self.state.open_pages.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.max_open_pages.fetch_max(open, Ordering::SeqCst);
        Ok(FakePage {
            state: self.state.clone(),
            current: Mutex::new(None),
            handler: Mutex::new(None),
        })
    }

    async fn close(&self) -> Result<(), BrowserError> {
        self.state.sessions_closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct FakePage {
    state: Arc<BrowserState>,
    current: Mutex<Option<Route>>,
    handler: Mutex<Option<RequestHandler>>,
}

impl FakePage {
    fn route(&self) -> Option<Route> {
        self.current.lock().unwrap().clone()
    }
}

#[async_trait]
impl BrowserPage for FakePage {
    async fn goto(
        &self,
        url: &str,
        _wait: WaitPolicy,
        timeout: Duration,
    ) -> Result<Option<NavigationResponse>, BrowserError> {
        self.state.visited.lock().unwrap().push(url.to_string());
        let route = self
            .state
            .routes
            .get(url)
            .cloned()
            .ok_or_else(|| BrowserError::Navigation("net::ERR_NAME_NOT_RESOLVED".to_string()))?;

        if route.delay > timeout {
            tokio::time::sleep(timeout).await;
            return Err(BrowserError::Timeout(timeout));
        }
        tokio::time::sleep(route.delay).await;
        if let Some(error) = &route.failure {
            return Err(error.clone());
        }

        let handler = self.handler.lock().unwrap().clone();
        if let Some(handler) = handler {
            for event in &route.requests {
                handler(event.clone());
            }
        }

        let request = RequestNode::from_hops(route.hops.clone())
            .ok_or_else(|| BrowserError::Navigation("route without hops".to_string()))?;
        let response = NavigationResponse {
            url: request.url.clone(),
            status: route.status,
            headers: route.headers.iter().cloned().collect(),
            request,
        };
        *self.current.lock().unwrap() = Some(route);
        Ok(Some(response))
    }

    async fn on_request(&self, handler: RequestHandler) -> Result<(), BrowserError> {
        *self.handler.lock().unwrap() = Some(handler);
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<Value, BrowserError> {
        if script != INSPECTION_SCRIPT {
            return Err(BrowserError::Evaluation("unexpected script".to_string()));
        }
        match self.route() {
            Some(route) => route.dom,
            None => Err(BrowserError::Evaluation("no document".to_string())),
        }
    }

    async fn content(&self) -> Result<String, BrowserError> {
        Ok(self.route().map(|route| route.markup).unwrap_or_default())
    }

    async fn url(&self) -> Result<String, BrowserError> {
        Ok(self
            .route()
            .and_then(|route| route.hops.last().cloned())
            .unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn screenshot(
        &self,
        _format: ScreenshotFormat,
        _quality: u8,
    ) -> Result<Vec<u8>, BrowserError> {
        Ok(vec![0xFF, 0xD8, 0xFF, 0xE0])
    }

    async fn close(&self) -> Result<(), BrowserError> {
        self.state.pages_closed.fetch_add(1, Ordering::SeqCst);
        self.state.open_pages.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A feed that always answers with the same verdict.
pub struct StaticFeed(pub ThreatVerdict);

#[async_trait]
impl ThreatFeed for StaticFeed {
    async fn lookup(&self, _host: &str) -> anyhow::Result<ThreatVerdict> {
        Ok(self.0.clone())
    }
}

/// A feed whose every lookup fails.
pub struct FailingFeed;

#[async_trait]
impl ThreatFeed for FailingFeed {
    async fn lookup(&self, host: &str) -> anyhow::Result<ThreatVerdict> {
        anyhow::bail!("feed unavailable for {host}")
    }
}

/// Server intelligence against the system resolver and the given geolocation endpoint.
pub fn test_intel(geo_endpoint: &str) -> ServerIntel {
    ServerIntel {
        resolver: init_resolver(),
        client: Arc::new(reqwest::Client::new()),
        geo_endpoint: geo_endpoint.to_string(),
    }
}

/// Settings with short timeouts and no screenshot.
pub fn test_settings() -> ScanSettings {
    ScanSettings {
        navigation_timeout: Duration::from_secs(2),
        probe_timeout: Duration::from_millis(300),
        screenshot: false,
        ..ScanSettings::default()
    }
}
