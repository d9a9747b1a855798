//! Outbound request observation.
//!
//! A [`NetworkObserver`] is attached to the primary page before navigation and
//! sees every request the page makes: the document, its subresources and any
//! later script-initiated traffic. Probe pages are not observed.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::app::host_of;
use crate::browser::{RequestEvent, RequestHandler};
use crate::config::{MAX_EXTERNAL_DOMAINS, MAX_NETWORK_SAMPLES, MAX_SAMPLE_URL_CHARS};
use crate::utils::truncate_chars;

/// A captured request, kept for the first few requests only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestSample {
    pub url: String,
    pub method: String,
    #[serde(rename = "type")]
    pub resource_type: String,
}

/// Aggregate view of a page's traffic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NetworkSummary {
    pub total_requests: usize,
    /// Distinct external hosts in first-seen order, at most 15.
    pub external_domains: Vec<String>,
    /// Request count per resource type.
    pub types: BTreeMap<String, usize>,
    /// The first 50 requests in arrival order, URLs capped at 200 characters.
    pub requests: Vec<RequestSample>,
}

#[derive(Debug, Default)]
struct ObserverState {
    total: usize,
    samples: Vec<RequestSample>,
    types: BTreeMap<String, usize>,
    external_domains: Vec<String>,
}

/// Records the requests of one page.
///
/// Cloning shares the underlying state, so the handler returned by
/// [`NetworkObserver::handler`] and the observer see the same counts.
#[derive(Debug, Clone)]
pub struct NetworkObserver {
    page_host: Option<String>,
    state: Arc<Mutex<ObserverState>>,
}

/// Whether `host` is external to `page_host`.
///
/// The page's own host and any of its subdomains are internal; every other
/// host is external. Comparison is case-insensitive.
pub fn is_external_host(host: &str, page_host: &str) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    let page_host = page_host.trim_end_matches('.').to_ascii_lowercase();
    if host.is_empty() {
        return false;
    }
    if host == page_host {
        return false;
    }
    !host.ends_with(&format!(".{page_host}"))
}

impl NetworkObserver {
    /// Creates an observer for a page expected to load `page_url`.
    pub fn new(page_url: &str) -> Self {
        Self {
            page_host: host_of(page_url),
            state: Arc::new(Mutex::new(ObserverState::default())),
        }
    }

    /// Records one outbound request.
    pub fn record(&self, event: &RequestEvent) {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        state.total += 1;
        *state.types.entry(event.resource_type.clone()).or_insert(0) += 1;

        if state.samples.len() < MAX_NETWORK_SAMPLES {
            state.samples.push(RequestSample {
                url: truncate_chars(&event.url, MAX_SAMPLE_URL_CHARS),
                method: event.method.clone(),
                resource_type: event.resource_type.clone(),
            });
        }

        // data:, blob: and friends have no host and are never external
        let (Some(host), Some(page_host)) = (host_of(&event.url), self.page_host.as_deref())
        else {
            return;
        };
        if state.external_domains.len() < MAX_EXTERNAL_DOMAINS
            && is_external_host(&host, page_host)
            && !state.external_domains.contains(&host)
        {
            state.external_domains.push(host);
        }
    }

    /// A request handler feeding this observer, for [`crate::browser::BrowserPage::on_request`].
    pub fn handler(&self) -> RequestHandler {
        let observer = self.clone();
        Arc::new(move |event: RequestEvent| observer.record(&event))
    }

    /// Snapshot of the traffic seen so far.
    pub fn summary(&self) -> NetworkSummary {
        let state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        NetworkSummary {
            total_requests: state.total,
            external_domains: state.external_domains.clone(),
            types: state.types.clone(),
            requests: state.samples.clone(),
        }
    }
}
