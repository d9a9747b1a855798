//! Deep-link probing.
//!
//! A bounded sample of the page's outbound links is opened, each in its own
//! page of the scan's browser session, to see where the link really lands.
//! Probes are independent: one failing or timing out only marks its own entry.

use std::collections::HashSet;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use log::{debug, info};
use serde::Serialize;

use super::dom::OutboundLink;
use super::redirects::{reconstruct_chain, RedirectHop};
use crate::browser::{BrowserPage, BrowserSession, WaitPolicy};
use crate::error_handling::BrowserError;
use crate::utils::sanitize::sanitize_and_truncate_error_message;

/// Outcome of probing one link.
///
/// Successful probes carry `final_url`, `chain` and `redirected`; failed
/// probes carry `error` instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeepLinkResult {
    pub original_text: String,
    pub original_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain: Option<Vec<RedirectHop>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeepLinkResult {
    fn landed(link: OutboundLink, final_url: String, chain: Vec<RedirectHop>) -> Self {
        let redirected = is_redirect(&link.href, &final_url);
        Self {
            original_text: link.text,
            original_url: link.href,
            final_url: Some(final_url),
            chain: Some(chain),
            redirected: Some(redirected),
            error: None,
        }
    }

    fn failed(link: OutboundLink, error: &BrowserError) -> Self {
        Self {
            original_text: link.text,
            original_url: link.href,
            final_url: None,
            chain: None,
            redirected: None,
            error: Some(sanitize_and_truncate_error_message(&error.to_string())),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Whether landing on `final_url` after requesting `requested` counts as a
/// redirect. A difference of only a trailing slash does not.
pub fn is_redirect(requested: &str, final_url: &str) -> bool {
    requested != final_url && format!("{requested}/") != final_url
}

/// The first `limit` links unique by href, in first-seen order.
pub fn select_links(links: &[OutboundLink], limit: usize) -> Vec<OutboundLink> {
    let mut seen = HashSet::new();
    links
        .iter()
        .filter(|link| seen.insert(link.href.as_str()))
        .take(limit)
        .cloned()
        .collect()
}

/// Probes up to `limit` links with at most `concurrency` probe pages open.
///
/// Results follow link order regardless of completion order, one entry per
/// probed link.
pub async fn probe_links<S>(
    session: &S,
    links: &[OutboundLink],
    limit: usize,
    concurrency: usize,
    timeout: Duration,
) -> Vec<DeepLinkResult>
where
    S: BrowserSession,
{
    let targets = select_links(links, limit);
    if targets.is_empty() {
        return Vec::new();
    }
    info!(
        "Probing {} of {} outbound links ({} at a time)",
        targets.len(),
        links.len(),
        concurrency.max(1)
    );

    stream::iter(targets)
        .map(|link| probe_link(session, link, timeout))
        .buffered(concurrency.max(1))
        .collect()
        .await
}

async fn probe_link<S>(session: &S, link: OutboundLink, timeout: Duration) -> DeepLinkResult
where
    S: BrowserSession,
{
    // Opening the page and following the link share one budget
    let deadline = tokio::time::Instant::now() + timeout;
    let opened = match tokio::time::timeout_at(deadline, session.new_page()).await {
        Ok(opened) => opened,
        Err(_) => Err(BrowserError::Timeout(timeout)),
    };
    let page = match opened {
        Ok(page) => page,
        Err(e) => {
            debug!("Probe page for {} could not open: {e}", link.href);
            return DeepLinkResult::failed(link, &e);
        }
    };

    let outcome = match tokio::time::timeout_at(deadline, follow(&page, &link.href, timeout)).await
    {
        Ok(outcome) => outcome,
        Err(_) => Err(BrowserError::Timeout(timeout)),
    };

    if let Err(e) = page.close().await {
        debug!("Closing probe page for {} failed: {e}", link.href);
    }

    match outcome {
        Ok((final_url, chain)) => {
            debug!("Probe {} landed on {final_url}", link.href);
            DeepLinkResult::landed(link, final_url, chain)
        }
        Err(e) => {
            debug!("Probe {} failed: {e}", link.href);
            DeepLinkResult::failed(link, &e)
        }
    }
}

async fn follow<P>(
    page: &P,
    url: &str,
    timeout: Duration,
) -> Result<(String, Vec<RedirectHop>), BrowserError>
where
    P: BrowserPage,
{
    let response = page.goto(url, WaitPolicy::DomContentLoaded, timeout).await?;
    let final_url = page.url().await?;
    let chain = reconstruct_chain(response.as_ref(), url, &final_url);
    Ok((final_url, chain))
}
