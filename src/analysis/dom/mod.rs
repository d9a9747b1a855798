//! DOM deception-signal extraction.
//!
//! A fixed inspection routine (`inspect.js`) runs once inside the loaded page
//! and returns raw findings. This module owns the shape of that payload and the
//! normalization applied to it in Rust: link filtering, text capping and
//! de-duplication.

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::browser::BrowserPage;
use crate::config::{EMPTY_LINK_TEXT_LABEL, MAX_LINK_TEXT_CHARS};
use crate::error_handling::BrowserError;
use crate::utils::truncate_chars;

/// Browser-side inspection routine. Takes no input beyond the loaded document.
pub const INSPECTION_SCRIPT: &str = include_str!("inspect.js");

/// Rendered box of an element, in CSS pixels relative to the viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxLocation {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HiddenIframe {
    pub src: String,
    /// Labels of the rules that fired, e.g. `"Opacity 0"`, `"Off-screen"`.
    pub risks: Vec<String>,
    pub location: BoxLocation,
}

/// An element that may intercept clicks while being close to invisible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayRisk {
    pub tag: String,
    #[serde(rename = "zIndex")]
    pub z_index: i64,
    /// Computed opacity as reported by the browser.
    pub opacity: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormRisk {
    pub action: String,
    pub method: String,
    pub warning: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundLink {
    pub text: String,
    pub href: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageUsage {
    pub cookies_count: usize,
    pub local_storage_entries: usize,
    pub session_storage_entries: usize,
}

/// Everything the inspection routine found on the page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DomSignals {
    pub hidden_iframes: Vec<HiddenIframe>,
    pub overlay_risks: Vec<OverlayRisk>,
    pub cross_domain_forms: Vec<FormRisk>,
    /// Absolute http(s) links, unique by href, in document order.
    pub links: Vec<OutboundLink>,
    pub storage: StorageUsage,
}

/// Top level of the inspection payload, before its entries are typed.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawSignals {
    hidden_iframes: Value,
    overlay_risks: Value,
    cross_domain_forms: Value,
    links: Value,
    storage: Value,
}

impl DomSignals {
    /// Parses the inspection payload and normalizes its link list.
    ///
    /// Entries are typed one by one: a malformed entry is dropped on its own
    /// and the rest of its section survives.
    pub fn from_value(value: Value) -> Result<Self, BrowserError> {
        let raw: RawSignals = serde_json::from_value(value)
            .map_err(|e| BrowserError::Evaluation(format!("unexpected inspection payload: {e}")))?;
        Ok(Self {
            hidden_iframes: typed_entries(raw.hidden_iframes),
            overlay_risks: typed_entries(raw.overlay_risks),
            cross_domain_forms: typed_entries(raw.cross_domain_forms),
            links: normalize_links(typed_entries(raw.links)),
            storage: serde_json::from_value(raw.storage).unwrap_or_default(),
        })
    }
}

fn typed_entries<T: DeserializeOwned>(section: Value) -> Vec<T> {
    match section {
        Value::Array(entries) => entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value(entry) {
                Ok(typed) => Some(typed),
                Err(e) => {
                    log::debug!("Dropping malformed inspection entry: {e}");
                    None
                }
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Keeps absolute http(s) links, first occurrence per href, with anchor text
/// capped and empty text replaced by a placeholder.
pub fn normalize_links(links: Vec<OutboundLink>) -> Vec<OutboundLink> {
    let mut seen = HashSet::new();
    links
        .into_iter()
        .filter(|link| is_http_link(&link.href))
        .filter(|link| seen.insert(link.href.clone()))
        .map(|link| {
            let text = link.text.trim();
            let text = if text.is_empty() {
                EMPTY_LINK_TEXT_LABEL.to_string()
            } else {
                truncate_chars(text, MAX_LINK_TEXT_CHARS)
            };
            OutboundLink {
                text,
                href: link.href,
            }
        })
        .collect()
}

fn is_http_link(href: &str) -> bool {
    url::Url::parse(href)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
        .unwrap_or(false)
}

/// Runs the inspection routine against a loaded page.
///
/// # Errors
///
/// Returns `BrowserError::Evaluation` when the script throws or returns a
/// payload of the wrong shape. Callers degrade to `DomSignals::default()`.
pub async fn extract_dom_signals<P>(page: &P) -> Result<DomSignals, BrowserError>
where
    P: BrowserPage + ?Sized,
{
    let value = page.evaluate(INSPECTION_SCRIPT).await?;
    DomSignals::from_value(value)
}
