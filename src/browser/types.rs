//! Data exchanged with the browser collaborator.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{DEFAULT_USER_AGENT, VIEWPORT_HEIGHT, VIEWPORT_WIDTH};

/// Session launch options.
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    pub headless: bool,
    pub user_agent: String,
    pub viewport: (u32, u32),
    /// Browser executable; auto-detected when `None`.
    pub executable: Option<PathBuf>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            headless: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            viewport: (VIEWPORT_WIDTH, VIEWPORT_HEIGHT),
            executable: None,
        }
    }
}

/// When a navigation counts as finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitPolicy {
    /// `DOMContentLoaded` fired.
    DomContentLoaded,
    /// `load` fired.
    Load,
    /// `load` fired and the network has been quiet for a short settle window.
    NetworkIdle,
}

/// Screenshot encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenshotFormat {
    Jpeg,
    Png,
}

/// One request in a navigation's redirect ancestry.
///
/// `redirected_from` points at the request that answered with the redirect
/// leading here, so the list runs newest to oldest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestNode {
    pub url: String,
    pub redirected_from: Option<Box<RequestNode>>,
}

impl RequestNode {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            redirected_from: None,
        }
    }

    /// Builds the ancestry for a navigation that visited `urls` in order.
    ///
    /// Returns `None` for an empty list. The returned node is the terminal
    /// request; its `redirected_from` chain walks back to `urls[0]`.
    pub fn from_hops<I, S>(urls: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        urls.into_iter().fold(None, |previous, url| {
            Some(RequestNode {
                url: url.into(),
                redirected_from: previous.map(Box::new),
            })
        })
    }
}

/// The terminal response of a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationResponse {
    /// URL of the response (the landing URL).
    pub url: String,
    /// HTTP status of the terminal response.
    pub status: u16,
    /// Response headers, keys lowercased.
    pub headers: HashMap<String, String>,
    /// The request that produced this response.
    pub request: RequestNode,
}

impl NavigationResponse {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// An outbound request observed on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestEvent {
    pub url: String,
    pub method: String,
    pub resource_type: String,
}

/// Callback invoked for every outbound request of a page.
pub type RequestHandler = Arc<dyn Fn(RequestEvent) + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hops_builds_reverse_chain() {
        let node = RequestNode::from_hops(["http://a.test/", "http://b.test/", "http://c.test/"])
            .expect("non-empty chain");
        assert_eq!(node.url, "http://c.test/");
        let b = node.redirected_from.as_ref().unwrap();
        assert_eq!(b.url, "http://b.test/");
        let a = b.redirected_from.as_ref().unwrap();
        assert_eq!(a.url, "http://a.test/");
        assert!(a.redirected_from.is_none());
    }

    #[test]
    fn test_from_hops_empty() {
        assert!(RequestNode::from_hops(Vec::<String>::new()).is_none());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let mut headers = HashMap::new();
        headers.insert("x-frame-options".to_string(), "DENY".to_string());
        let response = NavigationResponse {
            url: "https://example.com/".to_string(),
            status: 200,
            headers,
            request: RequestNode::new("https://example.com/"),
        };
        assert_eq!(response.header("X-Frame-Options"), Some("DENY"));
        assert_eq!(response.header("Content-Security-Policy"), None);
    }
}
