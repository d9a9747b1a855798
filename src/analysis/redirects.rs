//! Redirect chain reconstruction.
//!
//! Walks a navigation's `redirected_from` ancestry back to the original request
//! and returns the hops oldest first, ending with the landing URL.

use serde::{Serialize, Serializer};

use crate::browser::NavigationResponse;

/// Status attached to a hop.
///
/// Intermediate hops carry a generic `Redirect` marker: the browser exposes the
/// ancestor requests but not their 3xx codes. The terminal hop carries the
/// real status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HopStatus {
    Code(u16),
    Redirect,
    NoResponse,
}

impl Serialize for HopStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            HopStatus::Code(code) => serializer.serialize_u16(*code),
            HopStatus::Redirect => serializer.serialize_str("Redirect"),
            HopStatus::NoResponse => serializer.serialize_str("no-response"),
        }
    }
}

/// One step of a redirect chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedirectHop {
    pub url: String,
    pub status: HopStatus,
}

/// Reconstructs the redirect chain of a navigation.
///
/// # Arguments
///
/// * `response` - The terminal navigation response, if the navigation produced one
/// * `original_url` - The URL that was requested
/// * `final_url` - The page's landing URL
///
/// # Returns
///
/// The hops in chronological order. Without a response the chain is the single
/// hop `{original_url, no-response}`.
pub fn reconstruct_chain(
    response: Option<&NavigationResponse>,
    original_url: &str,
    final_url: &str,
) -> Vec<RedirectHop> {
    let Some(response) = response else {
        return vec![RedirectHop {
            url: original_url.to_string(),
            status: HopStatus::NoResponse,
        }];
    };

    let mut chain = Vec::new();
    let mut current = response.request.redirected_from.as_deref();
    while let Some(origin) = current {
        chain.insert(
            0,
            RedirectHop {
                url: origin.url.clone(),
                status: HopStatus::Redirect,
            },
        );
        current = origin.redirected_from.as_deref();
    }

    chain.push(RedirectHop {
        url: final_url.to_string(),
        status: HopStatus::Code(response.status),
    });
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::RequestNode;
    use std::collections::HashMap;

    fn response(hops: &[&str], status: u16) -> NavigationResponse {
        NavigationResponse {
            url: hops.last().unwrap().to_string(),
            status,
            headers: HashMap::new(),
            request: RequestNode::from_hops(hops.iter().copied()).unwrap(),
        }
    }

    #[test]
    fn test_three_hop_redirect_yields_four_hops() {
        let resp = response(
            &[
                "http://start.test/",
                "http://one.test/",
                "http://two.test/",
                "https://landing.test/",
            ],
            200,
        );
        let chain = reconstruct_chain(Some(&resp), "http://start.test/", "https://landing.test/");

        assert_eq!(chain.len(), 4);
        assert_eq!(chain[0].url, "http://start.test/");
        assert_eq!(chain[1].url, "http://one.test/");
        assert_eq!(chain[2].url, "http://two.test/");
        assert_eq!(chain[3].url, "https://landing.test/");
        assert!(chain[..3].iter().all(|h| h.status == HopStatus::Redirect));
        assert_eq!(chain[3].status, HopStatus::Code(200));
    }

    #[test]
    fn test_direct_load_is_single_hop() {
        let resp = response(&["https://example.com/"], 404);
        let chain = reconstruct_chain(Some(&resp), "https://example.com/", "https://example.com/");
        assert_eq!(
            chain,
            vec![RedirectHop {
                url: "https://example.com/".to_string(),
                status: HopStatus::Code(404),
            }]
        );
    }

    #[test]
    fn test_missing_response_yields_no_response_hop() {
        let chain = reconstruct_chain(None, "http://example.com", "about:blank");
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].url, "http://example.com");
        assert_eq!(chain[0].status, HopStatus::NoResponse);
    }

    #[test]
    fn test_final_hop_uses_page_url() {
        // Client-side redirects move the page after the response arrived
        let resp = response(&["http://a.test/"], 200);
        let chain = reconstruct_chain(Some(&resp), "http://a.test/", "http://b.test/#welcome");
        assert_eq!(chain.last().unwrap().url, "http://b.test/#welcome");
    }

    #[test]
    fn test_hop_status_serialization() {
        let json = serde_json::to_value(vec![
            RedirectHop {
                url: "http://a.test/".to_string(),
                status: HopStatus::Redirect,
            },
            RedirectHop {
                url: "http://b.test/".to_string(),
                status: HopStatus::Code(200),
            },
        ])
        .unwrap();
        assert_eq!(json[0]["status"], "Redirect");
        assert_eq!(json[1]["status"], 200);
        assert_eq!(
            serde_json::to_value(HopStatus::NoResponse).unwrap(),
            "no-response"
        );
    }
}
