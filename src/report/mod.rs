//! The response document.
//!
//! [`RiskReport`] is the root aggregate of one scan. It serializes to the flat
//! JSON document consumers read; its field names are the wire contract.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::analysis::{
    DeepLinkResult, FormRisk, HiddenIframe, NetworkSummary, OverlayRisk, RedirectHop, StorageUsage,
};
use crate::browser::NavigationResponse;
use crate::config::{MISSING_HEADER_VALUE, RECOMMENDED_SECURITY_HEADERS, REPORTED_SECURITY_HEADERS};
use crate::error_handling::PartialFailure;
use crate::scoring::{DeceptionVerdict, TechnicalVerdict};
use crate::server_info::ServerInfo;
use crate::threat::ThreatVerdict;

/// Technical findings and the technical score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityScan {
    pub risk_score: u8,
    pub verdict: TechnicalVerdict,
    pub suspicious_patterns: Vec<String>,
    pub storage_usage: StorageUsage,
    /// Reported security headers: value sent, or `"Missing"`.
    pub headers: BTreeMap<String, String>,
    /// Base64 JPEG of the landing page; `null` when disabled or failed.
    pub screenshot: Option<String>,
}

/// Plain-language verdict for end users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimpleAnalysis {
    pub summary: Vec<String>,
    pub phishing_score: u8,
    pub phishing_verdict: DeceptionVerdict,
}

/// Everything one scan found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskReport {
    pub final_url: String,
    pub redirect_chain: Vec<RedirectHop>,
    pub hidden_iframes: Vec<HiddenIframe>,
    pub clickjacking_risks: Vec<OverlayRisk>,
    pub form_risks: Vec<FormRisk>,
    pub deep_scan_results: Vec<DeepLinkResult>,
    pub network_summary: NetworkSummary,
    pub security_scan: SecurityScan,
    pub server_info: ServerInfo,
    pub simple_analysis: SimpleAnalysis,
    pub threat_intel: ThreatVerdict,
    /// Sections that degraded, in order of occurrence.
    pub partial_failures: Vec<PartialFailure>,
}

impl RiskReport {
    /// Serializes the report as JSON.
    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

/// The reported security headers of a response, `"Missing"` when absent.
///
/// Without a response every header is missing.
pub fn security_headers(response: Option<&NavigationResponse>) -> BTreeMap<String, String> {
    REPORTED_SECURITY_HEADERS
        .iter()
        .map(|name| {
            let value = response
                .and_then(|r| r.header(name))
                .map(str::to_string)
                .unwrap_or_else(|| MISSING_HEADER_VALUE.to_string());
            ((*name).to_string(), value)
        })
        .collect()
}

/// The recommended headers absent from `headers`, in recommendation order.
pub fn missing_recommended_headers(headers: &BTreeMap<String, String>) -> Vec<&'static str> {
    RECOMMENDED_SECURITY_HEADERS
        .iter()
        .copied()
        .filter(|name| {
            headers
                .get(*name)
                .map_or(true, |value| value == MISSING_HEADER_VALUE)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::RequestNode;
    use std::collections::HashMap;

    fn response_with(headers: &[(&str, &str)]) -> NavigationResponse {
        NavigationResponse {
            url: "https://example.com/".to_string(),
            status: 200,
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), v.to_string()))
                .collect::<HashMap<_, _>>(),
            request: RequestNode::new("https://example.com/"),
        }
    }

    #[test]
    fn test_security_headers_marks_missing() {
        let response = response_with(&[
            ("Content-Security-Policy", "default-src 'self'"),
            ("X-Frame-Options", "DENY"),
        ]);
        let headers = security_headers(Some(&response));
        assert_eq!(headers.len(), REPORTED_SECURITY_HEADERS.len());
        assert_eq!(headers["X-Frame-Options"], "DENY");
        assert_eq!(headers["Strict-Transport-Security"], MISSING_HEADER_VALUE);
        assert_eq!(
            missing_recommended_headers(&headers),
            vec!["Strict-Transport-Security", "X-Content-Type-Options"]
        );
    }

    #[test]
    fn test_no_response_means_all_missing() {
        let headers = security_headers(None);
        assert!(headers.values().all(|v| v == MISSING_HEADER_VALUE));
        assert_eq!(
            missing_recommended_headers(&headers).len(),
            RECOMMENDED_SECURITY_HEADERS.len()
        );
    }
}
