//! Risk scoring.
//!
//! Two scores are produced from the same signals and kept distinct:
//! - a technical score (100 = clean, penalties for missing headers and
//!   structural red flags) with a `Safe` / `Caution` / `High Risk` verdict
//! - a deception score (0 = no signals, points for phishing indicators) with a
//!   `Low` / `Medium` / `High` verdict, forced to `Critical` when the threat
//!   feed lists the host
//!
//! [`assess`] is a pure function of its input.

mod heuristics;
mod penalties;

use serde::Serialize;

use crate::app::host_of;

pub use heuristics::{risky_tld, url_keyword, urgency_families};
use penalties::*;

/// Verdict derived from the technical score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TechnicalVerdict {
    Safe,
    Caution,
    #[serde(rename = "High Risk")]
    HighRisk,
}

impl TechnicalVerdict {
    pub fn from_score(score: u8) -> Self {
        if score >= SAFE_MIN_SCORE {
            TechnicalVerdict::Safe
        } else if score >= CAUTION_MIN_SCORE {
            TechnicalVerdict::Caution
        } else {
            TechnicalVerdict::HighRisk
        }
    }
}

/// Verdict derived from the deception score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum DeceptionVerdict {
    Low,
    Medium,
    High,
    Critical,
}

impl DeceptionVerdict {
    /// Maps a score to a verdict; a malicious feed hit always yields `Critical`.
    pub fn from_score(score: u8, malicious: bool) -> Self {
        if malicious {
            DeceptionVerdict::Critical
        } else if score < MEDIUM_MIN_SCORE {
            DeceptionVerdict::Low
        } else if score < HIGH_MIN_SCORE {
            DeceptionVerdict::Medium
        } else {
            DeceptionVerdict::High
        }
    }
}

/// Signals the scores are computed from.
#[derive(Debug, Clone, Default)]
pub struct ScoringInput<'a> {
    /// URL the scan was asked to load.
    pub requested_url: &'a str,
    /// URL the page landed on.
    pub final_url: &'a str,
    /// Number of redirect hops before the landing page.
    pub redirect_hops: usize,
    /// Recommended security headers absent from the landing response.
    pub missing_headers: Vec<&'a str>,
    pub hidden_iframes: usize,
    pub overlay_risks: usize,
    pub cross_domain_forms: usize,
    /// Names of suspicious code patterns found in the markup.
    pub suspicious_patterns: &'a [String],
    pub external_domains: usize,
    /// HTTPS landing page whose certificate could not be validated.
    pub certificate_error: bool,
    /// Page text searched for pressure language.
    pub page_text: &'a str,
    pub deep_links_probed: usize,
    pub deep_links_redirected: usize,
    pub malicious: bool,
    pub threat_tags: Vec<&'a str>,
}

/// Both scores, their verdicts and the plain-language summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskAssessment {
    pub risk_score: u8,
    pub verdict: TechnicalVerdict,
    pub phishing_score: u8,
    pub phishing_verdict: DeceptionVerdict,
    /// Ordered summary lines; the threat-feed line comes first when present.
    pub summary: Vec<String>,
}

fn clamp_score(score: i32) -> u8 {
    u8::try_from(score.clamp(0, 100)).unwrap_or(0)
}

fn without_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

/// The technical score: 100 minus fixed penalties, floored at 0.
pub fn technical_score(input: &ScoringInput<'_>) -> u8 {
    let mut score = TECHNICAL_START;
    score -= MISSING_HEADER_PENALTY * input.missing_headers.len() as i32;
    if input.hidden_iframes > 0 {
        score -= HIDDEN_IFRAME_PENALTY;
    }
    if input.overlay_risks > 0 {
        score -= OVERLAY_PENALTY;
    }
    if input.cross_domain_forms > 0 {
        score -= CROSS_DOMAIN_FORM_PENALTY;
    }
    score -= CONTENT_PATTERN_PENALTY * input.suspicious_patterns.len() as i32;
    if input.external_domains > EXTERNAL_DOMAIN_THRESHOLD {
        score -= EXTERNAL_DOMAIN_PENALTY;
    }
    if input.certificate_error {
        score -= CERTIFICATE_ERROR_PENALTY;
    }
    clamp_score(score)
}

/// Combines the signals into both scores, verdicts and the summary.
pub fn assess(input: &ScoringInput<'_>) -> RiskAssessment {
    let mut summary = Vec::new();
    let mut deception = 0;

    if input.malicious {
        deception += MALICIOUS_POINTS;
        let tags = if input.threat_tags.is_empty() {
            String::new()
        } else {
            format!(" (tags: {})", input.threat_tags.join(", "))
        };
        summary.push(format!(
            "CRITICAL: this host is listed by threat intelligence as malicious{tags}. Do not enter any information."
        ));
    }

    let final_host = host_of(input.final_url);
    let plain_http = url::Url::parse(input.final_url)
        .map(|u| u.scheme() == "http")
        .unwrap_or(false);
    if plain_http {
        deception += PLAIN_HTTP_POINTS;
        summary.push("The connection is not encrypted (plain HTTP).".to_string());
    }

    if input.overlay_risks > 0 {
        deception += OVERLAY_POINTS;
        summary.push(format!(
            "Invisible overlay elements could hijack clicks ({} found).",
            input.overlay_risks
        ));
    }
    if input.hidden_iframes > 0 {
        summary.push(format!(
            "Hidden iframes are embedded in the page ({} found).",
            input.hidden_iframes
        ));
    }
    if input.cross_domain_forms > 0 {
        summary.push(format!(
            "Forms send data to a different domain ({} found).",
            input.cross_domain_forms
        ));
    }

    if let Some(keyword) = url_keyword(input.final_url) {
        deception += URL_KEYWORD_POINTS;
        summary.push(format!("The URL contains the suspicious keyword \"{keyword}\"."));
    }

    if let Some(tld) = final_host.as_deref().and_then(risky_tld) {
        deception += RISKY_TLD_POINTS;
        summary.push(format!("The domain uses the high-risk top-level domain .{tld}."));
    }

    let families = urgency_families(input.page_text);
    if !families.is_empty() {
        deception += (URGENCY_POINTS_PER_FAMILY * families.len() as i32).min(URGENCY_POINTS_MAX);
        summary.push(format!(
            "The page uses pressure language ({}).",
            families.join(", ")
        ));
    }

    let requested_host = host_of(input.requested_url);
    if let (Some(requested), Some(landed)) = (requested_host.as_deref(), final_host.as_deref()) {
        if without_www(requested) != without_www(landed) {
            deception += HOST_CHANGED_POINTS;
            summary.push(format!("The page ended up on a different domain ({requested} -> {landed})."));
        }
    }
    if input.redirect_hops > 0 {
        summary.push(format!(
            "The page redirected {} time(s) before loading.",
            input.redirect_hops
        ));
    }

    if input.deep_links_redirected > 0 {
        summary.push(format!(
            "{} of {} sampled links redirect elsewhere.",
            input.deep_links_redirected, input.deep_links_probed
        ));
    }
    if !input.suspicious_patterns.is_empty() {
        summary.push(format!(
            "Suspicious code patterns found: {}.",
            input.suspicious_patterns.join(", ")
        ));
    }
    if !input.missing_headers.is_empty() {
        summary.push(format!(
            "Missing security headers: {}.",
            input.missing_headers.join(", ")
        ));
    }
    if input.certificate_error {
        summary.push("The TLS certificate could not be validated.".to_string());
    }
    if input.external_domains > EXTERNAL_DOMAIN_THRESHOLD {
        summary.push(format!(
            "The page contacts many third-party domains ({}).",
            input.external_domains
        ));
    }

    if summary.is_empty() {
        summary.push("No obvious deception signals were found.".to_string());
    }

    let risk_score = technical_score(input);
    let phishing_score = clamp_score(deception);
    RiskAssessment {
        risk_score,
        verdict: TechnicalVerdict::from_score(risk_score),
        phishing_score,
        phishing_verdict: DeceptionVerdict::from_score(phishing_score, input.malicious),
        summary,
    }
}
