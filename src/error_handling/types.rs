//! Error type definitions.
//!
//! This module defines the fatal error types, the browser collaborator's error
//! type, and the section labels used to record degraded sub-analyses.

use std::time::Duration;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use serde::Serialize;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Errors reported by the browser collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrowserError {
    /// The browser process or its configuration could not be started.
    #[error("Browser launch failed: {0}")]
    Launch(String),

    /// A page (tab) could not be opened or closed.
    #[error("Page operation failed: {0}")]
    Page(String),

    /// Navigation failed (DNS, connection, certificate, aborted load).
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// An operation exceeded its time budget.
    #[error("Timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Script evaluation inside the page failed or returned an unusable value.
    #[error("Script evaluation failed: {0}")]
    Evaluation(String),

    /// Any other DevTools protocol failure.
    #[error("Browser protocol error: {0}")]
    Protocol(String),
}

/// Fatal scan errors.
///
/// Anything not listed here degrades a single report section instead of
/// failing the scan.
#[derive(Error, Debug)]
pub enum ScanError {
    /// The target could not be turned into an http(s) URL.
    #[error("Invalid target URL: {0}")]
    InvalidUrl(String),

    /// The browser session could not be started.
    #[error("Failed to launch browser: {0}")]
    BrowserLaunch(#[source] BrowserError),

    /// The primary page could not be opened.
    #[error("Failed to open page: {0}")]
    PageOpen(#[source] BrowserError),

    /// The primary navigation failed or timed out.
    #[error("Failed to load page {url}: {source}")]
    Navigation {
        /// Normalized target URL
        url: String,
        /// Underlying browser error
        #[source]
        source: BrowserError,
    },
}

/// Report sections that can degrade independently.
///
/// Each degraded section is logged and recorded as a partial failure; the
/// scan itself still completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    RequestCapture,
    DomInspection,
    ContentFetch,
    Screenshot,
    DeepLinkProbe,
    DnsResolution,
    Geolocation,
    TlsCertificate,
    ThreatLookup,
    PageClose,
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::RequestCapture => "Request capture",
            Section::DomInspection => "DOM inspection",
            Section::ContentFetch => "Content fetch",
            Section::Screenshot => "Screenshot",
            Section::DeepLinkProbe => "Deep-link probe",
            Section::DnsResolution => "DNS resolution",
            Section::Geolocation => "Geolocation",
            Section::TlsCertificate => "TLS certificate",
            Section::ThreatLookup => "Threat lookup",
            Section::PageClose => "Page close",
        }
    }
}

/// A sub-analysis that failed without aborting the scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartialFailure {
    pub section: Section,
    pub message: String,
}

impl PartialFailure {
    /// Builds a partial failure with a sanitized, length-capped message.
    pub fn new(section: Section, message: impl AsRef<str>) -> Self {
        Self {
            section,
            message: crate::utils::sanitize::sanitize_and_truncate_error_message(
                message.as_ref(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_section_labels_are_unique() {
        let labels: std::collections::HashSet<&str> = Section::iter().map(|s| s.as_str()).collect();
        assert_eq!(labels.len(), Section::iter().count());
    }

    #[test]
    fn test_section_display_matches_as_str() {
        for section in Section::iter() {
            assert_eq!(section.to_string(), section.as_str());
        }
    }

    #[test]
    fn test_section_serializes_snake_case() {
        let json = serde_json::to_string(&Section::DomInspection).unwrap();
        assert_eq!(json, "\"dom_inspection\"");
    }

    #[test]
    fn test_browser_timeout_message() {
        let err = BrowserError::Timeout(Duration::from_secs(10));
        assert_eq!(err.to_string(), "Timed out after 10000ms");
    }

    #[test]
    fn test_navigation_error_names_url() {
        let err = ScanError::Navigation {
            url: "http://example.com".to_string(),
            source: BrowserError::Navigation("net::ERR_NAME_NOT_RESOLVED".to_string()),
        };
        let msg = err.to_string();
        assert!(msg.contains("http://example.com"));
        assert!(msg.contains("ERR_NAME_NOT_RESOLVED"));
    }

    #[test]
    fn test_partial_failure_strips_control_characters() {
        let failure = PartialFailure::new(Section::Geolocation, "bad\u{0007}gateway");
        assert_eq!(failure.message, "badgateway");
        assert_eq!(failure.section, Section::Geolocation);
    }
}
