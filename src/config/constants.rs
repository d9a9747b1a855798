//! Configuration constants.
//!
//! This module defines the operational limits and timeouts used throughout the
//! scan pipeline. CLI-tunable values have their defaults here as well.

use std::time::Duration;

// Primary navigation and deep-link probing
/// Primary page navigation timeout in seconds.
/// Exceeding it is fatal to the whole scan.
pub const NAVIGATION_TIMEOUT_SECS: u64 = 15;
/// Per-link deep probe navigation timeout in seconds.
pub const PROBE_TIMEOUT_SECS: u64 = 10;
/// Maximum number of outbound links probed per scan (first-seen order).
pub const DEEP_LINK_LIMIT: usize = 5;
/// Maximum number of probe pages open at the same time.
pub const DEEP_LINK_CONCURRENCY: usize = 3;
/// Network silence required after the load event before a page counts as idle.
pub const NETWORK_IDLE_SETTLE: Duration = Duration::from_millis(500);

// Network operation timeouts
/// DNS query timeout in seconds
pub const DNS_TIMEOUT_SECS: u64 = 3;
/// TCP connection timeout in seconds
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 5;
/// TLS handshake timeout in seconds
pub const TLS_HANDSHAKE_TIMEOUT_SECS: u64 = 5;
/// Geolocation lookup timeout in seconds
pub const GEO_TIMEOUT_SECS: u64 = 3;
/// Threat feed lookup timeout in seconds
pub const THREAT_TIMEOUT_SECS: u64 = 5;

// Network observer limits
/// Maximum number of request samples kept for the primary page.
pub const MAX_NETWORK_SAMPLES: usize = 50;
/// Maximum length of a sampled request URL (characters).
pub const MAX_SAMPLE_URL_CHARS: usize = 200;
/// Maximum number of distinct external hosts reported.
pub const MAX_EXTERNAL_DOMAINS: usize = 15;

// DOM extraction limits
/// Maximum anchor text length kept per outbound link (characters).
pub const MAX_LINK_TEXT_CHARS: usize = 50;
/// Label used for links whose anchor text is empty (image links, icons).
pub const EMPTY_LINK_TEXT_LABEL: &str = "Image/Icon";

// Browser presentation
/// Viewport width used for every page in the session.
pub const VIEWPORT_WIDTH: u32 = 1280;
/// Viewport height used for every page in the session.
pub const VIEWPORT_HEIGHT: u32 = 720;
/// JPEG quality for the primary page screenshot.
pub const SCREENSHOT_QUALITY: u8 = 50;

// Error message limits
/// Maximum error message length in characters (2000 chars)
/// Messages longer than this are truncated with a note about the original length
pub const MAX_ERROR_MESSAGE_LENGTH: usize = 2000;

/// Default User-Agent presented by the headless browser.
///
/// A desktop Chrome string; some phishing kits serve benign content to obvious
/// automation, so the default mimics a regular browser.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Default geolocation endpoint (ip-api.com JSON API, queried as `{endpoint}/{ip}`).
pub const DEFAULT_GEO_ENDPOINT: &str = "http://ip-api.com/json";

/// Default threat feed endpoint (URLhaus host lookup).
pub const DEFAULT_THREAT_FEED_URL: &str = "https://urlhaus-api.abuse.ch/v1/host/";
