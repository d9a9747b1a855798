//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DEEP_LINK_CONCURRENCY, DEEP_LINK_LIMIT, DEFAULT_GEO_ENDPOINT, DEFAULT_THREAT_FEED_URL,
    DEFAULT_USER_AGENT, NAVIGATION_TIMEOUT_SECS, PROBE_TIMEOUT_SECS,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Scan configuration.
///
/// Parsed from the command line by the binary; library callers build it
/// directly, usually starting from `Config::default()`.
///
/// # Examples
///
/// ```no_run
/// use redirect_detector::Config;
///
/// let config = Config {
///     url: "example.com".to_string(),
///     deep_link_limit: 3,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "redirect_detector",
    about = "Renders a URL in a headless browser and reports redirects, deception signals and risk."
)]
pub struct Config {
    /// URL to analyze (http:// is assumed when no scheme is given)
    #[arg(value_parser)]
    pub url: String,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Primary page navigation timeout in seconds (fatal when exceeded)
    #[arg(long, default_value_t = NAVIGATION_TIMEOUT_SECS)]
    pub navigation_timeout_secs: u64,

    /// Per-link probe timeout in seconds
    #[arg(long, default_value_t = PROBE_TIMEOUT_SECS)]
    pub probe_timeout_secs: u64,

    /// Number of outbound links to probe (first-seen order, unique by href)
    #[arg(long, default_value_t = DEEP_LINK_LIMIT)]
    pub deep_link_limit: usize,

    /// Number of probe pages allowed open at once
    #[arg(long, default_value_t = DEEP_LINK_CONCURRENCY)]
    pub deep_link_concurrency: usize,

    /// User-Agent presented by the headless browser
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Chrome/Chromium executable (auto-detected when omitted)
    #[arg(long, env = "CHROME_PATH")]
    pub chrome_path: Option<PathBuf>,

    /// Geolocation endpoint, queried as `{endpoint}/{ip}`
    #[arg(long, default_value = DEFAULT_GEO_ENDPOINT)]
    pub geo_endpoint: String,

    /// Threat feed host-lookup endpoint (URLhaus API)
    #[arg(long, default_value = DEFAULT_THREAT_FEED_URL)]
    pub threat_feed_url: String,

    /// Threat feed API key; the lookup is skipped when absent
    #[arg(long, env = "URLHAUS_AUTH_KEY", hide_env_values = true)]
    pub threat_feed_key: Option<String>,

    /// Skip the primary page screenshot
    #[arg(long = "no-screenshot", action = clap::ArgAction::SetFalse)]
    pub screenshot: bool,

    /// Write the JSON report to this file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pub pretty: bool,
}

impl Config {
    /// Primary navigation timeout as a `Duration`.
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    /// Deep-link probe timeout as a `Duration`.
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: String::new(),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            navigation_timeout_secs: NAVIGATION_TIMEOUT_SECS,
            probe_timeout_secs: PROBE_TIMEOUT_SECS,
            deep_link_limit: DEEP_LINK_LIMIT,
            deep_link_concurrency: DEEP_LINK_CONCURRENCY,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            chrome_path: None,
            geo_endpoint: DEFAULT_GEO_ENDPOINT.to_string(),
            threat_feed_url: DEFAULT_THREAT_FEED_URL.to_string(),
            threat_feed_key: None,
            screenshot: true,
            output: None,
            pretty: false,
        }
    }
}
