//! HTTP client initialization.
//!
//! One `reqwest::Client` serves the out-of-browser lookups of a scan
//! (geolocation and the threat feed).

use std::sync::Arc;
use std::time::Duration;

use reqwest::ClientBuilder;

use crate::config::{Config, TCP_CONNECT_TIMEOUT_SECS, THREAT_TIMEOUT_SECS};

/// Initializes the HTTP client used for side lookups.
///
/// The client carries the configured User-Agent, a short connect timeout and
/// an overall per-request timeout; individual lookups may apply a tighter
/// timeout of their own.
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_client(config: &Config) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let client = ClientBuilder::new()
        .connect_timeout(Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(THREAT_TIMEOUT_SECS))
        .user_agent(config.user_agent.clone())
        .build()?;
    Ok(Arc::new(client))
}
