//! URLhaus host lookups (abuse.ch).
//!
//! `POST {endpoint}` with form field `host`; the API key travels in the
//! `Auth-Key` header.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Error, Result};
use async_trait::async_trait;
use log::debug;
use serde::Deserialize;

use super::{ThreatFeed, ThreatVerdict};
use crate::config::THREAT_TIMEOUT_SECS;

/// Host lookup response.
#[derive(Debug, Deserialize)]
pub struct UrlhausResponse {
    /// `"ok"`, `"no_results"`, `"invalid_host"`, ...
    pub query_status: String,
    #[serde(default)]
    pub urlhaus_reference: Option<String>,
    #[serde(default)]
    pub urls: Option<Vec<UrlhausEntry>>,
}

/// One malicious URL hosted on the queried host.
#[derive(Debug, Deserialize)]
pub struct UrlhausEntry {
    pub url: String,
    #[serde(default)]
    pub url_status: Option<String>,
    #[serde(default)]
    pub threat: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl UrlhausResponse {
    /// Interprets the response as a verdict.
    ///
    /// The host is malicious when the query succeeded and at least one URL is
    /// listed for it. `no_results` is a clean verdict; any other status is an
    /// error.
    pub fn into_verdict(self) -> Result<ThreatVerdict> {
        match self.query_status.as_str() {
            "ok" => {
                let urls = self.urls.unwrap_or_default();
                if urls.is_empty() {
                    return Ok(ThreatVerdict::clean());
                }
                let tags = urls.into_iter().flat_map(|entry| {
                    entry
                        .threat
                        .into_iter()
                        .chain(entry.tags.unwrap_or_default())
                });
                Ok(ThreatVerdict::malicious(tags))
            }
            "no_results" => Ok(ThreatVerdict::clean()),
            other => Err(Error::msg(format!("URLhaus query status: {other}"))),
        }
    }
}

/// URLhaus client.
#[derive(Debug, Clone)]
pub struct UrlhausClient {
    client: Arc<reqwest::Client>,
    endpoint: String,
    auth_key: String,
}

impl UrlhausClient {
    pub fn new(client: Arc<reqwest::Client>, endpoint: impl Into<String>, auth_key: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            auth_key: auth_key.into(),
        }
    }
}

#[async_trait]
impl ThreatFeed for UrlhausClient {
    async fn lookup(&self, host: &str) -> Result<ThreatVerdict> {
        debug!("Looking up {host} in URLhaus");
        let response: UrlhausResponse = self
            .client
            .post(&self.endpoint)
            .header("Auth-Key", &self.auth_key)
            .form(&[("host", host)])
            .timeout(Duration::from_secs(THREAT_TIMEOUT_SECS))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        response.into_verdict()
    }
}
