//! Threat-feed correlation.
//!
//! The landing host is looked up against an external reputation feed. The
//! lookup is best-effort: any failure yields [`ThreatVerdict::unknown`] and
//! never fails the scan.

mod urlhaus;

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::Serialize;

pub use urlhaus::{UrlhausClient, UrlhausEntry, UrlhausResponse};

/// Tag reported when the feed could not be consulted.
pub const UNKNOWN_TAG: &str = "unknown";

/// What the feed says about a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreatVerdict {
    pub malicious: bool,
    /// Threat categories and tags, sorted and unique.
    pub tags: BTreeSet<String>,
}

impl ThreatVerdict {
    /// Not malicious, no information.
    pub fn unknown() -> Self {
        Self {
            malicious: false,
            tags: BTreeSet::from([UNKNOWN_TAG.to_string()]),
        }
    }

    /// The feed knows nothing bad about the host.
    pub fn clean() -> Self {
        Self {
            malicious: false,
            tags: BTreeSet::new(),
        }
    }

    pub fn malicious<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            malicious: true,
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}

/// A reputation feed keyed by host name.
#[async_trait]
pub trait ThreatFeed: Send + Sync {
    /// Looks up `host`. Errors are reported to the caller, which degrades
    /// them to [`ThreatVerdict::unknown`].
    async fn lookup(&self, host: &str) -> anyhow::Result<ThreatVerdict>;
}

/// A feed that is never consulted; every lookup is `unknown`.
///
/// Used when no API key is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledFeed;

#[async_trait]
impl ThreatFeed for DisabledFeed {
    async fn lookup(&self, _host: &str) -> anyhow::Result<ThreatVerdict> {
        Ok(ThreatVerdict::unknown())
    }
}

#[async_trait]
impl<T: ThreatFeed + ?Sized> ThreatFeed for Box<T> {
    async fn lookup(&self, host: &str) -> anyhow::Result<ThreatVerdict> {
        (**self).lookup(host).await
    }
}
