//! Server intelligence for the landing host: IP, location and certificate.
//!
//! DNS resolution gates the section: when it fails the whole section is an
//! error object. Geolocation and certificate inspection then run concurrently
//! and each degrades on its own.

use std::net::IpAddr;
use std::sync::Arc;

use hickory_resolver::TokioAsyncResolver;
use log::debug;
use serde::{Serialize, Serializer};

use crate::app::{host_of, is_https};
use crate::dns::resolve_host_to_ip;
use crate::error_handling::{PartialFailures, Section};
use crate::geoip::{location_label, lookup_ip, UNKNOWN_LOCATION};
use crate::tls::get_certificate_summary;

pub use crate::tls::CertificateSummary;

/// Certificate status of the landing host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsInfo {
    /// The page was served over plain HTTP.
    NoSsl,
    Certificate(CertificateSummary),
    /// Handshake or parsing failed; the message says why.
    Error(String),
}

impl Serialize for TlsInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TlsInfo::NoSsl => serializer.serialize_str("no-ssl"),
            TlsInfo::Certificate(summary) => summary.serialize(serializer),
            TlsInfo::Error(message) => serializer.serialize_str(&format!("Error: {message}")),
        }
    }
}

/// The `server_info` report section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ServerInfo {
    Resolved {
        ip: String,
        location: String,
        ssl: TlsInfo,
    },
    Failed {
        error: String,
    },
}

impl ServerInfo {
    /// Whether the landing host is HTTPS and its certificate could not be
    /// validated or read.
    pub fn has_certificate_error(&self) -> bool {
        matches!(
            self,
            ServerInfo::Resolved {
                ssl: TlsInfo::Error(_),
                ..
            }
        )
    }
}

/// Collaborators needed to gather server intelligence.
#[derive(Clone)]
pub struct ServerIntel {
    pub resolver: Arc<TokioAsyncResolver>,
    pub client: Arc<reqwest::Client>,
    pub geo_endpoint: String,
}

impl ServerIntel {
    /// Gathers IP, location and certificate details for the host of `final_url`.
    ///
    /// Degraded sub-steps are recorded in `failures`.
    pub async fn gather(&self, final_url: &str, failures: &PartialFailures) -> ServerInfo {
        let Some(host) = host_of(final_url) else {
            let message = format!("No host in final URL {final_url}");
            failures.record(Section::DnsResolution, &message);
            return ServerInfo::Failed { error: message };
        };

        let ip = match resolve_host_to_ip(&host, &self.resolver).await {
            Ok(ip) => ip,
            Err(e) => {
                let message = format!("DNS resolution failed for {host}: {e}");
                failures.record(Section::DnsResolution, &message);
                return ServerInfo::Failed { error: message };
            }
        };
        debug!("{host} resolved to {ip}");

        let (location, ssl) = tokio::join!(
            self.locate(&ip, failures),
            inspect_certificate(&host, &ip, is_https(final_url), failures)
        );

        ServerInfo::Resolved { ip, location, ssl }
    }

    async fn locate(&self, ip: &str, failures: &PartialFailures) -> String {
        match lookup_ip(&self.client, &self.geo_endpoint, ip).await {
            Ok(result) => location_label(&result),
            Err(e) => {
                failures.record(Section::Geolocation, format!("{ip}: {e}"));
                UNKNOWN_LOCATION.to_string()
            }
        }
    }
}

async fn inspect_certificate(
    host: &str,
    ip: &str,
    secure: bool,
    failures: &PartialFailures,
) -> TlsInfo {
    if !secure {
        return TlsInfo::NoSsl;
    }
    let certificate = match ip.parse::<IpAddr>() {
        Ok(addr) => get_certificate_summary(host, addr).await,
        Err(e) => Err(anyhow::anyhow!("Unusable address {ip} for {host}: {e}")),
    };
    match certificate {
        Ok(summary) => TlsInfo::Certificate(summary),
        Err(e) => {
            let message = e.to_string();
            failures.record(Section::TlsCertificate, &message);
            TlsInfo::Error(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::initialization::init_resolver;

    #[test]
    fn test_tls_info_serialization() {
        assert_eq!(serde_json::to_value(TlsInfo::NoSsl).unwrap(), "no-ssl");
        assert_eq!(
            serde_json::to_value(TlsInfo::Error("handshake failed".to_string())).unwrap(),
            "Error: handshake failed"
        );
        let cert = TlsInfo::Certificate(CertificateSummary {
            issuer_org: "Example CA".to_string(),
            subject_common_name: "example.com".to_string(),
            not_after: "2030-01-01T00:00:00Z".to_string(),
        });
        assert_eq!(
            serde_json::to_value(cert).unwrap()["issuer_org"],
            "Example CA"
        );
    }

    #[test]
    fn test_server_info_shapes() {
        let resolved = ServerInfo::Resolved {
            ip: "93.184.216.34".to_string(),
            location: "Unknown".to_string(),
            ssl: TlsInfo::NoSsl,
        };
        let json = serde_json::to_value(&resolved).unwrap();
        assert_eq!(json["ip"], "93.184.216.34");
        assert_eq!(json["ssl"], "no-ssl");

        let failed = ServerInfo::Failed {
            error: "DNS resolution failed".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&failed).unwrap()["error"],
            "DNS resolution failed"
        );
    }

    #[test]
    fn test_certificate_error_detection() {
        let broken = ServerInfo::Resolved {
            ip: "1.2.3.4".to_string(),
            location: "Unknown".to_string(),
            ssl: TlsInfo::Error("expired".to_string()),
        };
        assert!(broken.has_certificate_error());
        let plain = ServerInfo::Resolved {
            ip: "1.2.3.4".to_string(),
            location: "Unknown".to_string(),
            ssl: TlsInfo::NoSsl,
        };
        assert!(!plain.has_certificate_error());
    }

    #[tokio::test]
    async fn test_certificate_needs_a_usable_address() {
        let failures = PartialFailures::new();
        let ssl = inspect_certificate("example.com", "not-an-ip", true, &failures).await;
        match ssl {
            TlsInfo::Error(message) => assert!(message.contains("not-an-ip"), "{message}"),
            other => panic!("expected certificate error, got {other:?}"),
        }
        assert_eq!(failures.take()[0].section, Section::TlsCertificate);
    }

    #[tokio::test]
    async fn test_https_landing_inspects_resolved_address() {
        crate::initialization::init_crypto_provider();
        let intel = ServerIntel {
            resolver: init_resolver(),
            client: Arc::new(reqwest::Client::new()),
            geo_endpoint: "http://127.0.0.1:9".to_string(),
        };
        let failures = PartialFailures::new();
        let info = intel.gather("https://127.0.0.1:8443/", &failures).await;
        match info {
            ServerInfo::Resolved { ip, ssl, .. } => {
                assert_eq!(ip, "127.0.0.1");
                assert!(matches!(ssl, TlsInfo::Error(_)));
            }
            other => panic!("expected resolved server info, got {other:?}"),
        }
        assert!(failures
            .take()
            .iter()
            .any(|f| f.section == Section::TlsCertificate));
    }

    #[tokio::test]
    async fn test_unresolvable_host_fails_whole_section() {
        let intel = ServerIntel {
            resolver: init_resolver(),
            client: Arc::new(reqwest::Client::new()),
            geo_endpoint: "http://127.0.0.1:9".to_string(),
        };
        let failures = PartialFailures::new();
        let info = intel
            .gather("http://no-such-host.invalid/", &failures)
            .await;
        assert!(matches!(info, ServerInfo::Failed { .. }));
        assert_eq!(failures.take()[0].section, Section::DnsResolution);
    }

    #[tokio::test]
    async fn test_geolocation_failure_degrades_to_unknown() {
        let intel = ServerIntel {
            resolver: init_resolver(),
            client: Arc::new(reqwest::Client::new()),
            // Discard port; nothing listens there
            geo_endpoint: "http://127.0.0.1:9".to_string(),
        };
        let failures = PartialFailures::new();
        let info = intel.gather("http://127.0.0.1:8080/", &failures).await;
        assert_eq!(
            info,
            ServerInfo::Resolved {
                ip: "127.0.0.1".to_string(),
                location: UNKNOWN_LOCATION.to_string(),
                ssl: TlsInfo::NoSsl,
            }
        );
        assert_eq!(failures.take()[0].section, Section::Geolocation);
    }
}
