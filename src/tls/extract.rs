//! Certificate field extraction.

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use x509_parser::certificate::X509Certificate;

const UNKNOWN: &str = "Unknown";

/// The certificate fields reported for a secure landing host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificateSummary {
    /// Issuer organization (O), or the full issuer name when it has none.
    pub issuer_org: String,
    /// Subject common name (CN), or the full subject name when it has none.
    pub subject_common_name: String,
    /// Expiry as an RFC 3339 UTC timestamp.
    pub not_after: String,
}

/// Parses a DER-encoded certificate and extracts the reported fields.
///
/// # Errors
///
/// Returns an error if the bytes are not a valid X.509 certificate.
pub fn summarize_certificate(der: &[u8]) -> Result<CertificateSummary> {
    let (_, cert) = x509_parser::parse_x509_certificate(der)
        .map_err(|e| anyhow::anyhow!("Certificate parsing failed: {e}"))?;
    Ok(summarize(&cert))
}

fn summarize(cert: &X509Certificate<'_>) -> CertificateSummary {
    let issuer = cert.issuer();
    let issuer_org = issuer
        .iter_organization()
        .next()
        .and_then(|attr| attr.as_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| fallback_name(issuer.to_string()));

    let subject = cert.subject();
    let subject_common_name = subject
        .iter_common_name()
        .next()
        .and_then(|attr| attr.as_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| fallback_name(subject.to_string()));

    let not_after = DateTime::<Utc>::from_timestamp(cert.validity().not_after.timestamp(), 0)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| UNKNOWN.to_string());

    CertificateSummary {
        issuer_org,
        subject_common_name,
        not_after,
    }
}

fn fallback_name(name: String) -> String {
    if name.is_empty() {
        UNKNOWN.to_string()
    } else {
        name
    }
}
