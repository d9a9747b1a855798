//! TLS certificate inspection.
//!
//! Opens a direct connection to port 443 of the address the landing host
//! resolved to, completes a handshake for that host name against the webpki
//! roots and summarizes the leaf certificate: issuer organization, subject
//! common name and expiry.
//!
//! Uses `tokio-rustls` for the async handshake and `x509-parser` for certificate parsing.

mod extract;

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::debug;
use rustls::pki_types::ServerName;
use tokio::net::TcpStream;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;

use crate::config::{TCP_CONNECT_TIMEOUT_SECS, TLS_HANDSHAKE_TIMEOUT_SECS};

pub use extract::{summarize_certificate, CertificateSummary};

/// Retrieves a summary of the certificate served for `host` by `ip` on port 443.
///
/// The connection goes to `ip`; `host` is only used for SNI and verification.
///
/// # Errors
///
/// Returns an error if:
/// - The host name is invalid
/// - TCP connection fails or times out
/// - TLS handshake fails or times out (including untrusted or expired certificates)
/// - The server sends no certificate or it cannot be parsed
pub async fn get_certificate_summary(host: &str, ip: IpAddr) -> Result<CertificateSummary> {
    fetch_certificate(host, SocketAddr::new(ip, 443)).await
}

async fn fetch_certificate(host: &str, addr: SocketAddr) -> Result<CertificateSummary> {
    debug!("Inspecting TLS certificate of {host} at {addr}");

    let mut root_store = RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    let server_name = ServerName::try_from(host.to_string())
        .map_err(|e| anyhow::anyhow!("Invalid host name {host}: {e}"))?;

    let sock = match tokio::time::timeout(
        Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS),
        TcpStream::connect(addr),
    )
    .await
    {
        Ok(Ok(sock)) => sock,
        Ok(Err(e)) => return Err(anyhow::anyhow!("Failed to connect to {host} at {addr}: {e}")),
        Err(_) => {
            return Err(anyhow::anyhow!(
                "TCP connection timeout for {host} at {addr} ({TCP_CONNECT_TIMEOUT_SECS}s)"
            ))
        }
    };

    let connector = TlsConnector::from(Arc::new(config));
    let tls_stream = match tokio::time::timeout(
        Duration::from_secs(TLS_HANDSHAKE_TIMEOUT_SECS),
        connector.connect(server_name, sock),
    )
    .await
    {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => return Err(anyhow::anyhow!("TLS handshake failed for {host}: {e}")),
        Err(_) => {
            return Err(anyhow::anyhow!(
                "TLS handshake timeout for {host} ({TLS_HANDSHAKE_TIMEOUT_SECS}s)"
            ))
        }
    };

    let leaf = tls_stream
        .get_ref()
        .1
        .peer_certificates()
        .and_then(|certs| certs.first())
        .ok_or_else(|| anyhow::anyhow!("{host} presented no certificate"))?;

    let summary = summarize_certificate(leaf.as_ref())?;
    debug!(
        "Certificate of {host}: issuer {}, expires {}",
        summary.issuer_org, summary.not_after
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::net::TcpListener;

    const LOOPBACK: IpAddr = IpAddr::V4(std::net::Ipv4Addr::LOCALHOST);

    #[tokio::test]
    async fn test_invalid_host_name() {
        crate::initialization::init_crypto_provider();
        let result = get_certificate_summary("not a host name", LOOPBACK).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_connects_to_given_address_not_host() {
        crate::initialization::init_crypto_provider();
        let listener = TcpListener::bind((LOOPBACK, 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            // Accept and hang up before any TLS bytes are exchanged
            let (sock, peer) = listener.accept().await.unwrap();
            drop(sock);
            peer
        });

        let result = fetch_certificate("example.com", addr).await;

        let peer = server.await.unwrap();
        assert!(peer.ip().is_loopback());
        let message = result.unwrap_err().to_string();
        assert!(message.contains("example.com"), "{message}");
    }

    #[tokio::test]
    async fn test_closed_port_reports_address() {
        crate::initialization::init_crypto_provider();
        let listener = TcpListener::bind((LOOPBACK, 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let message = fetch_certificate("example.com", addr)
            .await
            .unwrap_err()
            .to_string();
        assert!(message.contains(&addr.to_string()), "{message}");
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_public_certificate() {
        crate::initialization::init_crypto_provider();
        let ip = tokio::net::lookup_host(("example.com", 443))
            .await
            .unwrap()
            .next()
            .unwrap()
            .ip();
        let summary = get_certificate_summary("example.com", ip).await.unwrap();
        assert!(!summary.issuer_org.is_empty());
        assert!(!summary.not_after.is_empty());
    }
}
