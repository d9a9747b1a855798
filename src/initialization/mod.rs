//! Application initialization and resource setup.
//!
//! This module provides functions to initialize the shared resources of a scan:
//! - Logger (plain or JSON)
//! - HTTP client for side lookups
//! - DNS resolver
//! - The rustls crypto provider

mod client;
mod logger;
mod resolver;

use rustls::crypto::{ring::default_provider, CryptoProvider};

// Re-export public API
pub use client::init_client;
pub use logger::init_logger_with;
pub use resolver::init_resolver;

/// Initializes the crypto provider for TLS operations.
///
/// Configures the global crypto provider for `rustls`. This must be called before
/// any TLS connections are established.
pub fn init_crypto_provider() {
    // Reinstalling is harmless; the error only reports that one is already set
    let _ = CryptoProvider::install_default(default_provider());
}
