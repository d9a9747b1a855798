//! IP geolocation.
//!
//! Looks up the landing host's IP address against an ip-api compatible HTTP
//! endpoint (`{endpoint}/{ip}`). The lookup is best-effort: any failure is
//! reported as the `"Unknown"` location.

mod lookup;
mod types;

// Re-export public API
pub use lookup::{location_label, lookup_ip};
pub use types::GeoIpResult;

/// Location label used when the lookup fails or has no data.
pub const UNKNOWN_LOCATION: &str = "Unknown";
