//! DNS resolution of the landing host.
//!
//! Uses `hickory-resolver`; the resolver is created once per scan by
//! `initialization::init_resolver`.

mod resolution;

// Re-export public API
pub use resolution::resolve_host_to_ip;
