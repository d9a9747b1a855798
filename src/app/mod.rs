//! Application-level helpers shared by the library and the binary.

pub mod url;

pub use url::{host_of, is_https, normalize_target_url};
