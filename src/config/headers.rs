//! HTTP header name constants.

// Security header names
pub const HEADER_CONTENT_SECURITY_POLICY: &str = "Content-Security-Policy";
pub const HEADER_STRICT_TRANSPORT_SECURITY: &str = "Strict-Transport-Security";
pub const HEADER_X_CONTENT_TYPE_OPTIONS: &str = "X-Content-Type-Options";
pub const HEADER_X_FRAME_OPTIONS: &str = "X-Frame-Options";
pub const HEADER_REFERRER_POLICY: &str = "Referrer-Policy";

/// Headers whose absence costs points in the technical score.
pub const RECOMMENDED_SECURITY_HEADERS: &[&str] = &[
    HEADER_CONTENT_SECURITY_POLICY,
    HEADER_X_FRAME_OPTIONS,
    HEADER_STRICT_TRANSPORT_SECURITY,
    HEADER_X_CONTENT_TYPE_OPTIONS,
];

/// Headers echoed into the report's `security_scan.headers` section.
///
/// Superset of [`RECOMMENDED_SECURITY_HEADERS`]; `Referrer-Policy` is reported
/// but not scored.
pub const REPORTED_SECURITY_HEADERS: &[&str] = &[
    HEADER_CONTENT_SECURITY_POLICY,
    HEADER_X_FRAME_OPTIONS,
    HEADER_STRICT_TRANSPORT_SECURITY,
    HEADER_X_CONTENT_TYPE_OPTIONS,
    HEADER_REFERRER_POLICY,
];

/// Value reported for a security header the page did not send.
pub const MISSING_HEADER_VALUE: &str = "Missing";
