//! Fixed score adjustments.

// Technical score: starts at 100, floored at 0
pub const TECHNICAL_START: i32 = 100;
pub const MISSING_HEADER_PENALTY: i32 = 10;
pub const HIDDEN_IFRAME_PENALTY: i32 = 20;
pub const OVERLAY_PENALTY: i32 = 25;
pub const CROSS_DOMAIN_FORM_PENALTY: i32 = 20;
pub const CONTENT_PATTERN_PENALTY: i32 = 10;
pub const EXTERNAL_DOMAIN_PENALTY: i32 = 10;
/// More distinct external domains than this costs [`EXTERNAL_DOMAIN_PENALTY`].
pub const EXTERNAL_DOMAIN_THRESHOLD: usize = 10;
pub const CERTIFICATE_ERROR_PENALTY: i32 = 10;

// Technical verdict bounds
pub const SAFE_MIN_SCORE: u8 = 80;
pub const CAUTION_MIN_SCORE: u8 = 50;

// Deception score: starts at 0, capped at 100
pub const PLAIN_HTTP_POINTS: i32 = 20;
pub const OVERLAY_POINTS: i32 = 30;
pub const URL_KEYWORD_POINTS: i32 = 15;
pub const RISKY_TLD_POINTS: i32 = 20;
pub const URGENCY_POINTS_PER_FAMILY: i32 = 10;
pub const URGENCY_POINTS_MAX: i32 = 30;
pub const HOST_CHANGED_POINTS: i32 = 10;
pub const MALICIOUS_POINTS: i32 = 100;

// Deception verdict bounds
pub const MEDIUM_MIN_SCORE: u8 = 30;
pub const HIGH_MIN_SCORE: u8 = 60;
