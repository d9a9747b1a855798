//! GeoIP data structures.

use serde::Deserialize;

/// Geolocation lookup result, as returned by the endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GeoIpResult {
    /// `"success"` or `"fail"`
    pub status: String,
    /// Failure reason when `status` is `"fail"` (e.g. `"private range"`)
    pub message: Option<String>,
    pub country: Option<String>,
    #[serde(rename = "countryCode")]
    pub country_code: Option<String>,
    #[serde(rename = "regionName")]
    pub region: Option<String>,
    pub city: Option<String>,
    pub isp: Option<String>,
}

impl GeoIpResult {
    pub fn is_success(&self) -> bool {
        self.status.eq_ignore_ascii_case("success")
    }
}
