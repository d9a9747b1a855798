//! Geolocation lookups over HTTP.

use std::time::Duration;

use anyhow::{Error, Result};
use log::debug;

use super::types::GeoIpResult;
use super::UNKNOWN_LOCATION;
use crate::config::GEO_TIMEOUT_SECS;

/// Looks up an IP address at `{endpoint}/{ip}`.
///
/// # Errors
///
/// Returns an error on transport failure, timeout, a non-success HTTP status,
/// an unparsable body, or a `"fail"` lookup status.
pub async fn lookup_ip(client: &reqwest::Client, endpoint: &str, ip: &str) -> Result<GeoIpResult> {
    let url = format!("{}/{}", endpoint.trim_end_matches('/'), ip);
    debug!("Geolocating {ip} via {url}");

    let result: GeoIpResult = client
        .get(&url)
        .timeout(Duration::from_secs(GEO_TIMEOUT_SECS))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    if !result.is_success() {
        return Err(Error::msg(format!(
            "lookup failed: {}",
            result.message.as_deref().unwrap_or("no reason given")
        )));
    }
    Ok(result)
}

/// Human-readable location: `"City, Country"`, just the country when the city
/// is unknown, or `"Unknown"`.
pub fn location_label(result: &GeoIpResult) -> String {
    let non_empty = |value: &Option<String>| {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    match (non_empty(&result.city), non_empty(&result.country)) {
        (Some(city), Some(country)) => format!("{city}, {country}"),
        (None, Some(country)) => country,
        (Some(city), None) => city,
        (None, None) => UNKNOWN_LOCATION.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(city: Option<&str>, country: Option<&str>) -> GeoIpResult {
        GeoIpResult {
            status: "success".to_string(),
            city: city.map(str::to_string),
            country: country.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_location_label() {
        assert_eq!(
            location_label(&result(Some("Ashburn"), Some("United States"))),
            "Ashburn, United States"
        );
        assert_eq!(location_label(&result(None, Some("Germany"))), "Germany");
        assert_eq!(location_label(&result(Some(" "), Some("Germany"))), "Germany");
        assert_eq!(location_label(&result(None, None)), UNKNOWN_LOCATION);
    }

    #[test]
    fn test_result_deserializes_ip_api_shape() {
        let body = r#"{"status":"success","country":"United States","countryCode":"US",
            "regionName":"Virginia","city":"Ashburn","isp":"Example ISP","query":"1.2.3.4"}"#;
        let parsed: GeoIpResult = serde_json::from_str(body).unwrap();
        assert!(parsed.is_success());
        assert_eq!(parsed.country_code.as_deref(), Some("US"));
        assert_eq!(parsed.region.as_deref(), Some("Virginia"));
    }

    #[test]
    fn test_failed_lookup_shape() {
        let parsed: GeoIpResult =
            serde_json::from_str(r#"{"status":"fail","message":"private range"}"#).unwrap();
        assert!(!parsed.is_success());
        assert_eq!(parsed.message.as_deref(), Some("private range"));
    }
}
