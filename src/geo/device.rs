//! Device geolocation
//!
//! Single-shot position lookup via ip-api.com, the headless equivalent of
//! the platform geolocation API. Denial and timeout both surface as
//! `Error::Geolocation`; the caller leaves form state untouched on failure.

use crate::constants::api::IP_API_URL;
use crate::constants::timing::GEOLOCATION_TIMEOUT_SECS;
use crate::error::{Error, Result};
use crate::geo::{GeoLocation, Locator};
use serde::Deserialize;
use std::time::Duration;

/// IP-based device position source
#[derive(Debug, Clone)]
pub struct DeviceLocator {
    client: reqwest::Client,
    url: String,
}

/// ip-api.com response
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
    #[serde(rename = "regionName")]
    region_name: Option<String>,
    country: Option<String>,
}

impl DeviceLocator {
    /// Create a new locator against the public API
    pub fn new() -> Self {
        Self::with_url(IP_API_URL)
    }

    /// Create a locator against a specific URL
    pub fn with_url(url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(GEOLOCATION_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            url: url.into(),
        }
    }

    /// Build a display name from whatever locality fields are present
    fn display_name(data: &IpApiResponse) -> String {
        let name = [
            data.city.clone(),
            data.region_name.clone(),
            data.country.clone(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ");

        if name.is_empty() {
            "Current Location".to_string()
        } else {
            name
        }
    }
}

impl Default for DeviceLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl Locator for DeviceLocator {
    async fn locate(&self) -> Result<GeoLocation> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::Geolocation(format!("Position request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Geolocation(format!(
                "Position API returned status: {}",
                response.status()
            )));
        }

        let data: IpApiResponse = response
            .json()
            .await
            .map_err(|e| Error::Geolocation(format!("Failed to parse position response: {}", e)))?;

        if data.status != "success" {
            return Err(Error::Geolocation("Position lookup failed".to_string()));
        }

        let lat = data
            .lat
            .ok_or_else(|| Error::Geolocation("No latitude in response".to_string()))?;
        let lng = data
            .lon
            .ok_or_else(|| Error::Geolocation("No longitude in response".to_string()))?;
        let display_name = Self::display_name(&data);

        Ok(GeoLocation {
            lat,
            lng,
            display_name,
        })
    }
}
