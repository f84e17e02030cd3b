//! Geocoding module
//!
//! Provides address search (text to candidates), reverse geocoding
//! (coordinates to label) and single-shot device geolocation.

pub mod device;
pub mod nominatim;

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A geocoded location result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lng: f64,
    /// Display name (address or description)
    pub display_name: String,
}

impl GeoLocation {
    /// Coordinates of this location
    pub fn coords(&self) -> crate::coord::Coordinates {
        crate::coord::Coordinates::new(self.lat, self.lng)
    }
}

/// Trait for geocoding backends
///
/// Implementations must be thread-safe (Send + Sync) to be shared with
/// lookup tasks.
pub trait Geocoder: Send + Sync {
    /// Search for address candidates matching a free-text query
    ///
    /// Returns up to `limit` candidates, best match first. An empty result
    /// is not an error.
    fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<GeoLocation>>> + Send;

    /// Reverse geocode coordinates to a location
    ///
    /// Returns None if the service knows no address for the point
    fn reverse(
        &self,
        lat: f64,
        lng: f64,
    ) -> impl std::future::Future<Output = Result<Option<GeoLocation>>> + Send;
}

/// Trait for device position sources
///
/// A single-shot asynchronous position request; there is no watch stream.
pub trait Locator: Send + Sync {
    /// Get the device's current position
    fn locate(&self) -> impl std::future::Future<Output = Result<GeoLocation>> + Send;
}

/// Get the default device locator
pub fn get_locator() -> device::DeviceLocator {
    device::DeviceLocator::new()
}
