//! Great-circle distance between ride endpoints
//!
//! The fare model works in kilometers rounded to two decimals, so both the
//! raw haversine distance and the rounded route distance live here.

use crate::constants::geo::EARTH_RADIUS_KM;
use crate::coord::Coordinates;

/// Calculate the distance between two points in kilometers (Haversine formula)
///
/// # Arguments
/// * `p1` - First point
/// * `p2` - Second point
///
/// # Returns
/// Distance in kilometers
pub fn haversine_km(p1: Coordinates, p2: Coordinates) -> f64 {
    let lat1 = p1.lat.to_radians();
    let lat2 = p2.lat.to_radians();
    let delta_lat = (p2.lat - p1.lat).to_radians();
    let delta_lng = (p2.lng - p1.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Route distance between two endpoints, rounded to 2 decimals
pub fn route_distance_km(p1: Coordinates, p2: Coordinates) -> f64 {
    round2(haversine_km(p1, p2))
}

/// Round to 2 decimal places
pub fn round2(km: f64) -> f64 {
    (km * 100.0).round() / 100.0
}
