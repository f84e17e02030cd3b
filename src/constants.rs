//! Centralized constants for the ride-offer crate
//!
//! This module consolidates constants that are used across multiple modules
//! to avoid duplication and ensure consistency.

/// Geographic constants
pub mod geo {
    /// Mean Earth radius in kilometers (WGS84 approximation)
    pub const EARTH_RADIUS_KM: f64 = 6371.0;
}

/// External API endpoints
pub mod api {
    /// OpenStreetMap Nominatim geocoding API
    pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

    /// IP geolocation API (free, no key required)
    pub const IP_API_URL: &str = "http://ip-api.com/json";
}

/// Lookup timing
pub mod timing {
    /// Trailing debounce window for suggestion and reverse-geocode lookups
    pub const DEBOUNCE_MS: u64 = 800;

    /// Maximum number of address suggestions per query
    pub const SUGGESTION_LIMIT: usize = 5;

    /// Minimum query length that triggers an address search; anything
    /// shorter clears the suggestion list without a lookup
    pub const MIN_QUERY_LEN: usize = 3;

    /// Timeout for the single-shot device position request
    pub const GEOLOCATION_TIMEOUT_SECS: u64 = 10;
}

/// Fare model parameters
pub mod fare {
    /// Default vehicle mileage in km per liter
    pub const DEFAULT_MILEAGE_KM_PER_LITER: f64 = 12.0;

    /// Default fuel price in rupees per liter
    pub const DEFAULT_FUEL_PRICE_PER_LITER: f64 = 280.0;

    /// Lower fare bound factor (~15% discount)
    pub const MIN_FARE_FACTOR: f64 = 0.85;

    /// Upper fare bound factor (30% leverage)
    pub const MAX_FARE_FACTOR: f64 = 1.30;

    /// Stepper decrement in rupees
    pub const STEP_DOWN: i64 = 5;

    /// Stepper increment in rupees
    pub const STEP_UP: i64 = 10;

    /// Minimum seats a driver can offer
    pub const MIN_SEATS: u32 = 1;

    /// Maximum seats a driver can offer
    pub const MAX_SEATS: u32 = 4;

    /// Default seats offered
    pub const DEFAULT_SEATS: u32 = 3;
}
