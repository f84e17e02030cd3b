//! ride-offer: Ride Offer Form Engine
//!
//! A library and CLI tool for the ride-offering flow of a carpool app:
//! reconciling free-text search, map drags and device geolocation into one
//! consistent location record per endpoint, and deriving a per-seat fare
//! band from the route distance.
//!
//! ## Features
//!
//! - Event reducer over the two location records with request tokens, so
//!   stale lookup responses never clobber fresher input
//! - Trailing-edge debounce (800ms) for address search and reverse
//!   geocoding
//! - Nominatim geocoding + IP-based device position
//! - Fuel-cost fare model with a clamped suggestion band
//! - One-shot ride submission against the backend
//!
//! ## Quick Start
//!
//! ```rust
//! use ride_offer::coord::Coordinates;
//! use ride_offer::fare::{FareBreakdown, FareParams};
//!
//! let origin = Coordinates::new(31.5204, 74.3587); // Gulberg
//! let destination = Coordinates::new(31.4697, 74.2728); // Johar Town
//!
//! let fare = FareBreakdown::between(origin, destination, &FareParams::default(), 3);
//! println!(
//!     "{} km, suggested Rs. {} (Rs. {} - {})",
//!     fare.distance_km, fare.suggested_fare, fare.min_fare, fare.max_fare
//! );
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod coord;
pub mod error;
pub mod fare;
pub mod form;
pub mod geo;
pub mod ride;

// Re-export commonly used types
pub use config::Config;
pub use coord::Coordinates;
pub use error::{Error, Result};
pub use fare::{FareBreakdown, FareModel, FareParams, FareStage, FareStep};
pub use form::{Endpoint, FormEvent, FormSession, FormState};
pub use geo::{GeoLocation, Geocoder, Locator};
pub use ride::{OfferRideRequest, RideClient};
