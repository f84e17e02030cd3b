//! Error types for ride-offer

use thiserror::Error;

/// Main error type for ride-offer operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Invalid fare parameters: {0}")]
    InvalidFareParams(String),

    #[error("Invalid fare: {0}")]
    InvalidFare(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Geocoding error: {0}")]
    Geocoding(String),

    #[error("Geolocation error: {0}")]
    Geolocation(String),

    #[error("Form error: {0}")]
    Form(String),

    #[error("Submission rejected: {0}")]
    Submission(String),
}

/// Result type alias for ride-offer operations
pub type Result<T> = std::result::Result<T, Error>;
