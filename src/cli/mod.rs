//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod fare;
pub mod locate;
pub mod offer;
pub mod reverse;
pub mod search;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Ride offer toolkit: geocoding, fare suggestion and ride submission
#[derive(Parser)]
#[command(name = "ride-offer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search address candidates for a free-text query
    Search(search::SearchArgs),

    /// Reverse geocode coordinates to an address
    Reverse(reverse::ReverseArgs),

    /// Show the device's current position
    Locate(locate::LocateArgs),

    /// Compute the fare band for a route
    Fare(fare::FareArgs),

    /// Offer a ride
    Offer(offer::OfferArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

/// Run the CLI
pub async fn run() -> crate::error::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Search(args) => search::run(args).await,
        Commands::Reverse(args) => reverse::run(args).await,
        Commands::Locate(args) => locate::run(args).await,
        Commands::Fare(args) => fare::run(args),
        Commands::Offer(args) => offer::run(args).await,
        Commands::Config(args) => config::run(args),
    }
}

/// Parse a "lat,lng" pair
pub(crate) fn parse_latlng(s: &str) -> crate::error::Result<crate::coord::Coordinates> {
    let (lat, lng) = s
        .split_once(',')
        .ok_or_else(|| {
            crate::error::Error::InvalidCoordinates(format!("Expected \"lat,lng\", got: {}", s))
        })?;

    let lat: f64 = lat.trim().parse().map_err(|_| {
        crate::error::Error::InvalidCoordinates(format!("Invalid latitude: {}", lat))
    })?;
    let lng: f64 = lng.trim().parse().map_err(|_| {
        crate::error::Error::InvalidCoordinates(format!("Invalid longitude: {}", lng))
    })?;

    let coords = crate::coord::Coordinates::new(lat, lng);
    coords.validate()?;
    Ok(coords)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_latlng() {
        let coords = parse_latlng("31.5204, 74.3587").unwrap();
        assert_eq!(coords.lat, 31.5204);
        assert_eq!(coords.lng, 74.3587);
    }

    #[test]
    fn test_parse_latlng_invalid() {
        assert!(parse_latlng("31.5204").is_err());
        assert!(parse_latlng("north,east").is_err());
        assert!(parse_latlng("91.0,0.0").is_err());
    }
}
