//! Reverse command handler
//!
//! Resolves a coordinate pair to an address label.

use crate::cli::parse_latlng;
use crate::config::Config;
use crate::error::Result;
use crate::geo::Geocoder;
use clap::Args;

/// Reverse command arguments
#[derive(Args)]
pub struct ReverseArgs {
    /// Coordinates as "lat,lng"
    pub position: String,
}

/// Run the reverse command
pub async fn run(args: ReverseArgs) -> Result<()> {
    let coords = parse_latlng(&args.position)?;

    let config = Config::load()?;
    let geocoder = config.geocode.backend();

    match geocoder.reverse(coords.lat, coords.lng).await? {
        Some(place) => println!("{}", place.display_name),
        None => println!("No address found at {}", coords),
    }

    Ok(())
}
