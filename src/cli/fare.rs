//! Fare command handler
//!
//! Computes the fare band for a coordinate pair.

use crate::cli::parse_latlng;
use crate::config::Config;
use crate::error::Result;
use crate::fare::{FareBreakdown, FareParams};
use clap::Args;

/// Fare command arguments
#[derive(Args)]
pub struct FareArgs {
    /// Origin as "lat,lng"
    #[arg(long)]
    pub from: String,

    /// Destination as "lat,lng"
    #[arg(long)]
    pub to: String,

    /// Passenger seats offered
    #[arg(long, short = 's')]
    pub seats: Option<u32>,

    /// Vehicle mileage in km per liter
    #[arg(long)]
    pub mileage: Option<f64>,

    /// Fuel price per liter
    #[arg(long)]
    pub fuel_price: Option<f64>,
}

/// Run the fare command
pub fn run(args: FareArgs) -> Result<()> {
    let origin = parse_latlng(&args.from)?;
    let destination = parse_latlng(&args.to)?;

    let config = Config::load()?;
    let params = FareParams::new(
        args.mileage.unwrap_or(config.fare.mileage_km_per_liter),
        args.fuel_price.unwrap_or(config.fare.fuel_price_per_liter),
    );
    params.validate()?;
    let seats = args.seats.unwrap_or(config.fare.default_seats);

    let breakdown = FareBreakdown::between(origin, destination, &params, seats);

    println!("Distance:        {:.2} km", breakdown.distance_km);
    println!("Fuel needed:     {:.2} L", breakdown.fuel_needed_liters);
    println!("Total fuel cost: Rs. {:.0}", breakdown.total_fuel_cost);
    println!("Split {} ways:    Rs. {:.1}", seats + 1, breakdown.cost_per_person);
    println!();
    println!("Suggested fare:  Rs. {}", breakdown.suggested_fare);
    println!(
        "Allowed range:   Rs. {} - {}",
        breakdown.min_fare, breakdown.max_fare
    );

    Ok(())
}
