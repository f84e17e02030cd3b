//! ride-offer CLI entry point
//!
//! Ride offer form engine - geocoding, fare suggestion and submission

use ride_offer::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
