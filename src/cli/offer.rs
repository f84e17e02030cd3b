//! Offer command handler
//!
//! Resolves both endpoints, derives the fare and submits the ride.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::form::state::{Endpoint, FormEvent, FormState};
use crate::geo::nominatim::NominatimBackend;
use crate::geo::{get_locator, GeoLocation, Geocoder, Locator};
use crate::ride::{OfferRideRequest, RideClient};
use chrono::NaiveDateTime;
use clap::Args;

/// Offer command arguments
#[derive(Args)]
pub struct OfferArgs {
    /// Origin address (geocoded; defaults to the current position)
    #[arg(long, conflicts_with = "from_here")]
    pub from: Option<String>,

    /// Use the device's current position as origin
    #[arg(long)]
    pub from_here: bool,

    /// Destination address (geocoded)
    #[arg(long)]
    pub to: String,

    /// Departure time as "YYYY-MM-DD HH:MM" (defaults to now)
    #[arg(long, short = 'd')]
    pub departure: Option<String>,

    /// Passenger seats offered
    #[arg(long, short = 's')]
    pub seats: Option<u32>,

    /// Per-seat fare (defaults to the suggested fare)
    #[arg(long, short = 'p')]
    pub price: Option<i64>,
}

/// Run the offer command
pub async fn run(args: OfferArgs) -> Result<()> {
    let config = Config::load()?;
    let geocoder = config.geocode.backend();

    let origin = match &args.from {
        Some(query) => best_match(&geocoder, query).await?,
        None => {
            let position = get_locator().locate().await?;
            // Trade the coarse position name for a proper address
            match geocoder.reverse(position.lat, position.lng).await? {
                Some(address) => address,
                None => position,
            }
        }
    };
    let destination = best_match(&geocoder, &args.to).await?;

    let mut form = FormState::new(config.fare.params());
    form.apply(FormEvent::SeatsChanged(
        args.seats.unwrap_or(config.fare.default_seats),
    ));
    form.apply(FormEvent::ActiveChanged(Endpoint::Origin));
    form.apply(FormEvent::CandidateSelected(origin));
    form.apply(FormEvent::ActiveChanged(Endpoint::Destination));
    form.apply(FormEvent::CandidateSelected(destination));

    if let Some(departure) = &args.departure {
        form.apply(FormEvent::DepartureChanged(parse_departure(departure)?));
    }
    if let Some(price) = args.price {
        form.set_fare(price);
    }

    let request = OfferRideRequest::from_form(&form)?;

    println!("Origin:      {}", request.origin);
    println!("Destination: {}", request.destination);
    if let Some(breakdown) = form.fare().breakdown {
        println!("Distance:    {:.2} km", breakdown.distance_km);
        println!(
            "Fare band:   Rs. {} - {}",
            breakdown.min_fare, breakdown.max_fare
        );
    }
    println!(
        "Offering {} seat(s) at Rs. {} each, departing {}",
        request.seats_offered, request.price_per_seat, request.departure_time
    );

    let client =
        RideClient::new(&config.backend.base_url).with_auth_token(&config.backend.auth_token);
    let message = client.offer_ride(&request).await?;
    println!("{}", message);

    Ok(())
}

/// Geocode a query to its best match
async fn best_match(geocoder: &NominatimBackend, query: &str) -> Result<GeoLocation> {
    geocoder
        .search(query, 1)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| Error::Geocoding(format!("No match for '{}'", query)))
}

/// Parse a departure time in local form
fn parse_departure(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .map_err(|_| Error::Form(format!("Invalid departure time: {}", s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_departure() {
        let dt = parse_departure("2026-08-06 18:30").unwrap();
        assert_eq!(dt.format("%H:%M").to_string(), "18:30");

        // The HTML datetime-local shape is accepted too
        assert!(parse_departure("2026-08-06T18:30").is_ok());
        assert!(parse_departure("tomorrow evening").is_err());
    }
}
