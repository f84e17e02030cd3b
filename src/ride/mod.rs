//! Ride submission
//!
//! Builds the offer payload from a consistent form state and posts it to
//! the ride backend. Submission is the only path where failures surface to
//! the user; lookup failures never reach this far.

use crate::error::{Error, Result};
use crate::form::state::{Endpoint, FormState};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

const USER_AGENT: &str = "ride-offer/0.1.0";

/// Payload for offering a ride
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferRideRequest {
    pub origin: String,
    pub destination: String,
    pub start_lat: f64,
    pub start_lng: f64,
    pub end_lat: f64,
    pub end_lng: f64,
    pub departure_time: NaiveDateTime,
    pub seats_offered: u32,
    pub price_per_seat: i64,
}

impl OfferRideRequest {
    /// Build the payload from a form session's state
    ///
    /// Fails if either endpoint is unresolved or the fare is not positive;
    /// the form state is left intact either way so the user can fix and
    /// retry.
    pub fn from_form(state: &FormState) -> Result<Self> {
        let origin = state.record(Endpoint::Origin);
        let destination = state.record(Endpoint::Destination);

        if origin.label.trim().is_empty() {
            return Err(Error::Form("Origin is not set".to_string()));
        }
        if destination.label.trim().is_empty() {
            return Err(Error::Form("Destination is not set".to_string()));
        }

        let origin_coords = origin
            .coords
            .ok_or_else(|| Error::Form("Origin has no coordinates".to_string()))?;
        let destination_coords = destination
            .coords
            .ok_or_else(|| Error::Form("Destination has no coordinates".to_string()))?;

        let price_per_seat = state.fare().field.amount();
        if price_per_seat <= 0 {
            return Err(Error::InvalidFare("Please set a valid fare".to_string()));
        }

        Ok(Self {
            origin: origin.label.clone(),
            destination: destination.label.clone(),
            start_lat: origin_coords.lat,
            start_lng: origin_coords.lng,
            end_lat: destination_coords.lat,
            end_lng: destination_coords.lng,
            departure_time: state.departure(),
            seats_offered: state.fare().seat_count,
            price_per_seat,
        })
    }
}

/// Client for the ride backend
#[derive(Debug, Clone)]
pub struct RideClient {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl RideClient {
    /// Create a client against the given backend base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into(),
            auth_token: None,
        }
    }

    /// Attach a bearer token for authenticated endpoints
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.auth_token = (!token.is_empty()).then_some(token);
        self
    }

    /// Offer a ride
    ///
    /// Returns the backend confirmation message. A rejection surfaces the
    /// server's message verbatim so the caller can show it and retry.
    pub async fn offer_ride(&self, request: &OfferRideRequest) -> Result<String> {
        let url = format!("{}/api/rides/offer", self.base_url);

        let mut builder = self.client.post(&url).json(request);
        if let Some(token) = &self.auth_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Submission(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(Error::Submission(if body.is_empty() {
                format!("Backend returned status: {}", status)
            } else {
                body
            }));
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Coordinates;
    use crate::form::state::FormEvent;

    fn full_form() -> FormState {
        let mut state = FormState::default();
        state.apply(FormEvent::TextChanged(
            Endpoint::Origin,
            "Gulberg, Lahore".to_string(),
        ));
        state.apply(FormEvent::MapDragged(
            Endpoint::Origin,
            Coordinates::new(31.5204, 74.3587),
        ));
        state.apply(FormEvent::TextChanged(
            Endpoint::Destination,
            "Johar Town, Lahore".to_string(),
        ));
        state.apply(FormEvent::MapDragged(
            Endpoint::Destination,
            Coordinates::new(31.4697, 74.2728),
        ));
        state
    }

    #[test]
    fn test_from_form_complete() {
        let state = full_form();
        let request = OfferRideRequest::from_form(&state).unwrap();

        assert_eq!(request.origin, "Gulberg, Lahore");
        assert_eq!(request.destination, "Johar Town, Lahore");
        assert_eq!(request.start_lat, 31.5204);
        assert_eq!(request.end_lng, 74.2728);
        assert_eq!(request.seats_offered, 3);
        // The auto-suggested fare carried over
        assert!(request.price_per_seat > 0);
    }

    #[test]
    fn test_from_form_requires_labels_and_coords() {
        let state = FormState::default();
        assert!(matches!(
            OfferRideRequest::from_form(&state),
            Err(Error::Form(_))
        ));

        // A label alone is not enough
        let mut state = FormState::default();
        state.apply(FormEvent::TextChanged(
            Endpoint::Origin,
            "Gulberg".to_string(),
        ));
        state.apply(FormEvent::TextChanged(
            Endpoint::Destination,
            "Johar Town".to_string(),
        ));
        assert!(matches!(
            OfferRideRequest::from_form(&state),
            Err(Error::Form(_))
        ));
    }

    #[test]
    fn test_from_form_rejects_zero_fare() {
        // A zero-length route derives a zero fare
        let mut state = FormState::default();
        let spot = Coordinates::new(31.5204, 74.3587);
        state.apply(FormEvent::TextChanged(Endpoint::Origin, "Here".to_string()));
        state.apply(FormEvent::MapDragged(Endpoint::Origin, spot));
        state.apply(FormEvent::TextChanged(
            Endpoint::Destination,
            "Also here".to_string(),
        ));
        state.apply(FormEvent::MapDragged(Endpoint::Destination, spot));

        assert!(matches!(
            OfferRideRequest::from_form(&state),
            Err(Error::InvalidFare(_))
        ));
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let state = full_form();
        let request = OfferRideRequest::from_form(&state).unwrap();
        let json = serde_json::to_string(&request).unwrap();

        assert!(json.contains("\"startLat\""));
        assert!(json.contains("\"endLng\""));
        assert!(json.contains("\"departureTime\""));
        assert!(json.contains("\"seatsOffered\""));
        assert!(json.contains("\"pricePerSeat\""));
    }

    #[test]
    fn test_client_auth_token() {
        let client = RideClient::new("http://localhost:8080").with_auth_token("jwt");
        assert_eq!(client.auth_token.as_deref(), Some("jwt"));

        let client = RideClient::new("http://localhost:8080").with_auth_token("");
        assert!(client.auth_token.is_none());
    }
}
