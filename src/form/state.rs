//! Form state and reducer
//!
//! All precedence rules live here, in pure synchronous code: typed text
//! only touches the label, map drags own the coordinates, candidate
//! selection is terminal, and every network result must present a token
//! that is still current to be applied. The async session merely executes
//! the [`Effect`]s this reducer emits.

use crate::constants::timing::{MIN_QUERY_LEN, SUGGESTION_LIMIT};
use crate::coord::Coordinates;
use crate::fare::{FareModel, FareParams, FareStep};
use crate::geo::GeoLocation;
use chrono::NaiveDateTime;
use serde::Serialize;

/// Origin or Destination slot of a ride offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Origin,
    Destination,
}

impl Endpoint {
    /// The opposite slot
    pub fn other(self) -> Self {
        match self {
            Self::Origin => Self::Destination,
            Self::Destination => Self::Origin,
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Origin => write!(f, "origin"),
            Self::Destination => write!(f, "destination"),
        }
    }
}

impl std::str::FromStr for Endpoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "origin" | "pickup" | "from" => Ok(Self::Origin),
            "destination" | "dropoff" | "to" => Ok(Self::Destination),
            _ => Err(format!("Unknown endpoint: {}", s)),
        }
    }
}

/// Kinds of asynchronous lookup a form endpoint can own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupKind {
    /// Free-text address search
    Suggest,
    /// Coordinates-to-label reverse geocode
    Reverse,
}

/// Identifies one issued lookup
///
/// A response is applied only while its token matches the current
/// generation for its (endpoint, kind) target; anything older is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RequestToken {
    pub endpoint: Endpoint,
    pub kind: LookupKind,
    seq: u64,
}

/// Monotonic generation counters, one per (endpoint, lookup-kind)
#[derive(Debug, Clone, Copy, Default, Serialize)]
struct TokenTable {
    seqs: [u64; 4],
}

impl TokenTable {
    fn slot(endpoint: Endpoint, kind: LookupKind) -> usize {
        let e = match endpoint {
            Endpoint::Origin => 0,
            Endpoint::Destination => 1,
        };
        let k = match kind {
            LookupKind::Suggest => 0,
            LookupKind::Reverse => 1,
        };
        e * 2 + k
    }

    /// Start a new generation for the target, invalidating prior tokens
    fn bump(&mut self, endpoint: Endpoint, kind: LookupKind) -> RequestToken {
        let slot = Self::slot(endpoint, kind);
        self.seqs[slot] += 1;
        RequestToken {
            endpoint,
            kind,
            seq: self.seqs[slot],
        }
    }

    fn bump_all(&mut self) {
        for seq in &mut self.seqs {
            *seq += 1;
        }
    }

    fn is_current(&self, token: RequestToken) -> bool {
        self.seqs[Self::slot(token.endpoint, token.kind)] == token.seq
    }
}

/// One endpoint's location record
///
/// The label may be free text not yet resolved to coordinates; coordinates
/// are either fully present or fully absent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LocationRecord {
    pub label: String,
    pub coords: Option<Coordinates>,
}

impl LocationRecord {
    /// Whether the record has resolved coordinates
    pub fn has_coords(&self) -> bool {
        self.coords.is_some()
    }
}

/// Tagged input events feeding the reducer
#[derive(Debug, Clone)]
pub enum FormEvent {
    /// An endpoint's input gained focus
    ActiveChanged(Endpoint),
    /// The user typed into an endpoint's text field
    TextChanged(Endpoint, String),
    /// The user dragged an endpoint's map pin
    MapDragged(Endpoint, Coordinates),
    /// The user toggled an endpoint's embedded map
    MapToggled(Endpoint),
    /// The device position request succeeded
    GeolocationResolved(Coordinates),
    /// The user picked an address candidate for the active endpoint
    CandidateSelected(GeoLocation),
    /// A suggestion lookup returned
    SuggestionsArrived(RequestToken, Vec<GeoLocation>),
    /// A reverse geocode returned
    LabelResolved(RequestToken, String),
    /// The user changed the offered seat count
    SeatsChanged(u32),
    /// The user changed the departure time
    DepartureChanged(NaiveDateTime),
    /// The form was torn down
    Closed,
}

/// Lookups the session must schedule for an applied event
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Search for address candidates after the debounce window
    DebounceSuggest {
        endpoint: Endpoint,
        query: String,
        token: RequestToken,
    },
    /// Reverse geocode after the debounce window
    DebounceReverse {
        endpoint: Endpoint,
        coords: Coordinates,
        token: RequestToken,
    },
    /// Reverse geocode immediately (discrete event, not a drag stream)
    ReverseNow {
        endpoint: Endpoint,
        coords: Coordinates,
        token: RequestToken,
    },
}

/// Complete state of one ride-offer form session
#[derive(Debug, Clone, Serialize)]
pub struct FormState {
    origin: LocationRecord,
    destination: LocationRecord,
    active: Option<Endpoint>,
    open_map: Option<Endpoint>,
    suggestions: Vec<GeoLocation>,
    fare: FareModel,
    departure: NaiveDateTime,
    tokens: TokenTable,
    closed: bool,
}

impl FormState {
    /// Create an empty form with the given cost parameters
    ///
    /// Departure defaults to now, matching what the form shows on open.
    pub fn new(params: FareParams) -> Self {
        Self {
            origin: LocationRecord::default(),
            destination: LocationRecord::default(),
            active: None,
            open_map: None,
            suggestions: Vec::new(),
            fare: FareModel::new(params),
            departure: chrono::Local::now().naive_local(),
            tokens: TokenTable::default(),
            closed: false,
        }
    }

    /// The record for an endpoint
    pub fn record(&self, endpoint: Endpoint) -> &LocationRecord {
        match endpoint {
            Endpoint::Origin => &self.origin,
            Endpoint::Destination => &self.destination,
        }
    }

    fn record_mut(&mut self, endpoint: Endpoint) -> &mut LocationRecord {
        match endpoint {
            Endpoint::Origin => &mut self.origin,
            Endpoint::Destination => &mut self.destination,
        }
    }

    /// The endpoint currently owning keyboard/map focus
    pub fn active(&self) -> Option<Endpoint> {
        self.active
    }

    /// The endpoint whose embedded map is expanded
    pub fn open_map(&self) -> Option<Endpoint> {
        self.open_map
    }

    /// Address candidates for the active endpoint
    pub fn suggestions(&self) -> &[GeoLocation] {
        &self.suggestions
    }

    /// The fare model
    pub fn fare(&self) -> &FareModel {
        &self.fare
    }

    /// Departure time carried on the form
    pub fn departure(&self) -> NaiveDateTime {
        self.departure
    }

    /// Whether the form has been torn down
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Whether a lookup token is still the current generation
    pub fn token_is_current(&self, token: RequestToken) -> bool {
        self.tokens.is_current(token)
    }

    /// Replace the cost parameters and recompute the fare band
    pub fn set_fare_params(&mut self, params: FareParams) {
        self.fare.params = params;
        self.recompute_fare();
    }

    /// Step the fare up within the band
    pub fn fare_increment(&mut self) -> FareStep {
        self.fare.increment()
    }

    /// Step the fare down within the band
    pub fn fare_decrement(&mut self) -> FareStep {
        self.fare.decrement()
    }

    /// Set the fare directly (manual edit)
    pub fn set_fare(&mut self, amount: i64) {
        self.fare.field.set_manual(amount);
    }

    fn recompute_fare(&mut self) {
        self.fare.recompute(self.origin.coords, self.destination.coords);
    }

    /// Move focus to an endpoint: clears suggestions, closes any open map,
    /// and invalidates the previous endpoint's pending suggestion lookups.
    fn focus(&mut self, endpoint: Endpoint) {
        if self.active != Some(endpoint) {
            if let Some(prev) = self.active {
                self.tokens.bump(prev, LookupKind::Suggest);
            }
            self.active = Some(endpoint);
        }
        self.suggestions.clear();
        self.open_map = None;
    }

    /// Whether the endpoint's suggestion list is empty
    ///
    /// The list is scoped to the active endpoint, so any other endpoint's
    /// list is vacuously empty.
    fn suggestions_empty_for(&self, endpoint: Endpoint) -> bool {
        self.active != Some(endpoint) || self.suggestions.is_empty()
    }

    /// Apply one event and return the lookups to schedule
    ///
    /// After [`FormEvent::Closed`] every event is a no-op.
    pub fn apply(&mut self, event: FormEvent) -> Vec<Effect> {
        if self.closed {
            return Vec::new();
        }

        match event {
            FormEvent::ActiveChanged(endpoint) => {
                self.focus(endpoint);
                Vec::new()
            }

            FormEvent::TextChanged(endpoint, text) => {
                if self.active != Some(endpoint) {
                    self.focus(endpoint);
                }
                self.record_mut(endpoint).label = text.clone();

                // Every keystroke supersedes the previous pending search
                let token = self.tokens.bump(endpoint, LookupKind::Suggest);
                if text.chars().count() < MIN_QUERY_LEN {
                    self.suggestions.clear();
                    Vec::new()
                } else {
                    vec![Effect::DebounceSuggest {
                        endpoint,
                        query: text,
                        token,
                    }]
                }
            }

            FormEvent::MapDragged(endpoint, coords) => {
                self.record_mut(endpoint).coords = Some(coords);
                self.recompute_fare();

                // A drag stream never clobbers an in-progress text search
                if self.suggestions_empty_for(endpoint) {
                    let token = self.tokens.bump(endpoint, LookupKind::Reverse);
                    vec![Effect::DebounceReverse {
                        endpoint,
                        coords,
                        token,
                    }]
                } else {
                    Vec::new()
                }
            }

            FormEvent::MapToggled(endpoint) => {
                if self.open_map == Some(endpoint) {
                    self.open_map = None;
                } else {
                    // Closing the other map suppresses its drag-stream
                    // reverse lookups
                    if let Some(prev) = self.open_map {
                        self.tokens.bump(prev, LookupKind::Reverse);
                    }
                    self.focus(endpoint);
                    self.open_map = Some(endpoint);
                }
                Vec::new()
            }

            FormEvent::GeolocationResolved(coords) => {
                self.origin.coords = Some(coords);
                self.recompute_fare();

                // Discrete event: resolve the label right away
                let token = self.tokens.bump(Endpoint::Origin, LookupKind::Reverse);
                vec![Effect::ReverseNow {
                    endpoint: Endpoint::Origin,
                    coords,
                    token,
                }]
            }

            FormEvent::CandidateSelected(candidate) => {
                let Some(endpoint) = self.active else {
                    return Vec::new();
                };

                let record = self.record_mut(endpoint);
                record.label = candidate.display_name.clone();
                record.coords = Some(candidate.coords());
                self.suggestions.clear();

                // Terminal: the candidate's label is trusted, so anything
                // still in flight for this endpoint is stale
                self.tokens.bump(endpoint, LookupKind::Suggest);
                self.tokens.bump(endpoint, LookupKind::Reverse);
                self.recompute_fare();
                Vec::new()
            }

            FormEvent::SuggestionsArrived(token, mut candidates) => {
                if self.tokens.is_current(token) && self.active == Some(token.endpoint) {
                    candidates.truncate(SUGGESTION_LIMIT);
                    self.suggestions = candidates;
                }
                Vec::new()
            }

            FormEvent::LabelResolved(token, label) => {
                if self.tokens.is_current(token) {
                    self.record_mut(token.endpoint).label = label;
                }
                Vec::new()
            }

            FormEvent::SeatsChanged(seats) => {
                self.fare.set_seats(seats);
                self.recompute_fare();
                Vec::new()
            }

            FormEvent::DepartureChanged(departure) => {
                self.departure = departure;
                Vec::new()
            }

            FormEvent::Closed => {
                self.closed = true;
                self.tokens.bump_all();
                Vec::new()
            }
        }
    }
}

impl Default for FormState {
    fn default() -> Self {
        Self::new(FareParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fare::FareStage;

    fn candidate(label: &str, lat: f64, lng: f64) -> GeoLocation {
        GeoLocation {
            lat,
            lng,
            display_name: label.to_string(),
        }
    }

    fn suggest_token(effects: &[Effect]) -> RequestToken {
        match effects {
            [Effect::DebounceSuggest { token, .. }] => *token,
            other => panic!("Expected a single suggest effect, got {:?}", other),
        }
    }

    fn reverse_token(effects: &[Effect]) -> RequestToken {
        match effects {
            [Effect::DebounceReverse { token, .. }] | [Effect::ReverseNow { token, .. }] => *token,
            other => panic!("Expected a single reverse effect, got {:?}", other),
        }
    }

    #[test]
    fn test_text_change_touches_label_only() {
        let mut state = FormState::default();
        state.apply(FormEvent::MapDragged(
            Endpoint::Origin,
            Coordinates::new(31.52, 74.36),
        ));

        state.apply(FormEvent::TextChanged(
            Endpoint::Origin,
            "Liberty Market".to_string(),
        ));

        let record = state.record(Endpoint::Origin);
        assert_eq!(record.label, "Liberty Market");
        // The provisional label never clears resolved coordinates
        assert_eq!(record.coords, Some(Coordinates::new(31.52, 74.36)));
    }

    #[test]
    fn test_short_query_clears_without_effect() {
        let mut state = FormState::default();
        let effects = state.apply(FormEvent::TextChanged(Endpoint::Origin, "la".to_string()));
        assert!(effects.is_empty());
        assert!(state.suggestions().is_empty());
    }

    #[test]
    fn test_newer_query_supersedes_pending_one() {
        let mut state = FormState::default();
        let first = suggest_token(&state.apply(FormEvent::TextChanged(
            Endpoint::Origin,
            "lahore".to_string(),
        )));
        let second = suggest_token(&state.apply(FormEvent::TextChanged(
            Endpoint::Origin,
            "lahore fort".to_string(),
        )));

        assert!(!state.token_is_current(first));
        assert!(state.token_is_current(second));

        // The stale response is discarded unapplied
        state.apply(FormEvent::SuggestionsArrived(
            first,
            vec![candidate("Stale", 0.0, 0.0)],
        ));
        assert!(state.suggestions().is_empty());

        state.apply(FormEvent::SuggestionsArrived(
            second,
            vec![candidate("Lahore Fort", 31.5880, 74.3142)],
        ));
        assert_eq!(state.suggestions().len(), 1);
        assert_eq!(state.suggestions()[0].display_name, "Lahore Fort");
    }

    #[test]
    fn test_suggestions_capped_at_limit() {
        let mut state = FormState::default();
        let token = suggest_token(&state.apply(FormEvent::TextChanged(
            Endpoint::Origin,
            "lahore".to_string(),
        )));

        let many: Vec<GeoLocation> = (0..8)
            .map(|i| candidate(&format!("Result {}", i), 31.0 + f64::from(i), 74.0))
            .collect();
        state.apply(FormEvent::SuggestionsArrived(token, many));
        assert_eq!(state.suggestions().len(), SUGGESTION_LIMIT);
    }

    #[test]
    fn test_endpoint_switch_drops_pending_suggestions() {
        let mut state = FormState::default();
        let token = suggest_token(&state.apply(FormEvent::TextChanged(
            Endpoint::Origin,
            "lahore".to_string(),
        )));

        state.apply(FormEvent::ActiveChanged(Endpoint::Destination));
        state.apply(FormEvent::SuggestionsArrived(
            token,
            vec![candidate("Lahore", 31.5204, 74.3587)],
        ));
        assert!(state.suggestions().is_empty());
    }

    #[test]
    fn test_map_drag_is_authoritative_and_schedules_reverse() {
        let mut state = FormState::default();
        state.apply(FormEvent::ActiveChanged(Endpoint::Origin));

        let coords = Coordinates::new(31.4697, 74.2728);
        let effects = state.apply(FormEvent::MapDragged(Endpoint::Origin, coords));

        assert_eq!(state.record(Endpoint::Origin).coords, Some(coords));
        assert_eq!(
            effects,
            vec![Effect::DebounceReverse {
                endpoint: Endpoint::Origin,
                coords,
                token: reverse_token(&effects),
            }]
        );
    }

    #[test]
    fn test_map_drag_suppressed_while_suggestions_pending() {
        let mut state = FormState::default();
        let token = suggest_token(&state.apply(FormEvent::TextChanged(
            Endpoint::Origin,
            "lahore".to_string(),
        )));
        state.apply(FormEvent::SuggestionsArrived(
            token,
            vec![candidate("Lahore", 31.5204, 74.3587)],
        ));

        let effects = state.apply(FormEvent::MapDragged(
            Endpoint::Origin,
            Coordinates::new(31.50, 74.30),
        ));
        assert!(effects.is_empty(), "No reverse lookup while picking from a list");
    }

    #[test]
    fn test_candidate_selection_is_terminal() {
        let mut state = FormState::default();

        // A drag schedules a reverse lookup that is still in flight...
        state.apply(FormEvent::ActiveChanged(Endpoint::Origin));
        let effects = state.apply(FormEvent::MapDragged(
            Endpoint::Origin,
            Coordinates::new(31.50, 74.30),
        ));
        let in_flight = reverse_token(&effects);

        // ...when the user picks a candidate from a fresh search
        let token = suggest_token(&state.apply(FormEvent::TextChanged(
            Endpoint::Origin,
            "liberty".to_string(),
        )));
        state.apply(FormEvent::SuggestionsArrived(
            token,
            vec![candidate("Liberty Market, Gulberg", 31.5102, 74.3441)],
        ));
        state.apply(FormEvent::CandidateSelected(candidate(
            "Liberty Market, Gulberg",
            31.5102,
            74.3441,
        )));

        let record = state.record(Endpoint::Origin);
        assert_eq!(record.label, "Liberty Market, Gulberg");
        assert_eq!(record.coords, Some(Coordinates::new(31.5102, 74.3441)));
        assert!(state.suggestions().is_empty());

        // The late reverse result must not overwrite the trusted label
        state.apply(FormEvent::LabelResolved(in_flight, "Somewhere stale".to_string()));
        assert_eq!(state.record(Endpoint::Origin).label, "Liberty Market, Gulberg");
    }

    #[test]
    fn test_map_toggle_closes_other_and_suppresses_its_reverse() {
        let mut state = FormState::default();
        state.apply(FormEvent::MapToggled(Endpoint::Origin));
        assert_eq!(state.open_map(), Some(Endpoint::Origin));
        assert_eq!(state.active(), Some(Endpoint::Origin));

        // Drag stream on the origin map leaves a pending reverse lookup
        let effects = state.apply(FormEvent::MapDragged(
            Endpoint::Origin,
            Coordinates::new(31.50, 74.30),
        ));
        let in_flight = reverse_token(&effects);

        state.apply(FormEvent::MapToggled(Endpoint::Destination));
        assert_eq!(state.open_map(), Some(Endpoint::Destination));
        assert!(state.suggestions().is_empty());
        assert!(!state.token_is_current(in_flight));

        // Toggling the open map again closes it
        state.apply(FormEvent::MapToggled(Endpoint::Destination));
        assert_eq!(state.open_map(), None);
    }

    #[test]
    fn test_geolocation_targets_origin_immediately() {
        let mut state = FormState::default();
        let coords = Coordinates::new(31.5204, 74.3587);
        let effects = state.apply(FormEvent::GeolocationResolved(coords));

        assert_eq!(state.record(Endpoint::Origin).coords, Some(coords));
        assert!(matches!(
            effects.as_slice(),
            [Effect::ReverseNow {
                endpoint: Endpoint::Origin,
                ..
            }]
        ));
    }

    #[test]
    fn test_fare_recomputes_on_route_and_seats() {
        let mut state = FormState::default();
        state.apply(FormEvent::MapDragged(
            Endpoint::Origin,
            Coordinates::new(31.5204, 74.3587),
        ));
        assert!(state.fare().breakdown.is_none());

        state.apply(FormEvent::MapDragged(
            Endpoint::Destination,
            Coordinates::new(31.4697, 74.2728),
        ));
        let first = state.fare().breakdown.expect("fare after full route");
        assert_eq!(state.fare().field.stage(), FareStage::AutoSuggested);
        assert_eq!(state.fare().field.amount(), first.suggested_fare);

        state.apply(FormEvent::SeatsChanged(1));
        let second = state.fare().breakdown.expect("fare after seat change");
        assert!(second.cost_per_person > first.cost_per_person);
        // The field was populated once; only the band moved
        assert_eq!(state.fare().field.amount(), first.suggested_fare);
    }

    #[test]
    fn test_fare_params_change_recomputes_band() {
        let mut state = FormState::default();
        state.apply(FormEvent::MapDragged(
            Endpoint::Origin,
            Coordinates::new(31.5204, 74.3587),
        ));
        state.apply(FormEvent::MapDragged(
            Endpoint::Destination,
            Coordinates::new(31.4697, 74.2728),
        ));
        let first = state.fare().breakdown.expect("fare after full route");

        // Fuel price doubles, so every derived figure moves up
        state.set_fare_params(FareParams::new(12.0, 560.0));
        let second = state.fare().breakdown.expect("fare after params change");
        assert_eq!(second.distance_km, first.distance_km);
        assert!(second.total_fuel_cost > first.total_fuel_cost);
        assert!(second.max_fare > first.max_fare);
    }

    #[test]
    fn test_closed_form_ignores_late_responses() {
        let mut state = FormState::default();
        let token = suggest_token(&state.apply(FormEvent::TextChanged(
            Endpoint::Origin,
            "lahore".to_string(),
        )));

        state.apply(FormEvent::Closed);
        assert!(state.is_closed());

        state.apply(FormEvent::SuggestionsArrived(
            token,
            vec![candidate("Lahore", 31.5204, 74.3587)],
        ));
        assert!(state.suggestions().is_empty());

        // All further input is inert
        let effects = state.apply(FormEvent::TextChanged(
            Endpoint::Destination,
            "model town".to_string(),
        ));
        assert!(effects.is_empty());
        assert_eq!(state.record(Endpoint::Destination).label, "");
    }

    #[test]
    fn test_endpoint_parsing() {
        assert_eq!("origin".parse::<Endpoint>().unwrap(), Endpoint::Origin);
        assert_eq!("to".parse::<Endpoint>().unwrap(), Endpoint::Destination);
        assert!("middle".parse::<Endpoint>().is_err());
        assert_eq!(Endpoint::Origin.other(), Endpoint::Destination);
    }
}
