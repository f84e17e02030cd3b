//! Async form session
//!
//! Owns a [`FormState`] and executes the reducer's effects: every debounced
//! lookup is an abortable task keyed by (endpoint, lookup-kind), and
//! scheduling a new lookup aborts its predecessor for the same key, which
//! is what makes the 800ms window trailing-edge. Network results re-enter
//! the reducer as events and are token-checked there, so a task that
//! escaped cancellation still cannot apply a stale result.

use crate::constants::timing::{DEBOUNCE_MS, SUGGESTION_LIMIT};
use crate::coord::Coordinates;
use crate::error::Result;
use crate::fare::{FareParams, FareStep};
use crate::form::state::{Effect, Endpoint, FormEvent, FormState, LookupKind, RequestToken};
use crate::geo::{GeoLocation, Geocoder, Locator};
use crate::ride::OfferRideRequest;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

type PendingKey = (Endpoint, LookupKind);

/// Input coordinator for one ride-offer form
///
/// All user-driven operations are synchronous mutations (visible in the
/// next snapshot); network-derived mutations happen later and only if not
/// superseded. Call [`close`](Self::close) on teardown to cancel pending
/// timers and invalidate anything still in flight.
pub struct FormSession<G, L> {
    state: Arc<Mutex<FormState>>,
    geocoder: Arc<G>,
    locator: Arc<L>,
    debounce: Duration,
    pending: Mutex<HashMap<PendingKey, JoinHandle<()>>>,
}

impl<G, L> FormSession<G, L>
where
    G: Geocoder + 'static,
    L: Locator + 'static,
{
    /// Create a session over empty location records
    pub fn new(geocoder: G, locator: L, params: FareParams) -> Self {
        Self {
            state: Arc::new(Mutex::new(FormState::new(params))),
            geocoder: Arc::new(geocoder),
            locator: Arc::new(locator),
            debounce: Duration::from_millis(DEBOUNCE_MS),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Override the debounce window
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// A copy of the current form state
    pub async fn snapshot(&self) -> FormState {
        self.state.lock().await.clone()
    }

    /// Move focus to an endpoint
    pub async fn set_active_endpoint(&self, endpoint: Endpoint) {
        self.apply(FormEvent::ActiveChanged(endpoint)).await;
    }

    /// The user typed into an endpoint's text field
    pub async fn text_changed(&self, endpoint: Endpoint, text: impl Into<String>) {
        self.apply(FormEvent::TextChanged(endpoint, text.into()))
            .await;
    }

    /// The user dragged an endpoint's map pin
    pub async fn map_dragged(&self, endpoint: Endpoint, coords: Coordinates) {
        self.apply(FormEvent::MapDragged(endpoint, coords)).await;
    }

    /// The user toggled an endpoint's embedded map
    pub async fn toggle_map(&self, endpoint: Endpoint) {
        self.apply(FormEvent::MapToggled(endpoint)).await;
    }

    /// Single-shot device position request targeting the origin
    ///
    /// On failure the form is left untouched and the failure kind is
    /// returned to the caller.
    pub async fn use_current_location(&self) -> Result<Coordinates> {
        let location = self.locator.locate().await?;
        let coords = Coordinates::new(location.lat, location.lng);
        self.apply(FormEvent::GeolocationResolved(coords)).await;
        Ok(coords)
    }

    /// The user picked an address candidate for the active endpoint
    pub async fn select_candidate(&self, candidate: GeoLocation) {
        let endpoint = {
            let mut state = self.state.lock().await;
            let endpoint = state.active();
            state.apply(FormEvent::CandidateSelected(candidate));
            endpoint
        };

        // Selection is terminal: the endpoint's debounce timers die with it
        if let Some(endpoint) = endpoint {
            self.abort_pending_for(endpoint).await;
        }
    }

    /// The user changed the offered seat count
    pub async fn seats_changed(&self, seats: u32) {
        self.apply(FormEvent::SeatsChanged(seats)).await;
    }

    /// The user changed the departure time
    pub async fn set_departure(&self, departure: NaiveDateTime) {
        self.apply(FormEvent::DepartureChanged(departure)).await;
    }

    /// Step the per-seat fare up within the band
    pub async fn fare_increment(&self) -> FareStep {
        self.state.lock().await.fare_increment()
    }

    /// Step the per-seat fare down within the band
    pub async fn fare_decrement(&self) -> FareStep {
        self.state.lock().await.fare_decrement()
    }

    /// Set the per-seat fare directly (manual edit)
    pub async fn set_fare(&self, amount: i64) {
        self.state.lock().await.set_fare(amount);
    }

    /// Build the submission payload from the current state
    pub async fn submission(&self) -> Result<OfferRideRequest> {
        OfferRideRequest::from_form(&*self.state.lock().await)
    }

    /// Tear the form down: cancel pending timers and invalidate in-flight
    /// lookups so late responses cannot mutate state
    pub async fn close(&self) {
        self.state.lock().await.apply(FormEvent::Closed);
        let mut pending = self.pending.lock().await;
        for (_, handle) in pending.drain() {
            handle.abort();
        }
    }

    /// Wait for every scheduled lookup to finish or be aborted
    ///
    /// Useful for embedders draining the session before reading a final
    /// snapshot, and for deterministic tests.
    pub async fn settle(&self) {
        loop {
            let handles: Vec<(PendingKey, JoinHandle<()>)> =
                { self.pending.lock().await.drain().collect() };
            if handles.is_empty() {
                break;
            }
            for (_, handle) in handles {
                let _ = handle.await;
            }
        }
    }

    async fn apply(&self, event: FormEvent) {
        let effects = self.state.lock().await.apply(event);
        self.dispatch(effects).await;
    }

    async fn dispatch(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::DebounceSuggest {
                    endpoint,
                    query,
                    token,
                } => self.spawn_suggest(endpoint, query, token).await,
                Effect::DebounceReverse {
                    endpoint,
                    coords,
                    token,
                } => self.spawn_reverse(endpoint, coords, token, true).await,
                Effect::ReverseNow {
                    endpoint,
                    coords,
                    token,
                } => self.spawn_reverse(endpoint, coords, token, false).await,
            }
        }
    }

    async fn spawn_suggest(&self, endpoint: Endpoint, query: String, token: RequestToken) {
        let state = Arc::clone(&self.state);
        let geocoder = Arc::clone(&self.geocoder);
        let debounce = self.debounce;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;

            let candidates = match geocoder.search(&query, SUGGESTION_LIMIT).await {
                Ok(candidates) => candidates,
                Err(e) => {
                    // Transient: the list resolves to empty, nothing surfaces
                    debug!("Suggestion lookup for {:?} failed: {}", query, e);
                    Vec::new()
                }
            };
            state
                .lock()
                .await
                .apply(FormEvent::SuggestionsArrived(token, candidates));
        });

        self.track(endpoint, LookupKind::Suggest, handle).await;
    }

    async fn spawn_reverse(
        &self,
        endpoint: Endpoint,
        coords: Coordinates,
        token: RequestToken,
        debounced: bool,
    ) {
        let state = Arc::clone(&self.state);
        let geocoder = Arc::clone(&self.geocoder);
        let debounce = self.debounce;

        let handle = tokio::spawn(async move {
            if debounced {
                tokio::time::sleep(debounce).await;

                // Drag-stream gate, evaluated when the timer fires: the
                // endpoint must still be active with no suggestions pending
                let state = state.lock().await;
                if !state.token_is_current(token)
                    || state.active() != Some(endpoint)
                    || !state.suggestions().is_empty()
                {
                    return;
                }
            }

            match geocoder.reverse(coords.lat, coords.lng).await {
                Ok(Some(location)) => {
                    state
                        .lock()
                        .await
                        .apply(FormEvent::LabelResolved(token, location.display_name));
                }
                // No address for the point: the label stays as it was
                Ok(None) => {}
                Err(e) => {
                    debug!("Reverse geocode of {} failed: {}", coords, e);
                }
            }
        });

        self.track(endpoint, LookupKind::Reverse, handle).await;
    }

    /// Register a lookup task, aborting any predecessor for the same key
    async fn track(&self, endpoint: Endpoint, kind: LookupKind, handle: JoinHandle<()>) {
        let mut pending = self.pending.lock().await;
        if let Some(prev) = pending.insert((endpoint, kind), handle) {
            prev.abort();
        }
    }

    async fn abort_pending_for(&self, endpoint: Endpoint) {
        let mut pending = self.pending.lock().await;
        for kind in [LookupKind::Suggest, LookupKind::Reverse] {
            if let Some(handle) = pending.remove(&(endpoint, kind)) {
                handle.abort();
            }
        }
    }
}
