//! Ride-offer form engine
//!
//! This module is the synchronization core of the crate. Three input
//! modalities (typed text, map drag, device geolocation) race to mutate the
//! same two location records; the engine reconciles them through a single
//! reducer over tagged events, with per-(endpoint, lookup-kind) request
//! tokens so stale network results are discarded instead of clobbering
//! fresher user input.
//!
//! - [`state`] holds the pure reducer: `FormState`, `FormEvent`, `Effect`.
//! - [`session`] drives it asynchronously: debounce timers, lookup tasks,
//!   cancellation and teardown.

pub mod session;
pub mod state;

pub use session::FormSession;
pub use state::{Effect, Endpoint, FormEvent, FormState, LocationRecord, LookupKind, RequestToken};
