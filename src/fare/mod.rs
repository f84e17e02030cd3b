//! Fare model
//!
//! Pure, synchronous fare derivation: route distance to fuel cost to a
//! per-seat fare band, plus the edit-state machine for the fare field.
//! Everything here is derived data except the fare field itself.

use crate::constants::fare::{
    DEFAULT_FUEL_PRICE_PER_LITER, DEFAULT_MILEAGE_KM_PER_LITER, DEFAULT_SEATS, MAX_FARE_FACTOR,
    MAX_SEATS, MIN_FARE_FACTOR, MIN_SEATS, STEP_DOWN, STEP_UP,
};
use crate::coord::distance::route_distance_km;
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Vehicle cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FareParams {
    /// Vehicle mileage in km per liter
    pub mileage_km_per_liter: f64,
    /// Fuel price per liter
    pub fuel_price_per_liter: f64,
}

impl FareParams {
    /// Create new fare parameters
    pub fn new(mileage_km_per_liter: f64, fuel_price_per_liter: f64) -> Self {
        Self {
            mileage_km_per_liter,
            fuel_price_per_liter,
        }
    }

    /// Validate that the parameters can produce a finite fare
    pub fn validate(&self) -> Result<()> {
        if !self.mileage_km_per_liter.is_finite() || self.mileage_km_per_liter <= 0.0 {
            return Err(Error::InvalidFareParams(format!(
                "Mileage {} must be positive",
                self.mileage_km_per_liter
            )));
        }
        if !self.fuel_price_per_liter.is_finite() || self.fuel_price_per_liter < 0.0 {
            return Err(Error::InvalidFareParams(format!(
                "Fuel price {} must not be negative",
                self.fuel_price_per_liter
            )));
        }
        Ok(())
    }
}

impl Default for FareParams {
    fn default() -> Self {
        Self {
            mileage_km_per_liter: DEFAULT_MILEAGE_KM_PER_LITER,
            fuel_price_per_liter: DEFAULT_FUEL_PRICE_PER_LITER,
        }
    }
}

/// Derived fare figures for one route
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FareBreakdown {
    /// Route distance in km, rounded to 2 decimals
    pub distance_km: f64,
    /// Fuel needed for the route in liters
    pub fuel_needed_liters: f64,
    /// Total fuel cost for the route
    pub total_fuel_cost: f64,
    /// Fuel cost split across driver + passengers
    pub cost_per_person: f64,
    /// Suggested per-seat fare
    pub suggested_fare: i64,
    /// Lower bound of the fare band
    pub min_fare: i64,
    /// Upper bound of the fare band
    pub max_fare: i64,
}

impl FareBreakdown {
    /// Derive the fare figures from a route distance
    ///
    /// # Arguments
    /// * `distance_km` - Route distance, already rounded to 2 decimals
    /// * `params` - Vehicle cost parameters
    /// * `seat_count` - Passenger seats offered (driver is counted on top)
    pub fn from_distance(distance_km: f64, params: &FareParams, seat_count: u32) -> Self {
        let fuel_needed_liters = distance_km / params.mileage_km_per_liter;
        let total_fuel_cost = fuel_needed_liters * params.fuel_price_per_liter;
        let total_people = f64::from(1 + seat_count);
        let cost_per_person = total_fuel_cost / total_people;

        Self {
            distance_km,
            fuel_needed_liters,
            total_fuel_cost,
            cost_per_person,
            suggested_fare: cost_per_person.ceil() as i64,
            min_fare: (cost_per_person * MIN_FARE_FACTOR).ceil() as i64,
            max_fare: (cost_per_person * MAX_FARE_FACTOR).ceil() as i64,
        }
    }

    /// Derive the fare figures for a pair of endpoints
    pub fn between(
        origin: Coordinates,
        destination: Coordinates,
        params: &FareParams,
        seat_count: u32,
    ) -> Self {
        Self::from_distance(route_distance_km(origin, destination), params, seat_count)
    }
}

/// Edit state of the fare field
///
/// `Unset` until the first valid distance auto-populates the suggested
/// fare; any manual adjustment afterwards is permanent for the session.
/// Recomputing the band never resets the field back to `AutoSuggested`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FareStage {
    Unset,
    AutoSuggested,
    UserAdjusted,
}

/// Outcome of a fare stepper press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FareStep {
    /// The fare changed (possibly clamped to a bound)
    Applied(i64),
    /// The fare is already at the upper bound; the value did not change
    AtUpperBound { max: i64 },
    /// No fare band yet (route distance unknown); the value did not change
    Unavailable,
}

/// The user-visible per-seat fare field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FareField {
    amount: i64,
    stage: FareStage,
}

impl FareField {
    /// Create an unset fare field
    pub fn new() -> Self {
        Self {
            amount: 0,
            stage: FareStage::Unset,
        }
    }

    /// Current fare amount
    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// Current edit stage
    pub fn stage(&self) -> FareStage {
        self.stage
    }

    /// Populate the field from the first suggested fare
    ///
    /// Only applies while the field is `Unset`; later suggestions move the
    /// band, not the value.
    pub fn auto_populate(&mut self, suggested: i64) {
        if self.stage == FareStage::Unset {
            self.amount = suggested;
            self.stage = FareStage::AutoSuggested;
        }
    }

    /// Set the fare directly (manual edit)
    pub fn set_manual(&mut self, amount: i64) {
        self.amount = amount;
        self.stage = FareStage::UserAdjusted;
    }

    /// Step the fare up, clamped to the upper bound
    ///
    /// At the bound the value is left unchanged and the press is reported
    /// as `AtUpperBound`.
    pub fn increment(&mut self, max_fare: i64) -> FareStep {
        let next = (self.amount + STEP_UP).min(max_fare);
        if next == self.amount {
            return FareStep::AtUpperBound { max: max_fare };
        }
        self.amount = next;
        self.stage = FareStage::UserAdjusted;
        FareStep::Applied(next)
    }

    /// Step the fare down, clamped to the lower bound
    ///
    /// The lower clamp is silent: stepping below min lands exactly on min.
    pub fn decrement(&mut self, min_fare: i64) -> FareStep {
        let next = (self.amount - STEP_DOWN).max(min_fare);
        if next != self.amount {
            self.amount = next;
            self.stage = FareStage::UserAdjusted;
        }
        FareStep::Applied(self.amount)
    }
}

impl Default for FareField {
    fn default() -> Self {
        Self::new()
    }
}

/// Complete fare state for one form session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FareModel {
    /// Vehicle cost parameters
    pub params: FareParams,
    /// Passenger seats offered
    pub seat_count: u32,
    /// Derived figures; absent until both endpoints have coordinates
    pub breakdown: Option<FareBreakdown>,
    /// The user-visible fare field
    pub field: FareField,
}

impl FareModel {
    /// Create a fare model with the given parameters
    pub fn new(params: FareParams) -> Self {
        Self {
            params,
            seat_count: DEFAULT_SEATS,
            breakdown: None,
            field: FareField::new(),
        }
    }

    /// Recompute the breakdown from the current endpoints
    ///
    /// Skips silently while either endpoint lacks coordinates. The first
    /// valid distance auto-populates the fare field.
    pub fn recompute(&mut self, origin: Option<Coordinates>, destination: Option<Coordinates>) {
        let (Some(origin), Some(destination)) = (origin, destination) else {
            return;
        };

        let breakdown = FareBreakdown::between(origin, destination, &self.params, self.seat_count);
        self.field.auto_populate(breakdown.suggested_fare);
        self.breakdown = Some(breakdown);
    }

    /// Set the seat count, clamped to the offerable range
    pub fn set_seats(&mut self, seats: u32) {
        self.seat_count = seats.clamp(MIN_SEATS, MAX_SEATS);
    }

    /// Step the fare up within the band
    pub fn increment(&mut self) -> FareStep {
        match self.breakdown {
            Some(b) => self.field.increment(b.max_fare),
            None => FareStep::Unavailable,
        }
    }

    /// Step the fare down within the band
    pub fn decrement(&mut self) -> FareStep {
        match self.breakdown {
            Some(b) => self.field.decrement(b.min_fare),
            None => FareStep::Unavailable,
        }
    }
}

impl Default for FareModel {
    fn default() -> Self {
        Self::new(FareParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_worked_example() {
        // 11 km at 12 km/L and 280/L split across 4 people
        let params = FareParams::default();
        let breakdown = FareBreakdown::from_distance(11.0, &params, 3);

        assert_relative_eq!(breakdown.fuel_needed_liters, 11.0 / 12.0, epsilon = 1e-9);
        assert_relative_eq!(breakdown.total_fuel_cost, 256.666, epsilon = 0.001);
        assert_relative_eq!(breakdown.cost_per_person, 64.166, epsilon = 0.001);
        assert_eq!(breakdown.suggested_fare, 65);
        assert_eq!(breakdown.min_fare, 55);
        assert_eq!(breakdown.max_fare, 84);
    }

    #[test]
    fn test_band_ordering() {
        let params = FareParams::default();
        for distance in [0.5, 3.2, 11.0, 47.75, 312.0] {
            for seats in MIN_SEATS..=MAX_SEATS {
                let b = FareBreakdown::from_distance(distance, &params, seats);
                assert!(
                    b.min_fare <= b.suggested_fare && b.suggested_fare <= b.max_fare,
                    "Band {}..{} should bracket {} at {} km",
                    b.min_fare,
                    b.max_fare,
                    b.suggested_fare,
                    distance
                );
            }
        }
    }

    #[test]
    fn test_between_is_symmetric() {
        let params = FareParams::default();
        let a = Coordinates::new(31.5204, 74.3587);
        let b = Coordinates::new(31.4697, 74.2728);

        let ab = FareBreakdown::between(a, b, &params, 3);
        let ba = FareBreakdown::between(b, a, &params, 3);
        assert_eq!(ab.distance_km, ba.distance_km);
        assert_eq!(ab.suggested_fare, ba.suggested_fare);
    }

    #[test]
    fn test_params_validation() {
        assert!(FareParams::default().validate().is_ok());
        assert!(FareParams::new(0.0, 280.0).validate().is_err());
        assert!(FareParams::new(-3.0, 280.0).validate().is_err());
        assert!(FareParams::new(12.0, -1.0).validate().is_err());
    }

    #[test]
    fn test_auto_populate_only_once() {
        let mut field = FareField::new();
        assert_eq!(field.stage(), FareStage::Unset);

        field.auto_populate(65);
        assert_eq!(field.amount(), 65);
        assert_eq!(field.stage(), FareStage::AutoSuggested);

        // A later recompute suggests a new value; the field keeps the old one
        field.auto_populate(90);
        assert_eq!(field.amount(), 65);
    }

    #[test]
    fn test_user_adjusted_is_permanent() {
        let mut field = FareField::new();
        field.auto_populate(65);
        field.set_manual(70);
        assert_eq!(field.stage(), FareStage::UserAdjusted);

        field.auto_populate(80);
        assert_eq!(field.amount(), 70);
        assert_eq!(field.stage(), FareStage::UserAdjusted);
    }

    #[test]
    fn test_increment_clamps_then_signals() {
        let mut field = FareField::new();
        field.auto_populate(80);

        // 80 -> 84 (clamped below +10), then stuck at the bound
        assert_eq!(field.increment(84), FareStep::Applied(84));
        assert_eq!(field.increment(84), FareStep::AtUpperBound { max: 84 });
        assert_eq!(field.amount(), 84);
    }

    #[test]
    fn test_decrement_clamps_silently() {
        let mut field = FareField::new();
        field.auto_populate(57);

        assert_eq!(field.decrement(55), FareStep::Applied(55));
        assert_eq!(field.amount(), 55);

        // Already at min: value stays put, no bound signal
        assert_eq!(field.decrement(55), FareStep::Applied(55));
        assert_eq!(field.amount(), 55);
    }

    #[test]
    fn test_model_stepper_without_distance() {
        let mut model = FareModel::default();
        assert_eq!(model.increment(), FareStep::Unavailable);
        assert_eq!(model.decrement(), FareStep::Unavailable);
        assert_eq!(model.field.amount(), 0);
    }

    #[test]
    fn test_model_recompute_skips_incomplete_route() {
        let mut model = FareModel::default();
        model.recompute(Some(Coordinates::new(31.52, 74.36)), None);
        assert!(model.breakdown.is_none());
        assert_eq!(model.field.stage(), FareStage::Unset);
    }

    #[test]
    fn test_model_recompute_populates_field() {
        let mut model = FareModel::default();
        model.recompute(
            Some(Coordinates::new(31.5204, 74.3587)),
            Some(Coordinates::new(31.4697, 74.2728)),
        );

        let breakdown = model.breakdown.expect("breakdown after full route");
        assert!(breakdown.distance_km > 0.0);
        assert_eq!(model.field.amount(), breakdown.suggested_fare);
        assert_eq!(model.field.stage(), FareStage::AutoSuggested);
    }

    #[test]
    fn test_seat_clamping() {
        let mut model = FareModel::default();
        model.set_seats(9);
        assert_eq!(model.seat_count, MAX_SEATS);
        model.set_seats(0);
        assert_eq!(model.seat_count, MIN_SEATS);
    }
}
