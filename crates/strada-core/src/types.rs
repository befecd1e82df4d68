//! # Domain Types
//!
//! Core domain entities of the fleet control plane.
//!
//! ## Entity Relationships
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Entities                                 │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Vehicle      │   │     Rental      │   │    Payment      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (fleet code)│◄──│  vehicle_id (FK)│◄──│  rental_id (FK) │       │
//! │  │  kind + state   │   │  user_id (FK)   │   │  base+surcharge │       │
//! │  │  city, battery  │   │  start/end/activ│   │  total, desc    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  Vehicle state is only written through the state machine; a rental is  │
//! │  active exactly while its end_time is unset; a payment is created      │
//! │  exactly once per ended rental and never mutated.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, TransitionError};
use crate::geo::GeoPoint;
use crate::money::Money;
use crate::state::VehicleState;
use crate::DEFAULT_TEMPERATURE_C;

// =============================================================================
// Vehicle Kind
// =============================================================================

/// The kind of a fleet vehicle.
///
/// A tagged variant instead of a subtype hierarchy: only mopeds carry extra
/// per-kind data (the helmet sensor reading), and policies dispatch on the
/// tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleKind {
    Bicycle,
    ElectricScooter,
    /// Mopeds carry a helmet-presence sensor; Milan refuses to unlock a
    /// moped until it reports true.
    Moped { helmet_detected: bool },
}

impl VehicleKind {
    /// Canonical label, as persisted in the `type` column of `vehicles.csv`.
    pub fn label(self) -> &'static str {
        match self {
            VehicleKind::Bicycle => "Bicycle",
            VehicleKind::ElectricScooter => "ElectricScooter",
            VehicleKind::Moped { .. } => "Moped",
        }
    }

    /// Parses a persisted kind label. The helmet sensor is not persisted and
    /// starts out undetected.
    pub fn from_label(label: &str) -> Result<Self, CoreError> {
        match label {
            "Bicycle" => Ok(VehicleKind::Bicycle),
            "ElectricScooter" => Ok(VehicleKind::ElectricScooter),
            "Moped" => Ok(VehicleKind::Moped {
                helmet_detected: false,
            }),
            other => Err(CoreError::UnknownVehicleKind(other.to_string())),
        }
    }
}

impl fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Vehicle
// =============================================================================

/// A fleet vehicle.
///
/// The coordinator owns the authoritative copy and serialises all writes
/// behind the vehicle's locks; this type itself is plain data plus the
/// guarded state-machine mutation.
#[derive(Debug, Clone)]
pub struct Vehicle {
    /// Stable fleet code, e.g. `LON-ES001`.
    pub id: String,
    pub kind: VehicleKind,
    /// City name used to select the policy gate.
    pub city: String,
    pub location: GeoPoint,
    /// Charge level in [0, 100].
    pub battery_percent: u8,
    pub temperature_c: f64,
    state: VehicleState,
}

impl Vehicle {
    /// Creates a vehicle in the `AVAILABLE` state at ambient temperature.
    pub fn new(
        id: impl Into<String>,
        kind: VehicleKind,
        city: impl Into<String>,
        location: GeoPoint,
        battery_percent: u8,
    ) -> Self {
        Vehicle {
            id: id.into(),
            kind,
            city: city.into(),
            location,
            battery_percent,
            temperature_c: DEFAULT_TEMPERATURE_C,
            state: VehicleState::Available,
        }
    }

    /// Restores a vehicle from persistence in an arbitrary state.
    pub fn restore(
        id: impl Into<String>,
        kind: VehicleKind,
        city: impl Into<String>,
        location: GeoPoint,
        battery_percent: u8,
        temperature_c: f64,
        state: VehicleState,
    ) -> Self {
        Vehicle {
            id: id.into(),
            kind,
            city: city.into(),
            location,
            battery_percent,
            temperature_c,
            state,
        }
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> VehicleState {
        self.state
    }

    /// Applies a legal state transition; fails if the pair is not in the
    /// transition table.
    pub fn transition_to(&mut self, to: VehicleState) -> Result<(), TransitionError> {
        if self.state.can_transition_to(to) {
            self.state = to;
            Ok(())
        } else {
            Err(TransitionError {
                from: self.state,
                to,
            })
        }
    }

    /// Forces the state for rollback, bypassing the transition table.
    ///
    /// A target that is not directly reachable is routed through
    /// `AVAILABLE`, so a rollback can always restore the snapshot.
    pub fn force_state(&mut self, to: VehicleState) {
        if !self.state.can_transition_to(to) {
            self.state = VehicleState::Available;
        }
        self.state = to;
    }

    /// Applies a telemetry sample to the vehicle's live attributes.
    /// The helmet sensor is reported per-sample and not folded in here.
    pub fn apply_telemetry(&mut self, sample: &TelemetrySample) {
        self.location = sample.gps;
        self.battery_percent = sample.battery_percent;
        self.temperature_c = sample.temperature_c;
    }

    /// True for mopeds.
    #[inline]
    pub fn is_moped(&self) -> bool {
        matches!(self.kind, VehicleKind::Moped { .. })
    }

    /// The helmet sensor reading; false for kinds without a sensor.
    #[inline]
    pub fn helmet_detected(&self) -> bool {
        matches!(
            self.kind,
            VehicleKind::Moped {
                helmet_detected: true
            }
        )
    }

    /// Updates the helmet sensor reading. No-op for kinds without a sensor.
    pub fn set_helmet_detected(&mut self, detected: bool) {
        if let VehicleKind::Moped { helmet_detected } = &mut self.kind {
            *helmet_detected = detected;
        }
    }

    /// Builds a telemetry sample from the vehicle's current attributes.
    /// Used for pre-unlock policy checks when no live sample is at hand.
    pub fn current_telemetry(&self) -> TelemetrySample {
        TelemetrySample {
            timestamp: Utc::now(),
            gps: self.location,
            battery_percent: self.battery_percent,
            temperature_c: self.temperature_c,
            helmet_present: self.helmet_detected(),
        }
    }
}

impl fmt::Display for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[id={}, state={}, bat={}%, temp={:.1}C, city={}]",
            self.kind, self.id, self.state, self.battery_percent, self.temperature_c, self.city
        )
    }
}

// =============================================================================
// Telemetry Sample
// =============================================================================

/// One telemetry data point pushed by a vehicle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub timestamp: DateTime<Utc>,
    pub gps: GeoPoint,
    pub battery_percent: u8,
    pub temperature_c: f64,
    /// Helmet sensor reading; meaningful for mopeds only.
    pub helmet_present: bool,
}

// =============================================================================
// Rental
// =============================================================================

/// A reservation-to-return rental record.
#[derive(Debug, Clone)]
pub struct Rental {
    pub id: String,
    pub user_id: String,
    pub vehicle_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub active: bool,
}

impl Rental {
    /// Creates an active rental starting now.
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        vehicle_id: impl Into<String>,
        start_time: DateTime<Utc>,
    ) -> Self {
        Rental {
            id: id.into(),
            user_id: user_id.into(),
            vehicle_id: vehicle_id.into(),
            start_time,
            end_time: None,
            active: true,
        }
    }

    /// Marks the rental ended at the given instant.
    pub fn end(&mut self, at: DateTime<Utc>) {
        self.end_time = Some(at);
        self.active = false;
    }
}

// =============================================================================
// Payment
// =============================================================================

/// The settlement record for an ended rental. Immutable after creation.
#[derive(Debug, Clone)]
pub struct Payment {
    pub id: String,
    pub rental_id: String,
    pub base_amount: Money,
    pub surcharges: Money,
    pub total: Money,
    pub description: String,
}

impl Payment {
    /// Creates a payment; the total is always base + surcharges.
    pub fn new(
        id: impl Into<String>,
        rental_id: impl Into<String>,
        base_amount: Money,
        surcharges: Money,
        description: impl Into<String>,
    ) -> Self {
        Payment {
            id: id.into(),
            rental_id: rental_id.into(),
            base_amount,
            surcharges,
            total: base_amount + surcharges,
            description: description.into(),
        }
    }
}

// =============================================================================
// User
// =============================================================================

/// An immutable user lookup record.
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        User {
            id: id.into(),
            name: name.into(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn scooter() -> Vehicle {
        Vehicle::new(
            "LON-ES001",
            VehicleKind::ElectricScooter,
            "London",
            GeoPoint::new(51.5155, -0.1168),
            90,
        )
    }

    #[test]
    fn test_new_vehicle_defaults() {
        let v = scooter();
        assert_eq!(v.state(), VehicleState::Available);
        assert_eq!(v.temperature_c, DEFAULT_TEMPERATURE_C);
        assert!(!v.is_moped());
        assert!(!v.helmet_detected());
    }

    #[test]
    fn test_transition_guarded() {
        let mut v = scooter();
        v.transition_to(VehicleState::Reserved).unwrap();
        v.transition_to(VehicleState::InUse).unwrap();

        let err = v.transition_to(VehicleState::Reserved).unwrap_err();
        assert_eq!(err.from, VehicleState::InUse);
        assert_eq!(err.to, VehicleState::Reserved);
        assert_eq!(v.state(), VehicleState::InUse);
    }

    #[test]
    fn test_force_state_routes_via_available() {
        let mut v = scooter();
        v.transition_to(VehicleState::Reserved).unwrap();
        v.transition_to(VehicleState::InUse).unwrap();
        v.transition_to(VehicleState::Available).unwrap();

        // AVAILABLE -> IN_USE is not in the table; the rollback force still
        // lands on the target.
        v.force_state(VehicleState::InUse);
        assert_eq!(v.state(), VehicleState::InUse);
    }

    #[test]
    fn test_helmet_sensor_only_on_mopeds() {
        let mut moped = Vehicle::new(
            "MIL-M001",
            VehicleKind::Moped {
                helmet_detected: false,
            },
            "Milan",
            GeoPoint::new(45.4730, 9.1920),
            88,
        );
        assert!(moped.is_moped());
        assert!(!moped.helmet_detected());
        moped.set_helmet_detected(true);
        assert!(moped.helmet_detected());

        let mut bike = scooter();
        bike.set_helmet_detected(true);
        assert!(!bike.helmet_detected());
    }

    #[test]
    fn test_apply_telemetry_updates_attributes() {
        let mut v = scooter();
        let sample = TelemetrySample {
            timestamp: Utc::now(),
            gps: GeoPoint::new(51.52, -0.10),
            battery_percent: 42,
            temperature_c: 31.5,
            helmet_present: false,
        };
        v.apply_telemetry(&sample);
        assert_eq!(v.battery_percent, 42);
        assert_eq!(v.temperature_c, 31.5);
        assert_eq!(v.location, sample.gps);
    }

    #[test]
    fn test_kind_label_round_trip() {
        for label in ["Bicycle", "ElectricScooter", "Moped"] {
            assert_eq!(VehicleKind::from_label(label).unwrap().label(), label);
        }
        assert!(VehicleKind::from_label("Unicycle").is_err());
    }

    #[test]
    fn test_rental_end_clears_active() {
        let mut rental = Rental::new("R1001", "U001", "LON-ES001", Utc::now());
        assert!(rental.active);
        assert!(rental.end_time.is_none());

        rental.end(Utc::now());
        assert!(!rental.active);
        assert!(rental.end_time.is_some());
    }

    #[test]
    fn test_payment_total_is_base_plus_surcharges() {
        let payment = Payment::new(
            "P1001",
            "R1001",
            Money::from_cents(600),
            Money::from_cents(350),
            "Rental R1001 in London + London surcharge",
        );
        assert_eq!(payment.total, Money::from_cents(950));
    }
}
