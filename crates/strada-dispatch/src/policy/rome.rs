//! # Rome Policy
//!
//! ZTL enforcement for all vehicles plus archaeological and pedestrian
//! areas closed to electric scooters specifically.

use std::sync::LazyLock;
use tracing::debug;

use strada_core::{GeoPoint, Money, Rental, TelemetrySample, Vehicle, VehicleKind, VehicleState, Zone};

use crate::policy::{CityPolicy, PolicyResult, PolicyViolation, MIN_UNLOCK_BATTERY_PERCENT};

// Zones restricted to electric scooters (archaeological/pedestrian areas).
static SCOOTER_RESTRICTED_ZONES: LazyLock<Vec<Zone>> = LazyLock::new(|| {
    vec![
        // Colosseum & Roman Forum archaeological area.
        Zone::new(
            "ROME_ARCHAEOLOGICAL_COLOSSEO",
            GeoPoint::new(41.8902, 12.4922),
            800.0,
            true,
        ),
        // Vatican area.
        Zone::new("ROME_VATICAN", GeoPoint::new(41.9029, 12.4534), 600.0, true),
        // Piazza Navona pedestrian area.
        Zone::new(
            "ROME_PIAZZA_NAVONA",
            GeoPoint::new(41.8992, 12.4731),
            200.0,
            true,
        ),
    ]
});

// General restricted zones for all vehicles.
static GENERAL_RESTRICTED_ZONES: LazyLock<Vec<Zone>> = LazyLock::new(|| {
    vec![Zone::new(
        "ROME_ZTL_CENTRO",
        GeoPoint::new(41.8956, 12.4820),
        1500.0,
        true,
    )]
});

/// Rome's city policy.
pub struct RomePolicy;

impl CityPolicy for RomePolicy {
    fn before_unlock(
        &self,
        vehicle: &Vehicle,
        telemetry: &TelemetrySample,
        _rental: &Rental,
    ) -> PolicyResult<()> {
        if vehicle.battery_percent < MIN_UNLOCK_BATTERY_PERCENT {
            return Err(PolicyViolation::new(format!(
                "Rome policy: battery too low ({}%)",
                vehicle.battery_percent
            )));
        }
        // Refuse to unlock a vehicle that is already parked inside a
        // restricted zone.
        self.is_allowed(vehicle, telemetry.gps)?;
        debug!(vehicle_id = %vehicle.id, "Rome pre-unlock check passed");
        Ok(())
    }

    fn after_trip(&self, _rental: &Rental, base_amount: Money) -> PolicyResult<Money> {
        debug!(base = %base_amount, "Rome trip ended, no surcharge");
        Ok(Money::zero())
    }

    fn validate_transition(&self, _vehicle: &Vehicle, _target: VehicleState) -> PolicyResult<()> {
        // Rome has no additional transition constraints.
        Ok(())
    }

    fn is_allowed(&self, vehicle: &Vehicle, gps: GeoPoint) -> PolicyResult<()> {
        for zone in GENERAL_RESTRICTED_ZONES.iter() {
            if zone.restricted && zone.contains(gps) {
                return Err(PolicyViolation::new(format!(
                    "Rome policy: vehicle {} is entering restricted ZTL zone {}",
                    vehicle.id, zone.zone_id
                )));
            }
        }
        if matches!(vehicle.kind, VehicleKind::ElectricScooter) {
            for zone in SCOOTER_RESTRICTED_ZONES.iter() {
                if zone.restricted && zone.contains(gps) {
                    return Err(PolicyViolation::new(format!(
                        "Rome policy: scooter {} not allowed in protected zone {} (archaeological/pedestrian area)",
                        vehicle.id, zone.zone_id
                    )));
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
