//! # London Policy
//!
//! Congestion charging: riding in London is never blocked by zone geometry,
//! but every trip pays the flat congestion charge at trip end. Unlocks
//! require the fleet-wide minimum battery.

use std::sync::LazyLock;
use tracing::debug;

use strada_core::{GeoPoint, Money, Rental, TelemetrySample, Vehicle, VehicleState, Zone};

use crate::policy::{CityPolicy, PolicyResult, PolicyViolation, MIN_UNLOCK_BATTERY_PERCENT};

/// Flat congestion charge applied at the end of every London trip.
pub const CONGESTION_CHARGE: Money = Money::from_cents(350);

static CONGESTION_ZONES: LazyLock<Vec<Zone>> = LazyLock::new(|| {
    vec![
        // Central London congestion zone (simplified centre).
        Zone::new(
            "LON_CONGESTION_CENTRAL",
            GeoPoint::new(51.5155, -0.1168),
            2500.0,
            true,
        ),
        // Pedestrian zone near Westminster.
        Zone::new(
            "LON_PEDESTRIAN_WESTMINSTER",
            GeoPoint::new(51.5010, -0.1247),
            500.0,
            true,
        ),
    ]
});

static MANDATORY_PARKING_ZONES: LazyLock<Vec<Zone>> = LazyLock::new(|| {
    vec![
        Zone::new("LON_PARK_1", GeoPoint::new(51.5074, -0.1278), 100.0, false),
        Zone::new("LON_PARK_2", GeoPoint::new(51.5200, -0.0850), 100.0, false),
    ]
});

/// London's city policy.
pub struct LondonPolicy;

impl LondonPolicy {
    /// True if the position is inside a designated parking bay.
    pub fn is_in_mandatory_parking_zone(gps: GeoPoint) -> bool {
        MANDATORY_PARKING_ZONES.iter().any(|z| z.contains(gps))
    }
}

impl CityPolicy for LondonPolicy {
    fn before_unlock(
        &self,
        vehicle: &Vehicle,
        _telemetry: &TelemetrySample,
        _rental: &Rental,
    ) -> PolicyResult<()> {
        if vehicle.battery_percent < MIN_UNLOCK_BATTERY_PERCENT {
            return Err(PolicyViolation::new(format!(
                "London policy: battery too low to start rental ({}%)",
                vehicle.battery_percent
            )));
        }
        debug!(vehicle_id = %vehicle.id, "London pre-unlock check passed");
        Ok(())
    }

    fn after_trip(&self, _rental: &Rental, _base_amount: Money) -> PolicyResult<Money> {
        // The congestion charge applies unconditionally at trip end.
        debug!(charge = %CONGESTION_CHARGE, "Applying London congestion charge");
        Ok(CONGESTION_CHARGE)
    }

    fn validate_transition(&self, vehicle: &Vehicle, target: VehicleState) -> PolicyResult<()> {
        if target == VehicleState::InUse && vehicle.battery_percent < MIN_UNLOCK_BATTERY_PERCENT {
            return Err(PolicyViolation::new(format!(
                "London policy: cannot start rental, battery at {}% (minimum {}%)",
                vehicle.battery_percent, MIN_UNLOCK_BATTERY_PERCENT
            )));
        }
        Ok(())
    }

    fn is_allowed(&self, vehicle: &Vehicle, gps: GeoPoint) -> PolicyResult<()> {
        // Congestion zone presence is observed, never a hard block: the
        // charge is applied at trip end regardless.
        for zone in CONGESTION_ZONES.iter() {
            if zone.restricted && zone.contains(gps) {
                debug!(
                    vehicle_id = %vehicle.id,
                    zone_id = %zone.zone_id,
                    "Vehicle in congestion zone; charge applies at trip end"
                );
            }
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
