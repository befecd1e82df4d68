//! # Milan Policy
//!
//! Helmet enforcement for mopeds and hard ZTL zone blocks. A violation of
//! `is_allowed` here is treated by the coordinator as an emergency-lock
//! trigger.

use std::sync::LazyLock;
use tracing::debug;

use strada_core::{GeoPoint, Money, Rental, TelemetrySample, Vehicle, VehicleState, Zone};

use crate::policy::{CityPolicy, PolicyResult, PolicyViolation, MIN_UNLOCK_BATTERY_PERCENT};

/// Surcharge for trips ending in the city centre. Not currently applied by
/// `after_trip`; retained for the pricing experiment the zone table exists
/// for.
pub const CITY_CENTER_SURCHARGE: Money = Money::from_cents(150);

static RESTRICTED_ZONES: LazyLock<Vec<Zone>> = LazyLock::new(|| {
    vec![
        // ZTL (Zona a Traffico Limitato) areas.
        Zone::new("MIL_ZTL_CENTRO", GeoPoint::new(45.4642, 9.1900), 1200.0, true),
        Zone::new(
            "MIL_PROTECTED_PARCO",
            GeoPoint::new(45.4773, 9.1878),
            600.0,
            true,
        ),
    ]
});

static CITY_CENTER_ZONE: LazyLock<Zone> = LazyLock::new(|| {
    Zone::new(
        "MIL_CITY_CENTER",
        GeoPoint::new(45.4654, 9.1866),
        2000.0,
        false,
    )
});

/// Milan's city policy.
pub struct MilanPolicy;

impl MilanPolicy {
    /// True if the position is inside the city-centre pricing zone.
    pub fn is_in_city_center(gps: GeoPoint) -> bool {
        CITY_CENTER_ZONE.contains(gps)
    }
}

impl CityPolicy for MilanPolicy {
    fn before_unlock(
        &self,
        vehicle: &Vehicle,
        telemetry: &TelemetrySample,
        _rental: &Rental,
    ) -> PolicyResult<()> {
        // Mopeds require helmet sensor confirmation before unlocking.
        if vehicle.is_moped() {
            if !telemetry.helmet_present {
                return Err(PolicyViolation::new(format!(
                    "Milan policy: helmet not detected! Moped {} cannot be unlocked without confirmed helmet presence",
                    vehicle.id
                )));
            }
            debug!(vehicle_id = %vehicle.id, "Helmet confirmed for moped");
        }
        if vehicle.battery_percent < MIN_UNLOCK_BATTERY_PERCENT {
            return Err(PolicyViolation::new(format!(
                "Milan policy: battery too low ({}%)",
                vehicle.battery_percent
            )));
        }
        Ok(())
    }

    fn after_trip(&self, _rental: &Rental, base_amount: Money) -> PolicyResult<Money> {
        debug!(base = %base_amount, "Milan trip ended, no surcharge");
        Ok(Money::zero())
    }

    fn validate_transition(&self, vehicle: &Vehicle, target: VehicleState) -> PolicyResult<()> {
        if target == VehicleState::InUse && vehicle.is_moped() && !vehicle.helmet_detected() {
            return Err(PolicyViolation::new(
                "Milan policy: moped requires helmet sensor confirmation before use",
            ));
        }
        Ok(())
    }

    fn is_allowed(&self, vehicle: &Vehicle, gps: GeoPoint) -> PolicyResult<()> {
        for zone in RESTRICTED_ZONES.iter() {
            if zone.restricted && zone.contains(gps) {
                return Err(PolicyViolation::new(format!(
                    "Milan policy: vehicle {} entered restricted zone {}",
                    vehicle.id, zone.zone_id
                )));
            }
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use strada_core::VehicleKind;

    fn moped(helmet: bool, battery: u8) -> Vehicle {
        Vehicle::new(
            "MIL-M001",
            VehicleKind::Moped {
                helmet_detected: helmet,
            },
            "Milan",
            GeoPoint::new(45.4730, 9.1920),
            battery,
        )
    }

    fn rental() -> Rental {
        Rental::new("R1001", "U003", "MIL-M001", Utc::now())
    }

    #[test]
    fn test_before_unlock_requires_helmet_for_mopeds() {
        let v = moped(false, 88);
        let err = MilanPolicy
            .before_unlock(&v, &v.current_telemetry(), &rental())
            .unwrap_err();
        assert!(err.reason.to_lowercase().contains("helmet"));

        // The sample reports the sensor; once it reads present the unlock
        // goes through.
        let v = moped(true, 88);
        assert!(MilanPolicy
            .before_unlock(&v, &v.current_telemetry(), &rental())
            .is_ok());
    }

    #[test]
    fn test_before_unlock_ignores_helmet_for_bicycles() {
        let v = Vehicle::new(
            "MIL-B001",
            VehicleKind::Bicycle,
            "Milan",
            GeoPoint::new(45.4642, 9.1900),
            95,
        );
        assert!(MilanPolicy
            .before_unlock(&v, &v.current_telemetry(), &rental())
            .is_ok());
    }

    #[test]
    fn test_before_unlock_checks_battery() {
        let v = moped(true, 10);
        let err = MilanPolicy
            .before_unlock(&v, &v.current_telemetry(), &rental())
            .unwrap_err();
        assert!(err.reason.contains("battery too low"));
    }

    #[test]
    fn test_validate_transition_reads_vehicle_sensor() {
        let v = moped(false, 88);
        assert!(MilanPolicy
            .validate_transition(&v, VehicleState::InUse)
            .is_err());

        let v = moped(true, 88);
        assert!(MilanPolicy
            .validate_transition(&v, VehicleState::InUse)
            .is_ok());
    }

    #[test]
    fn test_after_trip_is_free() {
        let surcharge = MilanPolicy
            .after_trip(&rental(), Money::from_cents(600))
            .unwrap();
        assert!(surcharge.is_zero());
    }

    #[test]
    fn test_is_allowed_blocks_ztl() {
        let v = moped(true, 88);
        let err = MilanPolicy
            .is_allowed(&v, GeoPoint::new(45.4642, 9.1900))
            .unwrap_err();
        assert!(err.reason.contains("MIL_ZTL_CENTRO"));

        // Well outside both restricted zones.
        assert!(MilanPolicy
            .is_allowed(&v, GeoPoint::new(45.4400, 9.2400))
            .is_ok());
    }

    #[test]
    fn test_city_center_lookup() {
        assert!(MilanPolicy::is_in_city_center(GeoPoint::new(45.4654, 9.1866)));
        assert!(!MilanPolicy::is_in_city_center(GeoPoint::new(45.5200, 9.3000)));
        // The pricing constant exists but after_trip does not apply it.
        assert_eq!(CITY_CENTER_SURCHARGE, Money::from_cents(150));
    }
}
