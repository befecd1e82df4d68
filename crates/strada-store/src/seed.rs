//! # Demo Seed Data
//!
//! The demo fleet and user roster: five riders and thirteen vehicles across
//! London, Milan and Rome, parked at real coordinates with mixed battery
//! levels. Used by the `seed` binary, the demo driver, and tests.

use strada_core::{GeoPoint, User, Vehicle, VehicleKind};

use crate::error::StoreResult;
use crate::Store;

/// The demo user roster.
pub fn demo_users() -> Vec<User> {
    vec![
        User::new("U001", "Alice Johnson"),
        User::new("U002", "Bob Smith"),
        User::new("U003", "Carlos Rossi"),
        User::new("U004", "Elena Bianchi"),
        User::new("U005", "James Davies"),
    ]
}

/// The demo fleet.
pub fn demo_fleet() -> Vec<Vehicle> {
    let bicycle = || VehicleKind::Bicycle;
    let scooter = || VehicleKind::ElectricScooter;
    let moped = || VehicleKind::Moped {
        helmet_detected: false,
    };

    vec![
        // London
        Vehicle::new("LON-B001", bicycle(), "London", GeoPoint::new(51.5074, -0.1278), 85),
        Vehicle::new("LON-B002", bicycle(), "London", GeoPoint::new(51.5200, -0.0850), 72),
        Vehicle::new("LON-ES001", scooter(), "London", GeoPoint::new(51.5155, -0.1168), 90),
        Vehicle::new("LON-ES002", scooter(), "London", GeoPoint::new(51.5010, -0.1247), 45),
        Vehicle::new("LON-M001", moped(), "London", GeoPoint::new(51.5000, -0.1250), 78),
        // Milan
        Vehicle::new("MIL-B001", bicycle(), "Milan", GeoPoint::new(45.4642, 9.1900), 95),
        Vehicle::new("MIL-ES001", scooter(), "Milan", GeoPoint::new(45.4654, 9.1866), 60),
        Vehicle::new("MIL-M001", moped(), "Milan", GeoPoint::new(45.4730, 9.1920), 88),
        Vehicle::new("MIL-M002", moped(), "Milan", GeoPoint::new(45.4600, 9.1800), 30),
        // Rome
        Vehicle::new("ROM-B001", bicycle(), "Rome", GeoPoint::new(41.9300, 12.5200), 92),
        Vehicle::new("ROM-ES001", scooter(), "Rome", GeoPoint::new(41.9350, 12.5150), 55),
        Vehicle::new("ROM-ES002", scooter(), "Rome", GeoPoint::new(41.9400, 12.5100), 70),
        Vehicle::new("ROM-M001", moped(), "Rome", GeoPoint::new(41.9450, 12.5050), 80),
    ]
}

/// Writes the demo users and fleet into the store.
pub fn seed(store: &Store) -> StoreResult<()> {
    store.users().save_all(&demo_users())?;
    store.vehicles().save_all(&demo_fleet())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_seed_writes_both_tables() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        seed(&store).unwrap();

        assert_eq!(store.users().load_all().unwrap().len(), 5);
        let fleet = store.vehicles().load_all().unwrap();
        assert_eq!(fleet.len(), 13);
        assert!(fleet.iter().any(|v| v.id == "LON-ES001" && v.battery_percent == 90));
        assert!(fleet.iter().any(|v| v.id == "MIL-M001" && v.is_moped()));
    }
}
