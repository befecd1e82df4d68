//! # Vehicle Table
//!
//! Adapter for `vehicles.csv`.
//!
//! The helmet sensor reading of a moped is live telemetry, not fleet
//! inventory, so it is not persisted: every restored moped starts with the
//! helmet undetected.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use strada_core::{GeoPoint, Vehicle, VehicleKind, VehicleState};

use crate::error::{StoreError, StoreResult};
use crate::repository::{read_rows, write_rows};

pub const FILE_NAME: &str = "vehicles.csv";

const HEADER: [&str; 8] = [
    "id",
    "type",
    "state",
    "batteryPercent",
    "temperatureC",
    "lat",
    "lon",
    "city",
];

// =============================================================================
// Record
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VehicleRecord {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    state: VehicleState,
    battery_percent: u8,
    temperature_c: f64,
    lat: f64,
    lon: f64,
    city: String,
}

impl From<&Vehicle> for VehicleRecord {
    fn from(v: &Vehicle) -> Self {
        VehicleRecord {
            id: v.id.clone(),
            kind: v.kind.label().to_string(),
            state: v.state(),
            battery_percent: v.battery_percent,
            temperature_c: v.temperature_c,
            lat: v.location.lat,
            lon: v.location.lon,
            city: v.city.clone(),
        }
    }
}

impl VehicleRecord {
    fn into_vehicle(self) -> Result<Vehicle, strada_core::CoreError> {
        let kind = VehicleKind::from_label(&self.kind)?;
        Ok(Vehicle::restore(
            self.id,
            kind,
            self.city,
            GeoPoint::new(self.lat, self.lon),
            self.battery_percent,
            self.temperature_c,
            self.state,
        ))
    }
}

// =============================================================================
// Vehicle Store
// =============================================================================

/// Load/save adapter for the vehicle table.
#[derive(Debug, Clone)]
pub struct VehicleStore {
    path: PathBuf,
}

impl VehicleStore {
    pub(crate) fn new(path: PathBuf) -> Self {
        VehicleStore { path }
    }

    /// Loads the whole table.
    pub fn load_all(&self) -> StoreResult<Vec<Vehicle>> {
        let rows: Vec<VehicleRecord> = read_rows(&self.path)?;
        rows.into_iter()
            .map(|r| r.into_vehicle().map_err(|e| StoreError::malformed(&self.path, e)))
            .collect()
    }

    /// Rewrites the whole table.
    pub fn save_all(&self, vehicles: &[Vehicle]) -> StoreResult<()> {
        let rows: Vec<VehicleRecord> = vehicles.iter().map(VehicleRecord::from).collect();
        write_rows(&self.path, &HEADER, &rows)
    }

    /// Upserts a single vehicle by id.
    pub fn save_one(&self, vehicle: &Vehicle) -> StoreResult<()> {
        let mut all = self.load_all()?;
        match all.iter_mut().find(|v| v.id == vehicle.id) {
            Some(slot) => *slot = vehicle.clone(),
            None => all.push(vehicle.clone()),
        }
        self.save_all(&all)
    }

    /// Looks up a vehicle by id.
    pub fn find(&self, id: &str) -> StoreResult<Option<Vehicle>> {
        Ok(self.load_all()?.into_iter().find(|v| v.id == id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_fleet() -> Vec<Vehicle> {
        vec![
            Vehicle::new(
                "LON-ES001",
                VehicleKind::ElectricScooter,
                "London",
                GeoPoint::new(51.5155, -0.1168),
                90,
            ),
            Vehicle::new(
                "MIL-M001",
                VehicleKind::Moped {
                    helmet_detected: true,
                },
                "Milan",
                GeoPoint::new(45.4730, 9.1920),
                88,
            ),
        ]
    }

    #[test]
    fn test_missing_file_is_empty_table() {
        let dir = tempdir().unwrap();
        let store = VehicleStore::new(dir.path().join(FILE_NAME));
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let store = VehicleStore::new(dir.path().join(FILE_NAME));

        store.save_all(&sample_fleet()).unwrap();
        let loaded = store.load_all().unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id, "LON-ES001");
        assert_eq!(loaded[0].kind.label(), "ElectricScooter");
        assert_eq!(loaded[0].state(), VehicleState::Available);
        // Helmet state is telemetry, not inventory: restored undetected.
        assert!(!loaded[1].helmet_detected());
    }

    #[test]
    fn test_header_is_exact() {
        let dir = tempdir().unwrap();
        let store = VehicleStore::new(dir.path().join(FILE_NAME));
        store.save_all(&[]).unwrap();

        let contents = std::fs::read_to_string(dir.path().join(FILE_NAME)).unwrap();
        assert_eq!(
            contents.lines().next().unwrap(),
            "id,type,state,batteryPercent,temperatureC,lat,lon,city"
        );
    }

    #[test]
    fn test_save_one_upserts() {
        let dir = tempdir().unwrap();
        let store = VehicleStore::new(dir.path().join(FILE_NAME));
        store.save_all(&sample_fleet()).unwrap();

        let mut updated = sample_fleet().remove(0);
        updated.battery_percent = 12;
        store.save_one(&updated).unwrap();

        let found = store.find("LON-ES001").unwrap().unwrap();
        assert_eq!(found.battery_percent, 12);
        assert_eq!(store.load_all().unwrap().len(), 2);

        let extra = Vehicle::new(
            "ROM-B001",
            VehicleKind::Bicycle,
            "Rome",
            GeoPoint::new(41.9300, 12.5200),
            92,
        );
        store.save_one(&extra).unwrap();
        assert_eq!(store.load_all().unwrap().len(), 3);
    }

    #[test]
    fn test_save_all_load_all_is_stable() {
        let dir = tempdir().unwrap();
        let store = VehicleStore::new(dir.path().join(FILE_NAME));
        store.save_all(&sample_fleet()).unwrap();

        let first = std::fs::read_to_string(dir.path().join(FILE_NAME)).unwrap();
        let reloaded = store.load_all().unwrap();
        store.save_all(&reloaded).unwrap();
        let second = std::fs::read_to_string(dir.path().join(FILE_NAME)).unwrap();
        assert_eq!(first, second);
    }
}
