//! # Rental Table
//!
//! Adapter for `rentals.csv`. The `endTime` column is empty exactly while
//! the rental is active.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use strada_core::Rental;

use crate::error::StoreResult;
use crate::repository::{read_rows, write_rows};

pub const FILE_NAME: &str = "rentals.csv";

const HEADER: [&str; 6] = ["id", "userId", "vehicleId", "startTime", "endTime", "active"];

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RentalRecord {
    id: String,
    user_id: String,
    vehicle_id: String,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    active: bool,
}

impl From<&Rental> for RentalRecord {
    fn from(r: &Rental) -> Self {
        RentalRecord {
            id: r.id.clone(),
            user_id: r.user_id.clone(),
            vehicle_id: r.vehicle_id.clone(),
            start_time: r.start_time,
            end_time: r.end_time,
            active: r.active,
        }
    }
}

impl RentalRecord {
    fn into_rental(self) -> Rental {
        Rental {
            id: self.id,
            user_id: self.user_id,
            vehicle_id: self.vehicle_id,
            start_time: self.start_time,
            end_time: self.end_time,
            active: self.active,
        }
    }
}

/// Load/save adapter for the rental table.
#[derive(Debug, Clone)]
pub struct RentalStore {
    path: PathBuf,
}

impl RentalStore {
    pub(crate) fn new(path: PathBuf) -> Self {
        RentalStore { path }
    }

    pub fn load_all(&self) -> StoreResult<Vec<Rental>> {
        let rows: Vec<RentalRecord> = read_rows(&self.path)?;
        Ok(rows.into_iter().map(RentalRecord::into_rental).collect())
    }

    pub fn save_all(&self, rentals: &[Rental]) -> StoreResult<()> {
        let rows: Vec<RentalRecord> = rentals.iter().map(RentalRecord::from).collect();
        write_rows(&self.path, &HEADER, &rows)
    }

    pub fn save_one(&self, rental: &Rental) -> StoreResult<()> {
        let mut all = self.load_all()?;
        match all.iter_mut().find(|r| r.id == rental.id) {
            Some(slot) => *slot = rental.clone(),
            None => all.push(rental.clone()),
        }
        self.save_all(&all)
    }

    pub fn find(&self, id: &str) -> StoreResult<Option<Rental>> {
        Ok(self.load_all()?.into_iter().find(|r| r.id == id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::tempdir;

    #[test]
    fn test_active_rental_has_empty_end_time() {
        let dir = tempdir().unwrap();
        let store = RentalStore::new(dir.path().join(FILE_NAME));

        let mut ended = Rental::new("R1001", "U001", "LON-ES001", Utc::now());
        ended.end(Utc::now());
        let active = Rental::new("R1002", "U002", "LON-B001", Utc::now());
        store.save_all(&[ended, active]).unwrap();

        let raw = std::fs::read_to_string(dir.path().join(FILE_NAME)).unwrap();
        assert_eq!(
            raw.lines().next().unwrap(),
            "id,userId,vehicleId,startTime,endTime,active"
        );
        let active_line = raw.lines().find(|l| l.starts_with("R1002")).unwrap();
        assert!(active_line.contains(",,true"), "line: {active_line}");

        let loaded = store.load_all().unwrap();
        assert!(loaded[0].end_time.is_some());
        assert!(!loaded[0].active);
        assert!(loaded[1].end_time.is_none());
        assert!(loaded[1].active);
    }

    #[test]
    fn test_save_one_updates_in_place() {
        let dir = tempdir().unwrap();
        let store = RentalStore::new(dir.path().join(FILE_NAME));

        let mut rental = Rental::new("R1001", "U001", "LON-ES001", Utc::now());
        store.save_one(&rental).unwrap();

        rental.end(Utc::now());
        store.save_one(&rental).unwrap();

        let all = store.load_all().unwrap();
        assert_eq!(all.len(), 1);
        assert!(!all[0].active);
    }
}
