//! # User Table
//!
//! Adapter for `users.csv`. Users are immutable lookup records.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use strada_core::User;

use crate::error::StoreResult;
use crate::repository::{read_rows, write_rows};

pub const FILE_NAME: &str = "users.csv";

const HEADER: [&str; 2] = ["id", "name"];

#[derive(Debug, Serialize, Deserialize)]
struct UserRecord {
    id: String,
    name: String,
}

/// Load/save adapter for the user table.
#[derive(Debug, Clone)]
pub struct UserStore {
    path: PathBuf,
}

impl UserStore {
    pub(crate) fn new(path: PathBuf) -> Self {
        UserStore { path }
    }

    pub fn load_all(&self) -> StoreResult<Vec<User>> {
        let rows: Vec<UserRecord> = read_rows(&self.path)?;
        Ok(rows.into_iter().map(|r| User::new(r.id, r.name)).collect())
    }

    pub fn save_all(&self, users: &[User]) -> StoreResult<()> {
        let rows: Vec<UserRecord> = users
            .iter()
            .map(|u| UserRecord {
                id: u.id.clone(),
                name: u.name.clone(),
            })
            .collect();
        write_rows(&self.path, &HEADER, &rows)
    }

    pub fn save_one(&self, user: &User) -> StoreResult<()> {
        let mut all = self.load_all()?;
        match all.iter_mut().find(|u| u.id == user.id) {
            Some(slot) => *slot = user.clone(),
            None => all.push(user.clone()),
        }
        self.save_all(&all)
    }

    pub fn find(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(self.load_all()?.into_iter().find(|u| u.id == id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_round_trip_with_quoting() {
        let dir = tempdir().unwrap();
        let store = UserStore::new(dir.path().join(FILE_NAME));

        let users = vec![
            User::new("U001", "Alice Johnson"),
            // Commas and quotes must survive the CSV layer.
            User::new("U002", "Smith, Bob \"Bobby\""),
        ];
        store.save_all(&users).unwrap();

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].name, "Smith, Bob \"Bobby\"");

        let raw = std::fs::read_to_string(dir.path().join(FILE_NAME)).unwrap();
        assert_eq!(raw.lines().next().unwrap(), "id,name");
        assert!(raw.contains("\"Smith, Bob \"\"Bobby\"\"\""));
    }

    #[test]
    fn test_find() {
        let dir = tempdir().unwrap();
        let store = UserStore::new(dir.path().join(FILE_NAME));
        store.save_all(&[User::new("U001", "Alice Johnson")]).unwrap();

        assert_eq!(store.find("U001").unwrap().unwrap().name, "Alice Johnson");
        assert!(store.find("U999").unwrap().is_none());
    }
}
