//! # Audit Table
//!
//! Append-only adapter for `audit_log.csv`.
//!
//! Unlike the entity tables this file is never rewritten: the chained
//! checksums make every committed line immutable, and the write-ahead
//! discipline of the audit component depends on a single appended line
//! either landing on disk or failing the whole commit.

use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use strada_core::AuditEntry;

use crate::error::{StoreError, StoreResult};
use crate::repository::read_rows;

pub const FILE_NAME: &str = "audit_log.csv";

const HEADER: &str = "seqId,timestamp,eventType,payload,prevChecksum,checksum";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuditRecord {
    seq_id: u64,
    timestamp: String,
    event_type: String,
    payload: String,
    prev_checksum: String,
    checksum: String,
}

impl From<&AuditEntry> for AuditRecord {
    fn from(e: &AuditEntry) -> Self {
        AuditRecord {
            seq_id: e.seq_id,
            timestamp: e.timestamp.clone(),
            event_type: e.event_type.clone(),
            payload: e.payload.clone(),
            prev_checksum: e.prev_checksum.clone(),
            checksum: e.checksum.clone(),
        }
    }
}

impl AuditRecord {
    fn into_entry(self) -> AuditEntry {
        AuditEntry::restore(
            self.seq_id,
            self.timestamp,
            self.event_type,
            self.payload,
            self.prev_checksum,
            self.checksum,
        )
    }
}

// =============================================================================
// Audit Log Store
// =============================================================================

/// Append-only adapter for the audit table.
#[derive(Debug, Clone)]
pub struct AuditLogStore {
    path: PathBuf,
}

impl AuditLogStore {
    pub(crate) fn new(path: PathBuf) -> Self {
        AuditLogStore { path }
    }

    /// Loads the persisted chain in file order.
    pub fn load_all(&self) -> StoreResult<Vec<AuditEntry>> {
        let rows: Vec<AuditRecord> = read_rows(&self.path)?;
        Ok(rows.into_iter().map(AuditRecord::into_entry).collect())
    }

    /// Appends one entry. The header is written when the file is created;
    /// existing lines are never touched.
    pub fn append(&self, entry: &AuditEntry) -> StoreResult<()> {
        let exists = self.path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::write_failed(&self.path, e))?;

        if !exists {
            writeln!(file, "{HEADER}").map_err(|e| StoreError::write_failed(&self.path, e))?;
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer
            .serialize(AuditRecord::from(entry))
            .map_err(|e| StoreError::write_failed(&self.path, e))?;
        writer
            .flush()
            .map_err(|e| StoreError::write_failed(&self.path, e))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use strada_core::GENESIS_CHECKSUM;
    use tempfile::tempdir;

    fn entry(seq: u64, prev: &str) -> AuditEntry {
        AuditEntry::new(
            seq,
            format!("2026-08-02T10:0{seq}:00Z"),
            "VEHICLE_RESERVED",
            format!("vehicle=LON-ES001 user=U001 rental=R100{seq}"),
            prev,
        )
    }

    #[test]
    fn test_append_preserves_prior_lines() {
        let dir = tempdir().unwrap();
        let store = AuditLogStore::new(dir.path().join(FILE_NAME));

        let first = entry(1, GENESIS_CHECKSUM);
        store.append(&first).unwrap();
        let raw_after_first = std::fs::read_to_string(dir.path().join(FILE_NAME)).unwrap();

        let second = entry(2, &first.checksum);
        store.append(&second).unwrap();
        let raw_after_second = std::fs::read_to_string(dir.path().join(FILE_NAME)).unwrap();

        assert!(raw_after_second.starts_with(&raw_after_first));
        assert_eq!(raw_after_second.lines().count(), 3); // header + 2 entries
        assert_eq!(raw_after_second.lines().next().unwrap(), HEADER);
    }

    #[test]
    fn test_load_round_trips_entries() {
        let dir = tempdir().unwrap();
        let store = AuditLogStore::new(dir.path().join(FILE_NAME));

        let first = entry(1, GENESIS_CHECKSUM);
        let second = entry(2, &first.checksum);
        store.append(&first).unwrap();
        store.append(&second).unwrap();

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded, vec![first.clone(), second.clone()]);
        assert!(loaded[0].verify_integrity(GENESIS_CHECKSUM));
        assert!(loaded[1].verify_integrity(&first.checksum));
    }

    #[test]
    fn test_append_fails_when_path_unwritable() {
        let dir = tempdir().unwrap();
        // A directory where the file should be makes the open fail.
        let path = dir.path().join(FILE_NAME);
        std::fs::create_dir(&path).unwrap();

        let store = AuditLogStore::new(path);
        let err = store.append(&entry(1, GENESIS_CHECKSUM)).unwrap_err();
        assert!(matches!(err, StoreError::WriteFailed { .. }));
    }
}
