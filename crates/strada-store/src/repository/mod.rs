//! # Repositories
//!
//! One adapter per entity table. Each adapter converts between the domain
//! type and a serde record struct whose field renames pin the CSV header
//! exactly.
//!
//! Shared behaviour lives here: whole-file reads that tolerate individually
//! malformed rows (they are logged and skipped, so the rest of the file
//! stays usable after a partial hand edit), and whole-file rewrites that
//! always emit the header, even for an empty table.

pub mod audit;
pub mod payments;
pub mod rentals;
pub mod users;
pub mod vehicles;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::warn;

use crate::error::{StoreError, StoreResult};

/// Reads every row of a CSV table. A missing file is an empty table.
/// Rows that fail to deserialize are logged and skipped.
pub(crate) fn read_rows<T: DeserializeOwned>(path: &Path) -> StoreResult<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = csv::Reader::from_path(path).map_err(|e| StoreError::read_failed(path, e))?;

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => warn!(file = %path.display(), error = %e, "Skipping malformed row"),
        }
    }
    Ok(rows)
}

/// Rewrites a CSV table: the fixed header row, then the given records.
pub(crate) fn write_rows<T: Serialize>(path: &Path, header: &[&str], rows: &[T]) -> StoreResult<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| StoreError::write_failed(path, e))?;

    writer
        .write_record(header)
        .map_err(|e| StoreError::write_failed(path, e))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| StoreError::write_failed(path, e))?;
    }
    writer.flush().map_err(|e| StoreError::write_failed(path, e))
}
