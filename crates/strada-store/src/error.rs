//! # Store Error Types
//!
//! Error types for the CSV persistence layer.

use std::path::Path;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// CSV persistence errors.
///
/// Each variant names the file involved so callers can report which table
/// refused the operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The data directory could not be created.
    #[error("failed to create data directory {dir}: {message}")]
    CreateDirFailed { dir: String, message: String },

    /// A table file could not be read.
    #[error("failed to read {file}: {message}")]
    ReadFailed { file: String, message: String },

    /// A table file could not be written.
    ///
    /// ## When This Occurs
    /// - Disk full or filesystem read-only
    /// - Data directory removed underneath a running coordinator
    ///
    /// For the audit table this is the failure that vetoes a commit.
    #[error("failed to write {file}: {message}")]
    WriteFailed { file: String, message: String },

    /// A row existed but did not map back to a domain value.
    #[error("malformed record in {file}: {message}")]
    MalformedRecord { file: String, message: String },
}

impl StoreError {
    pub(crate) fn create_dir_failed(dir: &Path, err: std::io::Error) -> Self {
        StoreError::CreateDirFailed {
            dir: dir.display().to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn read_failed(file: &Path, err: impl std::fmt::Display) -> Self {
        StoreError::ReadFailed {
            file: file.display().to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn write_failed(file: &Path, err: impl std::fmt::Display) -> Self {
        StoreError::WriteFailed {
            file: file.display().to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn malformed(file: &Path, err: impl std::fmt::Display) -> Self {
        StoreError::MalformedRecord {
            file: file.display().to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_error_messages_name_the_file() {
        let path = PathBuf::from("data/vehicles.csv");
        let err = StoreError::malformed(&path, "unknown vehicle kind: 'Unicycle'");
        assert!(err.to_string().contains("data/vehicles.csv"));
        assert!(err.to_string().contains("Unicycle"));
    }
}
