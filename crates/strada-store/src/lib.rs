//! # strada-store: CSV Persistence for the Strada Fleet Control Plane
//!
//! Table-oriented load/save adapters for every domain entity, plus the
//! append-only audit table. One UTF-8 CSV file per entity under a single
//! data directory.
//!
//! ## File Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        data/ directory                                  │
//! │                                                                         │
//! │  vehicles.csv    id,type,state,batteryPercent,temperatureC,lat,lon,city│
//! │  users.csv       id,name                                               │
//! │  rentals.csv     id,userId,vehicleId,startTime,endTime,active          │
//! │  payments.csv    id,rentalId,baseAmount,surcharges,total,description   │
//! │  audit_log.csv   seqId,timestamp,eventType,payload,prevChecksum,       │
//! │                  checksum                    (append-only, chained)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The entity tables are write-through: `save_all` rewrites the whole file,
//! `save_one` is an upsert over it. Only the audit table is appended to;
//! rewriting it would defeat the tamper-evident chain.
//!
//! ## Usage
//! ```rust,ignore
//! use strada_store::Store;
//!
//! let store = Store::open("./data")?;
//! let fleet = store.vehicles().load_all()?;
//! store.vehicles().save_all(&fleet)?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod repository;
pub mod seed;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use repository::audit::AuditLogStore;
pub use repository::payments::PaymentStore;
pub use repository::rentals::RentalStore;
pub use repository::users::UserStore;
pub use repository::vehicles::VehicleStore;

use std::path::{Path, PathBuf};

// =============================================================================
// Store
// =============================================================================

/// Handle to the data directory, handing out one adapter per entity table.
#[derive(Debug, Clone)]
pub struct Store {
    root: PathBuf,
}

impl Store {
    /// Opens (and if needed creates) the data directory.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .map_err(|e| StoreError::create_dir_failed(&root, e))?;
        Ok(Store { root })
    }

    /// The data directory this store reads and writes.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Adapter for `vehicles.csv`.
    pub fn vehicles(&self) -> VehicleStore {
        VehicleStore::new(self.root.join(repository::vehicles::FILE_NAME))
    }

    /// Adapter for `users.csv`.
    pub fn users(&self) -> UserStore {
        UserStore::new(self.root.join(repository::users::FILE_NAME))
    }

    /// Adapter for `rentals.csv`.
    pub fn rentals(&self) -> RentalStore {
        RentalStore::new(self.root.join(repository::rentals::FILE_NAME))
    }

    /// Adapter for `payments.csv`.
    pub fn payments(&self) -> PaymentStore {
        PaymentStore::new(self.root.join(repository::payments::FILE_NAME))
    }

    /// Adapter for the append-only `audit_log.csv`.
    pub fn audit(&self) -> AuditLogStore {
        AuditLogStore::new(self.root.join(repository::audit::FILE_NAME))
    }
}
