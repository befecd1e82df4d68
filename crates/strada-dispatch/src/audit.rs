//! # Audit Log
//!
//! The checksum-chained, write-ahead-persisted audit trail.
//!
//! ## Append Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Write-Ahead Append                                   │
//! │                                                                         │
//! │  record(event, payload)                                                │
//! │       │                                                                 │
//! │       ▼  (audit mutex held for the whole triple)                       │
//! │  1. build entry: seq = last committed + 1,                             │
//! │                  prev = last checksum (or genesis)                     │
//! │  2. append entry to audit_log.csv      ── FAILS? ──► AuditWriteFailure │
//! │  3. push entry to the in-memory chain      (seq not consumed,          │
//! │       │                                     chain unchanged)           │
//! │       ▼                                                                 │
//! │  entry committed; seq_ids are gap-free by construction                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The mutex is a plain blocking lock: the append is one short file write
//! and the lock is never held across an await.

use parking_lot::Mutex;
use std::fmt;
use tracing::{info, warn};

use strada_core::{AuditEntry, GENESIS_CHECKSUM};
use strada_store::{AuditLogStore, StoreResult};

use crate::error::{DispatchError, DispatchResult};

// =============================================================================
// Audit Events
// =============================================================================

/// The stable audit event vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditEvent {
    VehicleReserved,
    RentalStarted,
    RentalEnded,
    PaymentProcessed,
    EmergencyLock,
    EmergencyRentalEnd,
    VehicleMaintenance,
    VehicleThrottled,
    LowBatteryWarning,
}

impl AuditEvent {
    /// Canonical event-type label, as persisted in the audit table.
    pub fn as_str(self) -> &'static str {
        match self {
            AuditEvent::VehicleReserved => "VEHICLE_RESERVED",
            AuditEvent::RentalStarted => "RENTAL_STARTED",
            AuditEvent::RentalEnded => "RENTAL_ENDED",
            AuditEvent::PaymentProcessed => "PAYMENT_PROCESSED",
            AuditEvent::EmergencyLock => "EMERGENCY_LOCK",
            AuditEvent::EmergencyRentalEnd => "EMERGENCY_RENTAL_END",
            AuditEvent::VehicleMaintenance => "VEHICLE_MAINTENANCE",
            AuditEvent::VehicleThrottled => "VEHICLE_THROTTLED",
            AuditEvent::LowBatteryWarning => "LOW_BATTERY_WARNING",
        }
    }
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Audit Log
// =============================================================================

struct ChainState {
    entries: Vec<AuditEntry>,
    /// Last committed sequence number; 0 before the first entry.
    last_seq: u64,
}

/// The tamper-evident audit log.
///
/// Holds the in-memory chain and the append-only store; every committed
/// entry is on disk before it is visible in memory.
pub struct AuditLog {
    store: AuditLogStore,
    chain: Mutex<ChainState>,
}

impl AuditLog {
    /// Opens the log, loading any previously committed chain.
    ///
    /// Loading does not verify the chain; operators call
    /// [`AuditLog::verify_chain`] explicitly.
    pub fn open(store: AuditLogStore) -> StoreResult<Self> {
        let entries = store.load_all()?;
        let last_seq = entries.iter().map(|e| e.seq_id).max().unwrap_or(0);
        if !entries.is_empty() {
            info!(entries = entries.len(), last_seq, "Loaded audit chain");
        }
        Ok(AuditLog {
            store,
            chain: Mutex::new(ChainState { entries, last_seq }),
        })
    }

    /// Creates and commits the next chain entry.
    ///
    /// Sequence allocation, the write-ahead persist, and the in-memory
    /// append happen atomically under the audit mutex: a refused persist
    /// consumes no sequence number and leaves the chain unchanged.
    pub fn record(&self, event: AuditEvent, payload: impl Into<String>) -> DispatchResult<AuditEntry> {
        let payload = payload.into();
        let mut chain = self.chain.lock();

        let seq_id = chain.last_seq + 1;
        let prev_checksum = chain
            .entries
            .last()
            .map(|e| e.checksum.clone())
            .unwrap_or_else(|| GENESIS_CHECKSUM.to_string());
        let timestamp = chrono::Utc::now().to_rfc3339();

        let entry = AuditEntry::new(seq_id, timestamp, event.as_str(), payload, prev_checksum);

        if let Err(e) = self.store.append(&entry) {
            warn!(seq_id, error = %e, "Audit persist refused; in-memory chain unchanged");
            return Err(DispatchError::AuditWriteFailure(e.to_string()));
        }

        chain.last_seq = seq_id;
        chain.entries.push(entry.clone());
        Ok(entry)
    }

    /// Re-walks the chain, checking every link and every stored checksum.
    pub fn verify_chain(&self) -> bool {
        let chain = self.chain.lock();
        let mut prev_checksum = GENESIS_CHECKSUM;
        for entry in &chain.entries {
            if !entry.verify_integrity(prev_checksum) {
                warn!(seq_id = entry.seq_id, "Audit chain integrity violation");
                return false;
            }
            prev_checksum = &entry.checksum;
        }
        info!(entries = chain.entries.len(), "Audit chain integrity verified");
        true
    }

    /// Snapshot of the committed chain.
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.chain.lock().entries.clone()
    }

    /// Last committed sequence number (0 when the chain is empty).
    pub fn last_committed_seq(&self) -> u64 {
        self.chain.lock().last_seq
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
