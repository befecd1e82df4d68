//! # strada-dispatch: The Strada Transactional Coordinator
//!
//! The control plane of the shared mobility fleet: a single coordinator
//! mediating reservation, unlock, return, GPS validation and emergency
//! response across cities, with per-city policy gates, a background
//! telemetry pipeline, and a checksum-chained write-ahead audit trail.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       strada-dispatch                                   │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                        Coordinator                               │  │
//! │  │                                                                  │  │
//! │  │  • reserve / start / end / check_gps / submit_telemetry          │  │
//! │  │  • per-vehicle mutexes, rollback snapshots                       │  │
//! │  │  • owns the authoritative in-memory tables                       │  │
//! │  └───────┬──────────────────┬──────────────────┬────────────────────┘  │
//! │          ▼                  ▼                  ▼                        │
//! │  ┌──────────────┐  ┌────────────────┐  ┌────────────────────────┐     │
//! │  │ Policy gates │  │   Audit log    │  │  Telemetry pipeline    │     │
//! │  │ London/Milan │  │ djb2 checksum  │  │ bounded queue + single │     │
//! │  │ /Rome + noop │  │ chain, write-  │  │ consumer, classified   │     │
//! │  │ fallback     │  │ ahead append   │  │ events back into the   │     │
//! │  │              │  │                │  │ locked reaction paths  │     │
//! │  └──────────────┘  └────────────────┘  └────────────────────────┘     │
//! │          │                  │                  │                        │
//! │          └──────────────────┴──────────────────┘                        │
//! │                             ▼                                           │
//! │                 strada-store (CSV tables)                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`coordinator`] - The service object and its operations
//! - [`policy`] - Per-city policy gates
//! - [`audit`] - The chained audit log
//! - [`telemetry`] - The bounded queue, worker, and classification
//! - [`config`] - TOML + environment configuration
//! - [`error`] - The coordinator's error taxonomy
//!
//! ## Usage
//!
//! ```rust,ignore
//! use strada_dispatch::{Coordinator, DispatchConfig};
//!
//! let coordinator = Coordinator::launch(DispatchConfig::with_data_dir("./data")).await?;
//!
//! let rental = coordinator.reserve("U001", "LON-ES001").await?;
//! coordinator.start(&rental.id, "LON-ES001").await?;
//! let payment = coordinator.end(&rental.id, "LON-ES001").await?;
//!
//! assert!(coordinator.verify_audit_chain());
//! coordinator.shutdown().await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod audit;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod policy;
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

pub use audit::{AuditEvent, AuditLog};
pub use config::DispatchConfig;
pub use coordinator::Coordinator;
pub use error::{DispatchError, DispatchResult};
pub use policy::{CityPolicy, PolicyRegistry, PolicyViolation};
pub use telemetry::{TelemetryAlert, TelemetryEvent, TelemetryMonitor};
