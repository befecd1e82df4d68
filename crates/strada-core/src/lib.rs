//! # strada-core: Pure Domain Logic for the Strada Fleet Control Plane
//!
//! This crate is the **heart** of Strada. It contains the fleet domain model
//! as pure types and functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Strada Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 strada-dispatch (Coordinator)                   │   │
//! │  │   reserve / start / end / check_gps / telemetry / audit         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ strada-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │    geo    │  │   types   │  │   state   │  │   audit   │  │   │
//! │  │   │ GeoPoint  │  │  Vehicle  │  │ Vehicle-  │  │ AuditEntry│  │   │
//! │  │   │   Zone    │  │  Rental   │  │   State   │  │  checksum │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 strada-store (CSV persistence)                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`geo`] - Coordinates, haversine distance, circular zones
//! - [`types`] - Domain entities (Vehicle, Rental, Payment, User, telemetry)
//! - [`state`] - The vehicle state machine and its transition table
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`audit`] - Audit entry and the checksum-chain primitives
//! - [`error`] - Domain error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod audit;
pub mod error;
pub mod geo;
pub mod money;
pub mod state;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use audit::{AuditEntry, GENESIS_CHECKSUM};
pub use error::{CoreError, CoreResult, TransitionError};
pub use geo::{GeoPoint, Zone};
pub use money::Money;
pub use state::VehicleState;
pub use types::{Payment, Rental, TelemetrySample, User, Vehicle, VehicleKind};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Flat base fare charged per trip, approximating a 20-minute ride at the
/// reference tariff of 0.30/min. Trip duration does not drive the fare.
pub const BASE_FARE: Money = Money::from_cents(600);

/// Ambient temperature assigned to freshly provisioned vehicles.
pub const DEFAULT_TEMPERATURE_C: f64 = 20.0;
