//! # Vehicle State Machine
//!
//! The legal lifecycle of every vehicle in the fleet.
//!
//! ## Transition Table
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Vehicle State Transitions                           │
//! │                                                                         │
//! │   AVAILABLE ──────► RESERVED ──────► IN_USE                            │
//! │       ▲ ▲              │                │                               │
//! │       │ └──────────────┘                │                               │
//! │       └─────────────────────────────────┘                               │
//! │                                                                         │
//! │   Every non-terminal state can reach EMERGENCY_LOCK except             │
//! │   RELOCATING; MAINTENANCE and RELOCATING drain back to AVAILABLE.      │
//! │   EMERGENCY_LOCK releases only through operator action                 │
//! │   (MAINTENANCE or AVAILABLE).                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The table lives here as a pure predicate; guarded mutation is on
//! [`crate::types::Vehicle`], which is the only place state is written.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

// =============================================================================
// Vehicle State
// =============================================================================

/// Lifecycle state of a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleState {
    /// Parked and open for reservation.
    Available,
    /// Held for a user who has not yet unlocked it.
    Reserved,
    /// Actively rented and moving.
    InUse,
    /// Pulled from circulation for service; also models retirement.
    Maintenance,
    /// Locked down by a policy or telemetry emergency until an operator
    /// intervenes.
    EmergencyLock,
    /// Being repositioned by the operations team.
    Relocating,
}

impl VehicleState {
    /// Returns true if the transition `self -> to` is in the legal table.
    pub fn can_transition_to(self, to: VehicleState) -> bool {
        use VehicleState::*;
        match self {
            Available => matches!(to, Reserved | Maintenance | EmergencyLock | Relocating),
            Reserved => matches!(to, InUse | Available | EmergencyLock),
            InUse => matches!(to, Available | Maintenance | EmergencyLock),
            Maintenance => matches!(to, Available | EmergencyLock),
            EmergencyLock => matches!(to, Maintenance | Available),
            Relocating => matches!(to, Available | Maintenance),
        }
    }

    /// Canonical SCREAMING_SNAKE_CASE label, as persisted and audited.
    pub fn as_str(self) -> &'static str {
        match self {
            VehicleState::Available => "AVAILABLE",
            VehicleState::Reserved => "RESERVED",
            VehicleState::InUse => "IN_USE",
            VehicleState::Maintenance => "MAINTENANCE",
            VehicleState::EmergencyLock => "EMERGENCY_LOCK",
            VehicleState::Relocating => "RELOCATING",
        }
    }
}

impl fmt::Display for VehicleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleState {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AVAILABLE" => Ok(VehicleState::Available),
            "RESERVED" => Ok(VehicleState::Reserved),
            "IN_USE" => Ok(VehicleState::InUse),
            "MAINTENANCE" => Ok(VehicleState::Maintenance),
            "EMERGENCY_LOCK" => Ok(VehicleState::EmergencyLock),
            "RELOCATING" => Ok(VehicleState::Relocating),
            other => Err(CoreError::UnknownVehicleState(other.to_string())),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
