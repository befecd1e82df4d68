//! # Domain Error Types
//!
//! Error types for strada-core.
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (vehicle id, states, raw value)
//! 3. Errors are enum variants, never bare strings

use thiserror::Error;

use crate::state::VehicleState;

// =============================================================================
// Transition Error
// =============================================================================

/// A state-machine transition that is not in the legal transition table.
///
/// Surfaced by [`crate::types::Vehicle::transition_to`]. The coordinator
/// treats this as an internal failure and reports a rollback to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal vehicle state transition: {from} -> {to}")]
pub struct TransitionError {
    pub from: VehicleState,
    pub to: VehicleState,
}

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A transition outside the legal table was requested.
    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),

    /// A persisted vehicle kind label did not match any known kind.
    ///
    /// ## When This Occurs
    /// - Hand-edited `vehicles.csv` with a typo in the `type` column
    /// - A file written by a newer release with additional kinds
    #[error("unknown vehicle kind: '{0}'")]
    UnknownVehicleKind(String),

    /// A persisted vehicle state label did not match any known state.
    #[error("unknown vehicle state: '{0}'")]
    UnknownVehicleState(String),

    /// A monetary amount could not be parsed from its decimal form.
    #[error("invalid money amount: '{0}'")]
    InvalidAmount(String),
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_error_message() {
        let err = TransitionError {
            from: VehicleState::Available,
            to: VehicleState::InUse,
        };
        assert_eq!(
            err.to_string(),
            "illegal vehicle state transition: AVAILABLE -> IN_USE"
        );
    }

    #[test]
    fn test_transition_converts_to_core_error() {
        let err = TransitionError {
            from: VehicleState::Maintenance,
            to: VehicleState::InUse,
        };
        let core: CoreError = err.into();
        assert!(matches!(core, CoreError::InvalidTransition(_)));
    }
}
