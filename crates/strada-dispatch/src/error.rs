//! # Dispatch Error Types
//!
//! The coordinator's error taxonomy. The variant names are contractual: they
//! are what callers match on regardless of transport.
//!
//! ## Propagation Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Error Propagation                                   │
//! │                                                                         │
//! │  Policy violation at unlock        → PolicyViolation, verbatim         │
//! │  Policy failure at trip end        → logged, surcharge taken as zero   │
//! │  Audit append refused              → rollback, RolledBack {            │
//! │                                        cause: AuditWriteFailure }      │
//! │  Persistence failure mid-commit    → rollback, RolledBack { cause }    │
//! │  State machine refused (internal)  → surfaced as RolledBack            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use strada_core::{TransitionError, VehicleState};
use strada_store::StoreError;

/// Result type alias for coordinator operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Coordinator error covering every operation failure.
#[derive(Debug, Error)]
pub enum DispatchError {
    // =========================================================================
    // Caller Errors
    // =========================================================================
    /// A user, vehicle, or rental id is unknown.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The vehicle's state precludes the requested operation.
    #[error("vehicle {id} is not available for this operation (state: {state})")]
    NotAvailable { id: String, state: VehicleState },

    /// A city policy gate refused; carries the policy's reason verbatim.
    #[error("policy violation: {reason}")]
    PolicyViolation { reason: String },

    /// End requested on a rental that has already ended.
    #[error("rental {id} is already ended")]
    AlreadyEnded { id: String },

    // =========================================================================
    // Commit Errors
    // =========================================================================
    /// The audit store refused the write-ahead append.
    #[error("audit write failed: {0}")]
    AuditWriteFailure(String),

    /// The operation failed mid-commit; in-memory state was restored to the
    /// pre-operation snapshot.
    #[error("operation rolled back: {cause}")]
    RolledBack { cause: Box<DispatchError> },

    /// The state machine refused a transition. Internal: operations surface
    /// this to callers wrapped in [`DispatchError::RolledBack`].
    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),

    /// A persistence adapter failed.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    // =========================================================================
    // Configuration / Lifecycle Errors
    // =========================================================================
    /// Invalid coordinator configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load a configuration file.
    #[error("failed to load configuration: {0}")]
    ConfigLoadFailed(String),

    /// An internal channel closed while the coordinator was running.
    #[error("channel closed: {0}")]
    ChannelClosed(&'static str),
}

impl DispatchError {
    /// Creates a NotFound error for a given entity and id.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        DispatchError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Wraps a commit failure into the rolled-back form reported to callers.
    pub fn rolled_back(cause: DispatchError) -> Self {
        DispatchError::RolledBack {
            cause: Box::new(cause),
        }
    }

    /// True if this error reports a rollback.
    pub fn is_rolled_back(&self) -> bool {
        matches!(self, DispatchError::RolledBack { .. })
    }

    /// True if this error is a policy gate refusal.
    pub fn is_policy_violation(&self) -> bool {
        matches!(self, DispatchError::PolicyViolation { .. })
    }
}

impl From<std::io::Error> for DispatchError {
    fn from(err: std::io::Error) -> Self {
        DispatchError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for DispatchError {
    fn from(err: toml::de::Error) -> Self {
        DispatchError::ConfigLoadFailed(err.to_string())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_available_message() {
        let err = DispatchError::NotAvailable {
            id: "LON-ES001".into(),
            state: VehicleState::Reserved,
        };
        assert!(err.to_string().contains("LON-ES001"));
        assert!(err.to_string().contains("RESERVED"));
    }

    #[test]
    fn test_rolled_back_carries_cause() {
        let err = DispatchError::rolled_back(DispatchError::AuditWriteFailure("disk full".into()));
        assert!(err.is_rolled_back());
        assert!(err.to_string().contains("audit write failed"));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_categorization_helpers() {
        let policy = DispatchError::PolicyViolation {
            reason: "battery too low".into(),
        };
        assert!(policy.is_policy_violation());
        assert!(!policy.is_rolled_back());
    }
}
