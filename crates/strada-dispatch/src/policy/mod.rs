//! # Policy Gates
//!
//! Per-city regulatory policy, enforced by the coordinator at four points:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Policy Gate Call Sites                             │
//! │                                                                         │
//! │  start   ──► before_unlock(vehicle, telemetry, rental)                 │
//! │          ──► validate_transition(vehicle, IN_USE)                      │
//! │  end     ──► after_trip(rental, base) → surcharge                      │
//! │  gps     ──► is_allowed(vehicle, gps) → violation triggers             │
//! │              the emergency-lock procedure                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cities without a registered policy fall back to the no-op default.

pub mod london;
pub mod milan;
pub mod rome;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use strada_core::{GeoPoint, Money, Rental, TelemetrySample, Vehicle, VehicleState};

pub use london::LondonPolicy;
pub use milan::MilanPolicy;
pub use rome::RomePolicy;

/// Minimum battery level required to start a rental in every policy city.
pub const MIN_UNLOCK_BATTERY_PERCENT: u8 = 15;

// =============================================================================
// Policy Violation
// =============================================================================

/// A policy gate refusal, carrying the policy's reason text verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyViolation {
    pub reason: String,
}

impl PolicyViolation {
    pub fn new(reason: impl Into<String>) -> Self {
        PolicyViolation {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for PolicyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl std::error::Error for PolicyViolation {}

impl From<PolicyViolation> for crate::error::DispatchError {
    fn from(violation: PolicyViolation) -> Self {
        crate::error::DispatchError::PolicyViolation {
            reason: violation.reason,
        }
    }
}

/// Result type for policy gates.
pub type PolicyResult<T> = Result<T, PolicyViolation>;

// =============================================================================
// City Policy Trait
// =============================================================================

/// The capability set every city policy exposes.
pub trait CityPolicy: Send + Sync {
    /// Called before unlocking a vehicle; a violation blocks the unlock.
    fn before_unlock(
        &self,
        vehicle: &Vehicle,
        telemetry: &TelemetrySample,
        rental: &Rental,
    ) -> PolicyResult<()>;

    /// Called after a trip ends; returns the surcharge to add to the base
    /// fare (never negative).
    fn after_trip(&self, rental: &Rental, base_amount: Money) -> PolicyResult<Money>;

    /// Validates a state transition against city-specific rules.
    fn validate_transition(&self, vehicle: &Vehicle, target: VehicleState) -> PolicyResult<()>;

    /// Checks whether the vehicle is allowed at the given GPS position.
    /// The coordinator treats a violation as an emergency-lock trigger.
    fn is_allowed(&self, vehicle: &Vehicle, gps: GeoPoint) -> PolicyResult<()>;
}

// =============================================================================
// Default Policy
// =============================================================================

/// No-op policy for cities without specific rules.
pub struct DefaultPolicy;

impl CityPolicy for DefaultPolicy {
    fn before_unlock(
        &self,
        _vehicle: &Vehicle,
        _telemetry: &TelemetrySample,
        _rental: &Rental,
    ) -> PolicyResult<()> {
        Ok(())
    }

    fn after_trip(&self, _rental: &Rental, _base_amount: Money) -> PolicyResult<Money> {
        Ok(Money::zero())
    }

    fn validate_transition(&self, _vehicle: &Vehicle, _target: VehicleState) -> PolicyResult<()> {
        Ok(())
    }

    fn is_allowed(&self, _vehicle: &Vehicle, _gps: GeoPoint) -> PolicyResult<()> {
        Ok(())
    }
}

// =============================================================================
// Policy Registry
// =============================================================================

/// City-name-keyed policy lookup with a no-op fallback.
pub struct PolicyRegistry {
    policies: HashMap<String, Arc<dyn CityPolicy>>,
    fallback: Arc<dyn CityPolicy>,
}

impl PolicyRegistry {
    /// The standard registry: London, Milan, and Rome.
    pub fn standard() -> Self {
        let mut policies: HashMap<String, Arc<dyn CityPolicy>> = HashMap::new();
        policies.insert("London".to_string(), Arc::new(LondonPolicy));
        policies.insert("Milan".to_string(), Arc::new(MilanPolicy));
        policies.insert("Rome".to_string(), Arc::new(RomePolicy));
        PolicyRegistry {
            policies,
            fallback: Arc::new(DefaultPolicy),
        }
    }

    /// Returns the policy for a city, or the no-op default.
    pub fn for_city(&self, city: &str) -> &Arc<dyn CityPolicy> {
        self.policies.get(city).unwrap_or(&self.fallback)
    }
}

impl Default for PolicyRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
