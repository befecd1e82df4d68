//! # Coordinator
//!
//! The single service object mediating every state-changing operation on
//! the fleet.
//!
//! ## Operation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Coordinator Operation Flow                           │
//! │                                                                         │
//! │  caller ──► operation (reserve / start / end / check_gps)              │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │  1. resolve entities            (NotFound)                             │
//! │  2. acquire per-vehicle mutex   (operations on one vehicle serialise,  │
//! │                                  distinct vehicles run in parallel)    │
//! │  3. policy gate                 (PolicyViolation)                      │
//! │  4. snapshot + state transition                                        │
//! │  5. persist entity tables                                              │
//! │  6. append audit entry          (write-ahead: commit gate)             │
//! │  7. clear snapshot, release mutex                                      │
//! │                                                                         │
//! │  Any failure in 5-6 forces the snapshot back and reports               │
//! │  RolledBack { cause } to the caller. Rollback never audits.            │
//! │                                                                         │
//! │  TELEMETRY: monitor worker ──► event channel ──► reactor task ──►      │
//! │  the same locked path (emergency lock, forced rental end, audits).     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use strada_core::{
    AuditEntry, GeoPoint, Money, Payment, Rental, TelemetrySample, User, Vehicle, VehicleState,
    BASE_FARE,
};
use strada_store::Store;

use crate::audit::{AuditEvent, AuditLog};
use crate::config::DispatchConfig;
use crate::error::{DispatchError, DispatchResult};
use crate::policy::PolicyRegistry;
use crate::telemetry::{TelemetryAlert, TelemetryEvent, TelemetryMonitor};

/// Rental and payment counters start above the seeded id space.
const ID_SEQ_FLOOR: u64 = 1000;

// =============================================================================
// Coordinator
// =============================================================================

/// The fleet coordinator: owns the authoritative in-memory tables and the
/// background telemetry pipeline.
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
    monitor: TelemetryMonitor,
    reactor: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

struct CoordinatorInner {
    store: Store,
    audit: AuditLog,
    policies: PolicyRegistry,

    // Authoritative in-memory tables.
    vehicles: DashMap<String, Arc<RwLock<Vehicle>>>,
    users: DashMap<String, User>,
    rentals: DashMap<String, Rental>,
    payments: DashMap<String, Payment>,

    // Per-vehicle operation mutexes, lazily created, never removed.
    vehicle_locks: DashMap<String, Arc<tokio::sync::Mutex<()>>>,

    // Rollback snapshots: vehicle id -> last stable state. An entry is only
    // touched by the thread holding that vehicle's mutex.
    snapshots: DashMap<String, VehicleState>,

    rental_seq: AtomicU64,
    payment_seq: AtomicU64,
}

impl Coordinator {
    /// Loads persisted state, spawns the telemetry worker and the event
    /// reactor, and returns the running coordinator.
    pub async fn launch(config: DispatchConfig) -> DispatchResult<Self> {
        config.validate()?;

        let store = Store::open(config.data_dir())?;

        let vehicles = DashMap::new();
        let vehicle_locks = DashMap::new();
        for vehicle in store.vehicles().load_all()? {
            vehicle_locks.insert(vehicle.id.clone(), Arc::new(tokio::sync::Mutex::new(())));
            vehicles.insert(vehicle.id.clone(), Arc::new(RwLock::new(vehicle)));
        }

        let users = DashMap::new();
        for user in store.users().load_all()? {
            users.insert(user.id.clone(), user);
        }

        let rentals = DashMap::new();
        for rental in store.rentals().load_all()? {
            rentals.insert(rental.id.clone(), rental);
        }

        let payments = DashMap::new();
        for payment in store.payments().load_all()? {
            payments.insert(payment.id.clone(), payment);
        }

        let rental_seq = AtomicU64::new(seq_floor(rentals.iter().map(|r| r.key().clone()), 'R'));
        let payment_seq = AtomicU64::new(seq_floor(payments.iter().map(|p| p.key().clone()), 'P'));

        let audit = AuditLog::open(store.audit())?;

        let (event_tx, event_rx) = mpsc::channel(config.telemetry.event_capacity);
        let monitor = TelemetryMonitor::spawn(config.telemetry.queue_capacity, event_tx);

        let inner = Arc::new(CoordinatorInner {
            store,
            audit,
            policies: PolicyRegistry::standard(),
            vehicles,
            users,
            rentals,
            payments,
            vehicle_locks,
            snapshots: DashMap::new(),
            rental_seq,
            payment_seq,
        });

        let reactor = tokio::spawn(reactor_loop(inner.clone(), event_rx));

        info!(
            vehicles = inner.vehicles.len(),
            users = inner.users.len(),
            rentals = inner.rentals.len(),
            audit_entries = inner.audit.last_committed_seq(),
            "Coordinator started"
        );

        Ok(Coordinator {
            inner,
            monitor,
            reactor: parking_lot::Mutex::new(Some(reactor)),
        })
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Reserves an available vehicle for a user.
    pub async fn reserve(&self, user_id: &str, vehicle_id: &str) -> DispatchResult<Rental> {
        self.inner.reserve(user_id, vehicle_id).await
    }

    /// Starts a reserved rental, applying the city's pre-unlock gates.
    pub async fn start(&self, rental_id: &str, vehicle_id: &str) -> DispatchResult<()> {
        self.inner.start_rental(rental_id, vehicle_id).await
    }

    /// Ends an active rental and settles the payment, including the city
    /// surcharge.
    pub async fn end(&self, rental_id: &str, vehicle_id: &str) -> DispatchResult<Payment> {
        self.inner.end_rental(rental_id, vehicle_id).await
    }

    /// Checks whether a vehicle is allowed at the given position. A policy
    /// violation triggers the emergency-lock procedure and returns false.
    pub async fn check_gps(&self, vehicle_id: &str, gps: GeoPoint) -> bool {
        self.inner.check_gps(vehicle_id, gps).await
    }

    /// Queues a telemetry sample for the background monitor. Blocks while
    /// the ingress queue is full.
    pub async fn submit_telemetry(
        &self,
        vehicle_id: &str,
        sample: TelemetrySample,
    ) -> DispatchResult<()> {
        let vehicle = self.inner.vehicle_arc(vehicle_id)?;
        self.monitor.submit(vehicle, sample).await
    }

    /// Validates a transition against both the city policy and the state
    /// machine table.
    pub fn validate_transition(&self, vehicle_id: &str, target: VehicleState) -> bool {
        let Ok(vehicle) = self.inner.vehicle_arc(vehicle_id) else {
            return false;
        };
        let view = vehicle.read().clone();
        let policy = self.inner.policies.for_city(&view.city);
        if let Err(violation) = policy.validate_transition(&view, target) {
            warn!(vehicle_id, %violation, "Transition validation failed");
            return false;
        }
        view.state().can_transition_to(target)
    }

    /// Re-walks the audit chain and reports its integrity.
    pub fn verify_audit_chain(&self) -> bool {
        self.inner.audit.verify_chain()
    }

    /// Stops the telemetry monitor, draining any queued samples first.
    pub async fn stop_telemetry_monitor(&self) {
        self.monitor.shutdown().await;
    }

    /// True while the telemetry worker is running.
    pub fn telemetry_monitor_running(&self) -> bool {
        self.monitor.is_running()
    }

    /// Full shutdown: stops the telemetry worker, then the event reactor.
    pub async fn shutdown(&self) {
        self.stop_telemetry_monitor().await;
        let reactor = self.reactor.lock().take();
        if let Some(handle) = reactor {
            if let Err(e) = handle.await {
                warn!(error = %e, "Event reactor ended abnormally");
            }
        }
        info!("Coordinator shut down");
    }

    // =========================================================================
    // Admin / Inspection Surface
    // =========================================================================

    /// Updates a moped's helmet sensor reading. No-op for other kinds.
    pub fn set_helmet_detected(&self, vehicle_id: &str, detected: bool) -> DispatchResult<()> {
        let vehicle = self.inner.vehicle_arc(vehicle_id)?;
        vehicle.write().set_helmet_detected(detected);
        Ok(())
    }

    /// Snapshot of a vehicle.
    pub fn vehicle(&self, vehicle_id: &str) -> Option<Vehicle> {
        self.inner
            .vehicles
            .get(vehicle_id)
            .map(|v| v.value().read().clone())
    }

    /// Current state of a vehicle.
    pub fn vehicle_state(&self, vehicle_id: &str) -> Option<VehicleState> {
        self.inner
            .vehicles
            .get(vehicle_id)
            .map(|v| v.value().read().state())
    }

    /// Snapshot of a rental.
    pub fn rental(&self, rental_id: &str) -> Option<Rental> {
        self.inner.rentals.get(rental_id).map(|r| r.value().clone())
    }

    /// Snapshot of a payment.
    pub fn payment(&self, payment_id: &str) -> Option<Payment> {
        self.inner.payments.get(payment_id).map(|p| p.value().clone())
    }

    /// Looks up a user.
    pub fn user(&self, user_id: &str) -> Option<User> {
        self.inner.users.get(user_id).map(|u| u.value().clone())
    }

    /// Snapshot of the whole fleet, for dashboards.
    pub fn fleet(&self) -> Vec<Vehicle> {
        self.inner
            .vehicles
            .iter()
            .map(|v| v.value().read().clone())
            .collect()
    }

    /// Snapshot of the committed audit chain.
    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        self.inner.audit.entries()
    }
}

// =============================================================================
// Inner Operations
// =============================================================================

impl CoordinatorInner {
    async fn reserve(&self, user_id: &str, vehicle_id: &str) -> DispatchResult<Rental> {
        let user = self
            .users
            .get(user_id)
            .map(|u| u.value().clone())
            .ok_or_else(|| DispatchError::not_found("user", user_id))?;
        let vehicle = self.vehicle_arc(vehicle_id)?;

        let lock = self.vehicle_lock(vehicle_id);
        let _guard = lock.lock().await;

        let state = vehicle.read().state();
        if state != VehicleState::Available {
            return Err(DispatchError::NotAvailable {
                id: vehicle_id.to_string(),
                state,
            });
        }

        self.snapshots.insert(vehicle_id.to_string(), state);
        // Bind before matching so the write guard is released first.
        let transition = vehicle.write().transition_to(VehicleState::Reserved);
        if let Err(e) = transition {
            self.rollback_vehicle(vehicle_id);
            return Err(DispatchError::rolled_back(e.into()));
        }

        let rental_id = format!("R{}", self.rental_seq.fetch_add(1, Ordering::SeqCst) + 1);
        let rental = Rental::new(rental_id.clone(), user_id, vehicle_id, Utc::now());
        self.rentals.insert(rental_id.clone(), rental.clone());

        let commit = (|| -> DispatchResult<()> {
            self.persist_rentals()?;
            self.persist_vehicles()?;
            self.audit.record(
                AuditEvent::VehicleReserved,
                format!("vehicle={vehicle_id} user={user_id} rental={rental_id}"),
            )?;
            Ok(())
        })();

        if let Err(cause) = commit {
            warn!(vehicle_id, rental_id = %rental_id, error = %cause, "Reserve commit failed, rolling back");
            self.rentals.remove(&rental_id);
            self.rollback_vehicle(vehicle_id);
            return Err(DispatchError::rolled_back(cause));
        }

        self.snapshots.remove(vehicle_id);
        info!(vehicle_id, user = %user.name, rental_id = %rental_id, "Vehicle reserved");
        Ok(rental)
    }

    async fn start_rental(&self, rental_id: &str, vehicle_id: &str) -> DispatchResult<()> {
        let rental = self
            .rentals
            .get(rental_id)
            .map(|r| r.value().clone())
            .ok_or_else(|| DispatchError::not_found("rental", rental_id))?;
        let vehicle = self.vehicle_arc(vehicle_id)?;

        let lock = self.vehicle_lock(vehicle_id);
        let _guard = lock.lock().await;

        let view = vehicle.read().clone();
        if view.state() != VehicleState::Reserved {
            return Err(DispatchError::NotAvailable {
                id: vehicle_id.to_string(),
                state: view.state(),
            });
        }

        // Pre-unlock gates run against a synthetic sample built from the
        // vehicle's current attributes.
        let latest_telemetry = view.current_telemetry();
        let policy = self.policies.for_city(&view.city);
        policy.before_unlock(&view, &latest_telemetry, &rental)?;
        policy.validate_transition(&view, VehicleState::InUse)?;

        self.snapshots.insert(vehicle_id.to_string(), view.state());
        // Bind before matching so the write guard is released first.
        let transition = vehicle.write().transition_to(VehicleState::InUse);
        if let Err(e) = transition {
            self.rollback_vehicle(vehicle_id);
            return Err(DispatchError::rolled_back(e.into()));
        }

        let commit = (|| -> DispatchResult<()> {
            self.persist_vehicles()?;
            self.audit.record(
                AuditEvent::RentalStarted,
                format!("vehicle={vehicle_id} rental={rental_id} city={}", view.city),
            )?;
            Ok(())
        })();

        if let Err(cause) = commit {
            warn!(vehicle_id, rental_id, error = %cause, "Start commit failed, rolling back");
            self.rollback_vehicle(vehicle_id);
            return Err(DispatchError::rolled_back(cause));
        }

        self.snapshots.remove(vehicle_id);
        info!(vehicle_id, rental_id, city = %view.city, "Rental started");
        Ok(())
    }

    async fn end_rental(&self, rental_id: &str, vehicle_id: &str) -> DispatchResult<Payment> {
        if !self.rentals.contains_key(rental_id) {
            return Err(DispatchError::not_found("rental", rental_id));
        }
        let vehicle = self.vehicle_arc(vehicle_id)?;

        let lock = self.vehicle_lock(vehicle_id);
        let _guard = lock.lock().await;

        self.end_rental_locked(rental_id, vehicle_id, &vehicle)
    }

    /// The locked core of `end_rental`. Callers must hold the vehicle's
    /// operation mutex; the telemetry reactor reuses this for forced ends.
    fn end_rental_locked(
        &self,
        rental_id: &str,
        vehicle_id: &str,
        vehicle: &Arc<RwLock<Vehicle>>,
    ) -> DispatchResult<Payment> {
        let original_rental = self
            .rentals
            .get(rental_id)
            .map(|r| r.value().clone())
            .ok_or_else(|| DispatchError::not_found("rental", rental_id))?;
        if !original_rental.active {
            return Err(DispatchError::AlreadyEnded {
                id: rental_id.to_string(),
            });
        }

        let view = vehicle.read().clone();
        if view.state() != VehicleState::InUse {
            return Err(DispatchError::NotAvailable {
                id: vehicle_id.to_string(),
                state: view.state(),
            });
        }

        self.snapshots.insert(vehicle_id.to_string(), view.state());

        let mut ended = original_rental.clone();
        ended.end(Utc::now());
        self.rentals.insert(rental_id.to_string(), ended.clone());

        // Trip-end pricing. A policy failure here is logged and the
        // surcharge taken as zero: the rental must end to free the vehicle.
        let policy = self.policies.for_city(&view.city);
        let base_amount = BASE_FARE;
        let surcharge = match policy.after_trip(&ended, base_amount) {
            Ok(surcharge) => surcharge,
            Err(violation) => {
                warn!(rental_id, %violation, "after_trip policy error; surcharge taken as 0");
                Money::zero()
            }
        };

        let payment_id = format!("P{}", self.payment_seq.fetch_add(1, Ordering::SeqCst) + 1);
        let mut description = format!("Rental {rental_id} in {}", view.city);
        if surcharge.is_positive() {
            description.push_str(&format!(" + {} surcharge", view.city));
        }
        let payment = Payment::new(
            payment_id.clone(),
            rental_id,
            base_amount,
            surcharge,
            description,
        );
        self.payments.insert(payment_id.clone(), payment.clone());

        let transitioned = vehicle.write().transition_to(VehicleState::Available);

        let commit = (|| -> DispatchResult<()> {
            transitioned?;
            self.persist_rentals()?;
            self.persist_payments()?;
            self.persist_vehicles()?;
            self.audit.record(
                AuditEvent::RentalEnded,
                format!("vehicle={vehicle_id} rental={rental_id} total={}", payment.total),
            )?;
            self.audit.record(
                AuditEvent::PaymentProcessed,
                format!(
                    "payment={payment_id} rental={rental_id} base={base_amount} surcharge={surcharge} total={}",
                    payment.total
                ),
            )?;
            Ok(())
        })();

        if let Err(cause) = commit {
            warn!(vehicle_id, rental_id, error = %cause, "End commit failed, rolling back");
            self.rentals
                .insert(rental_id.to_string(), original_rental);
            self.payments.remove(&payment_id);
            self.rollback_vehicle(vehicle_id);
            return Err(DispatchError::rolled_back(cause));
        }

        self.snapshots.remove(vehicle_id);
        info!(
            vehicle_id,
            rental_id,
            total = %payment.total,
            base = %base_amount,
            surcharge = %surcharge,
            "Rental ended"
        );
        Ok(payment)
    }

    async fn check_gps(&self, vehicle_id: &str, gps: GeoPoint) -> bool {
        let Ok(vehicle) = self.vehicle_arc(vehicle_id) else {
            return false;
        };

        let lock = self.vehicle_lock(vehicle_id);
        let _guard = lock.lock().await;

        let view = vehicle.read().clone();
        let policy = self.policies.for_city(&view.city);
        match policy.is_allowed(&view, gps) {
            Ok(()) => true,
            Err(violation) => {
                warn!(vehicle_id, %violation, "GPS position violation");
                self.emergency_lock_locked(
                    vehicle_id,
                    &vehicle,
                    &format!("GPS restriction violation: {violation}"),
                );
                false
            }
        }
    }

    // =========================================================================
    // Telemetry Event Reactions (§ run under the vehicle's mutex)
    // =========================================================================

    async fn handle_alert(&self, alert: TelemetryAlert) {
        let vehicle_id = alert.vehicle_id.as_str();
        let Ok(vehicle) = self.vehicle_arc(vehicle_id) else {
            warn!(vehicle_id, "Alert for unknown vehicle dropped");
            return;
        };

        let lock = self.vehicle_lock(vehicle_id);
        let _guard = lock.lock().await;

        match alert.event {
            TelemetryEvent::CriticalTemperature => {
                let temperature = vehicle.read().temperature_c;
                error!(vehicle_id, temperature, "Critical temperature, emergency lock");
                self.emergency_lock_locked(
                    vehicle_id,
                    &vehicle,
                    &format!("Critical temperature: {temperature:.1}C"),
                );
            }

            TelemetryEvent::HighTemperatureWarning => {
                let temperature = vehicle.read().temperature_c;
                warn!(vehicle_id, temperature, "High temperature, throttling speed");
                self.record_or_rollback(
                    AuditEvent::VehicleThrottled,
                    format!("vehicle={vehicle_id} temp={temperature:.1}C"),
                );
            }

            TelemetryEvent::CriticalBattery => {
                let state = vehicle.read().state();
                if state == VehicleState::InUse {
                    self.emergency_end_rental(vehicle_id, &vehicle);
                } else {
                    let battery = vehicle.read().battery_percent;
                    self.send_to_maintenance(
                        vehicle_id,
                        &vehicle,
                        &format!("Critical battery: {battery}%"),
                    );
                }
            }

            TelemetryEvent::LowBatteryWarning => {
                let battery = vehicle.read().battery_percent;
                self.record_or_rollback(
                    AuditEvent::LowBatteryWarning,
                    format!("vehicle={vehicle_id} battery={battery}%"),
                );
            }

            TelemetryEvent::TheftAlarm => {
                error!(vehicle_id, "Vehicle moved without active rental, emergency lock");
                self.emergency_lock_locked(
                    vehicle_id,
                    &vehicle,
                    "Theft alarm: movement without rental",
                );
            }
        }
    }

    /// Critical battery while rented: force-end the active rental so the
    /// rider is settled, falling back to an emergency lock if that fails.
    fn emergency_end_rental(&self, vehicle_id: &str, vehicle: &Arc<RwLock<Vehicle>>) {
        let active_rental = self
            .rentals
            .iter()
            .find(|r| r.value().active && r.value().vehicle_id == vehicle_id)
            .map(|r| r.value().id.clone());

        let Some(rental_id) = active_rental else {
            warn!(vehicle_id, "Critical battery in use but no active rental found");
            return;
        };

        info!(vehicle_id, rental_id = %rental_id, "Critical battery, forcing rental end");
        match self.end_rental_locked(&rental_id, vehicle_id, vehicle) {
            Ok(_) => {
                self.record_or_rollback(
                    AuditEvent::EmergencyRentalEnd,
                    format!("vehicle={vehicle_id} reason=critical_battery"),
                );
            }
            Err(e) => {
                error!(vehicle_id, rental_id = %rental_id, error = %e, "Emergency rental end failed");
                self.emergency_lock_locked(
                    vehicle_id,
                    vehicle,
                    "Critical battery, emergency end failed",
                );
            }
        }
    }

    // =========================================================================
    // Emergency Lock / Maintenance Procedures
    // =========================================================================

    /// Emergency-locks a vehicle through the regular transition table.
    /// Illegal from the current state (already locked): no-op.
    fn emergency_lock_locked(
        &self,
        vehicle_id: &str,
        vehicle: &Arc<RwLock<Vehicle>>,
        reason: &str,
    ) {
        let transitioned = vehicle.write().transition_to(VehicleState::EmergencyLock).is_ok();
        if !transitioned {
            debug!(vehicle_id, reason, "Emergency lock skipped: transition not legal");
            return;
        }

        if let Err(e) = self.persist_vehicles() {
            error!(vehicle_id, error = %e, "Failed to persist emergency lock");
        }
        self.record_or_rollback(
            AuditEvent::EmergencyLock,
            format!("vehicle={vehicle_id} reason={reason}"),
        );
        error!(vehicle_id, reason, "EMERGENCY LOCK");
    }

    /// Routes a vehicle to maintenance (critical battery while idle).
    fn send_to_maintenance(&self, vehicle_id: &str, vehicle: &Arc<RwLock<Vehicle>>, reason: &str) {
        let transitioned = vehicle.write().transition_to(VehicleState::Maintenance).is_ok();
        if !transitioned {
            debug!(vehicle_id, reason, "Maintenance transition not legal, skipped");
            return;
        }

        if let Err(e) = self.persist_vehicles() {
            error!(vehicle_id, error = %e, "Failed to persist maintenance state");
        }
        self.record_or_rollback(
            AuditEvent::VehicleMaintenance,
            format!("vehicle={vehicle_id} reason={reason}"),
        );
        info!(vehicle_id, reason, "Vehicle sent to maintenance");
    }

    // =========================================================================
    // Rollback
    // =========================================================================

    /// Operation-local rollback: forces the vehicle back to its snapshot
    /// and clears it. Never emits an audit entry.
    fn rollback_vehicle(&self, vehicle_id: &str) {
        let Some((_, snapshot)) = self.snapshots.remove(vehicle_id) else {
            return;
        };
        let Some(vehicle) = self.vehicles.get(vehicle_id) else {
            return;
        };

        let mut v = vehicle.write();
        let current = v.state();
        if current != snapshot {
            v.force_state(snapshot);
            warn!(vehicle_id, from = %current, to = %snapshot, "Rolled back vehicle state");
        }
    }

    /// Audit-failure rollback: restores every snapshotted vehicle whose
    /// state has drifted, then clears the table. Never emits an audit entry
    /// (the audit subsystem is the thing that just failed).
    fn rollback_all(&self) {
        warn!(
            snapshots = self.snapshots.len(),
            "Audit write failure: rolling back to last stable snapshots"
        );
        let vehicle_ids: Vec<String> = self.snapshots.iter().map(|e| e.key().clone()).collect();
        for vehicle_id in vehicle_ids {
            self.rollback_vehicle(&vehicle_id);
        }
        self.snapshots.clear();
    }

    /// Records an audit entry from a reaction path, where there is no
    /// operation to fail: an audit write failure triggers the table-wide
    /// rollback instead of propagating.
    fn record_or_rollback(&self, event: AuditEvent, payload: String) {
        if let Err(e) = self.audit.record(event, payload) {
            error!(error = %e, "Audit write failed in reaction path");
            self.rollback_all();
        }
    }

    // =========================================================================
    // Lookups and Persistence
    // =========================================================================

    fn vehicle_arc(&self, vehicle_id: &str) -> DispatchResult<Arc<RwLock<Vehicle>>> {
        self.vehicles
            .get(vehicle_id)
            .map(|v| v.value().clone())
            .ok_or_else(|| DispatchError::not_found("vehicle", vehicle_id))
    }

    fn vehicle_lock(&self, vehicle_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.vehicle_locks
            .entry(vehicle_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    fn persist_vehicles(&self) -> DispatchResult<()> {
        let snapshot: Vec<Vehicle> = self
            .vehicles
            .iter()
            .map(|v| v.value().read().clone())
            .collect();
        self.store.vehicles().save_all(&snapshot)?;
        Ok(())
    }

    fn persist_rentals(&self) -> DispatchResult<()> {
        let snapshot: Vec<Rental> = self.rentals.iter().map(|r| r.value().clone()).collect();
        self.store.rentals().save_all(&snapshot)?;
        Ok(())
    }

    fn persist_payments(&self) -> DispatchResult<()> {
        let snapshot: Vec<Payment> = self.payments.iter().map(|p| p.value().clone()).collect();
        self.store.payments().save_all(&snapshot)?;
        Ok(())
    }
}

/// Next-id floor: one past the highest persisted numeric suffix, and never
/// below the seeded id space.
fn seq_floor(ids: impl Iterator<Item = String>, prefix: char) -> u64 {
    ids.filter_map(|id| {
        id.strip_prefix(prefix)
            .and_then(|rest| rest.parse::<u64>().ok())
    })
    .max()
    .unwrap_or(0)
    .max(ID_SEQ_FLOOR)
}

/// Drains classified telemetry events into the locked reaction paths.
async fn reactor_loop(inner: Arc<CoordinatorInner>, mut event_rx: mpsc::Receiver<TelemetryAlert>) {
    while let Some(alert) = event_rx.recv().await {
        inner.handle_alert(alert).await;
    }
    debug!("Event reactor stopped");
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_floor_defaults_to_seed_space() {
        assert_eq!(seq_floor(Vec::new().into_iter(), 'R'), 1000);
    }

    #[test]
    fn test_seq_floor_continues_from_persisted_ids() {
        let ids = vec!["R1001".to_string(), "R1007".to_string(), "R1003".to_string()];
        assert_eq!(seq_floor(ids.into_iter(), 'R'), 1007);
    }

    #[test]
    fn test_seq_floor_ignores_foreign_ids() {
        let ids = vec!["P2001".to_string(), "R1002".to_string(), "legacy".to_string()];
        assert_eq!(seq_floor(ids.into_iter(), 'R'), 1002);
    }
}
