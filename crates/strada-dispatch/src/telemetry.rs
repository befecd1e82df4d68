//! # Telemetry Pipeline
//!
//! Bounded ingress queue with a single consumer worker.
//!
//! ## Pipeline Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Telemetry Pipeline                                  │
//! │                                                                         │
//! │  submit_telemetry ──► bounded queue (capacity 50 000, producers        │
//! │                       block when full)                                  │
//! │                            │                                            │
//! │                            ▼                                            │
//! │                   ┌─────────────────┐                                   │
//! │                   │  worker task    │  1. apply sample to vehicle       │
//! │                   │  (single        │  2. classify against thresholds   │
//! │                   │   consumer)     │  3. emit events to coordinator    │
//! │                   └────────┬────────┘                                   │
//! │                            │ event channel                              │
//! │                            ▼                                            │
//! │                  coordinator reactor (locked §4.6 reactions)           │
//! │                                                                         │
//! │  SHUTDOWN: running flag cleared, queue drained, worker exits           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each queued update captures the pre-submit location snapshot so theft
//! classification is deterministic regardless of later updates.

use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use strada_core::{GeoPoint, TelemetrySample, Vehicle, VehicleState};

use crate::error::{DispatchError, DispatchResult};

// =============================================================================
// Thresholds
// =============================================================================

/// Above this the vehicle is emergency-locked.
pub const CRITICAL_TEMPERATURE_C: f64 = 60.0;
/// Above this the vehicle is throttled (audited, no state change).
pub const WARNING_TEMPERATURE_C: f64 = 50.0;
/// At or below this an in-use rental is force-ended.
pub const CRITICAL_BATTERY_PERCENT: u8 = 5;
/// At or below this a warning is audited.
pub const LOW_BATTERY_PERCENT: u8 = 15;
/// Unrented movement beyond this distance raises a theft alarm.
pub const THEFT_DISTANCE_M: f64 = 10.0;

// =============================================================================
// Events
// =============================================================================

/// A classified telemetry condition, dispatched to the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryEvent {
    CriticalTemperature,
    HighTemperatureWarning,
    CriticalBattery,
    LowBatteryWarning,
    TheftAlarm,
}

impl fmt::Display for TelemetryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TelemetryEvent::CriticalTemperature => "CRITICAL_TEMPERATURE",
            TelemetryEvent::HighTemperatureWarning => "HIGH_TEMPERATURE_WARNING",
            TelemetryEvent::CriticalBattery => "CRITICAL_BATTERY",
            TelemetryEvent::LowBatteryWarning => "LOW_BATTERY_WARNING",
            TelemetryEvent::TheftAlarm => "THEFT_ALARM",
        };
        f.write_str(label)
    }
}

/// An event bound to the vehicle that produced it.
#[derive(Debug, Clone)]
pub struct TelemetryAlert {
    pub vehicle_id: String,
    pub event: TelemetryEvent,
}

/// One queued unit of work for the worker.
struct TelemetryUpdate {
    vehicle: Arc<RwLock<Vehicle>>,
    sample: TelemetrySample,
    /// Location at submit time, for deterministic theft classification.
    previous_location: GeoPoint,
}

// =============================================================================
// Classification
// =============================================================================

/// Classifies a sample against the thresholds. First match wins within each
/// category; a terminal condition stops further classification.
fn classify(
    state: VehicleState,
    sample: &TelemetrySample,
    previous_location: GeoPoint,
) -> Vec<TelemetryEvent> {
    let mut events = Vec::new();

    if sample.temperature_c > CRITICAL_TEMPERATURE_C {
        events.push(TelemetryEvent::CriticalTemperature);
        return events;
    }
    if sample.temperature_c > WARNING_TEMPERATURE_C {
        events.push(TelemetryEvent::HighTemperatureWarning);
    }

    if sample.battery_percent <= CRITICAL_BATTERY_PERCENT {
        events.push(TelemetryEvent::CriticalBattery);
        return events;
    }
    if sample.battery_percent <= LOW_BATTERY_PERCENT {
        events.push(TelemetryEvent::LowBatteryWarning);
    }

    // A vehicle moving without an active rental is being stolen or carried.
    if matches!(state, VehicleState::Available | VehicleState::Reserved) {
        let moved = previous_location.distance_m(sample.gps);
        if moved > THEFT_DISTANCE_M {
            events.push(TelemetryEvent::TheftAlarm);
            return events;
        }
    }

    events
}

// =============================================================================
// Telemetry Monitor
// =============================================================================

/// Handle to the telemetry pipeline: ingress queue plus the consumer task.
pub struct TelemetryMonitor {
    update_tx: mpsc::Sender<TelemetryUpdate>,
    running: Arc<AtomicBool>,
    worker: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

impl TelemetryMonitor {
    /// Spawns the worker and returns the monitor handle. Classified events
    /// are emitted on `event_tx`.
    pub fn spawn(queue_capacity: usize, event_tx: mpsc::Sender<TelemetryAlert>) -> Self {
        let (update_tx, update_rx) = mpsc::channel(queue_capacity);
        let running = Arc::new(AtomicBool::new(true));

        let worker = tokio::spawn(worker_loop(update_rx, event_tx, running.clone()));
        info!(queue_capacity, "Telemetry monitor started");

        TelemetryMonitor {
            update_tx,
            running,
            worker: parking_lot::Mutex::new(Some(worker)),
        }
    }

    /// Submits a sample for the given vehicle. Blocks when the queue is
    /// full (backpressure) until the worker drains capacity.
    pub async fn submit(
        &self,
        vehicle: Arc<RwLock<Vehicle>>,
        sample: TelemetrySample,
    ) -> DispatchResult<()> {
        let previous_location = vehicle.read().location;
        self.update_tx
            .send(TelemetryUpdate {
                vehicle,
                sample,
                previous_location,
            })
            .await
            .map_err(|_| DispatchError::ChannelClosed("telemetry queue"))
    }

    /// True while the worker is accepting and processing updates.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stops the worker: the queue is drained, remaining items are
    /// processed, then the task exits.
    pub async fn shutdown(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            debug!("Telemetry monitor already stopped");
            return;
        }

        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "Telemetry worker ended abnormally");
            }
        }
        info!("Telemetry monitor stopped");
    }
}

/// The single-consumer worker loop.
async fn worker_loop(
    mut update_rx: mpsc::Receiver<TelemetryUpdate>,
    event_tx: mpsc::Sender<TelemetryAlert>,
    running: Arc<AtomicBool>,
) {
    // Bounded poll so the running flag is observed even on a quiet queue.
    let poll_interval = std::time::Duration::from_millis(100);

    loop {
        let update = match tokio::time::timeout(poll_interval, update_rx.recv()).await {
            Ok(Some(update)) => update,
            // All senders dropped: nothing more can arrive.
            Ok(None) => break,
            Err(_) => {
                if running.load(Ordering::SeqCst) {
                    continue;
                }
                // Stop requested: drain whatever is still queued, then exit.
                while let Ok(update) = update_rx.try_recv() {
                    process_update(update, &event_tx).await;
                }
                break;
            }
        };

        process_update(update, &event_tx).await;
    }

    running.store(false, Ordering::SeqCst);
    info!("Telemetry worker stopped");
}

/// Applies one update to its vehicle and emits any classified events.
async fn process_update(update: TelemetryUpdate, event_tx: &mpsc::Sender<TelemetryAlert>) {
    let (vehicle_id, state) = {
        let mut vehicle = update.vehicle.write();
        vehicle.apply_telemetry(&update.sample);
        (vehicle.id.clone(), vehicle.state())
    };

    let events = classify(state, &update.sample, update.previous_location);
    if events.is_empty() {
        debug!(
            vehicle_id = %vehicle_id,
            battery = update.sample.battery_percent,
            temperature = update.sample.temperature_c,
            "Telemetry nominal"
        );
        return;
    }

    for event in events {
        warn!(vehicle_id = %vehicle_id, event = %event, "Telemetry condition detected");
        if event_tx
            .send(TelemetryAlert {
                vehicle_id: vehicle_id.clone(),
                event,
            })
            .await
            .is_err()
        {
            warn!(vehicle_id = %vehicle_id, "Event channel closed; dropping alert");
            return;
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use strada_core::VehicleKind;

    fn sample(battery: u8, temperature: f64, gps: GeoPoint) -> TelemetrySample {
        TelemetrySample {
            timestamp: Utc::now(),
            gps,
            battery_percent: battery,
            temperature_c: temperature,
            helmet_present: false,
        }
    }

    const HOME: GeoPoint = GeoPoint::new(45.4642, 9.1900);

    #[test]
    fn test_critical_temperature_is_terminal() {
        let events = classify(VehicleState::Available, &sample(3, 75.0, HOME), HOME);
        assert_eq!(events, vec![TelemetryEvent::CriticalTemperature]);
    }

    #[test]
    fn test_warning_temperature_continues_classification() {
        let events = classify(VehicleState::InUse, &sample(10, 55.0, HOME), HOME);
        assert_eq!(
            events,
            vec![
                TelemetryEvent::HighTemperatureWarning,
                TelemetryEvent::LowBatteryWarning
            ]
        );
    }

    #[test]
    fn test_critical_battery_is_terminal() {
        let far = GeoPoint::new(45.4700, 9.1950);
        let events = classify(VehicleState::Available, &sample(5, 20.0, far), HOME);
        assert_eq!(events, vec![TelemetryEvent::CriticalBattery]);
    }

    #[test]
    fn test_theft_requires_idle_state_and_distance() {
        let far = GeoPoint::new(45.4700, 9.1950); // ~700 m away

        let events = classify(VehicleState::Available, &sample(90, 20.0, far), HOME);
        assert_eq!(events, vec![TelemetryEvent::TheftAlarm]);

        let events = classify(VehicleState::Reserved, &sample(90, 20.0, far), HOME);
        assert_eq!(events, vec![TelemetryEvent::TheftAlarm]);

        // Moving while rented is normal.
        let events = classify(VehicleState::InUse, &sample(90, 20.0, far), HOME);
        assert!(events.is_empty());

        // A few metres of drift is not theft.
        let nearby = GeoPoint::new(45.46421, 9.19001);
        let events = classify(VehicleState::Available, &sample(90, 20.0, nearby), HOME);
        assert!(events.is_empty());
    }

    #[test]
    fn test_nominal_sample_is_quiet() {
        let events = classify(VehicleState::InUse, &sample(80, 25.0, HOME), HOME);
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_worker_applies_sample_and_emits_alert() {
        let (event_tx, mut event_rx) = mpsc::channel(16);
        let monitor = TelemetryMonitor::spawn(64, event_tx);

        let vehicle = Arc::new(RwLock::new(Vehicle::new(
            "MIL-B001",
            VehicleKind::Bicycle,
            "Milan",
            HOME,
            95,
        )));

        let moved = GeoPoint::new(45.4700, 9.1950);
        monitor
            .submit(vehicle.clone(), sample(95, 20.0, moved))
            .await
            .unwrap();

        let alert = event_rx.recv().await.expect("alert");
        assert_eq!(alert.vehicle_id, "MIL-B001");
        assert_eq!(alert.event, TelemetryEvent::TheftAlarm);
        assert_eq!(vehicle.read().location, moved);

        monitor.shutdown().await;
        assert!(!monitor.is_running());
    }

    #[tokio::test]
    async fn test_shutdown_drains_queue() {
        let (event_tx, mut event_rx) = mpsc::channel(64);
        let monitor = TelemetryMonitor::spawn(64, event_tx);

        let vehicle = Arc::new(RwLock::new(Vehicle::new(
            "LON-ES002",
            VehicleKind::ElectricScooter,
            "London",
            GeoPoint::new(51.5010, -0.1247),
            45,
        )));

        for _ in 0..3 {
            monitor
                .submit(vehicle.clone(), sample(45, 75.0, GeoPoint::new(51.5010, -0.1247)))
                .await
                .unwrap();
        }
        monitor.shutdown().await;

        let mut critical = 0;
        while let Ok(alert) = event_rx.try_recv() {
            if alert.event == TelemetryEvent::CriticalTemperature {
                critical += 1;
            }
        }
        assert_eq!(critical, 3);
    }
}
