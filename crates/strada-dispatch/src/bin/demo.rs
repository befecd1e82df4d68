//! # Strada Demo Driver
//!
//! Runs the multi-city scenarios end to end against a scratch data
//! directory:
//!
//! 1. London: reserve → start → end with the congestion charge
//! 2. Milan: moped unlock refused without a helmet, retried with one
//! 3. Rome: GPS check inside the archaeological zone triggers an
//!    emergency lock
//! 4. Telemetry: critical temperature and theft alarm preemption
//! 5. Concurrency: two riders race for the same vehicle
//! 6. Audit chain verification
//!
//! ## Usage
//! ```bash
//! cargo run -p strada-dispatch --bin demo -- --data-dir ./demo-data
//! RUST_LOG=strada_dispatch=debug cargo run -p strada-dispatch --bin demo
//! ```

use std::env;
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use strada_core::{GeoPoint, TelemetrySample, VehicleState};
use strada_dispatch::{Coordinator, DispatchConfig};
use strada_store::{seed, Store};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let mut data_dir = String::from("./demo-data");
    let mut i = 1;
    while i < args.len() {
        if matches!(args[i].as_str(), "--data-dir" | "-d") && i + 1 < args.len() {
            data_dir = args[i + 1].clone();
            i += 1;
        }
        i += 1;
    }

    info!(data_dir = %data_dir, "Seeding demo fleet");
    let store = Store::open(&data_dir)?;
    seed::seed(&store)?;

    let coordinator = Coordinator::launch(DispatchConfig::with_data_dir(&data_dir)).await?;

    london_scenario(&coordinator).await;
    milan_scenario(&coordinator).await;
    rome_scenario(&coordinator).await;
    telemetry_scenario(&coordinator).await;
    concurrency_scenario(&coordinator).await;

    info!(
        chain_valid = coordinator.verify_audit_chain(),
        entries = coordinator.audit_entries().len(),
        "Audit trail verified"
    );

    for vehicle in coordinator.fleet() {
        info!("{vehicle}");
    }

    coordinator.shutdown().await;
    info!("Demo complete");
    Ok(())
}

/// London: the congestion charge lands on every trip.
async fn london_scenario(coordinator: &Coordinator) {
    info!("=== LONDON: congestion charge ===");
    let result = async {
        let rental = coordinator.reserve("U001", "LON-ES001").await?;
        coordinator.start(&rental.id, "LON-ES001").await?;
        coordinator.end(&rental.id, "LON-ES001").await
    }
    .await;

    match result {
        Ok(payment) => info!(
            total = %payment.total,
            surcharge = %payment.surcharges,
            "London trip settled"
        ),
        Err(e) => warn!(error = %e, "London scenario failed"),
    }
}

/// Milan: the helmet gate refuses the first unlock.
async fn milan_scenario(coordinator: &Coordinator) {
    info!("=== MILAN: moped helmet gate ===");
    let Ok(rental) = coordinator.reserve("U003", "MIL-M001").await else {
        warn!("Milan reservation failed");
        return;
    };

    match coordinator.start(&rental.id, "MIL-M001").await {
        Err(e) => info!(refusal = %e, "Unlock correctly refused without helmet"),
        Ok(()) => warn!("Unlock without helmet should have been refused"),
    }

    // The rider puts the helmet on; the sensor confirms.
    coordinator.set_helmet_detected("MIL-M001", true).ok();
    if let Err(e) = coordinator.start(&rental.id, "MIL-M001").await {
        warn!(error = %e, "Unlock with helmet failed");
        return;
    }
    match coordinator.end(&rental.id, "MIL-M001").await {
        Ok(payment) => info!(total = %payment.total, "Milan trip settled without surcharge"),
        Err(e) => warn!(error = %e, "Milan end failed"),
    }
}

/// Rome: a scooter pinged inside the Colosseum area is emergency-locked.
async fn rome_scenario(coordinator: &Coordinator) {
    info!("=== ROME: archaeological zone ===");
    let result = async {
        let rental = coordinator.reserve("U002", "ROM-ES001").await?;
        coordinator.start(&rental.id, "ROM-ES001").await?;
        Ok::<_, strada_dispatch::DispatchError>(rental)
    }
    .await;
    if let Err(e) = result {
        warn!(error = %e, "Rome setup failed");
        return;
    }

    let colosseum = GeoPoint::new(41.8902, 12.4922);
    let allowed = coordinator.check_gps("ROM-ES001", colosseum).await;
    info!(
        allowed,
        state = ?coordinator.vehicle_state("ROM-ES001"),
        "Colosseum position checked"
    );
}

/// Telemetry: overheating preempts a rental; unrented movement raises theft.
async fn telemetry_scenario(coordinator: &Coordinator) {
    info!("=== TELEMETRY: critical temperature & theft ===");

    // LON-ES002 overheats mid-ride.
    if let Ok(rental) = coordinator.reserve("U004", "LON-ES002").await {
        if coordinator.start(&rental.id, "LON-ES002").await.is_ok() {
            let sample = TelemetrySample {
                timestamp: chrono::Utc::now(),
                gps: GeoPoint::new(51.5010, -0.1247),
                battery_percent: 45,
                temperature_c: 75.0,
                helmet_present: false,
            };
            coordinator.submit_telemetry("LON-ES002", sample).await.ok();
        }
    }

    // MIL-B001 wanders off while parked.
    let sample = TelemetrySample {
        timestamp: chrono::Utc::now(),
        gps: GeoPoint::new(45.4700, 9.1950),
        battery_percent: 95,
        temperature_c: 21.0,
        helmet_present: false,
    };
    coordinator.submit_telemetry("MIL-B001", sample).await.ok();

    wait_for_state(coordinator, "LON-ES002", VehicleState::EmergencyLock).await;
    wait_for_state(coordinator, "MIL-B001", VehicleState::EmergencyLock).await;
    info!(
        overheated = ?coordinator.vehicle_state("LON-ES002"),
        stolen = ?coordinator.vehicle_state("MIL-B001"),
        "Telemetry reactions applied"
    );
}

/// Concurrency: two riders, one bicycle.
async fn concurrency_scenario(coordinator: &Coordinator) {
    info!("=== CONCURRENCY: simultaneous reservations ===");
    let (alice, james) = tokio::join!(
        coordinator.reserve("U004", "ROM-B001"),
        coordinator.reserve("U005", "ROM-B001"),
    );
    info!(
        first = alice.is_ok(),
        second = james.is_ok(),
        state = ?coordinator.vehicle_state("ROM-B001"),
        "Exactly one reservation should win"
    );
}

/// Polls until the vehicle reaches the state or a short deadline passes.
async fn wait_for_state(coordinator: &Coordinator, vehicle_id: &str, target: VehicleState) {
    for _ in 0..100 {
        if coordinator.vehicle_state(vehicle_id) == Some(target) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    warn!(vehicle_id, target = %target, "Vehicle did not reach expected state in time");
}
