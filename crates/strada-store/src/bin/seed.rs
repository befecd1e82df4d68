//! # Seed Data Generator
//!
//! Populates the data directory with the demo fleet and users.
//!
//! ## Usage
//! ```bash
//! # Seed into ./data (default)
//! cargo run -p strada-store --bin seed
//!
//! # Specify the data directory
//! cargo run -p strada-store --bin seed -- --data-dir ./fleet-data
//! ```
//!
//! Seeds five users and a 13-vehicle fleet across London, Milan and Rome.
//! Skips seeding if a vehicle table already exists.

use std::env;

use strada_store::{seed, Store};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut data_dir = String::from("./data");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--data-dir" | "-d" => {
                if i + 1 < args.len() {
                    data_dir = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Strada Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --data-dir <PATH>   Data directory (default: ./data)");
                println!("  -h, --help              Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Strada Seed Data Generator");
    println!("==========================");
    println!("Data directory: {data_dir}");
    println!();

    let store = Store::open(&data_dir)?;

    let existing = store.vehicles().load_all()?;
    if !existing.is_empty() {
        println!("Vehicle table already has {} vehicles.", existing.len());
        println!("  Skipping seed to avoid clobbering live state.");
        println!("  Delete {data_dir}/vehicles.csv to reseed.");
        return Ok(());
    }

    seed::seed(&store)?;

    let fleet = store.vehicles().load_all()?;
    println!(
        "Seeded {} users and {} vehicles:",
        store.users().load_all()?.len(),
        fleet.len()
    );
    for vehicle in &fleet {
        println!("  {vehicle}");
    }
    println!();
    println!("Seed complete.");

    Ok(())
}
