//! # Coordinator Configuration
//!
//! Configuration for the dispatch coordinator.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     STRADA_DATA_DIR=/var/lib/strada                                    │
//! │     STRADA_TELEMETRY_QUEUE=10000                                       │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/strada/dispatch.toml (Linux)                             │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     data_dir = "./data", queue_capacity = 50000                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # dispatch.toml
//! [storage]
//! data_dir = "./data"
//!
//! [telemetry]
//! queue_capacity = 50000
//! event_capacity = 1024
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{DispatchError, DispatchResult};

// =============================================================================
// Storage Settings
// =============================================================================

/// Where the CSV tables live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Directory holding the entity and audit tables.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            data_dir: default_data_dir(),
        }
    }
}

// =============================================================================
// Telemetry Settings
// =============================================================================

/// Telemetry pipeline sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetrySettings {
    /// Bounded telemetry queue capacity. Producers block when full.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Capacity of the classified-event channel drained by the coordinator.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_queue_capacity() -> usize {
    50_000
}

fn default_event_capacity() -> usize {
    1024
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        TelemetrySettings {
            queue_capacity: default_queue_capacity(),
            event_capacity: default_event_capacity(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete coordinator configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Storage settings.
    #[serde(default)]
    pub storage: StorageSettings,

    /// Telemetry pipeline settings.
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

impl DispatchConfig {
    /// Creates a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration rooted at the given data directory.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        DispatchConfig {
            storage: StorageSettings {
                data_dir: data_dir.into(),
            },
            ..Default::default()
        }
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (dispatch.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> DispatchResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading dispatch config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns defaults if the load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load dispatch config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Validates the configuration.
    pub fn validate(&self) -> DispatchResult<()> {
        if self.telemetry.queue_capacity == 0 {
            return Err(DispatchError::InvalidConfig(
                "telemetry.queue_capacity must be greater than 0".into(),
            ));
        }
        if self.telemetry.event_capacity == 0 {
            return Err(DispatchError::InvalidConfig(
                "telemetry.event_capacity must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("STRADA_DATA_DIR") {
            debug!(data_dir = %dir, "Overriding data directory from environment");
            self.storage.data_dir = PathBuf::from(dir);
        }

        if let Ok(capacity) = std::env::var("STRADA_TELEMETRY_QUEUE") {
            match capacity.parse::<usize>() {
                Ok(c) => self.telemetry.queue_capacity = c,
                Err(_) => warn!(value = %capacity, "Ignoring invalid STRADA_TELEMETRY_QUEUE"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "strada", "strada")
            .map(|dirs| dirs.config_dir().join("dispatch.toml"))
    }

    /// The data directory the coordinator persists into.
    pub fn data_dir(&self) -> &PathBuf {
        &self.storage.data_dir
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
