//! # Configuration
//!
//! Environment-driven configuration for the daemon. All knobs have defaults
//! so a bare `wardend` run works out of the box; a `.env` file is honored
//! when present (loaded by the binary before `from_env`).
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

use anyhow::{Context, Result};
use std::time::Duration;

/// Default seconds between evaluation ticks
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 10;

/// Default data directory for the JSON collections
pub const DEFAULT_DATA_DIR: &str = "./warden-data";

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the persisted task/reminder collections
    pub data_dir: String,
    /// Seconds between reminder evaluation ticks
    pub check_interval_secs: u64,
    /// Whether the audible alert channel is used at all
    pub sound_enabled: bool,
    /// Default log filter when RUST_LOG is unset
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let data_dir =
            std::env::var("WARDEN_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());

        let check_interval_secs = match std::env::var("WARDEN_CHECK_INTERVAL_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("WARDEN_CHECK_INTERVAL_SECS is not a number: {raw}"))?,
            Err(_) => DEFAULT_CHECK_INTERVAL_SECS,
        };
        if check_interval_secs == 0 {
            anyhow::bail!("WARDEN_CHECK_INTERVAL_SECS must be at least 1");
        }

        let sound_enabled = std::env::var("WARDEN_SOUND_ENABLED")
            .map(|v| parse_bool(&v))
            .unwrap_or(true);

        let log_level = std::env::var("WARDEN_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Config {
            data_dir,
            check_interval_secs,
            sound_enabled,
            log_level,
        })
    }

    /// Tick interval as a Duration
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }
}

fn parse_bool(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
