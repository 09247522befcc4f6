//! Configuration system for Tether.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $TETHER_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/tether/config.toml
//!   3. ~/.config/tether/config.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TetherConfig {
    pub timing: TimingConfig,
    pub daemon: DaemonConfig,
    pub sim: SimConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Keep-alive reissue interval for both periodic tasks.
    pub periodic_interval_ms: u64,
    /// One-shot connection-establishment timeout.
    pub connection_timeout_ms: u64,
    /// Delay between a withdrawal tombstone and the actual removal of
    /// the local record. Matches the assumed max propagation delay.
    pub advertise_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// GUID published with every local advertisement.
    pub guid: String,
    /// Names advertised at startup.
    pub advertise_names: Vec<String>,
    /// Prefixes discovered at startup.
    pub find_prefixes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Hardware address the simulated driver reports for this device.
    pub device_address: String,
    /// Device name the simulated driver reports.
    pub device_name: String,
    /// Artificial completion latency per command.
    pub latency_ms: u64,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for TetherConfig {
    fn default() -> Self {
        Self {
            timing: TimingConfig::default(),
            daemon: DaemonConfig::default(),
            sim: SimConfig::default(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            periodic_interval_ms: 40_000,
            connection_timeout_ms: 150_000,
            advertise_timeout_ms: 256_000,
        }
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            guid: String::new(),
            advertise_names: Vec::new(),
            find_prefixes: Vec::new(),
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            device_address: "02:00:00:00:10:01".to_string(),
            device_name: "tether-sim".to_string(),
            latency_ms: 20,
        }
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".config"))
        .join("tether")
}

fn dirs_or_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl TetherConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::file_path();
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadFailed(path.clone(), e))?;
            toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.clone(), e))?
        } else {
            TetherConfig::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("TETHER_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write default config if none exists. Returns the path.
    pub fn write_default_if_missing() -> Result<PathBuf, ConfigError> {
        let path = Self::file_path();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
            }
            let text = toml::to_string_pretty(&TetherConfig::default())
                .map_err(ConfigError::SerializeFailed)?;
            std::fs::write(&path, text).map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
        }
        Ok(path)
    }

    /// Apply TETHER_* env var overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("TETHER_TIMING__PERIODIC_INTERVAL_MS") {
            if let Ok(ms) = v.parse() {
                self.timing.periodic_interval_ms = ms;
            }
        }
        if let Ok(v) = std::env::var("TETHER_TIMING__CONNECTION_TIMEOUT_MS") {
            if let Ok(ms) = v.parse() {
                self.timing.connection_timeout_ms = ms;
            }
        }
        if let Ok(v) = std::env::var("TETHER_TIMING__ADVERTISE_TIMEOUT_MS") {
            if let Ok(ms) = v.parse() {
                self.timing.advertise_timeout_ms = ms;
            }
        }
        if let Ok(v) = std::env::var("TETHER_DAEMON__GUID") {
            self.daemon.guid = v;
        }
        if let Ok(v) = std::env::var("TETHER_SIM__DEVICE_ADDRESS") {
            self.sim.device_address = v;
        }
    }
}
