//! Reader configuration parameters
//!
//! All tunable parameters for one reader process.
//! Values come from defaults, an optional JSON file, then CLI overrides.

use std::path::PathBuf;
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::error::Error;
use crate::protocol::AckPolicy;
use crate::protocol::frame::{PORT_MAX, PORT_MIN, POWER_MAX_DBM, POWER_MIN_DBM};
use crate::tracker::GatePairs;

/// Core reader configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    // --- Link ---
    /// Serial device the reader is attached to
    pub serial_port: String,
    /// Serial baud rate
    pub baud_rate: u32,
    /// Per-read timeout on the serial device (milliseconds)
    pub read_timeout_ms: u64,
    /// Delay between an inventory command and reading its response (milliseconds)
    pub response_settle_ms: u64,
    /// Delay between the power-set command and reading its acknowledgement (milliseconds)
    pub power_settle_ms: u64,

    // --- Radio ---
    /// Transmit power (dBm, 10-33)
    pub power_dbm: u8,
    /// Antenna ports polled each tick, in order (1-8)
    pub antennas: Vec<u8>,
    /// Which power-set acknowledgement is accepted
    pub ack_policy: AckPolicy,

    // --- Timing ---
    /// Pause between scan ticks (milliseconds)
    pub scan_interval_ms: u64,

    // --- Movement ---
    /// Antenna pairs on opposite sides of a gate
    pub gate_pairs: Vec<[u8; 2]>,
    /// Re-confirmation threshold (seconds)
    pub timeout_secs: u64,

    // --- Output ---
    /// Source label stamped on every detection
    pub device_label: String,
    /// Directory holding the dated CSV logs
    pub log_dir: PathBuf,
    /// Topic detections are published on
    pub publish_topic: String,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            // Link
            serial_port: "/dev/ttyUSB0".into(),
            baud_rate: 57_600,
            read_timeout_ms: 100,
            response_settle_ms: 100,
            power_settle_ms: 200,

            // Radio
            power_dbm: 30,
            antennas: vec![1, 2, 7, 8],
            ack_policy: AckPolicy::Requested,

            // Timing
            scan_interval_ms: 100, // 10 Hz

            // Movement
            gate_pairs: vec![[1, 8]],
            timeout_secs: 3600, // 1 h

            // Output
            device_label: "Reader_1_coop_2".into(),
            log_dir: PathBuf::from("."),
            publish_topic: "rfid/coop".into(),
        }
    }
}

impl ReaderConfig {
    pub fn scan_interval(&self) -> Duration {
        Duration::from_millis(self.scan_interval_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn response_settle(&self) -> Duration {
        Duration::from_millis(self.response_settle_ms)
    }

    pub fn power_settle(&self) -> Duration {
        Duration::from_millis(self.power_settle_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build the gate table from the configured pairs.
    pub fn gates(&self) -> Result<GatePairs, Error> {
        let pairs: Vec<(u8, u8)> = self.gate_pairs.iter().map(|&[a, b]| (a, b)).collect();
        GatePairs::new(&pairs)
    }
}

/// Range-check every field.  Invalid values are rejected, never clamped.
pub fn validate_config(cfg: &ReaderConfig) -> Result<(), ConfigError> {
    if cfg.serial_port.trim().is_empty() {
        return Err(ConfigError::ValidationFailed("serial_port must not be empty"));
    }
    if cfg.baud_rate == 0 {
        return Err(ConfigError::ValidationFailed("baud_rate must be > 0"));
    }
    if !(POWER_MIN_DBM..=POWER_MAX_DBM).contains(&cfg.power_dbm) {
        return Err(ConfigError::ValidationFailed("power_dbm must be 10–33"));
    }
    if cfg.antennas.is_empty() {
        return Err(ConfigError::ValidationFailed(
            "antennas must list at least one port",
        ));
    }
    if cfg
        .antennas
        .iter()
        .any(|p| !(PORT_MIN..=PORT_MAX).contains(p))
    {
        return Err(ConfigError::ValidationFailed("antenna ports must be 1–8"));
    }
    if !(1..=60_000).contains(&cfg.scan_interval_ms) {
        return Err(ConfigError::ValidationFailed(
            "scan_interval_ms must be 1–60000",
        ));
    }
    if !(1..=10_000).contains(&cfg.read_timeout_ms) {
        return Err(ConfigError::ValidationFailed(
            "read_timeout_ms must be 1–10000",
        ));
    }
    if cfg.response_settle_ms > 10_000 || cfg.power_settle_ms > 10_000 {
        return Err(ConfigError::ValidationFailed(
            "settle delays must be at most 10000 ms",
        ));
    }
    if cfg.timeout_secs == 0 {
        return Err(ConfigError::ValidationFailed("timeout_secs must be > 0"));
    }
    if cfg.gates().is_err() {
        return Err(ConfigError::ValidationFailed(
            "gate_pairs must join distinct ports 1–8, each port in at most one pair",
        ));
    }
    if cfg.device_label.trim().is_empty() {
        return Err(ConfigError::ValidationFailed("device_label must not be empty"));
    }
    if cfg.publish_topic.trim().is_empty() {
        return Err(ConfigError::ValidationFailed("publish_topic must not be empty"));
    }
    Ok(())
}

/// Parse a comma-separated antenna list such as `"1,2,7,8"`.
///
/// Entries that are not integers or lie outside 1–8 are skipped with a
/// warning; duplicates keep their first position.
pub fn parse_antenna_list(list: &str) -> Vec<u8> {
    let mut ports = Vec::new();
    for entry in list.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        match entry.parse::<u8>() {
            Ok(p) if (PORT_MIN..=PORT_MAX).contains(&p) => {
                if !ports.contains(&p) {
                    ports.push(p);
                }
            }
            _ => warn!("Ignoring antenna entry '{}' (expected 1–8)", entry),
        }
    }
    ports
}
