//! Host wall-clock adapter.
//!
//! Implements [`ClockPort`] from the system clock.  Tracker time is the
//! UTC offset from the Unix epoch; the human-readable timestamp is local
//! time, matching what the deployment's CSV files have always held.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::Local;

use crate::app::ports::ClockPort;

/// Timestamp layout for records and log rows.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl ClockPort for SystemClock {
    fn now(&self) -> Duration {
        // Before the epoch only on a badly broken clock; treat as zero.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
    }

    fn timestamp(&self) -> String {
        Local::now().format(TIMESTAMP_FORMAT).to_string()
    }
}
