//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (stderr via `env_logger` in the daemon).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Detection { record, decision } => {
                info!(
                    "DETECT | {} | {} | eid={} | {} | {}",
                    record.timestamp,
                    record.antenna_label(),
                    record.tag_id,
                    record.source_label,
                    decision.as_str(),
                );
            }
            AppEvent::LinkFault { port, error } => {
                warn!("LINK | ant={} {}", port, error);
            }
            AppEvent::Started {
                power_dbm,
                antennas,
            } => {
                info!("START | power={}dBm antennas={:?}", power_dbm, antennas);
            }
            AppEvent::Stopped { ticks } => {
                info!("STOP | ticks={}", ticks);
            }
        }
    }
}
