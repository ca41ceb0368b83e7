//! Outbound application events.
//!
//! The [`ReaderService`](super::service::ReaderService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log them, append them to the daily
//! CSV file, publish them on the bus.

use serde::{Deserialize, Serialize, Serializer};

use crate::error::LinkError;
use crate::protocol::TagId;
use crate::tracker::Decision;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The reader accepted its power setting and scanning begins.
    Started { power_dbm: u8, antennas: Vec<u8> },

    /// A sighting the movement tracker accepted.
    Detection {
        record: DetectionRecord,
        decision: Decision,
    },

    /// One antenna's exchange failed; the tick carried on.
    LinkFault { port: u8, error: LinkError },

    /// The scan loop exited.
    Stopped { ticks: u64 },
}

/// One accepted sighting, as logged and published.
///
/// Wire form:
/// `{"timestamp":"2024-05-01 06:12:03","antenna":"Ant_1","eid":"e280…","device":"Reader_1_coop_2"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub timestamp: String,
    #[serde(
        rename = "antenna",
        serialize_with = "serialize_antenna",
        deserialize_with = "deserialize_antenna"
    )]
    pub antenna_port: u8,
    #[serde(rename = "eid")]
    pub tag_id: TagId,
    #[serde(rename = "device")]
    pub source_label: String,
}

impl DetectionRecord {
    /// Antenna label as written to logs and payloads, e.g. `Ant_7`.
    pub fn antenna_label(&self) -> String {
        antenna_label(self.antenna_port)
    }

    /// Calendar date part of the timestamp (`YYYY-MM-DD`).
    pub fn date(&self) -> &str {
        self.timestamp
            .split_once(' ')
            .map_or(self.timestamp.as_str(), |(date, _)| date)
    }
}

pub fn antenna_label(port: u8) -> String {
    format!("Ant_{}", port)
}

fn serialize_antenna<S: Serializer>(port: &u8, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&format_args!("Ant_{}", port))
}

fn deserialize_antenna<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let label = String::deserialize(deserializer)?;
    label
        .strip_prefix("Ant_")
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| serde::de::Error::custom("antenna must look like Ant_<port>"))
}
