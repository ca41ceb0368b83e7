//! Message-bus publishing.
//!
//! [`PublishSink`] turns each accepted detection into a JSON payload and
//! hands it to a [`PublishPort`] on the configured topic.  Publishing is
//! best effort: a failure is logged and the scan loop carries on.
//!
//! [`NdjsonPublisher`] is the bundled publisher: one JSON object per line
//! on any writer, e.g. stdout piped into a bus bridge.
//!
//! ```text
//! {"topic":"rfid/coop","payload":{"timestamp":"…","antenna":"Ant_1","eid":"e280…","device":"…"}}
//! ```

use std::io::Write;

use log::{debug, warn};
use serde_json::{Value, json};

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, PublishError, PublishPort};

// ───────────────────────────────────────────────────────────────
// PublishSink
// ───────────────────────────────────────────────────────────────

pub struct PublishSink<P> {
    publisher: P,
    topic: String,
    failures: u64,
}

impl<P: PublishPort> PublishSink<P> {
    pub fn new(publisher: P, topic: impl Into<String>) -> Self {
        Self {
            publisher,
            topic: topic.into(),
            failures: 0,
        }
    }

    /// Publishes that failed since start.
    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }
}

impl<P: PublishPort> EventSink for PublishSink<P> {
    fn emit(&mut self, event: &AppEvent) {
        let AppEvent::Detection { record, .. } = event else {
            return;
        };
        let result = serde_json::to_vec(record)
            .map_err(|_| PublishError::Encode)
            .and_then(|payload| self.publisher.publish(&self.topic, &payload));
        if let Err(e) = result {
            self.failures += 1;
            warn!("Publish to '{}' failed: {}", self.topic, e);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// NdjsonPublisher
// ───────────────────────────────────────────────────────────────

/// Newline-delimited JSON envelope writer.
pub struct NdjsonPublisher<W> {
    out: W,
}

impl<W: Write> NdjsonPublisher<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> PublishPort for NdjsonPublisher<W> {
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), PublishError> {
        // Non-JSON payloads travel as a string.
        let payload = serde_json::from_slice::<Value>(payload)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(payload).into_owned()));
        let envelope = json!({ "topic": topic, "payload": payload });

        serde_json::to_writer(&mut self.out, &envelope).map_err(|_| PublishError::IoError)?;
        self.out
            .write_all(b"\n")
            .and_then(|()| self.out.flush())
            .map_err(|_| PublishError::IoError)?;
        debug!("PUB | topic={}", topic);
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// SinkFanout
// ───────────────────────────────────────────────────────────────

/// Forwards every event to each sink in turn.
#[derive(Default)]
pub struct SinkFanout {
    sinks: Vec<Box<dyn EventSink>>,
}

impl SinkFanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl EventSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn push(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl EventSink for SinkFanout {
    fn emit(&mut self, event: &AppEvent) {
        for sink in &mut self.sinks {
            sink.emit(event);
        }
    }
}
