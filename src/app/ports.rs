//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ReaderService (domain)
//! ```
//!
//! Driven adapters (clock, event sinks, publishers, config storage)
//! implement these traits.  The [`ReaderService`](super::service::ReaderService)
//! consumes them via generics, so the scan logic never touches the
//! filesystem or wall clock directly.  The device link port lives next to
//! the codec as [`Transport`](crate::protocol::transport::Transport).
//!
//! All port errors are typed; sinks swallow their own failures.

use core::fmt;
use std::time::Duration;

use crate::config::ReaderConfig;

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / files / bus)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (log, CSV file,
/// message bus).  Emission is infallible from the caller's side: an
/// adapter that fails logs the failure and carries on.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: wall clock → domain)
// ───────────────────────────────────────────────────────────────

/// Wall-clock source for one scan tick.
pub trait ClockPort {
    /// Time since the Unix epoch.  Fed to the movement tracker.
    fn now(&self) -> Duration;

    /// Human-readable local timestamp, `YYYY-MM-DD HH:MM:SS`.
    fn timestamp(&self) -> String;
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists reader configuration.
///
/// Implementations MUST validate config values before persisting.
/// Invalid ranges are rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped.
pub trait ConfigPort {
    /// Load configuration.
    /// Returns [`ReaderConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<ReaderConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &ReaderConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Publish port (driven adapter: domain → message bus)
// ───────────────────────────────────────────────────────────────

/// Publishes one serialized payload on a named topic.
pub trait PublishPort {
    fn publish(&mut self, topic: &str, payload: &[u8]) -> Result<(), PublishError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`PublishPort`] operations.
#[derive(Debug)]
pub enum PublishError {
    /// The payload could not be serialized.
    Encode,
    /// The transport to the bus rejected or dropped the message.
    IoError,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode => write!(f, "payload encoding failed"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for PublishError {}
