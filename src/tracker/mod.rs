//! Movement de-duplication.
//!
//! The reader reports the same tag on every inventory pass for as long as
//! it sits in an antenna's field.  The tracker folds that stream of raw
//! sightings into one event per genuine gate crossing, plus a periodic
//! re-confirmation for tags that linger.
//!
//! ```text
//!                 ┌───────────────┐  first sighting
//!   sighting ───▶ │ last seen?    │ ─────────────────────────▶ LOG
//!                 └──────┬────────┘
//!                        │ (last_port, last_time)
//!                        ▼
//!   same port && elapsed < timeout ─────────────────────────▶ drop
//!   partner(last_port) == port     ─────────────────────────▶ LOG
//!   elapsed >= timeout             ─────────────────────────▶ LOG
//!   otherwise                      ─────────────────────────▶ drop
//! ```
//!
//! The rules are evaluated strictly in that order.  State is only
//! refreshed on a logged decision, so it always holds the most recent
//! *meaningful* sighting, never the most recent raw one.

pub mod gate;

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::hash::Hash;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use log::debug;

use crate::protocol::TagId;

pub use gate::GatePairs;

/// Default re-confirmation threshold (one hour).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3600);

/// Last meaningful sighting of one tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagState {
    pub port: u8,
    pub last_seen: Duration,
}

/// Outcome of one sighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Tag never seen before.
    FirstSighting,
    /// Tag moved from `from` to the paired port on the other side.
    GateCrossing { from: u8 },
    /// Timeout elapsed since the last logged sighting.
    Reconfirmed,
    /// Same antenna again within the timeout.
    SuppressedRepeat,
    /// Different, unpaired antenna within the timeout.
    Ignored,
}

impl Decision {
    /// Whether the sighting should be forwarded downstream.
    pub fn is_logged(self) -> bool {
        matches!(
            self,
            Self::FirstSighting | Self::GateCrossing { .. } | Self::Reconfirmed
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FirstSighting => "first",
            Self::GateCrossing { .. } => "crossing",
            Self::Reconfirmed => "reconfirmed",
            Self::SuppressedRepeat => "repeat",
            Self::Ignored => "ignored",
        }
    }
}

/// Per-tag last-seen store plus the gate topology and timeout.
///
/// Generic over the key so the rules can be exercised with plain string
/// identifiers; the daemon always uses [`TagId`].
///
/// Entries are never evicted: every tag seen lives for the tracker's
/// lifetime.
#[derive(Debug)]
pub struct MovementTracker<K = TagId> {
    gates: GatePairs,
    timeout: Duration,
    seen: HashMap<K, TagState>,
}

impl<K: Eq + Hash> MovementTracker<K> {
    pub fn new(gates: GatePairs, timeout: Duration) -> Self {
        Self {
            gates,
            timeout,
            seen: HashMap::new(),
        }
    }

    /// Classify a sighting of `tag` on `port` at `now`, updating the
    /// stored state when the result is logged.
    ///
    /// `now` is wall-clock time since any fixed epoch.  A clock that steps
    /// backwards counts as zero elapsed time.
    pub fn evaluate(&mut self, port: u8, tag: K, now: Duration) -> Decision {
        let fresh = TagState {
            port,
            last_seen: now,
        };

        let mut entry = match self.seen.entry(tag) {
            Entry::Vacant(v) => {
                v.insert(fresh);
                return Decision::FirstSighting;
            }
            Entry::Occupied(o) => o,
        };

        let last = *entry.get();
        let elapsed = now.saturating_sub(last.last_seen);

        let decision = if port == last.port && elapsed < self.timeout {
            Decision::SuppressedRepeat
        } else if self.gates.is_crossing(last.port, port) {
            Decision::GateCrossing { from: last.port }
        } else if elapsed >= self.timeout {
            Decision::Reconfirmed
        } else {
            Decision::Ignored
        };

        if decision.is_logged() {
            entry.insert(fresh);
        }
        decision
    }

    /// `true` if the sighting represents a meaningful movement.
    pub fn should_log(&mut self, port: u8, tag: K, now: Duration) -> bool {
        self.evaluate(port, tag, now).is_logged()
    }

    /// Stored state for `tag`, if it has ever been seen.
    pub fn state(&self, tag: &K) -> Option<TagState> {
        self.seen.get(tag).copied()
    }

    /// Number of distinct tags seen.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn gates(&self) -> &GatePairs {
        &self.gates
    }
}

impl<K: Eq + Hash> Default for MovementTracker<K> {
    fn default() -> Self {
        Self::new(GatePairs::default(), DEFAULT_TIMEOUT)
    }
}

impl MovementTracker<TagId> {
    /// [`evaluate`](Self::evaluate) with a debug trace of the outcome.
    pub fn observe(&mut self, port: u8, tag: TagId, now: Duration) -> Decision {
        let decision = self.evaluate(port, tag, now);
        debug!("TRACK | ant={} eid={} -> {}", port, tag, decision.as_str());
        decision
    }
}

// ---------------------------------------------------------------------------
// Shared tracker
// ---------------------------------------------------------------------------

/// A tracker behind one mutex, for deployments where several scan loops
/// feed the same tag population.  Each call's read-then-write on a tag
/// entry is atomic with respect to every other caller.
#[derive(Debug)]
pub struct SharedTracker<K = TagId> {
    inner: Mutex<MovementTracker<K>>,
}

impl<K: Eq + Hash> SharedTracker<K> {
    pub fn new(tracker: MovementTracker<K>) -> Self {
        Self {
            inner: Mutex::new(tracker),
        }
    }

    pub fn evaluate(&self, port: u8, tag: K, now: Duration) -> Decision {
        // A poisoned lock still guards a consistent map.
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .evaluate(port, tag, now)
    }

    pub fn should_log(&self, port: u8, tag: K, now: Duration) -> bool {
        self.evaluate(port, tag, now).is_logged()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
