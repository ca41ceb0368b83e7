//! Application service: the hexagonal core.
//!
//! [`ReaderService`] owns the movement tracker, the active antenna list and
//! the source label.  All I/O flows through the [`Transport`] and port
//! traits injected at call sites, making the whole scan loop testable with
//! a scripted link and a manual clock.
//!
//! ```text
//!   Transport ◀──▶ ┌────────────────────────────┐ ──▶ EventSink
//!                  │       ReaderService        │
//!   ClockPort ───▶ │  codec · scanner · tracker │
//!                  └────────────────────────────┘
//! ```
//!
//! One tick polls every active antenna in order.  All sightings in a tick
//! share one timestamp, captured before the first antenna is polled.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::config::ReaderConfig;
use crate::error::{Error, LinkError, Result};
use crate::protocol::transport::Transport;
use crate::protocol::{AckPolicy, Frame, Hex, build_antenna_frame, build_power_frame, extract_tag_ids};
use crate::tracker::MovementTracker;

use super::events::{AppEvent, DetectionRecord};
use super::ports::{ClockPort, EventSink};

/// Bytes read back after the power-set command.
pub const ACK_LEN: usize = 6;

/// Upper bound on one inventory response.
pub const RESPONSE_BUF_LEN: usize = 4096;

/// Counters for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Antennas whose exchange completed.
    pub ports_polled: usize,
    /// Identifiers extracted, before de-duplication.
    pub tags_seen: usize,
    /// Sightings the tracker accepted.
    pub detections: usize,
    /// Antennas whose exchange failed.
    pub link_errors: usize,
}

// ───────────────────────────────────────────────────────────────
// ReaderService
// ───────────────────────────────────────────────────────────────

pub struct ReaderService {
    tracker: MovementTracker,
    /// Prebuilt antenna-select frames, in polling order.
    frames: Vec<(u8, Frame)>,
    power_dbm: u8,
    ack_policy: AckPolicy,
    source_label: String,
    scan_interval: Duration,
    response_settle: Duration,
    power_settle: Duration,
    rx_buf: Vec<u8>,
    ticks: u64,
}

impl ReaderService {
    /// Construct the service from configuration.
    ///
    /// Builds every antenna frame up front, so a bad port fails here with
    /// [`Error::Codec`] rather than mid-scan.  Does **not** talk to the
    /// reader; call [`initialise`](Self::initialise) next.
    pub fn new(config: &ReaderConfig) -> Result<Self> {
        let tracker = MovementTracker::new(config.gates()?, config.timeout());
        Self::with_tracker(config, tracker)
    }

    /// Like [`new`](Self::new) but with a caller-supplied tracker.
    pub fn with_tracker(config: &ReaderConfig, tracker: MovementTracker) -> Result<Self> {
        if config.antennas.is_empty() {
            return Err(Error::Config("no antenna ports selected"));
        }
        let frames = config
            .antennas
            .iter()
            .map(|&port| build_antenna_frame(port).map(|f| (port, f)))
            .collect::<core::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            tracker,
            frames,
            power_dbm: config.power_dbm,
            ack_policy: config.ack_policy,
            source_label: config.device_label.clone(),
            scan_interval: config.scan_interval(),
            response_settle: config.response_settle(),
            power_settle: config.power_settle(),
            rx_buf: vec![0; RESPONSE_BUF_LEN],
            ticks: 0,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Apply the configured transmit power and check the acknowledgement.
    ///
    /// Emits [`AppEvent::Started`] on success.  Fails with
    /// [`Error::UnexpectedAck`] if the reader answered anything but the
    /// expected frame, or [`LinkError::Timeout`] if it answered nothing.
    pub fn initialise(
        &mut self,
        link: &mut impl Transport,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let frame = build_power_frame(self.power_dbm)?;
        let expected = self.ack_policy.expected_ack(self.power_dbm);

        link.discard_input()?;
        debug!("TX | power={}dBm frame={}", self.power_dbm, frame);
        link.write(&frame)?;
        link.flush()?;
        pause(self.power_settle);

        let mut ack = [0u8; ACK_LEN];
        let n = read_up_to(link, &mut ack)?;
        debug!("RX | ack {} bytes: {}", n, Hex(&ack[..n]));

        if n == 0 {
            error!("Reader sent no acknowledgement to power setting");
            return Err(LinkError::Timeout.into());
        }
        if ack[..n] != *expected.as_bytes() {
            error!(
                "Unexpected power acknowledgement: got {} want {} (policy={})",
                Hex(&ack[..n]),
                expected,
                self.ack_policy
            );
            return Err(Error::UnexpectedAck);
        }

        info!("RF power set to {} dBm", self.power_dbm);
        sink.emit(&AppEvent::Started {
            power_dbm: self.power_dbm,
            antennas: self.antennas(),
        });
        Ok(())
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Poll every active antenna once.
    ///
    /// A link failure on one antenna is logged, reported as
    /// [`AppEvent::LinkFault`] and counted; the tick moves on to the next
    /// antenna.  Sink failures are the sink's business.
    pub fn scan_once(
        &mut self,
        link: &mut impl Transport,
        clock: &impl ClockPort,
        sink: &mut impl EventSink,
    ) -> ScanStats {
        self.ticks += 1;
        let now = clock.now();
        let timestamp = clock.timestamp();
        let mut stats = ScanStats::default();

        for (port, frame) in &self.frames {
            let port = *port;
            let n = match exchange(link, frame, self.response_settle, &mut self.rx_buf) {
                Ok(n) => n,
                Err(e) => {
                    warn!("Antenna {} exchange failed: {}", port, e);
                    stats.link_errors += 1;
                    sink.emit(&AppEvent::LinkFault { port, error: e });
                    continue;
                }
            };
            stats.ports_polled += 1;
            debug!("RX | ant={} {} bytes: {}", port, n, Hex(&self.rx_buf[..n]));

            for tag in extract_tag_ids(&self.rx_buf[..n]) {
                stats.tags_seen += 1;
                let decision = self.tracker.observe(port, tag, now);
                if !decision.is_logged() {
                    continue;
                }
                stats.detections += 1;
                sink.emit(&AppEvent::Detection {
                    record: DetectionRecord {
                        timestamp: timestamp.clone(),
                        antenna_port: port,
                        tag_id: tag,
                        source_label: self.source_label.clone(),
                    },
                    decision,
                });
            }
        }

        stats
    }

    /// Scan until `running` is cleared, pausing the scan interval between
    /// ticks.  Emits [`AppEvent::Stopped`] on exit and returns the number
    /// of ticks run.
    pub fn run(
        &mut self,
        link: &mut impl Transport,
        clock: &impl ClockPort,
        sink: &mut impl EventSink,
        running: &AtomicBool,
    ) -> u64 {
        let start = self.ticks;
        info!(
            "Scanning antennas {:?} every {} ms",
            self.antennas(),
            self.scan_interval.as_millis()
        );

        while running.load(Ordering::SeqCst) {
            let stats = self.scan_once(link, clock, sink);
            if stats.detections > 0 || stats.link_errors > 0 {
                debug!(
                    "TICK | n={} polled={} seen={} logged={} link_errors={}",
                    self.ticks, stats.ports_polled, stats.tags_seen, stats.detections, stats.link_errors
                );
            }
            pause(self.scan_interval);
        }

        let ticks = self.ticks - start;
        info!("Scan loop stopped after {} ticks, {} tags known", ticks, self.tracker.len());
        sink.emit(&AppEvent::Stopped { ticks });
        ticks
    }

    // ── Queries ───────────────────────────────────────────────

    /// Active antenna ports, in polling order.
    pub fn antennas(&self) -> Vec<u8> {
        self.frames.iter().map(|(port, _)| *port).collect()
    }

    pub fn tracker(&self) -> &MovementTracker {
        &self.tracker
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

// ───────────────────────────────────────────────────────────────
// Link helpers
// ───────────────────────────────────────────────────────────────

/// Send one inventory frame and read whatever the reader answers.
fn exchange(
    link: &mut impl Transport,
    frame: &Frame,
    settle: Duration,
    buf: &mut [u8],
) -> core::result::Result<usize, LinkError> {
    link.discard_input()?;
    link.write(frame)?;
    link.flush()?;
    pause(settle);
    link.read(buf)
}

/// Read until `buf` is full or the link goes quiet.
fn read_up_to(
    link: &mut impl Transport,
    buf: &mut [u8],
) -> core::result::Result<usize, LinkError> {
    let mut filled = 0;
    while filled < buf.len() {
        match link.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

fn pause(d: Duration) {
    if !d.is_zero() {
        thread::sleep(d);
    }
}
