//! Integration tests for the ReaderService → Transport → EventSink pipeline.
//!
//! These run against a scripted link and a manual clock, so every byte the
//! service writes and every event it emits can be checked exactly.

use std::sync::atomic::{AtomicBool, Ordering};

use gatereader::app::events::AppEvent;
use gatereader::app::service::ReaderService;
use gatereader::error::{Error, LinkError};
use gatereader::protocol::transport::Transport;
use gatereader::protocol::{AckPolicy, Hex, TagId};
use gatereader::tracker::Decision;

use crate::mock_link::{
    ManualClock, RecordingSink, ScriptedLink, TAG_A, TAG_B, fast_config, response,
};

const POWER_30_ACK: [u8; 6] = [0x05, 0x00, 0x2F, 0x1E, 0x72, 0x34];
const SENTINEL_ACK: [u8; 6] = [0x05, 0x00, 0x2F, 0x00, 0x8D, 0xCD];

fn tag(bytes: [u8; 12]) -> TagId {
    TagId::from_bytes(bytes).unwrap()
}

// ── Power handshake ───────────────────────────────────────────

#[test]
fn initialise_sends_power_frame_and_accepts_echo() {
    let mut svc = ReaderService::new(&fast_config(&[1, 8])).unwrap();
    let mut link = ScriptedLink::new().with_power_ack(&POWER_30_ACK);
    let mut sink = RecordingSink::new();

    svc.initialise(&mut link, &mut sink).unwrap();

    assert_eq!(link.writes.len(), 1);
    assert_eq!(Hex(&link.writes[0]).to_string(), "05002f1e7234");
    assert!(matches!(
        sink.events.as_slice(),
        [AppEvent::Started { power_dbm: 30, antennas }] if antennas == &vec![1, 8]
    ));
}

#[test]
fn wrong_ack_is_rejected() {
    let mut svc = ReaderService::new(&fast_config(&[1])).unwrap();
    let mut link = ScriptedLink::new().with_power_ack(&SENTINEL_ACK);
    let mut sink = RecordingSink::new();

    assert_eq!(
        svc.initialise(&mut link, &mut sink),
        Err(Error::UnexpectedAck)
    );
    assert!(sink.events.is_empty(), "no Started on failure");
}

#[test]
fn short_ack_is_rejected() {
    let mut svc = ReaderService::new(&fast_config(&[1])).unwrap();
    let mut link = ScriptedLink::new().with_power_ack(&POWER_30_ACK[..4]);
    assert_eq!(
        svc.initialise(&mut link, &mut RecordingSink::new()),
        Err(Error::UnexpectedAck)
    );
}

#[test]
fn sentinel_policy_accepts_zero_power_echo() {
    let mut cfg = fast_config(&[1]);
    cfg.ack_policy = AckPolicy::Sentinel;
    let mut svc = ReaderService::new(&cfg).unwrap();
    let mut link = ScriptedLink::new().with_power_ack(&SENTINEL_ACK);

    svc.initialise(&mut link, &mut RecordingSink::new()).unwrap();
    // The command itself still carries the requested power.
    assert_eq!(Hex(&link.writes[0]).to_string(), "05002f1e7234");
}

#[test]
fn silent_reader_times_out() {
    let mut svc = ReaderService::new(&fast_config(&[1])).unwrap();
    let mut link = ScriptedLink::new();
    assert_eq!(
        svc.initialise(&mut link, &mut RecordingSink::new()),
        Err(Error::Link(LinkError::Timeout))
    );
}

// ── Scan ticks ────────────────────────────────────────────────

#[test]
fn tick_polls_antennas_in_configured_order() {
    let mut svc = ReaderService::new(&fast_config(&[8, 1, 2])).unwrap();
    let mut link = ScriptedLink::new();
    let clock = ManualClock::new();

    let stats = svc.scan_once(&mut link, &clock, &mut RecordingSink::new());

    assert_eq!(link.polled_ports(), vec![8, 1, 2]);
    assert_eq!(Hex(&link.writes[0]).to_string(), "090001000000870a3aba");
    assert_eq!(Hex(&link.writes[1]).to_string(), "090001000000800a32f7");
    assert_eq!(stats.ports_polled, 3);
    assert_eq!(stats.detections, 0);
}

#[test]
fn gate_crossing_sequence() {
    let mut svc = ReaderService::new(&fast_config(&[1, 8])).unwrap();
    let mut link = ScriptedLink::new();
    let clock = ManualClock::new();
    let mut sink = RecordingSink::new();

    // t=0: first sighting inside.
    link.reply(1, response(&[TAG_A]));
    let stats = svc.scan_once(&mut link, &clock, &mut sink);
    assert_eq!(stats.detections, 1);
    let first = sink.detections()[0].clone();
    assert_eq!(first.timestamp, "2024-05-01 06:00:00");
    assert_eq!(first.antenna_port, 1);
    assert_eq!(first.tag_id, tag(TAG_A));
    assert_eq!(first.source_label, "Reader_1_coop_2");

    // t=10: still inside, suppressed.
    clock.advance(10);
    link.reply(1, response(&[TAG_A]));
    let stats = svc.scan_once(&mut link, &clock, &mut sink);
    assert_eq!((stats.tags_seen, stats.detections), (1, 0));

    // t=20: outside, crossing.
    clock.advance(10);
    link.reply(8, response(&[TAG_A]));
    svc.scan_once(&mut link, &clock, &mut sink);

    let decisions: Vec<Decision> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Detection { decision, .. } => Some(*decision),
            _ => None,
        })
        .collect();
    assert_eq!(
        decisions,
        vec![Decision::FirstSighting, Decision::GateCrossing { from: 1 }]
    );
    assert_eq!(sink.detections()[1].timestamp, "2024-05-01 06:00:20");
}

#[test]
fn lingering_tag_is_reconfirmed_after_timeout() {
    let mut cfg = fast_config(&[2]);
    cfg.timeout_secs = 60;
    let mut svc = ReaderService::new(&cfg).unwrap();
    let mut link = ScriptedLink::new();
    let clock = ManualClock::new();
    let mut sink = RecordingSink::new();

    for _ in 0..4 {
        link.reply(2, response(&[TAG_B]));
        svc.scan_once(&mut link, &clock, &mut sink);
        clock.advance(20);
    }
    // Sightings at 0, 20, 40, 60: logged at 0 and 60.
    let stamps: Vec<&str> = sink
        .detections()
        .iter()
        .map(|r| r.timestamp.as_str())
        .collect();
    assert_eq!(stamps, vec!["2024-05-01 06:00:00", "2024-05-01 06:01:00"]);
}

#[test]
fn all_tags_in_one_tick_share_a_timestamp() {
    let mut svc = ReaderService::new(&fast_config(&[1, 2])).unwrap();
    let mut link = ScriptedLink::new();
    let clock = ManualClock::new();
    let mut sink = RecordingSink::new();

    link.reply(1, response(&[TAG_A, TAG_B]));
    link.reply(2, response(&[]));
    let stats = svc.scan_once(&mut link, &clock, &mut sink);

    assert_eq!(stats.detections, 2);
    let d = sink.detections();
    assert_eq!(d[0].tag_id, tag(TAG_A));
    assert_eq!(d[1].tag_id, tag(TAG_B));
    assert_eq!(d[0].timestamp, d[1].timestamp);
}

#[test]
fn link_fault_skips_one_antenna_only() {
    let mut svc = ReaderService::new(&fast_config(&[1, 2, 7])).unwrap();
    let mut link = ScriptedLink::new();
    let clock = ManualClock::new();
    let mut sink = RecordingSink::new();

    link.fail(2, LinkError::Read);
    link.reply(7, response(&[TAG_B]));
    let stats = svc.scan_once(&mut link, &clock, &mut sink);

    assert_eq!(link.polled_ports(), vec![1, 2, 7]);
    assert_eq!(stats.ports_polled, 2);
    assert_eq!(stats.link_errors, 1);
    assert_eq!(stats.detections, 1);
    assert!(sink.events.iter().any(|e| matches!(
        e,
        AppEvent::LinkFault {
            port: 2,
            error: LinkError::Read
        }
    )));
    assert_eq!(sink.detections()[0].antenna_port, 7);
}

#[test]
fn truncated_response_yields_no_detection() {
    let mut svc = ReaderService::new(&fast_config(&[1])).unwrap();
    let mut link = ScriptedLink::new();
    let mut sink = RecordingSink::new();

    link.reply(1, TAG_A[..11].to_vec());
    let stats = svc.scan_once(&mut link, &ManualClock::new(), &mut sink);

    assert_eq!(stats.tags_seen, 0);
    assert!(sink.events.is_empty());
    assert!(svc.tracker().is_empty());
}

// ── Run loop ──────────────────────────────────────────────────

/// Clears the running flag once `budget` antenna frames have been sent.
struct StopAfter<'a> {
    inner: ScriptedLink,
    running: &'a AtomicBool,
    budget: usize,
}

impl Transport for StopAfter<'_> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        self.inner.read(buf)
    }

    fn write(&mut self, data: &[u8]) -> Result<(), LinkError> {
        self.budget = self.budget.saturating_sub(1);
        if self.budget == 0 {
            self.running.store(false, Ordering::SeqCst);
        }
        self.inner.write(data)
    }

    fn flush(&mut self) -> Result<(), LinkError> {
        self.inner.flush()
    }
}

#[test]
fn run_stops_when_flag_cleared() {
    let mut svc = ReaderService::new(&fast_config(&[1, 8])).unwrap();
    let running = AtomicBool::new(true);
    let mut link = StopAfter {
        inner: ScriptedLink::new(),
        running: &running,
        budget: 6,
    };
    let mut sink = RecordingSink::new();

    let ticks = svc.run(&mut link, &ManualClock::new(), &mut sink, &running);

    assert_eq!(ticks, 3);
    assert_eq!(link.inner.polled_ports(), vec![1, 8, 1, 8, 1, 8]);
    assert!(matches!(sink.events.last(), Some(AppEvent::Stopped { ticks: 3 })));
}

#[test]
fn run_with_cleared_flag_does_nothing() {
    let mut svc = ReaderService::new(&fast_config(&[1])).unwrap();
    let running = AtomicBool::new(false);
    let mut link = ScriptedLink::new();
    let mut sink = RecordingSink::new();

    assert_eq!(svc.run(&mut link, &ManualClock::new(), &mut sink, &running), 0);
    assert!(link.writes.is_empty());
    assert!(matches!(
        sink.events.as_slice(),
        [AppEvent::Stopped { ticks: 0 }]
    ));
}
