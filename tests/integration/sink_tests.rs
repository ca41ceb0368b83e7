//! Integration tests for the output adapters: dated CSV files and the
//! NDJSON publisher, alone and behind a fan-out fed by the service.

use std::fs;

use gatereader::adapters::csv_log::{CSV_HEADER, CsvLogSink};
use gatereader::adapters::publish::{NdjsonPublisher, PublishSink, SinkFanout};
use gatereader::app::events::{AppEvent, DetectionRecord};
use gatereader::app::ports::EventSink;
use gatereader::app::service::ReaderService;
use gatereader::tracker::Decision;

use crate::mock_link::{ManualClock, ScriptedLink, TAG_A, TAG_B, fast_config, response};

fn detection(timestamp: &str, port: u8, eid: &str) -> AppEvent {
    AppEvent::Detection {
        record: DetectionRecord {
            timestamp: timestamp.into(),
            antenna_port: port,
            tag_id: eid.parse().unwrap(),
            source_label: "Reader_1_coop_2".into(),
        },
        decision: Decision::FirstSighting,
    }
}

const EID_A: &str = "e28068940000501ec0b83c4d";

#[test]
fn header_written_once_per_new_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = CsvLogSink::new(dir.path());

    sink.emit(&detection("2024-05-01 06:00:00", 1, EID_A));
    sink.emit(&detection("2024-05-01 06:00:20", 8, EID_A));

    let text = fs::read_to_string(dir.path().join("2024-05-01.csv")).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            CSV_HEADER,
            "2024-05-01 06:00:00,Ant_1,e28068940000501ec0b83c4d,Reader_1_coop_2",
            "2024-05-01 06:00:20,Ant_8,e28068940000501ec0b83c4d,Reader_1_coop_2",
        ]
    );
}

#[test]
fn existing_file_is_appended_without_new_header() {
    let dir = tempfile::tempdir().unwrap();
    CsvLogSink::new(dir.path()).emit(&detection("2024-05-01 06:00:00", 1, EID_A));
    // A restarted daemon picks up the same day's file.
    CsvLogSink::new(dir.path()).emit(&detection("2024-05-01 07:00:00", 2, EID_A));

    let text = fs::read_to_string(dir.path().join("2024-05-01.csv")).unwrap();
    assert_eq!(text.matches(CSV_HEADER).count(), 1);
    assert_eq!(text.lines().count(), 3);
}

#[test]
fn date_rollover_opens_new_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = CsvLogSink::new(dir.path());

    sink.emit(&detection("2024-05-01 23:59:59", 1, EID_A));
    sink.emit(&detection("2024-05-02 00:00:00", 8, EID_A));

    for day in ["2024-05-01", "2024-05-02"] {
        let text = fs::read_to_string(dir.path().join(format!("{day}.csv"))).unwrap();
        assert_eq!(text.lines().count(), 2, "{day}");
    }
}

#[test]
fn rotated_file_is_recreated_with_header() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = CsvLogSink::new(dir.path());
    let today = dir.path().join("2024-05-01.csv");
    let archived = dir.path().join("2024-05-01.csv.1");

    sink.emit(&detection("2024-05-01 06:00:00", 1, EID_A));
    // logrotate-style move between two detections
    fs::rename(&today, &archived).unwrap();
    sink.emit(&detection("2024-05-01 06:00:20", 8, EID_A));

    let old = fs::read_to_string(&archived).unwrap();
    assert_eq!(old.lines().count(), 2);
    assert!(old.contains("Ant_1"));

    let new = fs::read_to_string(&today).unwrap();
    let lines: Vec<&str> = new.lines().collect();
    assert_eq!(
        lines,
        vec![
            CSV_HEADER,
            "2024-05-01 06:00:20,Ant_8,e28068940000501ec0b83c4d,Reader_1_coop_2",
        ]
    );
}

#[test]
fn non_detection_events_are_not_logged() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = CsvLogSink::new(dir.path());
    sink.emit(&AppEvent::Stopped { ticks: 1 });
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn unwritable_directory_is_swallowed() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = CsvLogSink::new(dir.path().join("missing").join("deeper"));
    // Logged as a warning, never a panic.
    sink.emit(&detection("2024-05-01 06:00:00", 1, EID_A));
    sink.emit(&detection("2024-05-01 06:00:01", 1, EID_A));
}

#[test]
fn service_feeds_csv_and_publisher_together() {
    let dir = tempfile::tempdir().unwrap();
    let out = tempfile::NamedTempFile::new().unwrap();
    let publisher = NdjsonPublisher::new(out.reopen().unwrap());

    let mut sink = SinkFanout::new()
        .with(CsvLogSink::new(dir.path()))
        .with(PublishSink::new(publisher, "rfid/coop"));
    assert_eq!(sink.len(), 2);

    let mut svc = ReaderService::new(&fast_config(&[1, 8])).unwrap();
    let mut link = ScriptedLink::new();
    let clock = ManualClock::new();

    link.reply(1, response(&[TAG_A, TAG_B]));
    svc.scan_once(&mut link, &clock, &mut sink);
    clock.advance(5);
    link.reply(8, response(&[TAG_A]));
    svc.scan_once(&mut link, &clock, &mut sink);

    let csv = fs::read_to_string(dir.path().join("2024-05-01.csv")).unwrap();
    assert_eq!(csv.lines().count(), 4);

    let published = fs::read_to_string(out.path()).unwrap();
    let lines: Vec<serde_json::Value> = published
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 3);
    assert!(lines.iter().all(|v| v["topic"] == "rfid/coop"));
    assert_eq!(lines[2]["payload"]["antenna"], "Ant_8");
    assert_eq!(lines[2]["payload"]["eid"], EID_A);
    assert_eq!(lines[2]["payload"]["timestamp"], "2024-05-01 06:00:05");
}
