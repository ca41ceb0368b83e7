//! Fuzz target: `MovementTracker::evaluate`
//!
//! Decodes the input as a stream of (port, tag, time-step) triples,
//! including out-of-range ports and backwards clock steps, and checks the
//! tracker's bookkeeping stays consistent.
//!
//! cargo fuzz run fuzz_tracker_stream

#![no_main]

use std::time::Duration;

use gatereader::tracker::{MovementTracker, TagState};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut tracker: MovementTracker<u8> = MovementTracker::default();
    let mut now: i64 = 1_000_000;

    for chunk in data.chunks_exact(3) {
        let (port, tag, step) = (chunk[0] % 10, chunk[1] % 8, chunk[2] as i8);
        now += i64::from(step) * 60;
        let t = Duration::from_secs(now.max(0) as u64);

        let before = tracker.state(&tag);
        let decision = tracker.evaluate(port, tag, t);

        if decision.is_logged() {
            assert_eq!(tracker.state(&tag), Some(TagState { port, last_seen: t }));
        } else {
            assert_eq!(tracker.state(&tag), before);
        }
    }
});
