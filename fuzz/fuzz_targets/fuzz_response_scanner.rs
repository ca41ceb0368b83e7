//! Fuzz target: `extract_tag_ids`
//!
//! Drives arbitrary reader responses into the scanner and asserts that it
//! never panics, only yields header-led windows, and never yields more
//! identifiers than the input can hold.
//!
//! cargo fuzz run fuzz_response_scanner

#![no_main]

use gatereader::protocol::extract_tag_ids;
use gatereader::protocol::scanner::{TAG_HEADER, TAG_ID_LEN};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let ids = extract_tag_ids(data);
    assert!(ids.len() <= data.len() / TAG_ID_LEN);

    for id in &ids {
        assert_eq!(id.as_bytes()[..2], TAG_HEADER);
        // Display and parse agree for everything the scanner emits.
        let text = id.to_string();
        assert_eq!(text.len(), TAG_ID_LEN * 2);
        assert_eq!(text.parse::<gatereader::protocol::TagId>().ok(), Some(*id));
    }
});
