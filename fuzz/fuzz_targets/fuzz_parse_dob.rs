#![no_main]

use libfuzzer_sys::fuzz_target;
use pwnhealth_client::{format_dob, parse_dob};

// Four-digit years survive a format/parse cycle.
fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(date) = parse_dob(text) {
            let wire = format_dob(date);
            if wire.len() == 8 {
                assert_eq!(parse_dob(&wire).ok(), Some(date));
            }
        }
    }
});
