#![no_main]

use libfuzzer_sys::fuzz_target;
use vulnaudit_advisory::{noglob_len, parse_pattern};

fuzz_target!(|data: &[u8]| {
    if let Ok(pattern) = std::str::from_utf8(data) {
        if let Ok(parsed) = parse_pattern(pattern) {
            assert!(!parsed.name.is_empty());
            assert!(noglob_len(&parsed.name) <= parsed.name.len());
        }
    }
});
