//! Fuzz target: `split_lines` over arbitrary modem output.
//!
//! Invariants checked:
//! - No panics for any byte sequence or `valid_len`
//! - Every line is non-empty and free of CR/LF
//! - Lines appear in order and never reach past `valid_len`
//!
//! cargo fuzz run fuzz_frame_lines

#![no_main]

use libfuzzer_sys::fuzz_target;
use smsgate::sms::codec::{split_lines, FRAME_CAPACITY};

fuzz_target!(|data: &[u8]| {
    let Some((&cut, frame)) = data.split_first() else {
        return;
    };
    let frame = &frame[..frame.len().min(FRAME_CAPACITY)];
    let valid_len = (cut as usize * 2).min(frame.len());

    let base = frame.as_ptr() as usize;
    let mut cursor = 0;
    for line in split_lines(frame, cut as usize * 2) {
        let bytes = line.as_bytes();
        assert!(!bytes.is_empty(), "empty line yielded");
        assert!(
            !bytes.iter().any(|b| *b == b'\r' || *b == b'\n'),
            "terminator inside line"
        );

        let start = bytes.as_ptr() as usize - base;
        assert!(start >= cursor, "lines out of order");
        cursor = start + bytes.len();
        assert!(cursor <= valid_len, "line past valid_len");
    }
});
