//! Fuzz target: `Authenticator::is_authorized` on arbitrary lines.
//!
//! The first byte picks the secret length (0..=32); the secret is cut
//! from the input and the rest is split into lines.
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - A line authorises iff it contains the secret as a contiguous run
//! - A line built as `prefix + secret + suffix` always authorises
//!
//! cargo fuzz run fuzz_auth

#![no_main]

use libfuzzer_sys::fuzz_target;
use smsgate::sms::auth::Authenticator;
use smsgate::sms::codec::split_lines;

fuzz_target!(|data: &[u8]| {
    let Some((&n, rest)) = data.split_first() else {
        return;
    };
    let take = (n as usize % 33).min(rest.len());
    let (secret, body) = rest.split_at(take);
    let Some(auth) = Authenticator::from_bytes(secret) else {
        return;
    };

    for line in split_lines(body, body.len()) {
        let bytes = line.as_bytes();
        let naive = secret.is_empty() || bytes.windows(secret.len()).any(|w| w == secret);
        assert_eq!(auth.is_authorized(line), naive);
    }

    if !secret.iter().any(|b| *b == b'\r' || *b == b'\n') {
        let mut framed = b"x".to_vec();
        framed.extend_from_slice(secret);
        framed.extend(body.iter().take(4).filter(|b| **b != b'\r' && **b != b'\n'));
        if let Some(line) = split_lines(&framed, framed.len()).next() {
            assert!(auth.is_authorized(line));
        }
    }
});
