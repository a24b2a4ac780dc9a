//! Shared-secret check for SMS lines.
//!
//! A line authorises a pulse when it contains the configured secret as a
//! contiguous, case-sensitive byte run.  No trimming, no case folding, no
//! sender filtering: the body `please open 1960s` and a `+CMT:` header that
//! happens to contain `1960s` both match.

use super::codec::Line;
use crate::config::MAX_SECRET_LEN;

/// `true` iff `secret` occurs as a contiguous run of bytes in `line`.
/// The empty secret matches every line, including the empty one.
pub fn matches(line: &[u8], secret: &[u8]) -> bool {
    if secret.is_empty() {
        return true;
    }
    line.windows(secret.len()).any(|w| w == secret)
}

/// Holds the secret for the lifetime of the event loop.
#[derive(Debug, Clone)]
pub struct Authenticator {
    secret: heapless::Vec<u8, MAX_SECRET_LEN>,
}

impl Authenticator {
    pub fn new(secret: &heapless::String<MAX_SECRET_LEN>) -> Self {
        Self {
            secret: secret.clone().into_bytes(),
        }
    }

    /// Raw-byte secret; `None` if longer than [`MAX_SECRET_LEN`].
    pub fn from_bytes(secret: &[u8]) -> Option<Self> {
        heapless::Vec::from_slice(secret).ok().map(|secret| Self { secret })
    }

    pub fn is_authorized(&self, line: Line<'_>) -> bool {
        matches(line.as_bytes(), &self.secret)
    }
}
