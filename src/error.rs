//! Unified error types for the SmsGate firmware.
//!
//! A single `Error` enum that every subsystem converts into, so the event
//! loop can decide in one place what escalates to a restart.  Only a short
//! write during the modem handshake is fatal; everything else is handled
//! locally and the loop keeps listening.

use core::fmt;

use crate::config::ConfigError;
use crate::drivers::relay::RelayError;
use crate::fsm::StateId;
use crate::sms::handshake::HandshakeFailed;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A bring-up command was not fully written to the modem.
    /// `step` is 1-based; `written` is `None` when the write itself failed.
    TransportWriteShortfall {
        step: usize,
        expected: usize,
        written: Option<usize>,
    },
    /// No bytes arrived within the poll window.
    TransportReadTimeout,
    /// The transport reported a read error.
    TransportReadFailed,
    /// No line of a received frame contained the secret.
    AuthMismatch,
    /// The relay pin could not be driven.
    Relay(RelayError),
    /// Configuration is invalid.
    Config(ConfigError),
    /// The event loop was polled outside `Listening`.
    NotListening(StateId),
}

impl Error {
    /// Whether this error must end the session with a device restart.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::TransportWriteShortfall { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TransportWriteShortfall {
                step,
                expected,
                written: Some(n),
            } => write!(f, "modem command {step}: wrote {n} of {expected} bytes"),
            Self::TransportWriteShortfall {
                step,
                expected,
                written: None,
            } => write!(f, "modem command {step}: write of {expected} bytes failed"),
            Self::TransportReadTimeout => write!(f, "no data within poll window"),
            Self::TransportReadFailed => write!(f, "transport read failed"),
            Self::AuthMismatch => write!(f, "no line matched the secret"),
            Self::Relay(e) => write!(f, "relay: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::NotListening(state) => write!(f, "not listening (state {state})"),
        }
    }
}

impl From<HandshakeFailed> for Error {
    fn from(e: HandshakeFailed) -> Self {
        Self::TransportWriteShortfall {
            step: e.step,
            expected: e.expected,
            written: e.written,
        }
    }
}

impl From<RelayError> for Error {
    fn from(e: RelayError) -> Self {
        Self::Relay(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
