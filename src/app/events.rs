//! Outbound application events and status messages.
//!
//! [`StatusMessage`] is the human-facing text shown through the
//! [`StatusSink`](super::ports::StatusSink); [`AppEvent`] is the structured
//! record emitted through the [`EventSink`](super::ports::EventSink).

use core::time::Duration;

use crate::config::StatusDurations;
use crate::drivers::relay::RelayError;
use crate::fsm::StateId;

// ───────────────────────────────────────────────────────────────
// Status messages
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    HandshakeStep,
    HandshakeError,
    SetupComplete,
    FrameReceived,
    LineRejected,
    Listening,
    ButtonPressed,
}

/// Display text plus how long to hold it.  With `persist` the text stays
/// up after the hold instead of being cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
    pub duration: Duration,
    pub persist: bool,
}

fn ms(value: u32) -> Duration {
    Duration::from_millis(value.into())
}

impl StatusMessage {
    pub fn handshake_step(step: usize, ok: bool, d: &StatusDurations) -> Self {
        let result = if ok { "Ok" } else { "ERR" };
        Self {
            kind: StatusKind::HandshakeStep,
            text: format!("AT CMD {step}:\n{result}"),
            duration: ms(d.handshake_step_ms),
            persist: false,
        }
    }

    pub fn handshake_error(d: &StatusDurations) -> Self {
        Self {
            kind: StatusKind::HandshakeError,
            text: String::from("AT ERR"),
            duration: ms(d.handshake_error_ms),
            persist: false,
        }
    }

    pub fn setup_complete(d: &StatusDurations) -> Self {
        Self {
            kind: StatusKind::SetupComplete,
            text: String::from("Setup complete!\nListening for\nincoming SMS"),
            duration: ms(d.setup_complete_ms),
            persist: true,
        }
    }

    pub fn frame_received(len: usize, d: &StatusDurations) -> Self {
        Self {
            kind: StatusKind::FrameReceived,
            text: format!("SMS RECEIVED!\nLength:{len}"),
            duration: ms(d.frame_received_ms),
            persist: false,
        }
    }

    pub fn rejected_line(d: &StatusDurations) -> Self {
        Self {
            kind: StatusKind::LineRejected,
            text: String::from("SMS line rejected"),
            duration: ms(d.rejected_line_ms),
            persist: false,
        }
    }

    pub fn listening(d: &StatusDurations) -> Self {
        Self {
            kind: StatusKind::Listening,
            text: String::from("Listening for\nincoming SMS"),
            duration: ms(d.listening_ms),
            persist: true,
        }
    }

    pub fn button_pressed(d: &StatusDurations) -> Self {
        Self {
            kind: StatusKind::ButtonPressed,
            text: String::from("Button Pressed!"),
            duration: ms(d.button_pressed_ms),
            persist: false,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Structured events
// ───────────────────────────────────────────────────────────────

/// What asked for a relay pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSource {
    Sms,
    Button,
}

/// Running totals since boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeCounters {
    pub frames_received: u32,
    pub frames_authorized: u32,
    pub lines_rejected: u32,
    pub pulses_completed: u32,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service has started (carries initial state).
    Started(StateId),

    /// The FSM transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// A frame arrived from the modem.
    FrameReceived { len: usize },

    /// A line matched the secret, or the button was pressed, and the relay
    /// was pulsed.
    Pulsed {
        source: TriggerSource,
        pulse_count: u32,
    },

    /// The relay pin could not be driven.  The pin was still released.
    PulseFailed {
        source: TriggerSource,
        error: RelayError,
    },

    /// Every line of a frame was scanned and none matched.
    NoMatch { lines: usize },
}
