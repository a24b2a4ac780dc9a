//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ GateService (domain)
//! ```
//!
//! The modem link is reached through [`Transport`](crate::sms::transport::Transport)
//! and the relay through an `embedded-hal` output pin; the two ports below
//! are the service's outbound channels.  Both are infallible: a display or
//! log that cannot keep up must never stall the gate.

use super::events::{AppEvent, StatusMessage};

// ───────────────────────────────────────────────────────────────
// Status sink (driven adapter: domain → human-facing display)
// ───────────────────────────────────────────────────────────────

/// Shows short human-readable status messages.
///
/// Implementations may block for the message's hold duration; the event
/// loop accounts for that time before its next poll.
pub trait StatusSink {
    fn show(&mut self, message: &StatusMessage);
}

// ───────────────────────────────────────────────────────────────
// Event sink (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}

impl<S: StatusSink + ?Sized> StatusSink for &mut S {
    fn show(&mut self, message: &StatusMessage) {
        (**self).show(message);
    }
}

impl<E: EventSink + ?Sized> EventSink for &mut E {
    fn emit(&mut self, event: &AppEvent) {
        (**self).emit(event);
    }
}
