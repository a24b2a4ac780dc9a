//! Manual-trigger events.
//!
//! The push button is the only asynchronous event source besides the modem.
//! Its clicks are posted into a bounded `embassy-sync` channel and consumed
//! by the trigger worker, which runs on its own thread so a pulse never
//! stalls the SMS event loop.
//!
//! ```text
//! ┌──────────────┐ TriggerEvent ┌───────────────┐
//! │ Button (idle │─────────────▶│ Trigger worker │──▶ RelayActuator::pulse
//! │ hook, main)  │              │ (own thread)   │
//! └──────────────┘              └───────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

/// One manual pulse request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerEvent;

/// Pending trigger depth.  Clicks beyond this while a pulse is running are
/// dropped rather than queued indefinitely.
pub const TRIGGER_DEPTH: usize = 4;

pub type TriggerChannel = Channel<CriticalSectionRawMutex, TriggerEvent, TRIGGER_DEPTH>;

/// Button → trigger worker.
pub static TRIGGER_CHANNEL: TriggerChannel = Channel::new();

/// Post a trigger without blocking.  Returns `false` if the channel is full.
pub fn post_trigger(channel: &TriggerChannel) -> bool {
    match channel.try_send(TriggerEvent) {
        Ok(()) => true,
        Err(_) => {
            warn!("TRIGGER | queue full, click dropped");
            false
        }
    }
}
