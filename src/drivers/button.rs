//! ISR-debounced manual-trigger button.
//!
//! ## Hardware
//!
//! Active-high momentary switch on [`BUTTON_GPIO`](crate::pins::BUTTON_GPIO)
//! with the internal pull-down enabled.  The GPIO fires on the rising edge;
//! the ISR only touches atomics in a [`ButtonLatch`], and
//! [`ButtonDriver::tick`] (polled every [`BUTTON_POLL_MS`] by the button
//! task, never by the SMS loop) turns latched presses into [`ButtonEvent`]s.
//!
//! Edges closer than [`DEBOUNCE_MS`] to the last accepted edge are contact
//! bounce and are ignored.

use core::sync::atomic::{AtomicU32, Ordering};

pub const DEBOUNCE_MS: u32 = 50;

/// Latch poll period of the button task.
pub const BUTTON_POLL_MS: u64 = 10;

const NEVER: u32 = u32::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    Click,
}

/// Press latch shared between the ISR (producer) and the button task.
pub struct ButtonLatch {
    last_edge_ms: AtomicU32,
    presses: AtomicU32,
}

impl Default for ButtonLatch {
    fn default() -> Self {
        Self::new()
    }
}

impl ButtonLatch {
    pub const fn new() -> Self {
        Self {
            last_edge_ms: AtomicU32::new(NEVER),
            presses: AtomicU32::new(0),
        }
    }

    /// ISR handler body.  Lock-free; safe from interrupt context.
    /// Returns `true` if the edge was accepted as a press.
    pub fn on_edge(&self, now_ms: u32) -> bool {
        let last = self.last_edge_ms.load(Ordering::Acquire);
        if last != NEVER && now_ms.wrapping_sub(last) < DEBOUNCE_MS {
            return false;
        }
        self.last_edge_ms.store(now_ms, Ordering::Release);
        self.presses.fetch_add(1, Ordering::AcqRel);
        true
    }

    /// Accepted presses since boot (wraps).
    pub fn presses(&self) -> u32 {
        self.presses.load(Ordering::Acquire)
    }
}

/// Latch the hardware ISR writes into.
pub static BUTTON_LATCH: ButtonLatch = ButtonLatch::new();

/// Main-loop side of the button.  Yields one click per latched press.
pub struct ButtonDriver<'a> {
    latch: &'a ButtonLatch,
    consumed: u32,
}

impl<'a> ButtonDriver<'a> {
    /// Presses latched before construction are ignored.
    pub fn new(latch: &'a ButtonLatch) -> Self {
        Self {
            latch,
            consumed: latch.presses(),
        }
    }

    pub fn tick(&mut self) -> Option<ButtonEvent> {
        if self.latch.presses() == self.consumed {
            return None;
        }
        self.consumed = self.consumed.wrapping_add(1);
        Some(ButtonEvent::Click)
    }
}
