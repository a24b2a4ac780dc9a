//! Controller lifecycle state machine.
//!
//! ```text
//!  Booting ──▶ Handshaking ──ok──▶ Listening ◀─┐
//!                  │                   │       │ frame / idle
//!                  │ short write       └───────┘
//!                  ▼
//!              Restarting  (terminal: device reboots)
//! ```
//!
//! Transitions are validated against a fixed edge table.  An illegal edge is
//! rejected with [`InvalidTransition`] and the state is left unchanged.  The
//! engine also counts loop ticks so the service can report how long it has
//! been listening.

use core::fmt;

use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Booting = 0,
    Handshaking = 1,
    Listening = 2,
    Restarting = 3,
}

impl StateId {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Booting => "Booting",
            Self::Handshaking => "Handshaking",
            Self::Listening => "Listening",
            Self::Restarting => "Restarting",
        }
    }

    /// Whether `self -> next` is a legal edge.
    pub const fn can_transition_to(self, next: StateId) -> bool {
        matches!(
            (self, next),
            (Self::Booting, Self::Handshaking)
                | (Self::Handshaking, Self::Listening)
                | (Self::Handshaking, Self::Restarting)
                | (Self::Listening, Self::Restarting)
        )
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: StateId,
    pub to: StateId,
}

impl fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "illegal transition {} -> {}", self.from, self.to)
    }
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Fsm {
    current: StateId,
    /// Event loop iterations (wraps at u64::MAX).
    tick_count: u64,
    /// Tick at which the current state was entered.
    state_entry_tick: u64,
}

impl Default for Fsm {
    fn default() -> Self {
        Self::new()
    }
}

impl Fsm {
    /// Every controller starts in `Booting`.
    pub const fn new() -> Self {
        Self {
            current: StateId::Booting,
            tick_count: 0,
            state_entry_tick: 0,
        }
    }

    pub fn current_state(&self) -> StateId {
        self.current
    }

    /// Move to `next` if the edge is legal.
    pub fn transition(&mut self, next: StateId) -> Result<(), InvalidTransition> {
        if !self.current.can_transition_to(next) {
            return Err(InvalidTransition {
                from: self.current,
                to: next,
            });
        }
        info!("FSM transition: {} -> {}", self.current, next);
        self.current = next;
        self.state_entry_tick = self.tick_count;
        Ok(())
    }

    /// Record one event loop iteration.
    pub fn tick(&mut self) {
        self.tick_count = self.tick_count.wrapping_add(1);
    }

    pub fn ticks_in_current_state(&self) -> u64 {
        self.tick_count.wrapping_sub(self.state_entry_tick)
    }
}
