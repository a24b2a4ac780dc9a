//! Relay actuator: one fixed-width active-HIGH pulse per authorised event.
//!
//! Two callers can request a pulse at the same time (the SMS event loop and
//! the manual-trigger worker).  A mutex around the pin serialises them, so
//! pulses never overlap and the second one starts only after the first has
//! driven the pin LOW.
//!
//! The pin is released by a drop guard.  Whether `pulse` returns normally,
//! returns an error, or unwinds, the guard drives the pin LOW before the
//! lock is given up.

use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};
use core::time::Duration;
use std::sync::{Mutex, MutexGuard, PoisonError};

use embedded_hal::digital::OutputPin;
use log::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayError {
    /// The GPIO write failed.
    PinWrite,
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PinWrite => write!(f, "relay pin write failed"),
        }
    }
}

/// Drives the pin LOW when dropped.
struct ReleaseGuard<'a, P: OutputPin>(MutexGuard<'a, P>);

impl<P: OutputPin> Drop for ReleaseGuard<'_, P> {
    fn drop(&mut self) {
        if self.0.set_low().is_err() {
            warn!("RELAY | failed to release pin");
        }
    }
}

pub struct RelayActuator<P: OutputPin> {
    pin: Mutex<P>,
    hold: Duration,
    pulses: AtomicU32,
}

impl<P: OutputPin> RelayActuator<P> {
    /// Take ownership of `pin` and drive it inactive.
    pub fn new(mut pin: P, hold: Duration) -> Result<Self, RelayError> {
        pin.set_low().map_err(|_| RelayError::PinWrite)?;
        Ok(Self {
            pin: Mutex::new(pin),
            hold,
            pulses: AtomicU32::new(0),
        })
    }

    /// Hold the relay active for the configured duration, then release it.
    ///
    /// Blocks the caller for the whole pulse, plus any time spent waiting for
    /// a pulse already in progress.
    pub fn pulse(&self) -> Result<(), RelayError> {
        // The previous holder's guard already drove the pin LOW, so a
        // poisoned lock is safe to reuse.
        let locked = self.pin.lock().unwrap_or_else(PoisonError::into_inner);
        let mut guard = ReleaseGuard(locked);

        guard.0.set_high().map_err(|_| RelayError::PinWrite)?;
        debug!("RELAY | active for {} ms", self.hold.as_millis());
        std::thread::sleep(self.hold);
        drop(guard);

        self.pulses.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    pub fn hold_duration(&self) -> Duration {
        self.hold
    }

    /// Pulses that ran to completion since construction.
    pub fn pulse_count(&self) -> u32 {
        self.pulses.load(Ordering::Relaxed)
    }
}
