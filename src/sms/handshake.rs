//! Modem bring-up: send the configured AT commands once, in order.
//!
//! Only the write count is checked.  Modem replies (`OK`, `ERROR`, echo) are
//! never parsed; they are discarded together with any boot chatter once the
//! last command has gone out, so the first frame the event loop sees is
//! real SMS traffic.
//!
//! ```text
//!  for each command:  write ──▶ count == len ? ──yes──▶ status "Ok" ──▶ settle
//!                                    │
//!                                    no ──▶ status "ERR" ──▶ "AT ERR" ──▶ HandshakeFailed
//!  then:  flush TX (bounded) ──▶ discard RX
//! ```

use core::fmt;
use core::time::Duration;

use log::{info, warn};

use crate::app::events::StatusMessage;
use crate::app::ports::StatusSink;
use crate::config::{GateConfig, ModemCommand, StatusDurations};

use super::transport::Transport;

/// Result of sending one bring-up command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Every byte was accepted by the transport.
    Sent,
    /// The write failed (`written == None`) or came up short.
    TransportError { written: Option<usize> },
}

/// The handshake stopped at `step` (1-based).  Always fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandshakeFailed {
    pub step: usize,
    pub expected: usize,
    pub written: Option<usize>,
}

impl fmt::Display for HandshakeFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.written {
            Some(n) => write!(f, "handshake step {}: wrote {} of {} bytes", self.step, n, self.expected),
            None => write!(f, "handshake step {}: transport write error", self.step),
        }
    }
}

/// Write one command and classify the outcome.
pub fn send_command<T: Transport>(transport: &mut T, command: &ModemCommand) -> CommandOutcome {
    match transport.write(command.as_bytes()) {
        Ok(n) if n == command.len() => CommandOutcome::Sent,
        Ok(n) => CommandOutcome::TransportError { written: Some(n) },
        Err(e) => {
            warn!("MODEM | write of '{}' failed: {:?}", command.label(), e);
            CommandOutcome::TransportError { written: None }
        }
    }
}

/// Drives the fixed bring-up sequence over a [`Transport`].
pub struct ModemInitializer<'a> {
    commands: &'a [ModemCommand],
    settle: Duration,
    flush_timeout: Duration,
    durations: &'a StatusDurations,
}

impl<'a> ModemInitializer<'a> {
    pub fn from_config(config: &'a GateConfig) -> Self {
        Self {
            commands: &config.command_sequence,
            settle: config.settle_delay(),
            flush_timeout: config.flush_timeout(),
            durations: &config.status,
        }
    }

    /// Send every command; stop at the first one that is not fully written.
    ///
    /// Status for each step (and the final `AT ERR` on failure) reaches
    /// `sink` before this returns, so the failure is visible on the display
    /// before the caller restarts the device.
    pub fn run<T: Transport>(
        &self,
        transport: &mut T,
        sink: &mut impl StatusSink,
    ) -> Result<(), HandshakeFailed> {
        let total = self.commands.len();

        for (idx, command) in self.commands.iter().enumerate() {
            let step = idx + 1;
            let outcome = send_command(transport, command);
            let sent = outcome == CommandOutcome::Sent;

            sink.show(&StatusMessage::handshake_step(step, sent, self.durations));

            if let CommandOutcome::TransportError { written } = outcome {
                warn!(
                    "MODEM | cmd {}/{} '{}' not fully written ({:?} of {} bytes)",
                    step,
                    total,
                    command.label(),
                    written,
                    command.len()
                );
                sink.show(&StatusMessage::handshake_error(self.durations));
                return Err(HandshakeFailed {
                    step,
                    expected: command.len(),
                    written,
                });
            }

            info!("MODEM | cmd {}/{} '{}' sent ({} bytes)", step, total, command.label(), command.len());
            std::thread::sleep(self.settle);
        }

        if let Err(e) = transport.flush_output(self.flush_timeout) {
            warn!("MODEM | TX flush did not complete: {:?}", e);
        }
        if let Err(e) = transport.discard_pending_input() {
            warn!("MODEM | RX discard failed: {:?}", e);
        }

        info!("MODEM | bring-up complete ({} commands)", total);
        Ok(())
    }
}
