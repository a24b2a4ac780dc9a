//! System configuration parameters
//!
//! All tunable parameters for the SmsGate controller.  Values are fixed at
//! build/startup time: the defaults below match the reference hardware, and
//! a JSON override can be baked in at build time (see `main.rs`).

use core::fmt;
use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::pins;

/// Longest AT command (including terminator) that fits a [`ModemCommand`].
pub const MAX_COMMAND_LEN: usize = 32;
/// Maximum number of bring-up commands.
pub const MAX_COMMANDS: usize = 8;
/// Longest accepted shared secret.
pub const MAX_SECRET_LEN: usize = 32;

/// Default modem bring-up: echo off, SMS text mode, push new SMS to the UART.
const DEFAULT_BRINGUP: [&str; 3] = ["ATE0\r\n", "AT+CMGF=1\r\n", "AT+CNMI=2,2,0,0,0\r\n"];

const DEFAULT_SECRET: &str = "1960s";

// ---------------------------------------------------------------------------
// Modem command
// ---------------------------------------------------------------------------

/// One AT command, terminator included.  Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModemCommand(heapless::String<MAX_COMMAND_LEN>);

impl ModemCommand {
    pub fn new(text: &str) -> Result<Self, ConfigError> {
        heapless::String::try_from(text)
            .map(Self)
            .map_err(|_| ConfigError::ValidationFailed("modem command longer than 32 bytes"))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Command text without its line terminator, for log output.
    pub fn label(&self) -> &str {
        self.0.trim_end_matches(['\r', '\n'])
    }
}

// ---------------------------------------------------------------------------
// Status display timings
// ---------------------------------------------------------------------------

/// Hold durations (milliseconds) for each status message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusDurations {
    /// Per bring-up command result.
    pub handshake_step_ms: u32,
    /// Final "AT ERR" before restart.
    pub handshake_error_ms: u32,
    /// "Setup complete" banner (persists).
    pub setup_complete_ms: u32,
    /// "SMS received" with frame length.
    pub frame_received_ms: u32,
    /// Per non-matching line.
    pub rejected_line_ms: u32,
    /// Idle "listening" banner (persists).
    pub listening_ms: u32,
    /// Manual override feedback.
    pub button_pressed_ms: u32,
}

impl Default for StatusDurations {
    fn default() -> Self {
        Self {
            handshake_step_ms: 2000,
            handshake_error_ms: 1500,
            setup_complete_ms: 2500,
            frame_received_ms: 1200,
            rejected_line_ms: 1000,
            listening_ms: 50,
            button_pressed_ms: 500,
        }
    }
}

impl StatusDurations {
    /// Longest single hold either task can show once listening.
    pub fn longest_listening_hold_ms(&self) -> u32 {
        self.frame_received_ms
            .max(self.rejected_line_ms)
            .max(self.listening_ms)
            .max(self.button_pressed_ms)
    }
}

// ---------------------------------------------------------------------------
// GateConfig
// ---------------------------------------------------------------------------

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    // --- Modem ---
    /// Ordered bring-up commands, sent once at startup.
    pub command_sequence: heapless::Vec<ModemCommand, MAX_COMMANDS>,
    /// Delay after each successful command (milliseconds).
    pub settle_ms: u32,
    /// Upper bound on waiting for the UART TX FIFO to drain after bring-up.
    pub flush_timeout_ms: u32,
    /// Time given to the modem to register on the network before bring-up.
    pub boot_delay_ms: u32,

    // --- Authentication ---
    /// Token whose presence in an SMS line authorises a pulse.
    pub secret: heapless::String<MAX_SECRET_LEN>,
    /// Emit a status message for every line that does not match.
    pub report_rejected_lines: bool,

    // --- Relay ---
    /// GPIO driving the relay coil (active HIGH).
    pub relay_pin: i32,
    /// How long the relay is held active per pulse (milliseconds).
    pub pulse_ms: u32,

    // --- Timing ---
    /// Transport poll window per loop iteration (milliseconds).
    pub poll_timeout_ms: u32,
    /// Task watchdog timeout (milliseconds).
    pub watchdog_timeout_ms: u32,

    // --- Display ---
    pub status: StatusDurations,
}

impl Default for GateConfig {
    fn default() -> Self {
        let command_sequence = DEFAULT_BRINGUP
            .iter()
            .filter_map(|c| ModemCommand::new(c).ok())
            .collect();

        Self {
            // Modem
            command_sequence,
            settle_ms: 200,
            flush_timeout_ms: 500,
            boot_delay_ms: 5000,

            // Authentication
            secret: heapless::String::try_from(DEFAULT_SECRET).unwrap_or_default(),
            report_rejected_lines: true,

            // Relay
            relay_pin: pins::RELAY_GPIO,
            pulse_ms: 300,

            // Timing
            poll_timeout_ms: 100,
            watchdog_timeout_ms: 10_000,

            status: StatusDurations::default(),
        }
    }
}

impl GateConfig {
    /// Parse a (possibly partial) JSON override on top of the defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults, overlaid with `override_json` when it parses and validates.
    /// A bad override is logged and ignored.
    pub fn resolve(override_json: Option<&str>) -> Self {
        let Some(json) = override_json else {
            log::info!("Config: built-in defaults");
            return Self::default();
        };
        match Self::from_json(json) {
            Ok(config) => {
                log::info!("Config: build-time override applied");
                config
            }
            Err(e) => {
                log::warn!("Config: override rejected ({}), using defaults", e);
                Self::default()
            }
        }
    }

    /// Reject values that would leave the controller unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.command_sequence.is_empty() {
            return Err(ConfigError::ValidationFailed("command_sequence is empty"));
        }
        if self.command_sequence.iter().any(ModemCommand::is_empty) {
            return Err(ConfigError::ValidationFailed("command_sequence contains an empty command"));
        }
        if self.pulse_ms == 0 {
            return Err(ConfigError::ValidationFailed("pulse_ms must be non-zero"));
        }
        if self.poll_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed("poll_timeout_ms must be non-zero"));
        }
        if self.longest_feed_gap_ms() >= u64::from(self.watchdog_timeout_ms) {
            return Err(ConfigError::ValidationFailed(
                "poll, status hold or pulse time exceeds watchdog_timeout_ms",
            ));
        }
        Ok(())
    }

    /// Worst-case time between two watchdog feeds in `Listening`.
    ///
    /// The loop feeds before every poll and around every status hold.  A
    /// hold may first wait for the trigger worker to release the display,
    /// and a pulse may first wait for the worker's own pulse.
    pub fn longest_feed_gap_ms(&self) -> u64 {
        let poll = u64::from(self.poll_timeout_ms);
        let hold = 2 * u64::from(self.status.longest_listening_hold_ms());
        let pulse = 2 * u64::from(self.pulse_ms);
        poll.max(hold).max(pulse)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms.into())
    }

    pub fn pulse_duration(&self) -> Duration {
        Duration::from_millis(self.pulse_ms.into())
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_ms.into())
    }

    pub fn flush_timeout(&self) -> Duration {
        Duration::from_millis(self.flush_timeout_ms.into())
    }

    pub fn boot_delay(&self) -> Duration {
        Duration::from_millis(self.boot_delay_ms.into())
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The override was not valid JSON for [`GateConfig`].
    Parse,
    /// A field failed range validation.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse => write!(f, "config override is not valid JSON"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}
