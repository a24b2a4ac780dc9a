//! GPIO / peripheral pin assignments for the SmsGate controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Relay
// ---------------------------------------------------------------------------

/// Digital output: relay coil driver (active HIGH).
pub const RELAY_GPIO: i32 = 18;

// ---------------------------------------------------------------------------
// Manual override button (active HIGH, internal pull-down)
// ---------------------------------------------------------------------------

pub const BUTTON_GPIO: i32 = 25;

// ---------------------------------------------------------------------------
// GSM modem UART
// ---------------------------------------------------------------------------

/// ESP-IDF UART peripheral number used for the modem.
pub const MODEM_UART_PORT: i32 = 1;
pub const MODEM_UART_TX_GPIO: i32 = 17;
pub const MODEM_UART_RX_GPIO: i32 = 16;
/// Fixed 115200-8N1 profile, no flow control.
pub const MODEM_UART_BAUD: u32 = 115_200;
/// Driver ring-buffer size (each direction).
pub const MODEM_UART_RING_BYTES: usize = 1024;
