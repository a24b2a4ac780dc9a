//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements      | Connects to                  |
//! |------------|-----------------|------------------------------|
//! | `log_sink` | EventSink       | Serial log output            |
//! |            | DisplayBackend  | Serial log (panel mirror)    |
//! | `uart`     | Transport       | ESP-IDF UART driver (modem)  |
//! | `system`   | (none)          | `esp_restart`                |

pub mod log_sink;
pub mod system;
#[cfg(target_os = "espidf")]
pub mod uart;
