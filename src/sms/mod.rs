//! GSM modem link: bring-up, frame parsing, and secret matching.
//!
//! ```text
//! ┌────────────┐   bytes   ┌──────────────┐  lines  ┌────────────────┐
//! │ Transport  │──────────▶│ IncomingFrame│────────▶│ Authenticator  │──▶ match?
//! │ (UART)     │◀──────────│ (codec)      │         │ (auth)         │
//! └────────────┘  AT cmds  └──────────────┘         └────────────────┘
//!       ▲
//!       └── ModemInitializer (handshake, once at boot)
//! ```

pub mod auth;
pub mod codec;
pub mod handshake;
pub mod transport;
