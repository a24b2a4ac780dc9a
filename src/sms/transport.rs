//! Transport abstraction: the byte channel to the GSM modem.
//!
//! The UART adapter (`adapters::uart`) implements this on hardware; tests
//! drive the handshake and the event loop through scripted mocks.

use core::time::Duration;

/// Byte-oriented duplex channel with timeout reads and blocking writes.
pub trait Transport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Write `data`, returning the number of bytes the driver accepted.
    /// A count below `data.len()` is a short write, not an error.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Read up to `buf.len()` bytes, waiting at most `timeout` for the
    /// first byte.  Returns 0 when nothing arrived in time.
    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, Self::Error>;

    /// Block until queued output has been transmitted or `timeout` elapses.
    fn flush_output(&mut self, timeout: Duration) -> Result<(), Self::Error>;

    /// Drop everything received but not yet read.
    fn discard_pending_input(&mut self) -> Result<(), Self::Error>;
}
