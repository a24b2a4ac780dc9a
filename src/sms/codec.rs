//! Incoming frame buffer and CR/LF line splitter.
//!
//! With `AT+CNMI=2,2,...` the modem pushes each new SMS straight to the
//! UART as an unsolicited `+CMT:` header line followed by the message body:
//!
//! ```text
//! \r\n+CMT: "+15551234567","","24/05/01,10:00:00+08"\r\nopen 1960s\r\n
//! ```
//!
//! One transport read is treated as one frame.  The frame is split on any
//! run of CR and/or LF; empty segments are skipped, so the example above
//! yields exactly two lines.  Bytes are never validated or decoded: a line
//! is a raw byte view into the frame buffer.

use core::iter::FusedIterator;
use core::time::Duration;

use super::transport::Transport;

/// Usable bytes per frame (one byte of the 512-byte receive area is kept
/// spare, matching the modem UART driver's buffer sizing).
pub const FRAME_CAPACITY: usize = 511;

// ---------------------------------------------------------------------------
// IncomingFrame
// ---------------------------------------------------------------------------

/// Receive buffer for one transport read.  Owned by the event loop and
/// overwritten on every iteration.
pub struct IncomingFrame {
    buf: [u8; FRAME_CAPACITY],
    len: usize,
}

impl Default for IncomingFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl IncomingFrame {
    pub fn new() -> Self {
        Self {
            buf: [0; FRAME_CAPACITY],
            len: 0,
        }
    }

    /// Replace the frame contents with one transport read.
    /// Returns the number of valid bytes (0 on timeout).  On error the
    /// frame is left empty.
    pub fn fill_from<T: Transport>(
        &mut self,
        transport: &mut T,
        timeout: Duration,
    ) -> Result<usize, T::Error> {
        self.len = 0;
        let n = transport.read(&mut self.buf, timeout)?;
        self.len = n.min(FRAME_CAPACITY);
        Ok(self.len)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn lines(&self) -> Lines<'_> {
        split_lines(&self.buf, self.len)
    }
}

// ---------------------------------------------------------------------------
// Line splitting
// ---------------------------------------------------------------------------

/// A non-empty, terminator-free byte run borrowed from a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a>(&'a [u8]);

impl<'a> Line<'a> {
    pub fn as_bytes(&self) -> &'a [u8] {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Lazy iterator over the lines of a frame.  See [`split_lines`].
#[derive(Debug, Clone)]
pub struct Lines<'a> {
    rest: &'a [u8],
}

/// Split the first `valid_len` bytes of `buf` into lines.
///
/// `valid_len` is clamped to `buf.len()`; nothing past it is inspected.
pub fn split_lines(buf: &[u8], valid_len: usize) -> Lines<'_> {
    Lines {
        rest: &buf[..valid_len.min(buf.len())],
    }
}

const fn is_terminator(b: u8) -> bool {
    b == b'\r' || b == b'\n'
}

impl<'a> Iterator for Lines<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.rest.iter().position(|&b| !is_terminator(b))?;
        let body = &self.rest[start..];
        let end = body.iter().position(|&b| is_terminator(b)).unwrap_or(body.len());
        self.rest = &body[end..];
        Some(Line(&body[..end]))
    }
}

impl FusedIterator for Lines<'_> {}
