//! Character-grid status display.
//!
//! [`StatusDisplay`] implements the [`StatusSink`] port on top of any
//! [`DisplayBackend`].  Text is laid out on a fixed 21×8 grid (a 128×64
//! panel with a 6×8 font):
//!
//! - `\n` starts a new row; a single trailing `\n` does not add one
//! - rows longer than [`COLUMNS`] characters continue on the next row
//! - rows past [`ROWS`] are dropped
//!
//! The display is shared by the event loop and the trigger worker.  A
//! message keeps the backend locked for its whole hold, so two messages
//! never interleave on screen.

use core::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, warn};

use crate::app::events::StatusMessage;
use crate::app::ports::StatusSink;

pub const COLUMNS: usize = 21;
pub const ROWS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayError {
    /// Communication error with the panel.
    Communication,
    /// Row or column outside the grid.
    InvalidCoordinates,
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Communication => write!(f, "display communication error"),
            Self::InvalidCoordinates => write!(f, "coordinates outside display grid"),
        }
    }
}

/// Hardware-agnostic text display.
pub trait DisplayBackend {
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Draw `text` starting at `row`, column 0.
    fn draw_text(&mut self, row: u8, text: &str) -> Result<(), DisplayError>;

    /// Push buffered content to the panel.
    fn flush(&mut self) -> Result<(), DisplayError>;
}

/// Lay `text` out on the grid.  Returned rows borrow from `text`.
pub fn wrap_rows(text: &str) -> heapless::Vec<&str, ROWS> {
    let mut rows = heapless::Vec::new();
    if text.is_empty() {
        return rows;
    }
    let body = text.strip_suffix('\n').unwrap_or(text);

    for segment in body.split('\n') {
        let mut rest = segment;
        loop {
            let cut = rest
                .char_indices()
                .nth(COLUMNS)
                .map_or(rest.len(), |(idx, _)| idx);
            let (row, tail) = rest.split_at(cut);
            if rows.push(row).is_err() {
                return rows;
            }
            if tail.is_empty() {
                break;
            }
            rest = tail;
        }
    }
    rows
}

/// [`StatusSink`] backed by a [`DisplayBackend`].  Clones share the panel.
pub struct StatusDisplay<B> {
    backend: Arc<Mutex<B>>,
}

impl<B> Clone for StatusDisplay<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: DisplayBackend> StatusDisplay<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend: Arc::new(Mutex::new(backend)),
        }
    }

    fn render(backend: &mut B, text: &str) -> Result<(), DisplayError> {
        backend.clear()?;
        for (row, line) in wrap_rows(text).iter().enumerate() {
            backend.draw_text(row as u8, line)?;
        }
        backend.flush()
    }

    fn blank(backend: &mut B) -> Result<(), DisplayError> {
        backend.clear()?;
        backend.flush()
    }
}

impl<B: DisplayBackend> StatusSink for StatusDisplay<B> {
    fn show(&mut self, message: &StatusMessage) {
        let mut backend = self.backend.lock().unwrap_or_else(PoisonError::into_inner);

        debug!(
            "DISPLAY | {:?} for {} ms{}",
            message.kind,
            message.duration.as_millis(),
            if message.persist { " (persist)" } else { "" }
        );
        if let Err(e) = Self::render(&mut backend, &message.text) {
            warn!("DISPLAY | render failed: {}", e);
        }

        std::thread::sleep(message.duration);

        if !message.persist {
            if let Err(e) = Self::blank(&mut backend) {
                warn!("DISPLAY | clear failed: {}", e);
            }
        }
    }
}
