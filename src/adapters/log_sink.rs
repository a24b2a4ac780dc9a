//! Log-based adapters.
//!
//! [`LogEventSink`] implements [`EventSink`] by writing structured events to
//! the ESP-IDF logger (UART0 / USB-CDC in production).  [`LogDisplayBackend`]
//! implements [`DisplayBackend`] by mirroring every drawn row to the same
//! log, which stands in for the panel on boards without one.

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::drivers::display::{DisplayBackend, DisplayError, ROWS};

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::FrameReceived { len } => {
                info!("FRAME | {} bytes", len);
            }
            AppEvent::Pulsed {
                source,
                pulse_count,
            } => {
                info!("PULSE | source={:?} total={}", source, pulse_count);
            }
            AppEvent::PulseFailed { source, error } => {
                info!("PULSE | source={:?} FAILED: {}", source, error);
            }
            AppEvent::NoMatch { lines } => {
                info!("AUTH  | no match in {} line(s)", lines);
            }
        }
    }
}

/// Text "panel" that writes each drawn row to the log on `flush`.
#[derive(Debug, Default)]
pub struct LogDisplayBackend {
    rows: [Option<String>; ROWS],
}

impl LogDisplayBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DisplayBackend for LogDisplayBackend {
    fn clear(&mut self) -> Result<(), DisplayError> {
        self.rows = Default::default();
        Ok(())
    }

    fn draw_text(&mut self, row: u8, text: &str) -> Result<(), DisplayError> {
        let slot = self
            .rows
            .get_mut(usize::from(row))
            .ok_or(DisplayError::InvalidCoordinates)?;
        *slot = Some(text.to_owned());
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        for (idx, row) in self.rows.iter().enumerate() {
            if let Some(text) = row {
                info!("OLED  | {}: {}", idx, text);
            }
        }
        Ok(())
    }
}
