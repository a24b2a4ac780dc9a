//! Application service: the hexagonal core.
//!
//! [`GateService`] owns the lifecycle FSM, the modem transport, the receive
//! buffer, and a shared handle to the relay.  Status text and structured
//! events leave through port traits, so the whole loop runs against mocks
//! on the host.
//!
//! ```text
//!   Transport ──▶ ┌─────────────────────────────┐ ──▶ StatusSink
//!                 │         GateService          │
//!                 │ FSM · frame · Authenticator  │ ──▶ EventSink
//!                 └──────────────┬──────────────┘
//!                                ▼
//!                       RelayActuator (shared)
//! ```

use std::sync::Arc;

use embedded_hal::digital::OutputPin;
use log::{debug, error, info, warn};

use crate::config::GateConfig;
use crate::drivers::relay::RelayActuator;
use crate::error::Error;
use crate::fsm::{Fsm, StateId};
use crate::sms::auth::Authenticator;
use crate::sms::codec::IncomingFrame;
use crate::sms::handshake::ModemInitializer;
use crate::sms::transport::Transport;

use super::events::{AppEvent, RuntimeCounters, StatusMessage, TriggerSource};
use super::ports::{EventSink, StatusSink};

/// Outcome of one frame that contained an authorised line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    /// Bytes in the frame.
    pub len: usize,
    /// Lines examined, including the matching one.
    pub lines_scanned: usize,
}

/// Lines checked before the first match (or the whole frame).
struct Scan {
    matched: bool,
    scanned: usize,
}

/// Check lines in order; stop at the first authorised one.
fn scan_frame(frame: &IncomingFrame, auth: &Authenticator, mut on_reject: impl FnMut()) -> Scan {
    let mut scanned = 0;
    for line in frame.lines() {
        scanned += 1;
        if auth.is_authorized(line) {
            return Scan {
                matched: true,
                scanned,
            };
        }
        debug!("AUTH | rejected line ({} bytes)", line.len());
        on_reject();
    }
    Scan {
        matched: false,
        scanned,
    }
}

// ───────────────────────────────────────────────────────────────
// GateService
// ───────────────────────────────────────────────────────────────

pub struct GateService<T, P, E>
where
    T: Transport,
    P: OutputPin,
    E: EventSink,
{
    config: GateConfig,
    transport: T,
    relay: Arc<RelayActuator<P>>,
    auth: Authenticator,
    fsm: Fsm,
    frame: IncomingFrame,
    counters: RuntimeCounters,
    events: E,
}

impl<T, P, E> GateService<T, P, E>
where
    T: Transport,
    P: OutputPin,
    E: EventSink,
{
    /// Construct the service in `Booting`.  Nothing is sent to the modem
    /// until [`start`](Self::start).
    pub fn new(config: GateConfig, transport: T, relay: Arc<RelayActuator<P>>, events: E) -> Self {
        let auth = Authenticator::new(&config.secret);
        Self {
            config,
            transport,
            relay,
            auth,
            fsm: Fsm::new(),
            frame: IncomingFrame::new(),
            counters: RuntimeCounters::default(),
            events,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Run the modem handshake and enter `Listening`.
    ///
    /// On a short write the service moves to `Restarting` and returns the
    /// fatal error; the failure status has already been shown.  Calling this
    /// again after the first call is a no-op.
    pub fn start(&mut self, sink: &mut impl StatusSink) -> Result<(), Error> {
        if self.fsm.current_state() != StateId::Booting {
            warn!("GateService::start called in {}", self.fsm.current_state());
            return Ok(());
        }
        self.events.emit(&AppEvent::Started(StateId::Booting));
        self.enter(StateId::Handshaking);

        let outcome = ModemInitializer::from_config(&self.config).run(&mut self.transport, sink);
        match outcome {
            Ok(()) => {
                self.enter(StateId::Listening);
                sink.show(&StatusMessage::setup_complete(&self.config.status));
                info!("GateService listening (poll {} ms)", self.config.poll_timeout_ms);
                Ok(())
            }
            Err(failed) => {
                error!("Modem bring-up failed: {}", failed);
                self.enter(StateId::Restarting);
                Err(failed.into())
            }
        }
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// One event loop iteration: poll, parse, authorise, pulse.
    ///
    /// - not in `Listening`: `Err(NotListening)`, the transport is not read
    /// - no bytes within the poll window: `Err(TransportReadTimeout)`,
    ///   nothing else happens
    /// - read error: `Err(TransportReadFailed)`, treated like a timeout
    /// - no line matched: `Err(AuthMismatch)`
    /// - relay write failed: `Err(Relay(_))`
    pub fn poll_once(&mut self, sink: &mut impl StatusSink) -> Result<FrameReport, Error> {
        let state = self.fsm.current_state();
        if state != StateId::Listening {
            return Err(Error::NotListening(state));
        }
        self.fsm.tick();

        let len = match self.frame.fill_from(&mut self.transport, self.config.poll_timeout()) {
            Ok(0) => return Err(Error::TransportReadTimeout),
            Ok(n) => n,
            Err(e) => {
                warn!("UART | read failed: {:?}", e);
                return Err(Error::TransportReadFailed);
            }
        };

        self.counters.frames_received = self.counters.frames_received.wrapping_add(1);
        info!("SMS | frame received ({} bytes)", len);
        self.events.emit(&AppEvent::FrameReceived { len });
        sink.show(&StatusMessage::frame_received(len, &self.config.status));

        let durations = &self.config.status;
        let report_rejected = self.config.report_rejected_lines;
        let scan = scan_frame(&self.frame, &self.auth, || {
            if report_rejected {
                sink.show(&StatusMessage::rejected_line(durations));
            }
        });

        let rejected = if scan.matched { scan.scanned - 1 } else { scan.scanned };
        self.counters.lines_rejected = self.counters.lines_rejected.wrapping_add(rejected as u32);

        let result = if scan.matched {
            self.fire()
                .map(|()| FrameReport {
                    len,
                    lines_scanned: scan.scanned,
                })
        } else {
            self.events.emit(&AppEvent::NoMatch {
                lines: scan.scanned,
            });
            Err(Error::AuthMismatch)
        };

        sink.show(&StatusMessage::listening(&self.config.status));
        result
    }

    /// [`start`](Self::start), then [`serve`](Self::serve).
    ///
    /// Returns the error that ended the session: the handshake failure, or
    /// `NotListening` if the service left `Listening`.
    pub fn run(&mut self, sink: &mut impl StatusSink, idle: impl FnMut()) -> Error {
        if let Err(e) = self.start(sink) {
            return e;
        }
        self.serve(sink, idle)
    }

    /// Poll while `Listening`, calling `idle` before every poll.
    pub fn serve(&mut self, sink: &mut impl StatusSink, mut idle: impl FnMut()) -> Error {
        loop {
            idle();
            match self.poll_once(sink) {
                Ok(report) => debug!("SMS | authorised after {} line(s)", report.lines_scanned),
                Err(Error::TransportReadTimeout) => {}
                Err(e @ Error::NotListening(_)) => return e,
                Err(e) => debug!("SMS | {}", e),
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn counters(&self) -> RuntimeCounters {
        RuntimeCounters {
            pulses_completed: self.relay.pulse_count(),
            ..self.counters
        }
    }

    /// Poll iterations since entering the current state.
    pub fn ticks_in_state(&self) -> u64 {
        self.fsm.ticks_in_current_state()
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    // ── Internal ──────────────────────────────────────────────

    fn fire(&mut self) -> Result<(), Error> {
        match self.relay.pulse() {
            Ok(()) => {
                self.counters.frames_authorized = self.counters.frames_authorized.wrapping_add(1);
                let c = self.counters();
                info!(
                    "AUTH | relay pulsed | frames={} authorised={} rejected_lines={} pulses={}",
                    c.frames_received, c.frames_authorized, c.lines_rejected, c.pulses_completed
                );
                self.events.emit(&AppEvent::Pulsed {
                    source: TriggerSource::Sms,
                    pulse_count: c.pulses_completed,
                });
                Ok(())
            }
            Err(e) => {
                error!("AUTH | relay pulse failed: {}", e);
                self.events.emit(&AppEvent::PulseFailed {
                    source: TriggerSource::Sms,
                    error: e,
                });
                Err(e.into())
            }
        }
    }

    fn enter(&mut self, next: StateId) {
        let from = self.fsm.current_state();
        match self.fsm.transition(next) {
            Ok(()) => self.events.emit(&AppEvent::StateChanged { from, to: next }),
            Err(e) => error!("{}", e),
        }
    }
}
