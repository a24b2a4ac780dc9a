//! Manual-trigger path.
//!
//! ```text
//!   ISR ─▶ ButtonLatch ─▶ ButtonForwarder ─▶ TRIGGER_CHANNEL ─▶ TriggerWorker ─▶ relay
//!                         (button task)                        (trigger task)
//! ```
//!
//! Both halves run on their own threads, so a press is dispatched while the
//! SMS loop is mid-frame.  The worker shares the relay (and its mutex) with
//! the SMS event loop but never touches the lifecycle FSM.

use std::sync::Arc;
use std::time::Duration;

use embedded_hal::digital::OutputPin;
use log::{error, info, warn};

use crate::config::StatusDurations;
use crate::drivers::button::{ButtonDriver, ButtonEvent};
use crate::drivers::relay::{RelayActuator, RelayError};
use crate::events::{TriggerChannel, TriggerEvent, post_trigger};

use super::events::{AppEvent, StatusMessage, TriggerSource};
use super::ports::{EventSink, StatusSink};

pub struct TriggerWorker<P, S, E>
where
    P: OutputPin,
    S: StatusSink,
    E: EventSink,
{
    relay: Arc<RelayActuator<P>>,
    sink: S,
    events: E,
    durations: StatusDurations,
    handled: u32,
}

impl<P, S, E> TriggerWorker<P, S, E>
where
    P: OutputPin,
    S: StatusSink,
    E: EventSink,
{
    pub fn new(relay: Arc<RelayActuator<P>>, sink: S, events: E, durations: StatusDurations) -> Self {
        Self {
            relay,
            sink,
            events,
            durations,
            handled: 0,
        }
    }

    /// Pulse once, then show the button feedback and the listening banner.
    /// The statuses are shown even if the pulse failed.
    pub fn handle(&mut self, _event: TriggerEvent) -> Result<(), RelayError> {
        self.handled = self.handled.wrapping_add(1);

        let result = self.relay.pulse();
        match result {
            Ok(()) => {
                let pulses = self.relay.pulse_count();
                info!("TRIGGER | manual pulse #{} (pulses={})", self.handled, pulses);
                self.events.emit(&AppEvent::Pulsed {
                    source: TriggerSource::Button,
                    pulse_count: pulses,
                });
            }
            Err(e) => {
                error!("TRIGGER | relay pulse failed: {}", e);
                self.events.emit(&AppEvent::PulseFailed {
                    source: TriggerSource::Button,
                    error: e,
                });
            }
        }

        self.sink.show(&StatusMessage::button_pressed(&self.durations));
        self.sink.show(&StatusMessage::listening(&self.durations));
        result
    }

    /// Block until one event arrives on `channel`, then handle it.
    pub fn serve_one(&mut self, channel: &TriggerChannel) -> Result<(), RelayError> {
        let event = futures_lite::future::block_on(channel.receive());
        self.handle(event)
    }

    /// Serve `channel` forever.
    pub fn run(mut self, channel: &TriggerChannel) -> ! {
        info!("TRIGGER | worker ready");
        loop {
            if let Err(e) = self.serve_one(channel) {
                warn!("TRIGGER | {}", e);
            }
        }
    }

    /// Trigger events handled so far.
    pub fn handled(&self) -> u32 {
        self.handled
    }
}

/// Moves latched button presses onto the trigger channel.
pub struct ButtonForwarder<'a> {
    button: ButtonDriver<'a>,
    channel: &'a TriggerChannel,
}

impl<'a> ButtonForwarder<'a> {
    pub fn new(button: ButtonDriver<'a>, channel: &'a TriggerChannel) -> Self {
        Self { button, channel }
    }

    /// Post one trigger per press latched since the last call.
    /// Returns how many were accepted by the channel.
    pub fn forward(&mut self) -> usize {
        let mut posted = 0;
        while let Some(ButtonEvent::Click) = self.button.tick() {
            info!("BUTTON | click -> manual pulse");
            if post_trigger(self.channel) {
                posted += 1;
            }
        }
        posted
    }

    /// Forward forever, checking the latch every `period`.
    pub fn run(mut self, period: Duration) -> ! {
        info!("BUTTON | forwarder ready ({} ms)", period.as_millis());
        loop {
            self.forward();
            std::thread::sleep(period);
        }
    }
}
