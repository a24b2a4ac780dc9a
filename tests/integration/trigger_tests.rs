//! Manual trigger path: button latch → channel → worker → relay.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use smsgate::app::events::{AppEvent, StatusKind, TriggerSource};
use smsgate::app::service::GateService;
use smsgate::adapters::log_sink::LogDisplayBackend;
use smsgate::app::trigger::{ButtonForwarder, TriggerWorker};
use smsgate::config::{GateConfig, StatusDurations};
use smsgate::drivers::button::{BUTTON_POLL_MS, ButtonDriver, ButtonEvent, ButtonLatch};
use smsgate::drivers::display::StatusDisplay;
use smsgate::drivers::relay::RelayActuator;
use smsgate::events::{TriggerChannel, TriggerEvent, post_trigger};
use smsgate::error::Error;
use smsgate::fsm::StateId;

use crate::mock_hw::{MockPin, MockTransport, RecordingEvents, RecordingSink, fast_config};

#[test]
fn click_reaches_worker_and_pulses() {
    static CHANNEL: TriggerChannel = TriggerChannel::new();
    static LATCH: ButtonLatch = ButtonLatch::new();

    let pin = MockPin::new();
    let relay = Arc::new(RelayActuator::new(pin.clone(), Duration::from_millis(5)).unwrap());
    let sink = RecordingSink::default();
    let events = RecordingEvents::default();
    let mut worker = TriggerWorker::new(
        Arc::clone(&relay),
        sink.clone(),
        events.clone(),
        fast_config().status,
    );

    let mut button = ButtonDriver::new(&LATCH);
    assert!(LATCH.on_edge(1_000));
    assert!(!LATCH.on_edge(1_020));
    assert_eq!(button.tick(), Some(ButtonEvent::Click));
    assert_eq!(button.tick(), None);
    assert!(post_trigger(&CHANNEL));

    let served = thread::spawn(move || {
        worker.serve_one(&CHANNEL).unwrap();
        worker.handled()
    })
    .join()
    .unwrap();

    assert_eq!(served, 1);
    assert_eq!(pin.pulses().len(), 1);
    assert_eq!(
        sink.kinds(),
        vec![StatusKind::ButtonPressed, StatusKind::Listening]
    );
    assert_eq!(
        events.all(),
        vec![AppEvent::Pulsed {
            source: TriggerSource::Button,
            pulse_count: 1
        }]
    );
}

#[test]
fn worker_blocks_until_event_posted() {
    static CHANNEL: TriggerChannel = TriggerChannel::new();

    let pin = MockPin::new();
    let relay = Arc::new(RelayActuator::new(pin.clone(), Duration::from_millis(1)).unwrap());
    let mut worker = TriggerWorker::new(
        relay,
        RecordingSink::default(),
        RecordingEvents::default(),
        fast_config().status,
    );

    let handle = thread::spawn(move || worker.serve_one(&CHANNEL));
    thread::sleep(Duration::from_millis(20));
    assert!(pin.pulses().is_empty());

    assert!(post_trigger(&CHANNEL));
    handle.join().unwrap().unwrap();
    assert_eq!(pin.pulses().len(), 1);
}

#[test]
fn manual_and_sms_pulses_are_serialised() {
    static CHANNEL: TriggerChannel = TriggerChannel::new();

    let config = fast_config();
    let hold = Duration::from_millis(30);
    let pin = MockPin::new();
    let relay = Arc::new(RelayActuator::new(pin.clone(), hold).unwrap());

    let mut worker = TriggerWorker::new(
        Arc::clone(&relay),
        RecordingSink::default(),
        RecordingEvents::default(),
        config.status.clone(),
    );
    let transport = MockTransport::with_reads(&[b"open 1960s\r\n"]);
    let mut service = GateService::new(
        config,
        transport,
        Arc::clone(&relay),
        RecordingEvents::default(),
    );
    let mut sink = RecordingSink::default();
    service.start(&mut sink).unwrap();

    assert!(post_trigger(&CHANNEL));
    thread::scope(|s| {
        s.spawn(|| worker.serve_one(&CHANNEL).unwrap());
        s.spawn(|| service.poll_once(&mut sink).unwrap());
    });

    assert_eq!(relay.pulse_count(), 2);
    let pulses = pin.pulses();
    assert_eq!(pulses.len(), 2);
    assert!(pulses[1].0 >= pulses[0].1);
    for (rise, fall) in pulses {
        assert!(fall.duration_since(rise) >= hold);
    }
    // the worker never touches the lifecycle
    assert_eq!(service.state(), StateId::Listening);
}

#[test]
fn full_channel_drops_extra_clicks() {
    let channel = TriggerChannel::new();
    let mut accepted = 0;
    for _ in 0..10 {
        if post_trigger(&channel) {
            accepted += 1;
        }
    }
    assert_eq!(accepted, smsgate::events::TRIGGER_DEPTH);
    assert_eq!(channel.try_receive().ok(), Some(TriggerEvent));
}

#[test]
fn press_during_frame_pulses_before_frame_finishes() {
    static CHANNEL: TriggerChannel = TriggerChannel::new();
    static LATCH: ButtonLatch = ButtonLatch::new();

    let forwarder = ButtonForwarder::new(ButtonDriver::new(&LATCH), &CHANNEL);
    thread::spawn(move || {
        forwarder.run(Duration::from_millis(BUTTON_POLL_MS));
    });

    let config = GateConfig {
        status: StatusDurations {
            frame_received_ms: 400,
            ..fast_config().status
        },
        ..fast_config()
    };
    let pin = MockPin::new();
    let relay = Arc::new(RelayActuator::new(pin.clone(), config.pulse_duration()).unwrap());

    let mut worker = TriggerWorker::new(
        Arc::clone(&relay),
        RecordingSink::default(),
        RecordingEvents::default(),
        config.status.clone(),
    );
    let worker = thread::spawn(move || worker.serve_one(&CHANNEL));

    let mut service = GateService::new(
        config,
        MockTransport::with_reads(&[b"noise only\r\n"]),
        Arc::clone(&relay),
        RecordingEvents::default(),
    );
    let mut display = StatusDisplay::new(LogDisplayBackend::new());
    service.start(&mut display).unwrap();

    let frame = thread::spawn(move || {
        let result = service.poll_once(&mut display);
        (result, Instant::now())
    });

    thread::sleep(Duration::from_millis(50));
    assert!(LATCH.on_edge(1_000));

    worker.join().unwrap().unwrap();
    let (result, frame_done) = frame.join().unwrap();
    assert_eq!(result, Err(Error::AuthMismatch));

    let pulses = pin.pulses();
    assert_eq!(pulses.len(), 1);
    // manual pulse completed while the SMS loop was still holding a status
    assert!(pulses[0].1 < frame_done);
}
