//! Integration tests for `GateService` against mock transport, pin and sinks.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use smsgate::app::events::{AppEvent, StatusKind, TriggerSource};
use smsgate::app::service::GateService;
use smsgate::config::{GateConfig, StatusDurations};
use smsgate::drivers::display::StatusDisplay;
use smsgate::drivers::relay::RelayActuator;
use smsgate::drivers::watchdog::{FedSink, Keepalive};
use smsgate::adapters::log_sink::LogDisplayBackend;
use smsgate::error::Error;
use smsgate::fsm::StateId;

use crate::mock_hw::{
    MockPin, MockTransport, RecordingEvents, RecordingSink, WriteScript, fast_config,
};

struct Rig {
    service: GateService<MockTransport, MockPin, RecordingEvents>,
    transport: MockTransport,
    pin: MockPin,
    sink: RecordingSink,
    events: RecordingEvents,
}

fn rig_with(config: GateConfig, reads: &[&[u8]]) -> Rig {
    let transport = MockTransport::with_reads(reads);
    let pin = MockPin::new();
    let relay = Arc::new(RelayActuator::new(pin.clone(), config.pulse_duration()).unwrap());
    let events = RecordingEvents::default();
    let service = GateService::new(config, transport.clone(), relay, events.clone());
    Rig {
        service,
        transport,
        pin,
        sink: RecordingSink::default(),
        events,
    }
}

fn rig(reads: &[&[u8]]) -> Rig {
    rig_with(fast_config(), reads)
}

fn started(reads: &[&[u8]]) -> Rig {
    let mut r = rig(reads);
    r.service.start(&mut r.sink).unwrap();
    r.sink.clear();
    r
}

// ── Handshake ─────────────────────────────────────────────────

#[test]
fn handshake_sends_all_commands_in_order() {
    let mut r = rig(&[]);
    r.service.start(&mut r.sink).unwrap();

    assert_eq!(
        r.transport.written(),
        vec![
            b"ATE0\r\n".to_vec(),
            b"AT+CMGF=1\r\n".to_vec(),
            b"AT+CNMI=2,2,0,0,0\r\n".to_vec(),
        ]
    );
    let log = r.transport.log.lock().unwrap();
    assert!(log.flushed);
    assert!(log.discarded);
    drop(log);

    assert_eq!(r.service.state(), StateId::Listening);
    assert_eq!(
        r.sink.kinds(),
        vec![
            StatusKind::HandshakeStep,
            StatusKind::HandshakeStep,
            StatusKind::HandshakeStep,
            StatusKind::SetupComplete,
        ]
    );
}

#[test]
fn handshake_emits_lifecycle_events() {
    let mut r = rig(&[]);
    r.service.start(&mut r.sink).unwrap();
    assert_eq!(
        r.events.all(),
        vec![
            AppEvent::Started(StateId::Booting),
            AppEvent::StateChanged {
                from: StateId::Booting,
                to: StateId::Handshaking
            },
            AppEvent::StateChanged {
                from: StateId::Handshaking,
                to: StateId::Listening
            },
        ]
    );
}

#[test]
fn short_write_is_fatal_and_stops_sequence() {
    let mut r = rig(&[]);
    r.transport
        .script_writes(&[WriteScript::Full, WriteScript::Short(4)]);

    let err = r.service.start(&mut r.sink).unwrap_err();
    assert_eq!(
        err,
        Error::TransportWriteShortfall {
            step: 2,
            expected: 11,
            written: Some(4)
        }
    );
    assert!(err.is_fatal());
    assert_eq!(r.service.state(), StateId::Restarting);
    assert_eq!(r.transport.written().len(), 2);
    assert!(!r.transport.log.lock().unwrap().flushed);
    assert_eq!(r.sink.kinds().last(), Some(&StatusKind::HandshakeError));
    assert_eq!(r.sink.texts().last().map(String::as_str), Some("AT ERR"));
}

#[test]
fn failed_write_reports_no_count() {
    let mut r = rig(&[]);
    r.transport.script_writes(&[WriteScript::Fail]);
    let err = r.service.start(&mut r.sink).unwrap_err();
    assert_eq!(
        err,
        Error::TransportWriteShortfall {
            step: 1,
            expected: 6,
            written: None
        }
    );
    assert!(r.transport.written().is_empty());
}

#[test]
fn run_returns_fatal_error_without_polling() {
    let mut r = rig(&[b"open 1960s"]);
    r.transport.script_writes(&[WriteScript::Short(0)]);
    let mut idle_calls = 0;
    let err = r.service.run(&mut r.sink, || idle_calls += 1);
    assert!(err.is_fatal());
    assert_eq!(idle_calls, 0);
    assert_eq!(r.transport.read_calls(), 0);
    assert_eq!(r.pin.history(), vec![false]);
}

#[test]
fn poll_after_failed_handshake_never_pulses() {
    let mut r = rig(&[b"open 1960s\r\n"]);
    r.transport.script_writes(&[WriteScript::Fail]);
    assert!(r.service.start(&mut r.sink).is_err());

    assert_eq!(
        r.service.poll_once(&mut r.sink),
        Err(Error::NotListening(StateId::Restarting))
    );
    assert_eq!(r.transport.read_calls(), 0);
    assert_eq!(r.pin.history(), vec![false]);
}

// ── Listening ─────────────────────────────────────────────────

#[test]
fn idle_poll_does_nothing_and_uses_poll_timeout() {
    let mut r = started(&[]);
    for _ in 0..5 {
        assert_eq!(
            r.service.poll_once(&mut r.sink),
            Err(Error::TransportReadTimeout)
        );
    }
    assert!(r.sink.kinds().is_empty());
    assert_eq!(r.pin.history(), vec![false]);
    let log = r.transport.log.lock().unwrap();
    assert_eq!(log.read_timeouts.len(), 5);
    assert!(log.read_timeouts.iter().all(|t| *t == Duration::from_millis(100)));
}

#[test]
fn authorised_body_line_pulses_once() {
    let frame = b"\r\n+CMT: \"+15551234567\",\"\",\"24/05/01,10:00:00+08\"\r\nopen 1960s\r\n";
    let mut r = started(&[frame]);

    let report = r.service.poll_once(&mut r.sink).unwrap();
    assert_eq!(report.len, frame.len());
    assert_eq!(report.lines_scanned, 2);
    assert_eq!(r.pin.history(), vec![false, true, false]);
    assert!(!r.pin.is_high());
    assert_eq!(
        r.sink.kinds(),
        vec![
            StatusKind::FrameReceived,
            StatusKind::LineRejected,
            StatusKind::Listening,
        ]
    );
    assert!(r.events.all().contains(&AppEvent::Pulsed {
        source: TriggerSource::Sms,
        pulse_count: 1
    }));
}

#[test]
fn first_match_wins() {
    let mut r = started(&[b"noise\r\ncontains-1960s-token\r\nalso-matches 1960s"]);
    let report = r.service.poll_once(&mut r.sink).unwrap();
    assert_eq!(report.lines_scanned, 2);
    assert_eq!(r.pin.pulses().len(), 1);
    assert_eq!(r.service.counters().lines_rejected, 1);
}

#[test]
fn pulse_holds_for_configured_width() {
    let config = GateConfig {
        pulse_ms: 30,
        ..fast_config()
    };
    let mut r = rig_with(config, &[b"1960s"]);
    r.service.start(&mut r.sink).unwrap();
    r.service.poll_once(&mut r.sink).unwrap();

    let pulses = r.pin.pulses();
    assert_eq!(pulses.len(), 1);
    let (rise, fall) = pulses[0];
    assert!(fall.duration_since(rise) >= Duration::from_millis(30));
}

#[test]
fn mismatch_is_case_sensitive() {
    let mut r = started(&[b"OPEN 1960S\r\n"]);
    assert_eq!(r.service.poll_once(&mut r.sink), Err(Error::AuthMismatch));
    assert_eq!(r.pin.history(), vec![false]);
    assert_eq!(
        r.sink.kinds(),
        vec![
            StatusKind::FrameReceived,
            StatusKind::LineRejected,
            StatusKind::Listening,
        ]
    );
    assert_eq!(r.events.all().last(), Some(&AppEvent::NoMatch { lines: 1 }));
}

#[test]
fn rejected_line_status_can_be_disabled() {
    let config = GateConfig {
        report_rejected_lines: false,
        ..fast_config()
    };
    let mut r = rig_with(config, &[b"a\r\nb\r\nc\r\n"]);
    r.service.start(&mut r.sink).unwrap();
    r.sink.clear();

    assert_eq!(r.service.poll_once(&mut r.sink), Err(Error::AuthMismatch));
    assert_eq!(
        r.sink.kinds(),
        vec![StatusKind::FrameReceived, StatusKind::Listening]
    );
    assert_eq!(r.service.counters().lines_rejected, 3);
}

#[test]
fn terminator_only_frame_scans_no_lines() {
    let mut r = started(&[b"\r\n\r\n"]);
    assert_eq!(r.service.poll_once(&mut r.sink), Err(Error::AuthMismatch));
    assert_eq!(r.events.all().last(), Some(&AppEvent::NoMatch { lines: 0 }));
    assert_eq!(r.service.counters().frames_received, 1);
}

#[test]
fn read_error_is_recoverable() {
    let mut r = started(&[b"1960s"]);
    r.transport.log.lock().unwrap().fail_reads = 1;

    let err = r.service.poll_once(&mut r.sink).unwrap_err();
    assert_eq!(err, Error::TransportReadFailed);
    assert!(!err.is_fatal());
    assert!(r.sink.kinds().is_empty());

    assert!(r.service.poll_once(&mut r.sink).is_ok());
    assert_eq!(r.pin.pulses().len(), 1);
}

#[test]
fn secret_past_frame_capacity_is_ignored() {
    let mut frame = vec![b'x'; 600];
    frame[550..555].copy_from_slice(b"1960s");
    let mut r = started(&[frame.as_slice()]);

    assert_eq!(r.service.poll_once(&mut r.sink), Err(Error::AuthMismatch));
    assert_eq!(
        r.events.all().iter().find(|e| matches!(e, AppEvent::FrameReceived { .. })),
        Some(&AppEvent::FrameReceived { len: 511 })
    );
}

#[test]
fn counters_accumulate_across_frames() {
    let mut r = started(&[b"1960s", b"nope", b"again 1960s", b"\r\n"]);
    for _ in 0..6 {
        let _ = r.service.poll_once(&mut r.sink);
    }
    let c = r.service.counters();
    assert_eq!(c.frames_received, 4);
    assert_eq!(c.frames_authorized, 2);
    assert_eq!(c.pulses_completed, 2);
    assert_eq!(c.lines_rejected, 1);
    assert_eq!(r.service.state(), StateId::Listening);
}

#[test]
fn custom_secret_from_json_override() {
    let config = GateConfig::from_json(r#"{ "secret": "let-me-in" }"#).unwrap();
    let config = GateConfig {
        status: fast_config().status,
        settle_ms: 0,
        pulse_ms: 1,
        ..config
    };
    let mut r = rig_with(config, &[b"1960s", b"please let-me-in"]);
    r.service.start(&mut r.sink).unwrap();

    assert_eq!(r.service.poll_once(&mut r.sink), Err(Error::AuthMismatch));
    assert!(r.service.poll_once(&mut r.sink).is_ok());
}

// ── Watchdog ──────────────────────────────────────────────────

#[derive(Default)]
struct FeedLog(Mutex<Vec<Instant>>);

impl Keepalive for FeedLog {
    fn feed(&self) {
        self.0.lock().unwrap().push(Instant::now());
    }
}

#[test]
fn long_frame_keeps_feeding_between_holds() {
    let hold = 40;
    let config = GateConfig {
        status: StatusDurations {
            frame_received_ms: hold,
            rejected_line_ms: hold,
            listening_ms: 5,
            ..fast_config().status
        },
        ..fast_config()
    };
    let mut frame = b"\r\n+CMT: \"+15551234567\",\"\",\"24/05/01,10:00:00+08\"\r\n".to_vec();
    for i in 1..=9 {
        frame.extend_from_slice(format!("l{i}\r\n").as_bytes());
    }
    let mut r = rig_with(config, &[frame.as_slice()]);
    r.service.start(&mut r.sink).unwrap();

    let feeds = FeedLog::default();
    let mut sink = FedSink::new(StatusDisplay::new(LogDisplayBackend::new()), &feeds);
    feeds.feed();
    let began = Instant::now();
    assert_eq!(r.service.poll_once(&mut sink), Err(Error::AuthMismatch));
    let elapsed = began.elapsed();
    feeds.feed();

    // frame banner + 10 rejected lines
    assert!(elapsed >= Duration::from_millis(11 * hold as u64));
    let stamps = feeds.0.lock().unwrap().clone();
    let widest = stamps
        .windows(2)
        .map(|w| w[1].duration_since(w[0]))
        .max()
        .unwrap();
    assert!(
        widest < Duration::from_millis(4 * hold as u64),
        "gap {widest:?} while whole frame took {elapsed:?}"
    );
}
