//! SmsGate Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  UartTransport   RelayGpio     StatusDisplay    LogEventSink   │
//! │  (Transport)     (OutputPin)   (StatusSink)     (EventSink)    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌──────────────────────────┐   ┌───────────────────────────┐  │
//! │  │ GateService (main task)  │   │ ButtonForwarder (APP_CPU) │  │
//! │  │ FSM · frame · auth       │   │ TriggerWorker   (PRO_CPU) │  │
//! │  └────────────┬─────────────┘   └─────────────┬─────────────┘  │
//! │               └──────── RelayActuator ────────┘                │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use esp_idf_hal::peripherals::Peripherals;
use log::{error, info};

use smsgate::adapters::log_sink::{LogDisplayBackend, LogEventSink};
use smsgate::adapters::system;
use smsgate::adapters::uart::UartTransport;
use smsgate::app::service::GateService;
use smsgate::app::trigger::{ButtonForwarder, TriggerWorker};
use smsgate::config::GateConfig;
use smsgate::drivers::button::{BUTTON_LATCH, BUTTON_POLL_MS, ButtonDriver};
use smsgate::drivers::display::StatusDisplay;
use smsgate::drivers::hw_init::{self, RelayGpio};
use smsgate::drivers::relay::RelayActuator;
use smsgate::drivers::task_pin::{self, BUTTON_TASK, TRIGGER_TASK};
use smsgate::drivers::watchdog::{FedSink, Keepalive, Watchdog};
use smsgate::events::TRIGGER_CHANNEL;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  SmsGate v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = GateConfig::resolve(option_env!("SMSGATE_CONFIG_JSON"));

    // ── 2. Relay safe state before anything else ──────────────
    hw_init::init_peripherals(config.relay_pin).map_err(|e| anyhow!("HAL init failed: {e}"))?;
    let relay = Arc::new(
        RelayActuator::new(RelayGpio::new(config.relay_pin), config.pulse_duration())
            .map_err(|e| anyhow!("relay init failed: {e}"))?,
    );
    if let Err(e) = hw_init::init_isr_service() {
        error!("ISR service init failed: {}, button disabled", e);
    }

    // ── 3. Let the modem register on the network ──────────────
    info!("Waiting {} ms for modem boot", config.boot_delay_ms);
    std::thread::sleep(config.boot_delay());

    // ── 4. Modem UART ─────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let transport = UartTransport::new(
        peripherals.uart1,
        peripherals.pins.gpio17,
        peripherals.pins.gpio16,
    )?;

    // ── 5. Status display + manual-trigger path ──────────────
    let mut display = StatusDisplay::new(LogDisplayBackend::new());
    let worker = TriggerWorker::new(
        Arc::clone(&relay),
        display.clone(),
        LogEventSink::new(),
        config.status.clone(),
    );
    let _trigger = task_pin::spawn(&TRIGGER_TASK, move || worker.run(&TRIGGER_CHANNEL))?;
    let forwarder = ButtonForwarder::new(ButtonDriver::new(&BUTTON_LATCH), &TRIGGER_CHANNEL);
    let _button = task_pin::spawn(&BUTTON_TASK, move || {
        forwarder.run(Duration::from_millis(BUTTON_POLL_MS))
    })?;

    // ── 6. Modem handshake ────────────────────────────────────
    let watchdog_timeout_ms = config.watchdog_timeout_ms;
    let mut service = GateService::new(config, transport, relay, LogEventSink::new());
    if let Err(fatal) = service.start(&mut display) {
        error!("Fatal: {}, restarting", fatal);
        system::restart();
    }

    // ── 7. SMS event loop ─────────────────────────────────────
    // Subscribed only now: the handshake holds are not bounded by the
    // watchdog timeout, every hold in Listening is.
    let watchdog = Watchdog::new(watchdog_timeout_ms);
    let mut sink = FedSink::new(display, &watchdog);

    info!("System ready. Entering event loop.");
    let ended = service.serve(&mut sink, || watchdog.feed());

    error!("Event loop ended: {}, restarting", ended);
    system::restart()
}
