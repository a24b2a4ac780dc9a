//! Application core: domain logic behind port traits.
//!
//! This module contains the rules of the gate: modem bring-up sequencing,
//! frame scanning, the lifecycle FSM orchestration, and the manual-trigger
//! worker.  Hardware is reached only through [`ports`], the
//! [`Transport`](crate::sms::transport::Transport) trait, and
//! `embedded-hal` pins, keeping this layer testable without peripherals.

pub mod events;
pub mod ports;
pub mod service;
pub mod trigger;
