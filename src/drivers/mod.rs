//! Actuator drivers, hardware initialisation, and peripheral helpers.

pub mod button;
pub mod display;
pub mod hw_init;
pub mod relay;
pub mod task_pin;
pub mod watchdog;
