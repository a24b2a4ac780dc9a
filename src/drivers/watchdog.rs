//! Task Watchdog Timer (TWDT) driver.
//!
//! Resets the device if the SMS event loop stalls for longer than
//! `watchdog_timeout_ms`.  The loop feeds it before every poll, and
//! [`FedSink`] feeds it around every status hold, so a frame with many
//! lines never starves it.  `GateConfig::validate` bounds the longest gap.

use crate::app::events::StatusMessage;
use crate::app::ports::StatusSink;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

/// Anything that must hear from the loop periodically.
pub trait Keepalive {
    fn feed(&self);
}

pub struct Watchdog {
    #[cfg(target_os = "espidf")]
    subscribed: bool,
}

impl Watchdog {
    /// Initialise and subscribe the current task to the TWDT.
    #[cfg(target_os = "espidf")]
    pub fn new(timeout_ms: u32) -> Self {
        // SAFETY: TWDT calls with a fully initialised config; the null
        // handle subscribes the calling task.
        unsafe {
            let cfg = esp_task_wdt_config_t {
                timeout_ms,
                idle_core_mask: 0,
                trigger_panic: true,
            };
            let ret = esp_task_wdt_reconfigure(&cfg);
            if ret != ESP_OK {
                log::warn!("WDT | reconfigure returned {} (may already be configured)", ret);
            }

            let ret = esp_task_wdt_add(core::ptr::null_mut());
            let subscribed = ret == ESP_OK;
            if subscribed {
                info!("WDT | subscribed ({} ms timeout, panic on trigger)", timeout_ms);
            } else {
                log::warn!("WDT | failed to subscribe ({})", ret);
            }

            Self { subscribed }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(timeout_ms: u32) -> Self {
        log::info!("WDT | sim no-op ({} ms)", timeout_ms);
        Self {}
    }
}

impl Keepalive for Watchdog {
    fn feed(&self) {
        #[cfg(target_os = "espidf")]
        {
            if self.subscribed {
                // SAFETY: the calling task is subscribed.
                unsafe {
                    esp_task_wdt_reset();
                }
            }
        }
    }
}

/// Status sink that feeds `keepalive` before and after every message.
pub struct FedSink<'k, S, K: ?Sized> {
    inner: S,
    keepalive: &'k K,
}

impl<'k, S: StatusSink, K: Keepalive + ?Sized> FedSink<'k, S, K> {
    pub fn new(inner: S, keepalive: &'k K) -> Self {
        Self { inner, keepalive }
    }
}

impl<S: StatusSink, K: Keepalive + ?Sized> StatusSink for FedSink<'_, S, K> {
    fn show(&mut self, message: &StatusMessage) {
        self.keepalive.feed();
        self.inner.show(message);
        self.keepalive.feed();
    }
}
