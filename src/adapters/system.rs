//! Platform restart.

/// Reboot the device.  Used after a fatal modem bring-up failure.
#[cfg(target_os = "espidf")]
pub fn restart() -> ! {
    log::warn!("SYSTEM | restarting");
    esp_idf_hal::reset::restart()
}

/// Simulation fallback: end the process with a non-zero status.
#[cfg(not(target_os = "espidf"))]
pub fn restart() -> ! {
    log::warn!("SYSTEM(sim) | restart requested, exiting");
    std::process::exit(1)
}
