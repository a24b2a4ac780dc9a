//! Core-pinned task specs for the firmware's helper threads.
//!
//! The SMS loop stays on the main task (PRO_CPU).  The trigger worker shares
//! that core at a lower priority; the button forwarder sits alone on
//! APP_CPU so a press is picked up while the loop is mid-frame.
//!
//! On ESP-IDF, `esp_pthread_set_cfg()` configures the *next*
//! `pthread_create()` from the calling thread, so [`spawn`] must not be
//! interleaved with other thread creation on the same thread.

/// CPU core identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Core {
    /// Core 0 (PRO_CPU): main task and trigger worker.
    Pro = 0,
    /// Core 1 (APP_CPU): button forwarder.
    App = 1,
}

/// Placement, priority and stack of one helper thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSpec {
    /// Null-terminated; ESP-IDF keeps the pointer.
    pub name: &'static str,
    pub core: Core,
    pub priority: u8,
    pub stack_kb: usize,
}

impl TaskSpec {
    pub fn label(&self) -> &'static str {
        self.name.trim_end_matches('\0')
    }
}

/// Drains `TRIGGER_CHANNEL` and pulses the relay.
pub const TRIGGER_TASK: TaskSpec = TaskSpec {
    name: "trigger\0",
    core: Core::Pro,
    priority: 5,
    stack_kb: 8,
};

/// Polls the button latch; above the worker so clicks are never queued late.
pub const BUTTON_TASK: TaskSpec = TaskSpec {
    name: "button\0",
    core: Core::App,
    priority: 6,
    stack_kb: 4,
};

/// Spawn `f` as described by `spec`.  A rejected pthread config only
/// loses the pinning; the thread still starts.
#[cfg(target_os = "espidf")]
pub fn spawn(
    spec: &TaskSpec,
    f: impl FnOnce() + Send + 'static,
) -> std::io::Result<std::thread::JoinHandle<()>> {
    // SAFETY: cfg starts from the IDF default; `spec.name` is a 'static
    // null-terminated string that outlives the thread.
    let ret = unsafe {
        let mut cfg = esp_idf_sys::esp_create_default_pthread_config();
        cfg.pin_to_core = spec.core as i32;
        cfg.prio = spec.priority as i32;
        cfg.stack_size = (spec.stack_kb * 1024) as i32;
        cfg.thread_name = spec.name.as_ptr() as *const _;
        esp_idf_sys::esp_pthread_set_cfg(&cfg)
    };
    if ret != esp_idf_sys::ESP_OK {
        log::warn!("TASK | '{}' pthread cfg rejected ({}), unpinned", spec.label(), ret);
    }

    log::info!(
        "TASK | '{}' on {:?} pri={} stack={}KB",
        spec.label(),
        spec.core,
        spec.priority,
        spec.stack_kb
    );
    std::thread::Builder::new().name(spec.label().into()).spawn(f)
}

/// Host build: no pinning or priority, stack size is honoured.
#[cfg(not(target_os = "espidf"))]
pub fn spawn(
    spec: &TaskSpec,
    f: impl FnOnce() + Send + 'static,
) -> std::io::Result<std::thread::JoinHandle<()>> {
    log::info!("TASK | '{}' (sim, stack={}KB)", spec.label(), spec.stack_kb);
    std::thread::Builder::new()
        .name(spec.label().into())
        .stack_size(spec.stack_kb * 1024)
        .spawn(f)
}
