//! Task watchdog for the control loop.
//!
//! The main task subscribes to the ESP-IDF TWDT with a 2 s period and a
//! panic (reset) on expiry. No single wait in the firmware comes close:
//! the loop sleeps one 50 ms tick, a conversion poll waits 10 ms, and a
//! flash code runs in 100 ms steps. Each of those feeds through
//! [`WatchdogPort`], so only a hung bus or a wedged loop trips it.
//!
//! Host builds get an inert handle.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::{
    esp_task_wdt_add, esp_task_wdt_config_t, esp_task_wdt_reconfigure, esp_task_wdt_reset,
    ESP_OK,
};
#[cfg(target_os = "espidf")]
use log::{info, warn};

use crate::app::ports::WatchdogPort;

/// Watchdog period.
pub const TIMEOUT_MS: u32 = 2_000;

/// Handle to the task watchdog. `Copy`: the sensor driver and the flash
/// player each hold one.
#[derive(Debug, Clone, Copy)]
pub struct Watchdog {
    #[cfg(target_os = "espidf")]
    armed: bool,
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new()
    }
}

impl Watchdog {
    /// Arm the TWDT for the calling task.
    #[cfg(target_os = "espidf")]
    pub fn new() -> Self {
        let cfg = esp_task_wdt_config_t {
            timeout_ms: TIMEOUT_MS,
            idle_core_mask: 0,
            trigger_panic: true,
        };
        // SAFETY: called once from the main task during boot.
        let rc = unsafe { esp_task_wdt_reconfigure(&cfg) };
        if rc != ESP_OK as i32 {
            warn!("Watchdog: reconfigure rc={} (keeping IDF defaults)", rc);
        }
        // SAFETY: a null handle subscribes the current task.
        let rc = unsafe { esp_task_wdt_add(core::ptr::null_mut()) };
        let armed = rc == ESP_OK as i32;
        if armed {
            info!("Watchdog: armed, {} ms", TIMEOUT_MS);
        } else {
            warn!("Watchdog: subscribe failed rc={}, running unguarded", rc);
        }
        Self { armed }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self {}
    }

    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        if self.armed {
            // SAFETY: only resets the calling task's subscription.
            unsafe {
                esp_task_wdt_reset();
            }
        }
    }
}

impl WatchdogPort for Watchdog {
    fn feed(&mut self) {
        Watchdog::feed(self);
    }
}
