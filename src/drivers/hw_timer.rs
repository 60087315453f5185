//! Periodic tick timer using ESP-IDF's esp_timer API.
//!
//! Drives [`COUNTDOWN`](crate::countdown::COUNTDOWN) at
//! [`TICKS_PER_SECOND`](crate::countdown::TICKS_PER_SECOND). The callback
//! runs in the esp_timer task (not an ISR) and only touches atomics.
//! On simulation targets the main loop ticks the countdown itself.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::countdown::{COUNTDOWN, TICK_PERIOD_US};

#[cfg(target_os = "espidf")]
static mut TICK_TIMER: esp_timer_handle_t = core::ptr::null_mut();

/// SAFETY: TICK_TIMER is written once in `start_timers()` before the
/// callback can fire.  Only called from the single main task.
#[cfg(target_os = "espidf")]
unsafe fn tick_timer() -> esp_timer_handle_t {
    unsafe { TICK_TIMER }
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn tick_cb(_arg: *mut core::ffi::c_void) {
    COUNTDOWN.on_timer_tick();
}

/// Errors starting the tick timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    Create(i32),
    Start(i32),
}

impl core::fmt::Display for TimerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Create(rc) => write!(f, "tick timer create failed (rc={})", rc),
            Self::Start(rc) => write!(f, "tick timer start failed (rc={})", rc),
        }
    }
}

/// Start the periodic countdown tick.
#[cfg(target_os = "espidf")]
pub fn start_timers() -> Result<(), TimerError> {
    // SAFETY: TICK_TIMER is written here once at boot from the single
    // main-task context before the callback fires. The callback only
    // touches atomics.
    unsafe {
        let args = esp_timer_create_args_t {
            callback: Some(tick_cb),
            arg: core::ptr::null_mut(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: b"countdown\0".as_ptr() as *const _,
            skip_unhandled_events: false,
        };
        let ret = esp_timer_create(&args, &raw mut TICK_TIMER);
        if ret != ESP_OK as i32 {
            return Err(TimerError::Create(ret));
        }
        let ret = esp_timer_start_periodic(tick_timer(), TICK_PERIOD_US);
        if ret != ESP_OK as i32 {
            return Err(TimerError::Start(ret));
        }
    }
    info!("hw_timer: countdown tick every {} us", TICK_PERIOD_US);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn start_timers() -> Result<(), TimerError> {
    log::info!("hw_timer(sim): timer not started (main loop ticks the countdown)");
    Ok(())
}
