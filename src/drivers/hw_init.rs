//! One-shot GPIO initialisation and raw pin helpers.
//!
//! Configures the relay and LED outputs (driven low) and the mode-select
//! input (pull-up) using raw ESP-IDF sys calls. Called once from `main()`
//! before the control loop starts. The 1-Wire line is not configured here;
//! it is owned by an `esp-idf-hal` open-drain `PinDriver`.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU64, Ordering};

// ── Error type ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed { pin: i32, rc: i32 },
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed { pin, rc } => {
                write!(f, "GPIO{} config failed (rc={})", pin, rc)
            }
        }
    }
}

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe {
        configure(pins::RELAY_GPIO, gpio_mode_t_GPIO_MODE_OUTPUT, false)?;
        gpio_set_level(pins::RELAY_GPIO, 0);
        configure(pins::STATUS_LED_GPIO, gpio_mode_t_GPIO_MODE_OUTPUT, false)?;
        gpio_set_level(pins::STATUS_LED_GPIO, 0);
        configure(pins::MODE_SWITCH_GPIO, gpio_mode_t_GPIO_MODE_INPUT, true)?;
    }
    info!("hw_init: relay/LED outputs low, mode switch input with pull-up");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe fn configure(pin: i32, mode: gpio_mode_t, pull_up: bool) -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pin,
        mode,
        pull_up_en: if pull_up {
            gpio_pullup_t_GPIO_PULLUP_ENABLE
        } else {
            gpio_pullup_t_GPIO_PULLUP_DISABLE
        },
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let rc = unsafe { gpio_config(&cfg) };
    if rc != ESP_OK as i32 {
        return Err(HwInitError::GpioConfigFailed { pin, rc });
    }
    Ok(())
}

// ── Pin access ────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: read-only register access on an already-configured input.
    (unsafe { gpio_get_level(pin) }) != 0
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: pin was configured as an output in init_peripherals(). Main-loop only.
    unsafe {
        gpio_set_level(pin, u32::from(high));
    }
}

// Simulation: one bit per GPIO number, all inputs idle high (pull-ups).

#[cfg(not(target_os = "espidf"))]
static SIM_LEVELS: AtomicU64 = AtomicU64::new(u64::MAX);

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(pin: i32) -> bool {
    SIM_LEVELS.load(Ordering::Acquire) & (1 << pin) != 0
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(pin: i32, high: bool) {
    if high {
        SIM_LEVELS.fetch_or(1 << pin, Ordering::AcqRel);
    } else {
        SIM_LEVELS.fetch_and(!(1 << pin), Ordering::AcqRel);
    }
}

/// Drive a simulated input level (host tests).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_level(pin: i32, high: bool) {
    gpio_write(pin, high);
}
