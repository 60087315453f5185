//! Single status LED driver.
//!
//! Lit steady means the heater is idle (relay off); dark steady means it
//! is heating. Flash codes from [`led_patterns`](super::led_patterns)
//! temporarily take the LED over and always leave it dark.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the GPIO via hw_init.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;
use crate::drivers::led_patterns::Indicator;

pub struct StatusLed {
    gpio: i32,
    on: bool,
}

impl StatusLed {
    pub fn new(gpio: i32) -> Self {
        hw_init::gpio_write(gpio, false);
        Self { gpio, on: false }
    }

    pub fn set(&mut self, on: bool) {
        hw_init::gpio_write(self.gpio, on);
        self.on = on;
    }

    pub fn off(&mut self) {
        self.set(false);
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}

impl Indicator for StatusLed {
    fn set(&mut self, on: bool) {
        StatusLed::set(self, on);
    }
}
