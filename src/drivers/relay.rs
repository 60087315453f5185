//! Heater relay driver.
//!
//! A transistor-driven relay coil on one GPIO, active high. The driver is
//! a dumb actuator; the only rule it knows is that it starts de-energised.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the GPIO via hw_init helpers.
//! On host/test: hw_init keeps a simulated level; the driver tracks state.

use log::debug;

use crate::drivers::hw_init;

pub struct RelayDriver {
    gpio: i32,
    on: bool,
}

impl RelayDriver {
    /// Take the relay pin and force it off.
    pub fn new(gpio: i32) -> Self {
        hw_init::gpio_write(gpio, false);
        Self {
            gpio,
            on: false,
        }
    }

    pub fn set(&mut self, on: bool) {
        hw_init::gpio_write(self.gpio, on);
        if on != self.on {
            debug!("Relay: {}", if on { "energised" } else { "released" });
        }
        self.on = on;
    }

    pub fn off(&mut self) {
        self.set(false);
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
