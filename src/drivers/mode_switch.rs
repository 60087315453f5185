//! Mode-select jumper.
//!
//! ## Hardware
//!
//! Input with pull-up. Fitting the jumper pulls the pin LOW, which enables
//! the temperature read-out on the status LED after every good poll. The
//! jumper is sampled once per poll, so no debouncing is needed.

use crate::drivers::hw_init;

pub struct ModeSwitch {
    gpio: i32,
}

impl ModeSwitch {
    pub fn new(gpio: i32) -> Self {
        Self { gpio }
    }

    /// `true` while the jumper is fitted (pin LOW).
    pub fn display_enabled(&self) -> bool {
        !hw_init::gpio_read(self.gpio)
    }
}
