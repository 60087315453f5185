//! Actuator drivers, hardware initialisation, and peripheral helpers.

pub mod hw_init;
pub mod hw_timer;
pub mod led_patterns;
pub mod mode_switch;
pub mod relay;
pub mod status_led;
pub mod watchdog;
