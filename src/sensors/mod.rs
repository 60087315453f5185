//! Sensor subsystem: the DS18x20 protocol and its fixed-point reading type.
//!
//! The control loop never talks to the bus directly; it gets a
//! `Result<DeciCelsius, SensorError>` per poll from the hardware adapter,
//! which owns a [`Ds18x20`] over the board's 1-Wire master.

pub mod ds18x20;
pub mod temperature;

pub use ds18x20::{Ds18x20, RomCode, Scratchpad};
pub use temperature::DeciCelsius;
