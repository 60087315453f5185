//! Control laws.

pub mod hysteresis;

pub use hysteresis::{decide, Decision, Thresholds};
