//! Frostguard firmware library.
//!
//! Exposes the control logic, the 1-Wire stack and the adapters for
//! integration testing. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module; on the host the
//! bus runs against [`onewire::sim`] and GPIO against in-memory levels.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod control;
pub mod countdown;
pub mod error;
pub mod fsm;
pub mod onewire;
pub mod pins;
pub mod safety;
pub mod sensors;

pub mod adapters;
pub mod drivers;
