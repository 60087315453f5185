//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (sensor, relay/LED, event sinks, byte storage, watchdog)
//! implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.

use crate::config::HeaterConfig;
use crate::error::{SensorError, StorageError};
use crate::sensors::DeciCelsius;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this once per poll period.
pub trait SensorPort {
    /// Run a full conversion and return the decoded temperature.
    fn read_temperature(&mut self) -> Result<DeciCelsius, SensorError>;

    /// Whether the mode-select input asks for the temperature read-out.
    fn display_requested(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: relay, status LED and the blocking flash patterns.
///
/// The flash methods block for the duration of the pattern and must keep
/// the watchdog fed while they do.
pub trait ActuatorPort {
    fn set_relay(&mut self, on: bool);

    fn is_relay_on(&self) -> bool;

    fn set_led(&mut self, on: bool);

    /// Flash a whole-degree value (sign, tens, units).
    fn flash_temperature(&mut self, degrees: i16);

    /// Flash an error code once, followed by the inter-burst gap.
    fn flash_error(&mut self, code: u8);

    /// Rapid burst shown when the freeze threshold is reached.
    fn flash_freeze_alarm(&mut self);

    /// Relay and LED off.
    fn all_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Byte storage port (driven adapter: domain ↔ EEPROM / NVS)
// ───────────────────────────────────────────────────────────────

/// Byte-addressed non-volatile storage. Unwritten cells read as `0xFF`.
pub trait EepromPort {
    fn read_byte(&self, addr: u8) -> Result<u8, StorageError>;

    fn write_byte(&mut self, addr: u8, value: u8) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Configuration port
// ───────────────────────────────────────────────────────────────

/// Loads the heater configuration, writing defaults on first boot.
pub trait ConfigPort {
    fn load(&mut self) -> Result<HeaterConfig, StorageError>;
}

impl<T: EepromPort> ConfigPort for T {
    fn load(&mut self) -> Result<HeaterConfig, StorageError> {
        HeaterConfig::load_or_init(self).map(|(cfg, _)| cfg)
    }
}

// ───────────────────────────────────────────────────────────────
// Watchdog port
// ───────────────────────────────────────────────────────────────

/// Anything that must be kicked during long blocking waits.
pub trait WatchdogPort {
    fn feed(&mut self);
}

/// No watchdog.
impl WatchdogPort for () {
    fn feed(&mut self) {}
}
