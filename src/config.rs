//! Heater configuration parameters.
//!
//! Five single-byte values in the persisted byte store, one address each:
//!
//! | addr | field                     | type | default |
//! |------|---------------------------|------|---------|
//! | 0    | `temp_on_c`               | i8   | 8       |
//! | 1    | `temp_off_c`              | i8   | 9       |
//! | 2    | `temp_freeze_c`           | i8   | -10     |
//! | 3    | `read_period_secs`        | u8   | 10      |
//! | 4    | `read_failed_period_max`  | u8   | 60      |
//!
//! An erased store reads `0xFF` everywhere; `0xFF` in the read-period byte
//! marks a first boot and all defaults are written before the first poll.
//! The configuration is read-only after startup.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::EepromPort;
use crate::error::StorageError;

pub const ADDR_TEMP_ON: u8 = 0x00;
pub const ADDR_TEMP_OFF: u8 = 0x01;
pub const ADDR_TEMP_FREEZE: u8 = 0x02;
pub const ADDR_READ_PERIOD: u8 = 0x03;
pub const ADDR_READ_FAILED_MAX: u8 = 0x04;

/// Number of configuration bytes.
pub const CONFIG_LEN: usize = 5;

/// Value of an erased (never written) byte.
pub const ERASED: u8 = 0xFF;

/// Persisted heater control configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaterConfig {
    /// Relay turns ON at or below this temperature (°C).
    pub temp_on_c: i8,
    /// Relay turns OFF at or above this temperature (°C).
    pub temp_off_c: i8,
    /// At or below this the relay is forced OFF and the freeze alarm flashes.
    pub temp_freeze_c: i8,
    /// Seconds between sensor polls.
    pub read_period_secs: u8,
    /// Consecutive failed polls tolerated before emergency-off.
    pub read_failed_period_max: u8,
}

impl Default for HeaterConfig {
    fn default() -> Self {
        Self {
            temp_on_c: 8,
            temp_off_c: 9,
            temp_freeze_c: -10,
            read_period_secs: 10,
            read_failed_period_max: 60,
        }
    }
}

/// Suspicious but accepted configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigWarning {
    /// `temp_on_c >= temp_off_c`: the OFF branch always wins, heater never runs.
    NoHysteresisBand,
    /// `temp_freeze_c >= temp_on_c`: the freeze cut-off shadows turn-on.
    FreezeAboveTurnOn,
    /// A zero poll period makes the loop poll continuously.
    ZeroReadPeriod,
}

impl core::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoHysteresisBand => write!(f, "turn-on threshold is not below turn-off"),
            Self::FreezeAboveTurnOn => write!(f, "freeze threshold is not below turn-on"),
            Self::ZeroReadPeriod => write!(f, "read period is zero"),
        }
    }
}

impl HeaterConfig {
    /// Storage image, indexed by address.
    pub fn to_bytes(&self) -> [u8; CONFIG_LEN] {
        [
            self.temp_on_c as u8,
            self.temp_off_c as u8,
            self.temp_freeze_c as u8,
            self.read_period_secs,
            self.read_failed_period_max,
        ]
    }

    pub fn from_bytes(bytes: [u8; CONFIG_LEN]) -> Self {
        Self {
            temp_on_c: bytes[ADDR_TEMP_ON as usize] as i8,
            temp_off_c: bytes[ADDR_TEMP_OFF as usize] as i8,
            temp_freeze_c: bytes[ADDR_TEMP_FREEZE as usize] as i8,
            read_period_secs: bytes[ADDR_READ_PERIOD as usize],
            read_failed_period_max: bytes[ADDR_READ_FAILED_MAX as usize],
        }
    }

    /// How long the sensor may fail before the heater is forced off.
    pub fn failure_timeout_secs(&self) -> u32 {
        u32::from(self.read_period_secs) * u32::from(self.read_failed_period_max)
    }

    pub fn warnings(&self) -> heapless::Vec<ConfigWarning, 3> {
        let mut out = heapless::Vec::new();
        // Capacity equals the number of checks; pushes cannot fail.
        if self.temp_on_c >= self.temp_off_c {
            let _ = out.push(ConfigWarning::NoHysteresisBand);
        }
        if self.temp_freeze_c >= self.temp_on_c {
            let _ = out.push(ConfigWarning::FreezeAboveTurnOn);
        }
        if self.read_period_secs == 0 {
            let _ = out.push(ConfigWarning::ZeroReadPeriod);
        }
        out
    }

    /// Read the configuration, writing defaults first if the store is
    /// erased. Returns the config and whether defaults were written.
    pub fn load_or_init(eeprom: &mut impl EepromPort) -> Result<(Self, bool), StorageError> {
        let first_boot = eeprom.read_byte(ADDR_READ_PERIOD)? == ERASED;
        if first_boot {
            let defaults = Self::default();
            for (addr, value) in defaults.to_bytes().into_iter().enumerate() {
                eeprom.write_byte(addr as u8, value)?;
            }
            info!("Config: erased store, wrote defaults {:?}", defaults);
        }

        let mut bytes = [0u8; CONFIG_LEN];
        for (addr, b) in bytes.iter_mut().enumerate() {
            *b = eeprom.read_byte(addr as u8)?;
        }
        let cfg = Self::from_bytes(bytes);

        for w in cfg.warnings() {
            warn!("Config: {w}");
        }
        info!(
            "Config: on={} off={} freeze={} period={}s fail_max={} (timeout {}s)",
            cfg.temp_on_c,
            cfg.temp_off_c,
            cfg.temp_freeze_c,
            cfg.read_period_secs,
            cfg.read_failed_period_max,
            cfg.failure_timeout_secs()
        );
        Ok((cfg, first_boot))
    }
}
