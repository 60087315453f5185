//! Unified error types for the Frostguard firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! top-level control loop's error handling uniform. All variants are `Copy`
//! so they can be passed through the FSM context and event sink without
//! allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The temperature sensor transaction failed.
    Sensor(SensorError),
    /// Non-volatile storage could not be read or written.
    Storage(StorageError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

/// Failure of a 1-Wire sensor transaction.
///
/// Each variant owns a reserved 16-bit sentinel in the `0x8000..=0x8004`
/// range. The sentinels sit far outside the valid temperature range
/// (-550..=1250 tenths), and their low byte is what the status LED flashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum SensorError {
    /// The bus pin itself reported an I/O error.
    Gpio = 0x8000,
    /// No presence pulse after the initial reset: sensor missing or wire cut.
    NoPresence = 0x8001,
    /// The sensor never signalled conversion complete.
    ConversionTimeout = 0x8002,
    /// No presence pulse after the conversion: line held or device dropped.
    LineBusy = 0x8003,
    /// CRC-8 over the received bytes did not return to zero.
    BadChecksum = 0x8004,
}

impl SensorError {
    /// The reserved sentinel code for this error.
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Low byte of the sentinel, rendered as a flash count on the LED.
    pub const fn flash_code(self) -> u8 {
        (self as u16 & 0xFF) as u8
    }

    /// Map a sentinel code back to its error kind.
    pub const fn from_code(code: u16) -> Option<Self> {
        match code {
            0x8000 => Some(Self::Gpio),
            0x8001 => Some(Self::NoPresence),
            0x8002 => Some(Self::ConversionTimeout),
            0x8003 => Some(Self::LineBusy),
            0x8004 => Some(Self::BadChecksum),
            _ => None,
        }
    }
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpio => write!(f, "bus pin I/O error"),
            Self::NoPresence => write!(f, "no presence pulse"),
            Self::ConversionTimeout => write!(f, "conversion timeout"),
            Self::LineBusy => write!(f, "line busy after conversion"),
            Self::BadChecksum => write!(f, "bad checksum"),
        }?;
        write!(f, " (0x{:04X})", self.code())
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Storage errors
// ---------------------------------------------------------------------------

/// Errors from the non-volatile byte store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Address is outside the configuration area.
    OutOfRange(u8),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange(addr) => write!(f, "address {addr} out of range"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

impl core::error::Error for Error {}
impl core::error::Error for SensorError {}
impl core::error::Error for StorageError {}

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
