//! Mock hardware adapter for integration tests.
//!
//! Serves scripted sensor results and records every actuator call so
//! tests can assert on the full command history without touching GPIO.

use std::collections::VecDeque;

use frostguard::app::events::AppEvent;
use frostguard::app::ports::{ActuatorPort, EepromPort, EventSink, SensorPort};
use frostguard::countdown::Countdown;
use frostguard::error::{SensorError, StorageError};
use frostguard::sensors::DeciCelsius;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCall {
    Relay(bool),
    Led(bool),
    FlashTemperature(i16),
    FlashError(u8),
    FreezeAlarm,
    AllOff,
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub readings: VecDeque<Result<DeciCelsius, SensorError>>,
    pub display: bool,
    pub relay: bool,
    pub led: bool,
    pub calls: Vec<ActuatorCall>,
    pub sensor_reads: u32,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            readings: VecDeque::new(),
            display: false,
            relay: false,
            led: false,
            calls: Vec::new(),
            sensor_reads: 0,
        }
    }

    pub fn push_degrees(&mut self, degrees: i16) {
        self.readings.push_back(Ok(DeciCelsius::new(degrees * 10)));
    }

    pub fn push_error(&mut self, e: SensorError) {
        self.readings.push_back(Err(e));
    }

    pub fn count(&self, call: ActuatorCall) -> usize {
        self.calls.iter().filter(|c| **c == call).count()
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn read_temperature(&mut self) -> Result<DeciCelsius, SensorError> {
        self.sensor_reads += 1;
        self.readings
            .pop_front()
            .unwrap_or(Err(SensorError::NoPresence))
    }

    fn display_requested(&mut self) -> bool {
        self.display
    }
}

impl ActuatorPort for MockHardware {
    fn set_relay(&mut self, on: bool) {
        self.relay = on;
        self.calls.push(ActuatorCall::Relay(on));
    }

    fn is_relay_on(&self) -> bool {
        self.relay
    }

    fn set_led(&mut self, on: bool) {
        self.led = on;
        self.calls.push(ActuatorCall::Led(on));
    }

    fn flash_temperature(&mut self, degrees: i16) {
        self.calls.push(ActuatorCall::FlashTemperature(degrees));
    }

    fn flash_error(&mut self, code: u8) {
        self.calls.push(ActuatorCall::FlashError(code));
    }

    fn flash_freeze_alarm(&mut self) {
        self.calls.push(ActuatorCall::FreezeAlarm);
    }

    fn all_off(&mut self) {
        self.relay = false;
        self.led = false;
        self.calls.push(ActuatorCall::AllOff);
    }
}

// ── Recording event sink ──────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(*e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── In-memory EEPROM ──────────────────────────────────────────

/// 16-byte store that logs every write.
pub struct MemEeprom {
    pub cells: [u8; 16],
    pub writes: Vec<(u8, u8)>,
}

#[allow(dead_code)]
impl MemEeprom {
    pub fn erased() -> Self {
        Self {
            cells: [0xFF; 16],
            writes: Vec::new(),
        }
    }
}

impl EepromPort for MemEeprom {
    fn read_byte(&self, addr: u8) -> Result<u8, StorageError> {
        self.cells
            .get(addr as usize)
            .copied()
            .ok_or(StorageError::OutOfRange(addr))
    }

    fn write_byte(&mut self, addr: u8, value: u8) -> Result<(), StorageError> {
        let cell = self
            .cells
            .get_mut(addr as usize)
            .ok_or(StorageError::OutOfRange(addr))?;
        *cell = value;
        self.writes.push((addr, value));
        Ok(())
    }
}

/// A countdown private to one test; the service needs `'static`.
pub fn leak_countdown() -> &'static Countdown {
    Box::leak(Box::new(Countdown::new()))
}
