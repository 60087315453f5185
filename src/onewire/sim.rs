//! Virtual-time 1-Wire line with a DS18B20 model, for host tests.
//!
//! The simulated pin, delay and interrupt mask share one `Wire`. Delays
//! advance a nanosecond clock instead of sleeping; every release of the
//! line is classified by how long the master held it low:
//!
//! ```text
//!   low >= 480 µs        reset        device answers presence at +30..+150 µs
//!   low <  15 µs         short slot   write-1, or read: device may hold low to +30 µs
//!   15 µs <= low < 480   long slot    write-0
//! ```
//!
//! The device decodes ROM/function commands from those slots exactly like
//! the real part would, so the bus driver and the sensor protocol are
//! exercised end-to-end without hardware.

use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, ErrorKind, ErrorType, InputPin, OutputPin};

use super::{Crc8, InterruptMask, OneWire};

const NS_PER_US: u64 = 1_000;
const RESET_MIN_NS: u64 = 480 * NS_PER_US;
const SHORT_SLOT_MAX_NS: u64 = 15 * NS_PER_US;
const PRESENCE_START_NS: u64 = 30 * NS_PER_US;
const PRESENCE_END_NS: u64 = 150 * NS_PER_US;
const DEVICE_HOLD_NS: u64 = 30 * NS_PER_US;

/// DS18B20 family code.
pub const FAMILY_DS18B20: u8 = 0x28;
/// Scratchpad content of a DS18B20 straight after power-up (+85 °C).
pub const POWER_ON_RAW: i16 = 0x0550;

// ───────────────────────────────────────────────────────────────
// Device model
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    RomCommand,
    Function,
    Transmit,
    Converting,
}

/// Behavioural model of one DS18B20 on the line.
#[derive(Debug, Clone)]
pub struct SimDevice {
    rom: [u8; 8],
    scratchpad: [u8; 9],
    busy_polls: u16,
    never_completes: bool,
    vanish_after_convert: bool,
    corrupt: bool,

    phase: Phase,
    rx_byte: u8,
    rx_bits: u8,
    tx: Vec<u8>,
    tx_bit: usize,
    busy_slots: u32,
    vanish_pending: bool,
    received: Vec<u8>,
    conversions: u32,
}

impl SimDevice {
    /// A DS18B20 holding `raw` (1/16 °C) in its scratchpad.
    pub fn ds18b20(raw: i16) -> Self {
        let mut rom = [FAMILY_DS18B20, 0xFF, 0x4C, 0x61, 0x91, 0x16, 0x04, 0];
        rom[7] = Crc8::checksum(&rom[..7]);
        let mut dev = Self {
            rom,
            scratchpad: [0, 0, 0x4B, 0x46, 0x7F, 0xFF, 0x0C, 0x10, 0],
            busy_polls: 3,
            never_completes: false,
            vanish_after_convert: false,
            corrupt: false,
            phase: Phase::Idle,
            rx_byte: 0,
            rx_bits: 0,
            tx: Vec::new(),
            tx_bit: 0,
            busy_slots: 0,
            vanish_pending: false,
            received: Vec::new(),
            conversions: 0,
        };
        dev.set_raw_temperature(raw);
        dev
    }

    /// Replace the six serial bytes; the ROM CRC is recomputed.
    #[must_use]
    pub fn with_serial(mut self, serial: [u8; 6]) -> Self {
        self.rom[1..7].copy_from_slice(&serial);
        self.rom[7] = Crc8::checksum(&self.rom[..7]);
        self
    }

    /// Number of all-zero poll bytes before the conversion reports done.
    #[must_use]
    pub fn with_conversion_polls(mut self, polls: u16) -> Self {
        self.busy_polls = polls;
        self
    }

    /// Conversion never finishes; every poll reads zero.
    #[must_use]
    pub fn stuck_converting(mut self) -> Self {
        self.never_completes = true;
        self
    }

    /// The first reset after a CONVERT T gets no presence pulse.
    #[must_use]
    pub fn vanishing_after_convert(mut self) -> Self {
        self.vanish_after_convert = true;
        self
    }

    /// Flip one bit of every transmitted scratchpad without fixing its CRC.
    pub fn corrupt_scratchpad(&mut self) {
        self.corrupt = true;
    }

    pub fn set_raw_temperature(&mut self, raw: i16) {
        let [lsb, msb] = raw.to_le_bytes();
        self.scratchpad[0] = lsb;
        self.scratchpad[1] = msb;
        self.scratchpad[8] = Crc8::checksum(&self.scratchpad[..8]);
    }

    pub fn rom(&self) -> [u8; 8] {
        self.rom
    }

    pub fn scratchpad(&self) -> [u8; 9] {
        self.scratchpad
    }

    pub fn conversions(&self) -> u32 {
        self.conversions
    }

    /// Reset pulse seen. Returns whether the device answers with presence.
    fn on_reset(&mut self) -> bool {
        self.rx_byte = 0;
        self.rx_bits = 0;
        self.tx.clear();
        self.tx_bit = 0;
        if self.vanish_pending {
            self.vanish_pending = false;
            self.phase = Phase::Idle;
            return false;
        }
        self.phase = Phase::RomCommand;
        true
    }

    /// One time slot. `short` is true for write-1/read slots. Returns
    /// whether the device holds the line low through the sample point.
    fn on_slot(&mut self, short: bool) -> bool {
        match self.phase {
            Phase::Idle => false,
            Phase::RomCommand | Phase::Function => {
                if short {
                    self.rx_byte |= 1 << self.rx_bits;
                }
                self.rx_bits += 1;
                if self.rx_bits == 8 {
                    let byte = self.rx_byte;
                    self.rx_byte = 0;
                    self.rx_bits = 0;
                    self.on_command(byte);
                }
                false
            }
            Phase::Transmit => {
                let bit = self
                    .tx
                    .get(self.tx_bit / 8)
                    .is_none_or(|byte| (byte >> (self.tx_bit % 8)) & 1 == 1);
                self.tx_bit += 1;
                short && !bit
            }
            Phase::Converting => {
                if !short {
                    return false;
                }
                if self.never_completes {
                    return true;
                }
                if self.busy_slots > 0 {
                    self.busy_slots -= 1;
                    return true;
                }
                false
            }
        }
    }

    fn on_command(&mut self, byte: u8) {
        self.received.push(byte);
        match (self.phase, byte) {
            (Phase::RomCommand, 0xCC) => self.phase = Phase::Function,
            (Phase::RomCommand, 0x33) => {
                let rom = self.rom;
                self.transmit(&rom);
            }
            (Phase::Function, 0x44) => {
                self.conversions += 1;
                self.busy_slots = u32::from(self.busy_polls) * 8;
                self.vanish_pending = self.vanish_after_convert;
                self.phase = Phase::Converting;
            }
            (Phase::Function, 0xBE) => {
                let mut pad = self.scratchpad;
                if self.corrupt {
                    pad[2] ^= 0x01;
                }
                self.transmit(&pad);
            }
            _ => self.phase = Phase::Idle,
        }
    }

    fn transmit(&mut self, bytes: &[u8]) {
        self.tx.clear();
        self.tx.extend_from_slice(bytes);
        self.tx_bit = 0;
        self.phase = Phase::Transmit;
    }
}

// ───────────────────────────────────────────────────────────────
// Shared line state
// ───────────────────────────────────────────────────────────────

/// Counters collected while the simulated line runs.
#[derive(Debug, Clone, Default)]
pub struct SimStats {
    pub now_us: u64,
    pub resets: u32,
    pub masked_samples: u32,
    pub unmasked_samples: u32,
    pub mask_depth: u32,
    /// Longest continuous masked window seen.
    pub max_masked_us: u64,
    /// Every byte the device decoded as a command.
    pub commands: Vec<u8>,
}

#[derive(Debug, Default)]
struct Wire {
    now_ns: u64,
    master_low: bool,
    low_since_ns: u64,
    device_window: Option<(u64, u64)>,
    device: Option<SimDevice>,
    pin_ops: u32,
    fail_after: Option<u32>,
    mask_depth: u32,
    mask_since_ns: u64,
    max_masked_ns: u64,
    resets: u32,
    masked_samples: u32,
    unmasked_samples: u32,
}

impl Wire {
    fn pin_op(&mut self) -> Result<(), SimPinError> {
        if self.fail_after.is_some_and(|limit| self.pin_ops >= limit) {
            return Err(SimPinError);
        }
        self.pin_ops += 1;
        Ok(())
    }

    fn pull_low(&mut self) {
        if !self.master_low {
            self.master_low = true;
            self.low_since_ns = self.now_ns;
        }
    }

    fn release(&mut self) {
        if !self.master_low {
            return;
        }
        self.master_low = false;
        let held = self.now_ns - self.low_since_ns;

        if held >= RESET_MIN_NS {
            self.resets += 1;
            let presence = self.device.as_mut().is_some_and(SimDevice::on_reset);
            self.device_window =
                presence.then(|| (self.now_ns + PRESENCE_START_NS, self.now_ns + PRESENCE_END_NS));
        } else {
            let short = held < SHORT_SLOT_MAX_NS;
            let hold = self.device.as_mut().is_some_and(|d| d.on_slot(short));
            self.device_window =
                hold.then(|| (self.low_since_ns, self.low_since_ns + DEVICE_HOLD_NS));
        }
    }

    fn line_low(&mut self) -> bool {
        if self.mask_depth > 0 {
            self.masked_samples += 1;
        } else {
            self.unmasked_samples += 1;
        }
        let now = self.now_ns;
        self.master_low
            || self
                .device_window
                .is_some_and(|(start, end)| start <= now && now < end)
    }
}

// ───────────────────────────────────────────────────────────────
// Handles
// ───────────────────────────────────────────────────────────────

/// Owner of a simulated line; hands out pin/delay/mask handles onto it.
#[derive(Clone)]
pub struct SimBus {
    wire: Rc<RefCell<Wire>>,
}

impl SimBus {
    pub fn new(device: SimDevice) -> Self {
        let bus = Self::empty();
        bus.wire.borrow_mut().device = Some(device);
        bus
    }

    /// A line with only the pull-up on it.
    pub fn empty() -> Self {
        Self {
            wire: Rc::new(RefCell::new(Wire::default())),
        }
    }

    pub fn pin(&self) -> SimPin {
        SimPin {
            wire: Rc::clone(&self.wire),
        }
    }

    pub fn delay(&self) -> SimDelay {
        SimDelay {
            wire: Rc::clone(&self.wire),
        }
    }

    pub fn mask(&self) -> SimMask {
        SimMask {
            wire: Rc::clone(&self.wire),
        }
    }

    /// A bus master wired to this line.
    pub fn one_wire(&self) -> OneWire<SimPin, SimDelay, SimMask> {
        OneWire::new(self.pin(), self.delay(), self.mask())
    }

    /// Allow `ops` more pin operations, then fail every one after.
    pub fn fail_pin_after(&self, ops: u32) {
        let mut wire = self.wire.borrow_mut();
        wire.fail_after = Some(wire.pin_ops + ops);
    }

    /// Inspect or modify the attached device, if any.
    pub fn with_device<R>(&self, f: impl FnOnce(&mut SimDevice) -> R) -> Option<R> {
        self.wire.borrow_mut().device.as_mut().map(f)
    }

    pub fn unplug(&self) -> Option<SimDevice> {
        self.wire.borrow_mut().device.take()
    }

    pub fn plug(&self, device: SimDevice) {
        self.wire.borrow_mut().device = Some(device);
    }

    pub fn stats(&self) -> SimStats {
        let wire = self.wire.borrow();
        SimStats {
            now_us: wire.now_ns / NS_PER_US,
            resets: wire.resets,
            masked_samples: wire.masked_samples,
            unmasked_samples: wire.unmasked_samples,
            mask_depth: wire.mask_depth,
            max_masked_us: wire.max_masked_ns / NS_PER_US,
            commands: wire
                .device
                .as_ref()
                .map(|d| d.received.clone())
                .unwrap_or_default(),
        }
    }
}

/// Open-drain pin onto the simulated line.
pub struct SimPin {
    wire: Rc<RefCell<Wire>>,
}

/// Injected pin failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimPinError;

impl digital::Error for SimPinError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

impl ErrorType for SimPin {
    type Error = SimPinError;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        let mut wire = self.wire.borrow_mut();
        wire.pin_op()?;
        wire.pull_low();
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        let mut wire = self.wire.borrow_mut();
        wire.pin_op()?;
        wire.release();
        Ok(())
    }
}

impl InputPin for SimPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.is_low().map(|low| !low)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        let mut wire = self.wire.borrow_mut();
        wire.pin_op()?;
        Ok(wire.line_low())
    }
}

/// Delay that advances the virtual clock.
pub struct SimDelay {
    wire: Rc<RefCell<Wire>>,
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.wire.borrow_mut().now_ns += u64::from(ns);
    }

    fn delay_us(&mut self, us: u32) {
        self.wire.borrow_mut().now_ns += u64::from(us) * NS_PER_US;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.wire.borrow_mut().now_ns += u64::from(ms) * 1_000 * NS_PER_US;
    }
}

/// Mask that only records nesting depth and window length.
pub struct SimMask {
    wire: Rc<RefCell<Wire>>,
}

impl InterruptMask for SimMask {
    fn masked<R>(&mut self, f: impl FnOnce() -> R) -> R {
        {
            let mut wire = self.wire.borrow_mut();
            if wire.mask_depth == 0 {
                wire.mask_since_ns = wire.now_ns;
            }
            wire.mask_depth += 1;
        }
        let result = f();
        let mut wire = self.wire.borrow_mut();
        wire.mask_depth -= 1;
        if wire.mask_depth == 0 {
            let window = wire.now_ns - wire.mask_since_ns;
            wire.max_masked_ns = wire.max_masked_ns.max(window);
        }
        result
    }
}
