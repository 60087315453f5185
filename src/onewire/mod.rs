//! Bit-banged 1-Wire bus master.
//!
//! One GPIO serves as both open-drain output and input: `set_low()` pulls
//! the line down, `set_high()` releases it to the external pull-up, and
//! `is_high()` samples it. Timing comes from an [`embedded_hal`] delay and
//! every sample point is bracketed by [`InterruptMask::masked`], so timer
//! interrupts can neither stretch a slot nor be lost for longer than one
//! slot.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: the pin is an open-drain `PinDriver`, the delay is the ROM
//! busy-wait (`Ets`), and masking goes through `critical-section`.
//! On host/test: [`sim`] provides a virtual-time line with a DS18x20 model.

pub mod crc;
#[cfg(not(target_os = "espidf"))]
pub mod sim;
pub mod timing;

pub use crc::Crc8;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use log::error;

use crate::error::SensorError;

/// All-ones output byte: every slot becomes "release early, then sample".
pub const READ_SLOTS: u8 = 0xFF;

// ───────────────────────────────────────────────────────────────
// Interrupt masking
// ───────────────────────────────────────────────────────────────

/// Runs a closure with interrupts masked.
///
/// Implementations must unmask on every exit path, including early
/// returns from the closure.
pub trait InterruptMask {
    fn masked<R>(&mut self, f: impl FnOnce() -> R) -> R;
}

/// Masks through the global `critical-section` implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct CriticalSectionMask;

impl InterruptMask for CriticalSectionMask {
    fn masked<R>(&mut self, f: impl FnOnce() -> R) -> R {
        critical_section::with(|_| f())
    }
}

// ───────────────────────────────────────────────────────────────
// Bus abstraction used by the sensor protocol
// ───────────────────────────────────────────────────────────────

/// Byte-level view of a single-wire bus.
pub trait OneWireBus {
    /// Issue a reset pulse. `Ok(true)` if a device answered with presence.
    fn reset(&mut self) -> Result<bool, SensorError>;

    /// Exchange one byte, LSB first. Pass [`READ_SLOTS`] to read.
    /// Every received byte is folded into the running CRC.
    fn transfer_byte(&mut self, value: u8) -> Result<u8, SensorError>;

    /// Clear the running CRC before a block read.
    fn reset_crc(&mut self);

    /// Running CRC since the last [`reset_crc`](Self::reset_crc).
    fn crc(&self) -> Crc8;

    /// Busy-wait between transactions (interrupts stay enabled).
    fn delay_us(&mut self, us: u32);

    fn write_byte(&mut self, value: u8) -> Result<(), SensorError> {
        self.transfer_byte(value).map(|_| ())
    }

    fn read_byte(&mut self) -> Result<u8, SensorError> {
        self.transfer_byte(READ_SLOTS)
    }
}

// ───────────────────────────────────────────────────────────────
// Bit-banged master
// ───────────────────────────────────────────────────────────────

/// 1-Wire master on one open-drain GPIO.
pub struct OneWire<P, D, M = CriticalSectionMask> {
    pin: P,
    delay: D,
    mask: M,
    crc: Crc8,
}

impl<P, D, M> OneWire<P, D, M>
where
    P: OutputPin + InputPin,
    D: DelayNs,
    M: InterruptMask,
{
    pub fn new(pin: P, delay: D, mask: M) -> Self {
        Self {
            pin,
            delay,
            mask,
            crc: Crc8::new(),
        }
    }

    /// Give the pin, delay and mask back.
    pub fn release(self) -> (P, D, M) {
        (self.pin, self.delay, self.mask)
    }

    /// One time slot. Writes `bit`; for a 1 bit the returned value is what
    /// the line read at the sample point.
    fn transfer_bit(&mut self, bit: bool) -> Result<bool, SensorError> {
        let pin = &mut self.pin;
        let delay = &mut self.delay;

        if bit {
            let sampled = self
                .mask
                .masked(|| -> Result<bool, <P as ErrorType>::Error> {
                    pin.set_low()?;
                    delay.delay_us(timing::SLOT_START_US);
                    pin.set_high()?;
                    delay.delay_us(timing::SAMPLE_OFFSET_US);
                    pin.is_high()
                });
            delay.delay_us(timing::SLOT_REMAINDER_US);
            sampled.map_err(pin_error)
        } else {
            let released = self
                .mask
                .masked(|| -> Result<(), <P as ErrorType>::Error> {
                    pin.set_low()?;
                    delay.delay_us(timing::SLOT_START_US + timing::SLOT_REMAINDER_US);
                    pin.set_high()
                });
            delay.delay_us(timing::RECOVERY_US);
            released.map(|()| false).map_err(pin_error)
        }
    }
}

impl<P, D, M> OneWireBus for OneWire<P, D, M>
where
    P: OutputPin + InputPin,
    D: DelayNs,
    M: InterruptMask,
{
    fn reset(&mut self) -> Result<bool, SensorError> {
        self.pin.set_low().map_err(pin_error)?;
        self.delay.delay_us(timing::RESET_LOW_US);

        let pin = &mut self.pin;
        let delay = &mut self.delay;
        let line_low = self
            .mask
            .masked(|| -> Result<bool, <P as ErrorType>::Error> {
                pin.set_high()?;
                delay.delay_us(timing::PRESENCE_SAMPLE_US);
                pin.is_low()
            })
            .map_err(pin_error)?;

        self.delay.delay_us(timing::RESET_RECOVERY_US);
        Ok(line_low)
    }

    fn transfer_byte(&mut self, value: u8) -> Result<u8, SensorError> {
        let mut received = 0u8;
        for i in 0..8 {
            if self.transfer_bit((value >> i) & 1 == 1)? {
                received |= 1 << i;
            }
        }
        self.crc.update(received);
        Ok(received)
    }

    fn reset_crc(&mut self) {
        self.crc.reset();
    }

    fn crc(&self) -> Crc8 {
        self.crc
    }

    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }
}

fn pin_error<E: embedded_hal::digital::Error>(e: E) -> SensorError {
    error!("1-Wire pin error: {:?}", e.kind());
    SensorError::Gpio
}
