//! DS18x20 digital thermometer, single device on the bus.
//!
//! Every function transaction is addressed with SKIP ROM, so exactly one
//! sensor may be wired to the line. A temperature read is:
//!
//! ```text
//! reset ─ CC 44 ─ poll read slots until non-zero ─ reset ─ CC BE ─ 9 bytes ─ CRC
//! ```
//!
//! The conversion poll is bounded (256 polls, 10 ms apart) and feeds the
//! watchdog between polls, so a stuck sensor costs ~2.6 s but never a
//! watchdog reset.

use core::fmt;

use crate::app::ports::WatchdogPort;
use crate::error::SensorError;
use crate::onewire::{timing, OneWireBus};

use super::temperature::DeciCelsius;

pub const SKIP_ROM: u8 = 0xCC;
pub const READ_ROM: u8 = 0x33;
pub const CONVERT_T: u8 = 0x44;
pub const READ_SCRATCHPAD: u8 = 0xBE;

/// 64-bit ROM code: family byte, 48-bit serial, CRC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RomCode(pub [u8; 8]);

impl RomCode {
    pub const fn family(&self) -> u8 {
        self.0[0]
    }

    pub fn serial(&self) -> [u8; 6] {
        let mut s = [0u8; 6];
        s.copy_from_slice(&self.0[1..7]);
        s
    }

    pub const fn crc(&self) -> u8 {
        self.0[7]
    }

    /// Human-readable family name, if known.
    pub const fn family_name(&self) -> &'static str {
        match self.family() {
            0x10 => "DS18S20",
            0x22 => "DS1822",
            0x28 => "DS18B20",
            _ => "unknown",
        }
    }

    /// Serial number as 12 hex digits, most significant byte first.
    pub fn serial_hex(&self) -> heapless::String<12> {
        use core::fmt::Write;
        let mut out = heapless::String::new();
        for b in self.serial().iter().rev() {
            // 6 bytes x 2 digits always fit.
            let _ = write!(out, "{b:02X}");
        }
        out
    }
}

impl fmt::Display for RomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{b:02X}")?;
        }
        Ok(())
    }
}

/// The 9-byte scratchpad, CRC already verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scratchpad(pub [u8; 9]);

impl Scratchpad {
    /// Raw signed reading in 1/16 °C.
    pub const fn raw_temperature(&self) -> i16 {
        i16::from_le_bytes([self.0[0], self.0[1]])
    }

    pub const fn temperature(&self) -> DeciCelsius {
        DeciCelsius::from_raw(self.raw_temperature())
    }

    /// Alarm high register (user byte 1).
    pub const fn alarm_high(&self) -> i8 {
        self.0[2] as i8
    }

    /// Alarm low register (user byte 2).
    pub const fn alarm_low(&self) -> i8 {
        self.0[3] as i8
    }

    /// Conversion resolution in bits (DS18B20 configuration register).
    pub const fn resolution_bits(&self) -> u8 {
        9 + ((self.0[4] >> 5) & 0x03)
    }

    pub const fn crc(&self) -> u8 {
        self.0[8]
    }
}

/// Single DS18x20 on a 1-Wire bus.
pub struct Ds18x20<B, W> {
    bus: B,
    watchdog: W,
}

impl<B: OneWireBus, W: WatchdogPort> Ds18x20<B, W> {
    pub fn new(bus: B, watchdog: W) -> Self {
        Self { bus, watchdog }
    }

    /// Start a conversion, wait for it, and read back the temperature.
    pub fn read_temperature(&mut self) -> Result<DeciCelsius, SensorError> {
        self.function(CONVERT_T, SensorError::NoPresence)?;
        self.wait_for_conversion()?;
        let pad = self.read_block::<9>(READ_SCRATCHPAD, SensorError::LineBusy)?;
        Ok(Scratchpad(pad).temperature())
    }

    /// Read the sensor's 64-bit ROM code.
    ///
    /// READ ROM is itself a ROM-level command, so it replaces SKIP ROM
    /// rather than following it.
    pub fn read_serial_number(&mut self) -> Result<RomCode, SensorError> {
        if !self.bus.reset()? {
            return Err(SensorError::NoPresence);
        }
        self.bus.write_byte(READ_ROM)?;
        self.read_verified::<8>().map(RomCode)
    }

    /// Read the full scratchpad without starting a conversion.
    pub fn read_scratchpad(&mut self) -> Result<Scratchpad, SensorError> {
        self.read_block::<9>(READ_SCRATCHPAD, SensorError::NoPresence)
            .map(Scratchpad)
    }

    /// reset + SKIP ROM + `command`. `absent` is returned when nobody
    /// answers the reset.
    fn function(&mut self, command: u8, absent: SensorError) -> Result<(), SensorError> {
        if !self.bus.reset()? {
            return Err(absent);
        }
        self.bus.write_byte(SKIP_ROM)?;
        self.bus.write_byte(command)
    }

    fn read_block<const N: usize>(
        &mut self,
        command: u8,
        absent: SensorError,
    ) -> Result<[u8; N], SensorError> {
        self.function(command, absent)?;
        self.read_verified::<N>()
    }

    /// Read `N` bytes whose last byte is the CRC over the others.
    fn read_verified<const N: usize>(&mut self) -> Result<[u8; N], SensorError> {
        self.bus.reset_crc();
        let mut buf = [0u8; N];
        for b in &mut buf {
            *b = self.bus.read_byte()?;
        }
        if self.bus.crc().is_valid() {
            Ok(buf)
        } else {
            Err(SensorError::BadChecksum)
        }
    }

    /// The sensor holds read slots low while converting.
    fn wait_for_conversion(&mut self) -> Result<(), SensorError> {
        for _ in 0..timing::CONVERSION_MAX_POLLS {
            if self.bus.read_byte()? != 0 {
                return Ok(());
            }
            self.bus.delay_us(timing::CONVERSION_POLL_INTERVAL_US);
            self.watchdog.feed();
        }
        Err(SensorError::ConversionTimeout)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::onewire::sim::{SimBus, SimDevice};

    #[derive(Default)]
    struct CountingWatchdog(Cell<u32>);

    impl WatchdogPort for &CountingWatchdog {
        fn feed(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn reads_room_temperature() {
        let bus = SimBus::new(SimDevice::ds18b20(0x0191));
        let mut sensor = Ds18x20::new(bus.one_wire(), ());
        assert_eq!(sensor.read_temperature(), Ok(DeciCelsius::new(250)));
        assert_eq!(
            bus.stats().commands.as_slice(),
            &[SKIP_ROM, CONVERT_T, SKIP_ROM, READ_SCRATCHPAD]
        );
        assert_eq!(bus.stats().resets, 2);
    }

    #[test]
    fn reads_negative_temperature() {
        let bus = SimBus::new(SimDevice::ds18b20(-0x00A2));
        let mut sensor = Ds18x20::new(bus.one_wire(), ());
        assert_eq!(sensor.read_temperature(), Ok(DeciCelsius::new(-101)));
    }

    #[test]
    fn no_sensor_is_no_presence() {
        let bus = SimBus::empty();
        let mut sensor = Ds18x20::new(bus.one_wire(), ());
        for _ in 0..3 {
            assert_eq!(sensor.read_temperature(), Err(SensorError::NoPresence));
        }
    }

    #[test]
    fn stuck_conversion_times_out_and_feeds_watchdog() {
        let wd = CountingWatchdog::default();
        let bus = SimBus::new(SimDevice::ds18b20(0).stuck_converting());
        let mut sensor = Ds18x20::new(bus.one_wire(), &wd);
        assert_eq!(sensor.read_temperature(), Err(SensorError::ConversionTimeout));
        assert_eq!(wd.0.get(), u32::from(timing::CONVERSION_MAX_POLLS));
        // 256 polls at 10 ms each, plus slot time.
        assert!(bus.stats().now_us >= 2_560_000);
    }

    #[test]
    fn short_conversion_feeds_once_per_busy_poll() {
        let wd = CountingWatchdog::default();
        let bus = SimBus::new(SimDevice::ds18b20(0).with_conversion_polls(5));
        let mut sensor = Ds18x20::new(bus.one_wire(), &wd);
        assert!(sensor.read_temperature().is_ok());
        assert_eq!(wd.0.get(), 5);
    }

    #[test]
    fn device_dropping_after_convert_is_line_busy() {
        let bus = SimBus::new(SimDevice::ds18b20(0).vanishing_after_convert());
        let mut sensor = Ds18x20::new(bus.one_wire(), ());
        assert_eq!(sensor.read_temperature(), Err(SensorError::LineBusy));
    }

    #[test]
    fn corrupted_scratchpad_is_bad_checksum() {
        let mut device = SimDevice::ds18b20(0x0191);
        device.corrupt_scratchpad();
        let bus = SimBus::new(device);
        let mut sensor = Ds18x20::new(bus.one_wire(), ());
        assert_eq!(sensor.read_temperature(), Err(SensorError::BadChecksum));
        assert_eq!(sensor.read_scratchpad(), Err(SensorError::BadChecksum));
    }

    #[test]
    fn pin_failure_is_gpio() {
        let bus = SimBus::new(SimDevice::ds18b20(0));
        bus.fail_pin_after(0);
        let mut sensor = Ds18x20::new(bus.one_wire(), ());
        assert_eq!(sensor.read_temperature(), Err(SensorError::Gpio));
    }

    #[test]
    fn reads_rom_code() {
        let device = SimDevice::ds18b20(0).with_serial([0x01, 0x02, 0x03, 0x04, 0x05, 0xA6]);
        let expected = device.rom();
        let bus = SimBus::new(device);
        let mut sensor = Ds18x20::new(bus.one_wire(), ());
        let rom = sensor.read_serial_number().unwrap();
        assert_eq!(rom.0, expected);
        assert_eq!(rom.family(), 0x28);
        assert_eq!(rom.family_name(), "DS18B20");
        assert_eq!(rom.serial_hex().as_str(), "A60504030201");
        assert_eq!(bus.stats().commands.as_slice(), &[READ_ROM]);
    }

    #[test]
    fn reads_scratchpad_fields() {
        let bus = SimBus::new(SimDevice::ds18b20(0x0550));
        let mut sensor = Ds18x20::new(bus.one_wire(), ());
        let pad = sensor.read_scratchpad().unwrap();
        assert_eq!(pad.raw_temperature(), 0x0550);
        assert_eq!(pad.temperature(), DeciCelsius::new(850));
        assert_eq!(pad.alarm_high(), 0x4B);
        assert_eq!(pad.alarm_low(), 0x46);
        assert_eq!(pad.resolution_bits(), 12);
    }

    #[test]
    fn rom_display_is_colon_separated() {
        let rom = RomCode([0x28, 0xFF, 0, 0, 0, 0, 0x01, 0x9A]);
        assert_eq!(rom.to_string(), "28:FF:00:00:00:00:01:9A");
    }
}
