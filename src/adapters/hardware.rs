//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the DS18x20, the relay, the status LED, the mode jumper and the
//! flash-code player, exposing them through [`SensorPort`] and
//! [`ActuatorPort`].  On non-espidf targets the GPIO drivers use
//! cfg-gated simulation stubs and the sensor runs on the simulated bus.

use embedded_hal::delay::DelayNs;

use crate::app::ports::{ActuatorPort, SensorPort, WatchdogPort};
use crate::drivers::led_patterns::FlashPlayer;
use crate::drivers::mode_switch::ModeSwitch;
use crate::drivers::relay::RelayDriver;
use crate::drivers::status_led::StatusLed;
use crate::error::SensorError;
use crate::onewire::OneWireBus;
use crate::sensors::{DeciCelsius, Ds18x20};

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<B, D, W> {
    sensor: Ds18x20<B, W>,
    relay: RelayDriver,
    led: StatusLed,
    mode: ModeSwitch,
    flasher: FlashPlayer<D, W>,
}

impl<B, D, W> HardwareAdapter<B, D, W>
where
    B: OneWireBus,
    D: DelayNs,
    W: WatchdogPort,
{
    pub fn new(
        sensor: Ds18x20<B, W>,
        relay: RelayDriver,
        led: StatusLed,
        mode: ModeSwitch,
        flasher: FlashPlayer<D, W>,
    ) -> Self {
        Self {
            sensor,
            relay,
            led,
            mode,
            flasher,
        }
    }

    pub fn sensor_mut(&mut self) -> &mut Ds18x20<B, W> {
        &mut self.sensor
    }

    pub fn led(&self) -> &StatusLed {
        &self.led
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<B, D, W> SensorPort for HardwareAdapter<B, D, W>
where
    B: OneWireBus,
    D: DelayNs,
    W: WatchdogPort,
{
    fn read_temperature(&mut self) -> Result<DeciCelsius, SensorError> {
        self.sensor.read_temperature()
    }

    fn display_requested(&mut self) -> bool {
        self.mode.display_enabled()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<B, D, W> ActuatorPort for HardwareAdapter<B, D, W>
where
    B: OneWireBus,
    D: DelayNs,
    W: WatchdogPort,
{
    fn set_relay(&mut self, on: bool) {
        self.relay.set(on);
    }

    fn is_relay_on(&self) -> bool {
        self.relay.is_on()
    }

    fn set_led(&mut self, on: bool) {
        self.led.set(on);
    }

    fn flash_temperature(&mut self, degrees: i16) {
        self.flasher.number(&mut self.led, degrees);
    }

    fn flash_error(&mut self, code: u8) {
        self.flasher.error(&mut self.led, code);
    }

    fn flash_freeze_alarm(&mut self) {
        self.flasher.freeze_alarm(&mut self.led);
    }

    fn all_off(&mut self) {
        self.relay.off();
        self.led.off();
    }
}
