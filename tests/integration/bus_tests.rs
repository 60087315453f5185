//! End-to-end tests: AppService → HardwareAdapter → Ds18x20 → bit-banged
//! 1-Wire master → simulated DS18B20.

use embedded_hal::delay::DelayNs;
use frostguard::adapters::hardware::HardwareAdapter;
use frostguard::app::ports::{ActuatorPort, SensorPort};
use frostguard::app::service::AppService;
use frostguard::config::HeaterConfig;
use frostguard::drivers::hw_init;
use frostguard::drivers::led_patterns::FlashPlayer;
use frostguard::drivers::mode_switch::ModeSwitch;
use frostguard::drivers::relay::RelayDriver;
use frostguard::drivers::status_led::StatusLed;
use frostguard::error::SensorError;
use frostguard::fsm::StateId;
use frostguard::onewire::OneWire;
use frostguard::onewire::sim::{POWER_ON_RAW, SimBus, SimDelay, SimDevice, SimMask, SimPin};
use frostguard::sensors::{DeciCelsius, Ds18x20};

use crate::mock_hw::{leak_countdown, RecordingSink};

struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

type SimHardware = HardwareAdapter<OneWire<SimPin, SimDelay, SimMask>, NoDelay, ()>;

/// Hardware adapter on `bus`, with relay/LED/jumper on `base..base + 3`.
fn hardware(bus: &SimBus, base: i32) -> SimHardware {
    HardwareAdapter::new(
        Ds18x20::new(bus.one_wire(), ()),
        RelayDriver::new(base),
        StatusLed::new(base + 1),
        ModeSwitch::new(base + 2),
        FlashPlayer::new(NoDelay, ()),
    )
}

#[test]
fn cold_sensor_turns_heater_on() {
    // +3.0625 C
    let bus = SimBus::new(SimDevice::ds18b20(0x0031));
    let mut hw = hardware(&bus, 20);
    let cd = leak_countdown();
    let mut app = AppService::new(HeaterConfig::default(), cd);
    let mut sink = RecordingSink::new();
    app.start(&mut hw, &mut sink);

    assert!(app.tick(&mut hw, &mut sink));
    assert_eq!(app.state(), StateId::Idle);
    assert!(hw.is_relay_on());
    assert!(hw_init::gpio_read(20), "relay GPIO driven high");
    assert_eq!(bus.with_device(|d| d.conversions()), Some(1));

    let stats = bus.stats();
    assert_eq!(stats.mask_depth, 0);
    assert_eq!(stats.unmasked_samples, 0);
    assert_eq!(&stats.commands[..2], &[0xCC, 0x44]);
}

#[test]
fn unplugged_sensor_escalates_to_emergency_off() {
    let bus = SimBus::new(SimDevice::ds18b20(0x0031));
    let mut hw = hardware(&bus, 23);
    let cd = leak_countdown();
    let cfg = HeaterConfig {
        read_failed_period_max: 2,
        ..HeaterConfig::default()
    };
    let mut app = AppService::new(cfg, cd);
    let mut sink = RecordingSink::new();
    app.start(&mut hw, &mut sink);

    app.tick(&mut hw, &mut sink);
    assert!(hw.is_relay_on());

    let sensor = bus.unplug();
    for _ in 0..2 {
        cd.reload(0);
        app.tick(&mut hw, &mut sink);
        assert_eq!(app.state(), StateId::ErrorBackoff);
        assert!(hw.is_relay_on());
    }
    cd.reload(0);
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.state(), StateId::EmergencyOff);
    assert!(!hw.is_relay_on());
    assert!(!hw_init::gpio_read(23));
    assert_eq!(app.build_telemetry().last_error, Some(SensorError::NoPresence.code()));

    // Plugging the sensor back in clears the emergency on the next poll.
    bus.plug(sensor.unwrap());
    cd.reload(0);
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.state(), StateId::Idle);
    assert!(hw.is_relay_on());
    assert_eq!(app.consecutive_failures(), 0);
}

#[test]
fn corrupted_scratchpad_reports_bad_checksum() {
    let bus = SimBus::new(SimDevice::ds18b20(0x0191));
    bus.with_device(SimDevice::corrupt_scratchpad);
    let mut hw = hardware(&bus, 26);
    assert_eq!(hw.read_temperature(), Err(SensorError::BadChecksum));
}

#[test]
fn stuck_conversion_times_out() {
    let bus = SimBus::new(SimDevice::ds18b20(0x0191).stuck_converting());
    let mut hw = hardware(&bus, 29);
    assert_eq!(hw.read_temperature(), Err(SensorError::ConversionTimeout));
    // 256 polls, 10 ms apart.
    assert!(bus.stats().now_us >= 2_560_000);
}

#[test]
fn sensor_vanishing_mid_read_is_line_busy() {
    let bus = SimBus::new(SimDevice::ds18b20(0x0191).vanishing_after_convert());
    let mut hw = hardware(&bus, 32);
    assert_eq!(hw.read_temperature(), Err(SensorError::LineBusy));
}

#[test]
fn jumper_enables_readout() {
    let bus = SimBus::new(SimDevice::ds18b20(0x0191));
    let mut hw = hardware(&bus, 35);
    assert!(!hw.display_requested());
    hw_init::sim_set_level(37, false);
    assert!(hw.display_requested());
}

#[test]
fn identity_and_power_on_scratchpad() {
    let serial = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06];
    let bus = SimBus::new(SimDevice::ds18b20(POWER_ON_RAW).with_serial(serial));
    let mut hw = hardware(&bus, 38);

    let rom = hw.sensor_mut().read_serial_number().unwrap();
    assert_eq!(rom.family(), 0x28);
    assert_eq!(rom.serial(), serial);
    assert_eq!(rom.serial_hex().as_str(), "060504030201");

    let pad = hw.sensor_mut().read_scratchpad().unwrap();
    assert_eq!(pad.temperature(), DeciCelsius::new(850));
    assert_eq!(pad.resolution_bits(), 12);
    assert_eq!(bus.with_device(|d| d.conversions()), Some(0));
}

#[test]
fn negative_temperature_end_to_end() {
    // -10.125 C: 0xFF5E
    let bus = SimBus::new(SimDevice::ds18b20(-162));
    let mut hw = hardware(&bus, 41);
    let t = hw.read_temperature().unwrap();
    assert_eq!(t.tenths(), -101);
    assert_eq!(t.round_to_degrees(), -10);
}
