//! Frostguard Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter            LogEventSink       NvsAdapter      │
//! │  (DS18x20 + relay + LED)    (EventSink)        (EepromPort)    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  FSM · Hysteresis · Failure supervisor                 │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  esp_timer ──▶ Countdown ──▶ main loop                         │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::{Ets, FreeRtos};
use esp_idf_hal::gpio::{PinDriver, Pull};
use esp_idf_hal::peripherals::Peripherals;
use log::{error, info, warn};

use frostguard::adapters::hardware::HardwareAdapter;
use frostguard::adapters::log_sink::LogEventSink;
use frostguard::adapters::nvs::NvsAdapter;
use frostguard::app::events::AppEvent;
use frostguard::app::ports::EventSink;
use frostguard::app::service::AppService;
use frostguard::config::HeaterConfig;
use frostguard::countdown::{COUNTDOWN, TICK_PERIOD_US};
use frostguard::drivers::led_patterns::FlashPlayer;
use frostguard::drivers::mode_switch::ModeSwitch;
use frostguard::drivers::relay::RelayDriver;
use frostguard::drivers::status_led::StatusLed;
use frostguard::drivers::watchdog::Watchdog;
use frostguard::drivers::{hw_init, hw_timer};
use frostguard::error::Error;
use frostguard::onewire::{CriticalSectionMask, OneWire, OneWireBus};
use frostguard::pins;
use frostguard::sensors::Ds18x20;

/// Idle sleep between loop passes when nothing is due.
const LOOP_SLEEP_MS: u32 = (TICK_PERIOD_US / 1000) as u32;

fn init_hardware() -> frostguard::error::Result<()> {
    hw_init::init_peripherals().map_err(|e| {
        error!("HAL init failed: {}", e);
        Error::Init("gpio")
    })?;
    hw_timer::start_timers().map_err(|e| {
        error!("{}", e);
        Error::Init("tick timer")
    })
}

/// Log what the sensor reports about itself before the loop starts.
fn log_sensor_identity<B: OneWireBus>(sensor: &mut Ds18x20<B, Watchdog>) {
    match sensor.read_serial_number() {
        Ok(rom) => info!(
            "Sensor: {} serial={} rom={}",
            rom.family_name(),
            rom.serial_hex(),
            rom
        ),
        Err(e) => warn!("Sensor: ROM read failed ({})", e),
    }
    match sensor.read_scratchpad() {
        Ok(pad) => info!(
            "Sensor: scratchpad T={} TH={} TL={} resolution={} bits",
            pad.temperature(),
            pad.alarm_high(),
            pad.alarm_low(),
            pad.resolution_bits()
        ),
        Err(e) => warn!("Sensor: scratchpad read failed ({})", e),
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Frostguard v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Peripherals, tick timer, watchdog ──────────────────
    init_hardware()?;
    let watchdog = Watchdog::new();

    // ── 3. Config from NVS (defaults written on first boot) ───
    let config = match NvsAdapter::new() {
        Ok(mut nvs) => match HeaterConfig::load_or_init(&mut nvs) {
            Ok((cfg, first_boot)) => {
                if first_boot {
                    info!("Config: first boot, defaults persisted");
                }
                cfg
            }
            Err(e) => {
                warn!("NVS config load failed ({}), using defaults", e);
                HeaterConfig::default()
            }
        },
        Err(e) => {
            warn!("NVS init failed ({}), running with defaults", e);
            HeaterConfig::default()
        }
    };

    // ── 4. 1-Wire bus + sensor ────────────────────────────────
    let peripherals = Peripherals::take()?;
    // gpio4 == pins::ONEWIRE_GPIO
    let mut line = PinDriver::input_output_od(peripherals.pins.gpio4)?;
    line.set_pull(Pull::Up)?;
    line.set_high()?;
    let bus = OneWire::new(line, Ets, CriticalSectionMask);
    let mut sensor = Ds18x20::new(bus, watchdog);
    log_sensor_identity(&mut sensor);

    // ── 5. Adapters ───────────────────────────────────────────
    let mut hw = HardwareAdapter::new(
        sensor,
        RelayDriver::new(pins::RELAY_GPIO),
        StatusLed::new(pins::STATUS_LED_GPIO),
        ModeSwitch::new(pins::MODE_SWITCH_GPIO),
        FlashPlayer::new(FreeRtos, watchdog),
    );
    let mut log_sink = LogEventSink::new();

    // ── 6. App service ────────────────────────────────────────
    let mut app = AppService::new(config, &COUNTDOWN);
    app.start(&mut hw, &mut log_sink);

    info!("System ready. Entering control loop.");

    // ── 7. Control loop ───────────────────────────────────────
    loop {
        watchdog.feed();

        if app.tick(&mut hw, &mut log_sink) {
            log_sink.emit(&AppEvent::Telemetry(app.build_telemetry()));
            continue;
        }

        // Error codes repeat until the next poll; otherwise just wait.
        if !app.render_pending(&mut hw) {
            FreeRtos::delay_ms(LOOP_SLEEP_MS);
        }
    }
}
