//! Integration tests: AppService → FSM → hysteresis → actuators.

use frostguard::app::events::AppEvent;
use frostguard::app::service::AppService;
use frostguard::config::{HeaterConfig, ADDR_READ_PERIOD};
use frostguard::control::Decision;
use frostguard::countdown::Countdown;
use frostguard::error::SensorError;
use frostguard::fsm::StateId;
use frostguard::sensors::DeciCelsius;

use crate::mock_hw::{leak_countdown, ActuatorCall, MemEeprom, MockHardware, RecordingSink};

struct Rig {
    app: AppService,
    hw: MockHardware,
    sink: RecordingSink,
    cd: &'static Countdown,
}

impl Rig {
    fn new(config: HeaterConfig) -> Self {
        let cd = leak_countdown();
        let mut rig = Self {
            app: AppService::new(config, cd),
            hw: MockHardware::new(),
            sink: RecordingSink::new(),
            cd,
        };
        rig.app.start(&mut rig.hw, &mut rig.sink);
        rig
    }

    /// Expire the countdown and run one control cycle.
    fn poll(&mut self) -> bool {
        self.cd.reload(0);
        self.app.tick(&mut self.hw, &mut self.sink)
    }
}

#[test]
fn hysteresis_sequence_with_defaults() {
    let mut rig = Rig::new(HeaterConfig::default());
    let temps = [10, 9, 8, 7, -11, 7];
    let expected = [false, false, true, true, false, true];

    for (t, want) in temps.iter().zip(expected) {
        rig.hw.push_degrees(*t);
        assert!(rig.poll());
        assert_eq!(rig.hw.relay, want, "relay after {t} C");
        assert_eq!(rig.app.state(), StateId::Idle);
    }
    assert_eq!(rig.hw.count(ActuatorCall::FreezeAlarm), 1);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::FreezeAlarm(_))),
        1
    );
}

#[test]
fn band_holds_previous_relay_state() {
    let cfg = HeaterConfig {
        temp_on_c: 5,
        temp_off_c: 8,
        ..HeaterConfig::default()
    };
    let mut rig = Rig::new(cfg);

    rig.hw.push_degrees(6);
    rig.poll();
    assert!(!rig.hw.relay, "band from cold start stays off");

    rig.hw.push_degrees(4);
    rig.hw.push_degrees(6);
    rig.hw.push_degrees(7);
    rig.poll();
    rig.poll();
    rig.poll();
    assert!(rig.hw.relay, "band after turn-on stays on");

    let holds = rig.sink.count(|e| {
        matches!(
            e,
            AppEvent::Reading {
                decision: Decision::Hold,
                ..
            }
        )
    });
    assert_eq!(holds, 3);
}

#[test]
fn readings_are_rounded_before_comparison() {
    let mut rig = Rig::new(HeaterConfig::default());
    // 8.4 rounds to 8 (turn on), 8.5 rounds to 9 (turn off).
    rig.hw.readings.push_back(Ok(DeciCelsius::new(84)));
    rig.poll();
    assert!(rig.hw.relay);
    rig.hw.readings.push_back(Ok(DeciCelsius::new(85)));
    rig.poll();
    assert!(!rig.hw.relay);
}

#[test]
fn negative_readings_round_away_from_zero_at_freeze_boundary() {
    let mut rig = Rig::new(HeaterConfig::default());
    let alarms = |hw: &MockHardware| hw.count(ActuatorCall::FreezeAlarm);

    // -9.5 rounds to -10: at the freeze threshold.
    rig.hw.readings.push_back(Ok(DeciCelsius::new(-95)));
    rig.poll();
    assert_eq!(alarms(&rig.hw), 1);
    assert!(!rig.hw.relay);

    // -9.4 rounds to -9: above freeze, below turn-on.
    rig.hw.readings.push_back(Ok(DeciCelsius::new(-94)));
    rig.poll();
    assert_eq!(alarms(&rig.hw), 1);
    assert!(rig.hw.relay);

    // -10.5 rounds to -11.
    rig.hw.readings.push_back(Ok(DeciCelsius::new(-105)));
    rig.poll();
    assert_eq!(alarms(&rig.hw), 2);
    assert!(!rig.hw.relay);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::FreezeAlarm(_))),
        2
    );
}

#[test]
fn escalation_to_emergency_off_and_recovery() {
    let cfg = HeaterConfig {
        read_period_secs: 10,
        read_failed_period_max: 3,
        ..HeaterConfig::default()
    };
    let mut rig = Rig::new(cfg);

    rig.hw.push_degrees(5);
    rig.poll();
    assert!(rig.hw.relay);

    for n in 1..=3 {
        rig.hw.push_error(SensorError::NoPresence);
        rig.poll();
        assert_eq!(rig.app.state(), StateId::ErrorBackoff, "failure {n}");
        assert!(rig.hw.relay, "relay held during backoff");
        assert_eq!(rig.app.consecutive_failures(), n);
    }

    rig.hw.push_error(SensorError::NoPresence);
    rig.poll();
    assert_eq!(rig.app.state(), StateId::EmergencyOff);
    assert!(!rig.hw.relay);

    rig.hw.push_error(SensorError::NoPresence);
    rig.poll();
    assert_eq!(rig.app.state(), StateId::EmergencyOff);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::EmergencyOff { .. })),
        1
    );

    rig.hw.push_degrees(5);
    rig.poll();
    assert_eq!(rig.app.state(), StateId::Idle);
    assert!(rig.hw.relay);
    assert_eq!(rig.app.consecutive_failures(), 0);
}

#[test]
fn repeated_no_presence_counts_up() {
    let mut rig = Rig::new(HeaterConfig::default());
    for expected in 1..=5u16 {
        rig.poll();
        let last = rig.sink.events.iter().rev().find_map(|e| match e {
            AppEvent::SensorFault { error, consecutive } => Some((*error, *consecutive)),
            _ => None,
        });
        assert_eq!(last, Some((SensorError::NoPresence, expected)));
    }
    assert_eq!(rig.app.build_telemetry().last_error, Some(0x8001));
}

#[test]
fn error_code_flashes_until_next_poll() {
    let mut rig = Rig::new(HeaterConfig::default());
    rig.hw.push_error(SensorError::BadChecksum);
    rig.poll();
    assert!(!rig.hw.led, "LED belongs to the flash code");

    assert!(rig.app.render_pending(&mut rig.hw));
    assert!(rig.app.render_pending(&mut rig.hw));
    assert_eq!(rig.hw.count(ActuatorCall::FlashError(4)), 2);

    rig.hw.push_degrees(20);
    rig.poll();
    assert!(!rig.app.render_pending(&mut rig.hw));
    assert!(rig.hw.led, "idle heater lights the LED again");
}

#[test]
fn display_readout_precedes_relay_change() {
    let mut rig = Rig::new(HeaterConfig::default());
    rig.hw.display = true;
    rig.hw.push_degrees(-3);
    rig.poll();

    let flash = rig
        .hw
        .calls
        .iter()
        .position(|c| *c == ActuatorCall::FlashTemperature(-3));
    let relay = rig
        .hw
        .calls
        .iter()
        .position(|c| *c == ActuatorCall::Relay(true));
    assert!(flash.is_some());
    assert!(flash < relay);
}

#[test]
fn no_readout_without_jumper() {
    let mut rig = Rig::new(HeaterConfig::default());
    rig.hw.push_degrees(12);
    rig.poll();
    assert!(
        !rig
            .hw
            .calls
            .iter()
            .any(|c| matches!(c, ActuatorCall::FlashTemperature(_)))
    );
}

#[test]
fn poll_waits_for_countdown() {
    let mut rig = Rig::new(HeaterConfig::default());
    rig.hw.push_degrees(20);
    assert!(rig.app.tick(&mut rig.hw, &mut rig.sink), "first poll is immediate");
    assert_eq!(rig.cd.remaining(), 10);

    for _ in 0..5 {
        assert!(!rig.app.tick(&mut rig.hw, &mut rig.sink));
    }
    for _ in 0..10 {
        rig.cd.tick_second();
    }
    rig.hw.push_degrees(20);
    assert!(rig.app.tick(&mut rig.hw, &mut rig.sink));
    assert_eq!(rig.hw.sensor_reads, 2);
}

#[test]
fn first_boot_writes_defaults_before_any_read() {
    let mut eeprom = MemEeprom::erased();
    let (cfg, first_boot) = HeaterConfig::load_or_init(&mut eeprom).unwrap();
    assert!(first_boot);
    assert_eq!(cfg, HeaterConfig::default());
    assert_eq!(eeprom.writes.len(), 5);
    assert_eq!(eeprom.cells[ADDR_READ_PERIOD as usize], 10);

    let mut rig = Rig::new(cfg);
    assert_eq!(rig.hw.sensor_reads, 0);
    assert_eq!(rig.hw.calls.first(), Some(&ActuatorCall::AllOff));
    rig.poll();
    assert_eq!(rig.hw.sensor_reads, 1);

    let (_, again) = HeaterConfig::load_or_init(&mut eeprom).unwrap();
    assert!(!again);
    assert_eq!(eeprom.writes.len(), 5);
}

#[test]
fn telemetry_serialises_to_json() {
    let mut rig = Rig::new(HeaterConfig::default());
    rig.hw.push_degrees(3);
    rig.poll();
    let json = serde_json::to_string(&rig.app.build_telemetry()).unwrap();
    assert!(json.contains(r#""state":"Idle""#), "{json}");
    assert!(json.contains(r#""temperature":30"#), "{json}");
    assert!(json.contains(r#""relay_on":true"#), "{json}");
    assert!(json.contains(r#""last_error":null"#), "{json}");
}
