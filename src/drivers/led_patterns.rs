//! Blocking flash-code renderer for the single status LED.
//!
//! Everything the board has to say goes through one LED, so values are
//! encoded as pulse trains. All durations are in 100 ms steps and the
//! watchdog is fed after every step, so a long pattern never trips it.
//!
//! | Pattern       | Encoding                                              |
//! |---------------|-------------------------------------------------------|
//! | Number -99..99| minus: 1 × (off 1.0 s, on 3.0 s), then 0.7 s gap      |
//! |               | tens:  n × (off 0.7 s, on 1.1 s), then 1.0 s gap      |
//! |               | units: n × (off 0.7 s, on 0.5 s), then 1.5 s gap      |
//! | Error code    | n × (off 0.5 s, on 0.2 s), then 1.5 s gap             |
//! | Freeze alarm  | 10 × (off 0.2 s, on 0.2 s)                            |
//!
//! Every train ends with the LED off.

use embedded_hal::delay::DelayNs;

use crate::app::ports::WatchdogPort;

/// Length of one pattern step.
pub const STEP_MS: u32 = 100;

/// Gap after an error burst or a displayed number.
pub const BURST_GAP_STEPS: u8 = 15;

/// Anything that can be switched on and off.
pub trait Indicator {
    fn set(&mut self, on: bool);
}

/// Timing of one pulse train: `count` × (`off_steps` dark, `on_steps` lit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pulses {
    pub count: u8,
    pub off_steps: u8,
    pub on_steps: u8,
}

impl Pulses {
    pub const fn new(count: u8, off_steps: u8, on_steps: u8) -> Self {
        Self {
            count,
            off_steps,
            on_steps,
        }
    }

    /// Total duration in steps.
    pub const fn steps(&self) -> u32 {
        self.count as u32 * (self.off_steps as u32 + self.on_steps as u32)
    }
}

const MINUS: Pulses = Pulses::new(1, 10, 30);
const MINUS_GAP_STEPS: u8 = 7;
const TENS_OFF: u8 = 7;
const TENS_ON: u8 = 11;
const DIGIT_GAP_STEPS: u8 = 10;
const UNITS_OFF: u8 = 7;
const UNITS_ON: u8 = 5;
const ERROR_OFF: u8 = 5;
const ERROR_ON: u8 = 2;
const FREEZE_ALARM: Pulses = Pulses::new(10, 2, 2);

pub struct FlashPlayer<D, W> {
    delay: D,
    watchdog: W,
}

impl<D: DelayNs, W: WatchdogPort> FlashPlayer<D, W> {
    pub fn new(delay: D, watchdog: W) -> Self {
        Self { delay, watchdog }
    }

    /// Wait `steps` × 100 ms, feeding the watchdog each step.
    pub fn pause(&mut self, steps: u8) {
        for _ in 0..steps {
            self.delay.delay_ms(STEP_MS);
            self.watchdog.feed();
        }
    }

    pub fn flash(&mut self, led: &mut impl Indicator, pulses: Pulses) {
        for _ in 0..pulses.count {
            led.set(false);
            self.pause(pulses.off_steps);
            led.set(true);
            self.pause(pulses.on_steps);
        }
        led.set(false);
    }

    /// Render a whole-degree value, followed by the gap that keeps the
    /// last units pulse apart from whatever the LED shows next.
    /// Magnitudes above 99 are clamped.
    pub fn number(&mut self, led: &mut impl Indicator, value: i16) {
        let value = value.clamp(-99, 99);
        if value < 0 {
            self.flash(led, MINUS);
            self.pause(MINUS_GAP_STEPS);
        }
        let magnitude = value.unsigned_abs() as u8;
        self.flash(led, Pulses::new(magnitude / 10, TENS_OFF, TENS_ON));
        self.pause(DIGIT_GAP_STEPS);
        self.flash(led, Pulses::new(magnitude % 10, UNITS_OFF, UNITS_ON));
        self.pause(BURST_GAP_STEPS);
    }

    /// One error burst plus the gap that separates repeats.
    pub fn error(&mut self, led: &mut impl Indicator, code: u8) {
        self.flash(led, Pulses::new(code, ERROR_OFF, ERROR_ON));
        self.pause(BURST_GAP_STEPS);
    }

    pub fn freeze_alarm(&mut self, led: &mut impl Indicator) {
        self.flash(led, FREEZE_ALARM);
    }
}
