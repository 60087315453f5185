//! Poll countdown shared between the periodic timer callback and the main
//! loop.
//!
//! ```text
//! ┌──────────────┐ on_timer_tick()  ┌─────────────┐  expired()/reload()  ┌───────────┐
//! │ esp_timer    │─────────────────▶│  Countdown  │◀─────────────────────│ Main loop │
//! │ (50 ms)      │                  │  (atomics)  │                      │           │
//! └──────────────┘                  └─────────────┘                      └───────────┘
//! ```
//!
//! The timer prescales its ticks into whole seconds and decrements the
//! seconds counter, saturating at zero. The main loop polls the sensor
//! when the counter reads zero and reloads it with the poll period. Both
//! sides only touch the counters through atomic read-modify-write, so a
//! reload racing a decrement never tears.
//!
//! The counter starts at zero: the first sensor read happens on the first
//! loop pass after boot.

use core::sync::atomic::{AtomicU8, Ordering};

/// Timer callbacks per second. The hardware timer runs at
/// `1000 / TICKS_PER_SECOND` ms.
pub const TICKS_PER_SECOND: u8 = 20;
/// Period of the hardware tick in microseconds.
pub const TICK_PERIOD_US: u64 = 1_000_000 / TICKS_PER_SECOND as u64;

pub struct Countdown {
    sub_ticks: AtomicU8,
    seconds: AtomicU8,
}

/// The instance driven by the hardware timer.
pub static COUNTDOWN: Countdown = Countdown::new();

impl Default for Countdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Countdown {
    pub const fn new() -> Self {
        Self {
            sub_ticks: AtomicU8::new(0),
            seconds: AtomicU8::new(0),
        }
    }

    /// Timer callback entry point. Every `TICKS_PER_SECOND` calls one
    /// second elapses.
    pub fn on_timer_tick(&self) {
        let prev = self
            .sub_ticks
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |t| {
                Some(if t + 1 >= TICKS_PER_SECOND { 0 } else { t + 1 })
            })
            .unwrap_or(0);
        if prev + 1 >= TICKS_PER_SECOND {
            self.tick_second();
        }
    }

    /// One second elapsed. Decrements, saturating at zero.
    pub fn tick_second(&self) {
        // Err just means the counter was already zero.
        let _ = self
            .seconds
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |s| s.checked_sub(1));
    }

    pub fn expired(&self) -> bool {
        self.seconds.load(Ordering::Acquire) == 0
    }

    pub fn remaining(&self) -> u8 {
        self.seconds.load(Ordering::Acquire)
    }

    pub fn reload(&self, seconds: u8) {
        self.seconds.store(seconds, Ordering::Release);
    }
}
