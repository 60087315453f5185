//! Two-threshold relay control with a freeze cut-off.
//!
//! Evaluated on whole degrees, in this order:
//!
//! ```text
//!   t <= freeze          → OFF + freeze alarm
//!   t >= off             → OFF
//!   t <= on              → ON
//!   on < t < off         → hold previous state
//! ```
//!
//! The freeze branch wins over everything: a reading that low means the
//! sensor sits in ice or the heater has already failed, and running it
//! against a frozen pipe is pointless.

use crate::config::HeaterConfig;

/// Relay thresholds in whole degrees Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub on: i16,
    pub off: i16,
    pub freeze: i16,
}

impl From<&HeaterConfig> for Thresholds {
    fn from(cfg: &HeaterConfig) -> Self {
        Self {
            on: i16::from(cfg.temp_on_c),
            off: i16::from(cfg.temp_off_c),
            freeze: i16::from(cfg.temp_freeze_c),
        }
    }
}

/// Outcome of one hysteresis evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// At or below the freeze threshold.
    FreezeOff,
    Off,
    On,
    /// Inside the band; keep whatever the relay is doing.
    Hold,
}

impl Decision {
    /// Relay state after applying this decision to the current one.
    pub const fn apply(self, relay_on: bool) -> bool {
        match self {
            Self::FreezeOff | Self::Off => false,
            Self::On => true,
            Self::Hold => relay_on,
        }
    }

    pub const fn is_freeze(self) -> bool {
        matches!(self, Self::FreezeOff)
    }
}

pub fn decide(degrees: i16, th: &Thresholds) -> Decision {
    if degrees <= th.freeze {
        Decision::FreezeOff
    } else if degrees >= th.off {
        Decision::Off
    } else if degrees <= th.on {
        Decision::On
    } else {
        Decision::Hold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TH: Thresholds = Thresholds {
        on: 8,
        off: 9,
        freeze: -10,
    };

    #[test]
    fn default_sequence() {
        let mut relay = false;
        let mut out = Vec::new();
        for t in [10, 9, 8, 7, -11, 7] {
            relay = decide(t, &TH).apply(relay);
            out.push(relay);
        }
        assert_eq!(out, [false, false, true, true, false, true]);
    }

    #[test]
    fn freeze_boundary_is_inclusive() {
        assert_eq!(decide(-10, &TH), Decision::FreezeOff);
        assert_eq!(decide(-9, &TH), Decision::On);
    }

    #[test]
    fn band_holds_previous_state() {
        let th = Thresholds {
            on: 5,
            off: 10,
            freeze: -10,
        };
        assert_eq!(decide(7, &th), Decision::Hold);
        assert!(decide(7, &th).apply(true));
        assert!(!decide(7, &th).apply(false));
    }

    #[test]
    fn off_wins_when_band_is_inverted() {
        let th = Thresholds {
            on: 10,
            off: 5,
            freeze: -10,
        };
        assert_eq!(decide(7, &th), Decision::Off);
    }

    #[test]
    fn thresholds_from_config() {
        let th = Thresholds::from(&HeaterConfig::default());
        assert_eq!(th, TH);
    }
}
