//! Sensor-failure supervisor.
//!
//! Sensor errors are never fatal on their own: the relay keeps its last
//! commanded state while the failures stay within tolerance. Once the
//! consecutive-failure count exceeds `read_failed_period_max` the heater
//! is cut (emergency-off), and it stays cut until a read succeeds again.
//!
//! ## Fault lifecycle
//!
//! 1. A poll fails; [`FailureSupervisor::record_failure`] increments the count.
//! 2. `count <= max`: [`Verdict::Tolerated`], relay unchanged.
//! 3. `count > max`: [`Verdict::EmergencyOff`] on this and every further
//!    failure.
//! 4. Any successful poll resets the count and clears the trip.

use log::{error, info, warn};

use crate::error::SensorError;

/// What the control loop must do after a failed poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Keep the relay as it is and try again next period.
    Tolerated,
    /// Force the relay off.
    EmergencyOff,
}

#[derive(Debug, Clone)]
pub struct FailureSupervisor {
    max_failures: u8,
    consecutive: u16,
    tripped: bool,
}

impl FailureSupervisor {
    pub fn new(max_failures: u8) -> Self {
        Self {
            max_failures,
            consecutive: 0,
            tripped: false,
        }
    }

    pub fn record_failure(&mut self, err: SensorError) -> Verdict {
        self.consecutive = self.consecutive.saturating_add(1);
        if self.consecutive > u16::from(self.max_failures) {
            if !self.tripped {
                error!(
                    "SAFETY: {} consecutive sensor failures (last: {err}), heater forced off",
                    self.consecutive
                );
            }
            self.tripped = true;
            Verdict::EmergencyOff
        } else {
            warn!(
                "Sensor failure {}/{}: {err}",
                self.consecutive, self.max_failures
            );
            Verdict::Tolerated
        }
    }

    pub fn record_success(&mut self) {
        if self.tripped {
            info!("SAFETY: sensor recovered, emergency-off cleared");
        }
        self.consecutive = 0;
        self.tripped = false;
    }

    pub fn consecutive_failures(&self) -> u16 {
        self.consecutive
    }

    pub fn is_tripped(&self) -> bool {
        self.tripped
    }
}
