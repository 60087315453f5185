//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the blackboard the state handlers read from and write
//! to: the poll trigger and the latest sensor result go in, relay and
//! indicator commands come out. The service copies inputs in before a
//! tick and applies the commands to hardware after it.

use crate::config::HeaterConfig;
use crate::control::{Decision, Thresholds};
use crate::error::SensorError;
use crate::safety::FailureSupervisor;
use crate::sensors::DeciCelsius;

// ---------------------------------------------------------------------------
// Output commands (written by state handlers; applied by the service)
// ---------------------------------------------------------------------------

/// What the hardware should do after this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputCommands {
    /// Desired heater relay state.
    pub relay_on: bool,
    /// Flash the freeze alarm pattern once.
    pub freeze_alarm: bool,
    /// Whole-degree value to flash before actuating, if read-out is enabled.
    pub display_degrees: Option<i16>,
    /// Error to flash repeatedly until the next poll is due.
    pub error_code: Option<SensorError>,
}

impl OutputCommands {
    /// Heater off, nothing to show.
    pub fn all_off() -> Self {
        Self::default()
    }

    /// Clear the one-shot indicator requests, keeping the relay state.
    pub fn clear_indications(&mut self) {
        self.freeze_alarm = false;
        self.display_degrees = None;
        self.error_code = None;
    }
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

pub struct FsmContext {
    // -- Inputs --
    /// The poll countdown has expired; a sensor read is due.
    pub poll_due: bool,
    /// Result of the read performed this tick. Consumed by `Reading`.
    pub reading: Option<Result<DeciCelsius, SensorError>>,
    /// The mode-select input asks for the temperature read-out.
    pub display_requested: bool,

    // -- Outputs --
    pub commands: OutputCommands,

    // -- Configuration --
    pub config: HeaterConfig,
    pub thresholds: Thresholds,

    // -- Failure tracking --
    pub failures: FailureSupervisor,
    pub last_error: Option<SensorError>,
    pub last_temperature: Option<DeciCelsius>,
    pub last_decision: Option<Decision>,
}

impl FsmContext {
    pub fn new(config: HeaterConfig) -> Self {
        Self {
            poll_due: false,
            reading: None,
            display_requested: false,
            commands: OutputCommands::all_off(),
            thresholds: Thresholds::from(&config),
            failures: FailureSupervisor::new(config.read_failed_period_max),
            config,
            last_error: None,
            last_temperature: None,
            last_decision: None,
        }
    }

    pub fn consecutive_failures(&self) -> u16 {
        self.failures.consecutive_failures()
    }
}
