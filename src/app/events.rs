//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them; on the device they become log lines.

use serde::Serialize;

use crate::config::HeaterConfig;
use crate::control::Decision;
use crate::error::SensorError;
use crate::fsm::StateId;
use crate::sensors::DeciCelsius;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The service has started (initial state and active configuration).
    Started { state: StateId, config: HeaterConfig },

    /// The FSM settled in a different state than before the tick.
    StateChanged { from: StateId, to: StateId },

    /// A poll succeeded.
    Reading {
        temperature: DeciCelsius,
        decision: Decision,
        relay_on: bool,
    },

    /// A poll failed.
    SensorFault { error: SensorError, consecutive: u16 },

    /// Failures exceeded the tolerance; the heater was forced off.
    EmergencyOff { consecutive: u16 },

    /// The freeze threshold was reached.
    FreezeAlarm(DeciCelsius),

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),
}

/// A point-in-time telemetry snapshot, serialised as one JSON line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TelemetryData {
    pub state: StateId,
    /// Last good reading in tenths of a degree.
    pub temperature: Option<DeciCelsius>,
    pub relay_on: bool,
    pub consecutive_failures: u16,
    /// Sentinel code of the last failure, cleared by a good read.
    pub last_error: Option<u16>,
    pub polls: u32,
    /// Seconds until the next poll.
    pub next_poll_secs: u8,
}
