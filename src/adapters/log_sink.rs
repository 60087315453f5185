//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! Telemetry snapshots are emitted as one JSON line each so a serial
//! logger on the other end can parse them.

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => match serde_json::to_string(t) {
                Ok(json) => info!("TELEM | {}", json),
                Err(e) => warn!("TELEM | serialise failed: {}", e),
            },
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::Reading {
                temperature,
                decision,
                relay_on,
            } => {
                info!(
                    "READ  | T={}\u{00b0}C | {:?} | relay={}",
                    temperature,
                    decision,
                    if *relay_on { "ON" } else { "OFF" },
                );
            }
            AppEvent::SensorFault { error, consecutive } => {
                warn!("FAULT | {} | consecutive={}", error, consecutive);
            }
            AppEvent::EmergencyOff { consecutive } => {
                error!(
                    "FAULT | emergency off after {} consecutive failures",
                    consecutive
                );
            }
            AppEvent::FreezeAlarm(t) => {
                warn!("FREEZE | T={}\u{00b0}C at or below freeze threshold", t);
            }
            AppEvent::Started { state, config } => {
                info!(
                    "START | initial_state={:?} | on={}\u{00b0}C off={}\u{00b0}C \
                     freeze={}\u{00b0}C | period={}s max_failed={}",
                    state,
                    config.temp_on_c,
                    config.temp_off_c,
                    config.temp_freeze_c,
                    config.read_period_secs,
                    config.read_failed_period_max,
                );
            }
        }
    }
}
