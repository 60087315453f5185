//! Application service, the hexagonal core.
//!
//! [`AppService`] owns the FSM and its context and is driven by the poll
//! countdown. All I/O flows through port traits injected at call sites,
//! making the whole control loop testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌─────────────────────────────┐ ──▶ EventSink
//!                 │         AppService           │
//! ActuatorPort ◀──│  FSM · Hysteresis · Failures │◀── Countdown
//!                 └─────────────────────────────┘
//! ```
//!
//! One main-loop pass is:
//!
//! 1. [`tick`](AppService::tick): if the countdown expired, read the
//!    sensor, run the FSM to a settled state, apply relay/LED and reload
//!    the countdown.
//! 2. [`render_pending`](AppService::render_pending): while a failure is
//!    being reported, flash its code once per call until the next poll is
//!    due.

use log::info;

use crate::config::HeaterConfig;
use crate::countdown::Countdown;
use crate::fsm::context::FsmContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};

use super::events::{AppEvent, TelemetryData};
use super::ports::{ActuatorPort, EventSink, SensorPort};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

pub struct AppService {
    fsm: Fsm,
    ctx: FsmContext,
    countdown: &'static Countdown,
    polls: u32,
}

impl AppService {
    /// Construct the service. Does **not** start the FSM; call
    /// [`start`](Self::start) next.
    pub fn new(config: HeaterConfig, countdown: &'static Countdown) -> Self {
        Self {
            fsm: Fsm::new(build_state_table(), StateId::Idle),
            ctx: FsmContext::new(config),
            countdown,
            polls: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Start the FSM in Idle with every output off.
    pub fn start(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        hw.all_off();
        self.fsm.start(&mut self.ctx);
        sink.emit(&AppEvent::Started {
            state: self.fsm.current_state(),
            config: self.ctx.config,
        });
        info!("AppService started in {:?}", self.fsm.current_state());
    }

    // ── Per-pass orchestration ────────────────────────────────

    /// Run one control cycle if a poll is due. Returns `true` if the
    /// sensor was read.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`]; this avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    pub fn tick(
        &mut self,
        hw: &mut (impl SensorPort + ActuatorPort),
        sink: &mut impl EventSink,
    ) -> bool {
        let prev_state = self.fsm.current_state();

        // 1. Let the waiting state notice the expired countdown.
        self.ctx.poll_due = self.countdown.expired();
        self.fsm.tick(&mut self.ctx);
        if self.fsm.current_state() != StateId::Reading {
            return false;
        }

        // 2. Read and settle.
        self.ctx.display_requested = hw.display_requested();
        let reading = hw.read_temperature();
        self.polls = self.polls.wrapping_add(1);
        self.ctx.poll_due = false;
        self.ctx.reading = Some(reading);
        self.fsm.tick(&mut self.ctx);

        // 3. Outputs, then start the next period.
        self.apply_outputs(hw, sink);
        self.countdown.reload(self.ctx.config.read_period_secs);

        // 4. Events.
        let new_state = self.fsm.current_state();
        match reading {
            Ok(temperature) => {
                if let Some(decision) = self.ctx.last_decision {
                    sink.emit(&AppEvent::Reading {
                        temperature,
                        decision,
                        relay_on: self.ctx.commands.relay_on,
                    });
                }
            }
            Err(error) => {
                sink.emit(&AppEvent::SensorFault {
                    error,
                    consecutive: self.ctx.consecutive_failures(),
                });
                if new_state == StateId::EmergencyOff && prev_state != StateId::EmergencyOff {
                    sink.emit(&AppEvent::EmergencyOff {
                        consecutive: self.ctx.consecutive_failures(),
                    });
                }
            }
        }
        if new_state != prev_state {
            sink.emit(&AppEvent::StateChanged {
                from: prev_state,
                to: new_state,
            });
        }
        true
    }

    /// Flash the pending error code once if the next poll is not yet due.
    /// Returns `true` if anything was rendered; the caller loops on this
    /// between polls.
    pub fn render_pending(&mut self, hw: &mut impl ActuatorPort) -> bool {
        match self.ctx.commands.error_code {
            Some(error) if !self.countdown.expired() => {
                hw.flash_error(error.flash_code());
                true
            }
            _ => false,
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn build_telemetry(&self) -> TelemetryData {
        TelemetryData {
            state: self.fsm.current_state(),
            temperature: self.ctx.last_temperature,
            relay_on: self.ctx.commands.relay_on,
            consecutive_failures: self.ctx.consecutive_failures(),
            last_error: self.ctx.last_error.map(|e| e.code()),
            polls: self.polls,
            next_poll_secs: self.countdown.remaining(),
        }
    }

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn config(&self) -> &HeaterConfig {
        &self.ctx.config
    }

    pub fn relay_on(&self) -> bool {
        self.ctx.commands.relay_on
    }

    pub fn consecutive_failures(&self) -> u16 {
        self.ctx.consecutive_failures()
    }

    pub fn polls(&self) -> u32 {
        self.polls
    }

    // ── Internal ──────────────────────────────────────────────

    /// Translate FSM output commands into port calls, in the order the
    /// user sees them: read-out, relay, freeze alarm, steady LED.
    fn apply_outputs(&self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        let cmds = self.ctx.commands;

        if let Some(degrees) = cmds.display_degrees {
            hw.flash_temperature(degrees);
        }

        hw.set_relay(cmds.relay_on);

        if cmds.freeze_alarm {
            if let Some(t) = self.ctx.last_temperature {
                sink.emit(&AppEvent::FreezeAlarm(t));
            }
            hw.flash_freeze_alarm();
        }

        // LED lit means "heater idle"; during a failure the flash code owns it.
        let led = cmds.error_code.is_none() && !cmds.relay_on;
        hw.set_led(led);
    }
}
