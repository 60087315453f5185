//! Concrete state handler functions and table builder.
//!
//! Each state is three plain `fn` pointers; no closures, no dynamic
//! dispatch, no heap.
//!
//! ```text
//!                 ┌────────[success]────────┐
//!                 ▼                          │
//!  IDLE ──[poll due]──▶ READING ──[error, count <= max]──▶ ERROR_BACKOFF
//!                          │  ▲                                  │
//!                          │  └────────────[poll due]────────────┘
//!                          │  ▲
//!            [error, count > max]
//!                          ▼  │
//!                    EMERGENCY_OFF ──[poll due]──▶ READING
//! ```
//!
//! Only a successful read leaves the error states for good; emergency-off
//! clears itself the moment the sensor answers again.

use log::{debug, info, warn};

use super::context::FsmContext;
use super::{StateDescriptor, StateId};
use crate::control;
use crate::safety::Verdict;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Idle
        StateDescriptor {
            id: StateId::Idle,
            name: "Idle",
            on_enter: None,
            on_exit: None,
            on_update: wait_for_poll,
        },
        // Index 1: Reading
        StateDescriptor {
            id: StateId::Reading,
            name: "Reading",
            on_enter: Some(reading_enter),
            on_exit: None,
            on_update: reading_update,
        },
        // Index 2: ErrorBackoff
        StateDescriptor {
            id: StateId::ErrorBackoff,
            name: "ErrorBackoff",
            on_enter: Some(backoff_enter),
            on_exit: None,
            on_update: wait_for_poll,
        },
        // Index 3: EmergencyOff
        StateDescriptor {
            id: StateId::EmergencyOff,
            name: "EmergencyOff",
            on_enter: Some(emergency_enter),
            on_exit: Some(emergency_exit),
            on_update: wait_for_poll,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  Shared update for every waiting state
// ═══════════════════════════════════════════════════════════════════════════

fn wait_for_poll(ctx: &mut FsmContext) -> Option<StateId> {
    ctx.poll_due.then_some(StateId::Reading)
}

// ═══════════════════════════════════════════════════════════════════════════
//  READING state
// ═══════════════════════════════════════════════════════════════════════════

fn reading_enter(ctx: &mut FsmContext) {
    ctx.commands.clear_indications();
}

fn reading_update(ctx: &mut FsmContext) -> Option<StateId> {
    let reading = ctx.reading.take()?;

    match reading {
        Ok(t) => {
            ctx.failures.record_success();
            ctx.last_error = None;
            ctx.last_temperature = Some(t);

            let degrees = t.round_to_degrees();
            if ctx.display_requested {
                ctx.commands.display_degrees = Some(degrees);
            }

            let decision = control::decide(degrees, &ctx.thresholds);
            let relay = decision.apply(ctx.commands.relay_on);
            if relay != ctx.commands.relay_on {
                info!(
                    "Heater {} at {t} C ({decision:?})",
                    if relay { "ON" } else { "OFF" }
                );
            }
            ctx.commands.relay_on = relay;
            ctx.commands.freeze_alarm = decision.is_freeze();
            ctx.last_decision = Some(decision);

            Some(StateId::Idle)
        }
        Err(e) => {
            ctx.last_error = Some(e);
            ctx.commands.error_code = Some(e);
            match ctx.failures.record_failure(e) {
                Verdict::Tolerated => Some(StateId::ErrorBackoff),
                Verdict::EmergencyOff => Some(StateId::EmergencyOff),
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  ERROR_BACKOFF state
// ═══════════════════════════════════════════════════════════════════════════

fn backoff_enter(ctx: &mut FsmContext) {
    // Relay deliberately untouched: a few lost reads must not cycle the heater.
    debug!(
        "Backoff: relay held {} after {} failure(s)",
        if ctx.commands.relay_on { "ON" } else { "OFF" },
        ctx.consecutive_failures()
    );
}

// ═══════════════════════════════════════════════════════════════════════════
//  EMERGENCY_OFF state
// ═══════════════════════════════════════════════════════════════════════════

fn emergency_enter(ctx: &mut FsmContext) {
    if ctx.commands.relay_on {
        warn!("EmergencyOff: heater relay forced OFF");
    }
    ctx.commands.relay_on = false;
}

fn emergency_exit(ctx: &mut FsmContext) {
    debug!(
        "EmergencyOff: leaving after {} failure(s)",
        ctx.consecutive_failures()
    );
}
