//! GPIO assignments for the Frostguard controller board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// 1-Wire bus
// ---------------------------------------------------------------------------

/// DS18x20 data line. Open-drain, external 4.7 kΩ pull-up to 3.3 V.
pub const ONEWIRE_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Heater relay driver (transistor + coil). HIGH = heater powered.
pub const RELAY_GPIO: i32 = 5;

/// Single status LED. HIGH = lit.
pub const STATUS_LED_GPIO: i32 = 6;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Mode-select jumper with internal pull-up. Jumper to ground (LOW)
/// enables the temperature read-out after each successful poll.
pub const MODE_SWITCH_GPIO: i32 = 7;
