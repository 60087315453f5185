//! 1-Wire standard-speed timing, in absolute microseconds.
//!
//! These are wire-level durations the sensor's tolerances are specified
//! against; they must not be scaled with the CPU clock.
//!
//! ```text
//! reset:   ‾‾\____________500____________/‾‾100‾‾[sample]‾‾‾‾400‾‾‾‾
//! 1 / read ‾‾\_5_/‾‾10‾‾[sample]‾‾‾‾‾‾‾‾45‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾
//! 0        ‾‾\_5_______45_______/‾‾10‾‾
//! ```

/// Master reset pulse (datasheet minimum 480 µs).
pub const RESET_LOW_US: u32 = 500;
/// Delay after releasing the reset pulse before sampling for presence.
pub const PRESENCE_SAMPLE_US: u32 = 100;
/// Remainder of the presence window after the sample.
pub const RESET_RECOVERY_US: u32 = 400;

/// Low pulse that opens every time slot.
pub const SLOT_START_US: u32 = 5;
/// Delay after early release before sampling a read / write-1 slot.
pub const SAMPLE_OFFSET_US: u32 = 10;
/// Rest of the slot after the sample (read / write-1) or after the
/// opening pulse (write-0 keeps the line low for this long).
pub const SLOT_REMAINDER_US: u32 = 45;
/// Recovery time after a write-0 slot releases the line.
pub const RECOVERY_US: u32 = 10;

/// Gap between "conversion done?" polls.
pub const CONVERSION_POLL_INTERVAL_US: u32 = 10_000;
/// Number of all-zero polls after which a conversion is declared stuck.
pub const CONVERSION_MAX_POLLS: u16 = 256;
