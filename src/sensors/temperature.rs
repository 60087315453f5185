//! Fixed-point temperature in tenths of a degree Celsius.
//!
//! The DS18B20 reports a signed 12-bit reading in 1/16 °C steps. Tenths
//! are `raw * 10 / 16 = raw * 5 / 8`, computed as `raw/2 + raw/8` with
//! each division truncating toward zero. For negative readings that can
//! differ by one tenth from exact rounding; control decisions only use
//! whole degrees, so the bias is harmless.

use core::fmt;

use serde::Serialize;

/// Temperature in tenths of a degree Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct DeciCelsius(i16);

impl DeciCelsius {
    /// Lowest temperature the sensor can report (-55.0 °C).
    pub const MIN: Self = Self(-550);
    /// Highest temperature the sensor can report (+125.0 °C).
    pub const MAX: Self = Self(1250);

    pub const fn new(tenths: i16) -> Self {
        Self(tenths)
    }

    /// Decode a raw scratchpad reading (1/16 °C).
    pub const fn from_raw(raw: i16) -> Self {
        Self(raw / 2 + raw / 8)
    }

    pub const fn tenths(self) -> i16 {
        self.0
    }

    pub const fn is_in_range(self) -> bool {
        self.0 >= Self::MIN.0 && self.0 <= Self::MAX.0
    }

    /// Whole degrees, rounding half away from zero.
    ///
    /// `-10.5 → -11`, `-10.4 → -10`, `10.5 → 11`.
    pub const fn round_to_degrees(self) -> i16 {
        if self.0 >= 0 {
            (self.0 + 5) / 10
        } else {
            (self.0 - 5) / 10
        }
    }
}

impl fmt::Display for DeciCelsius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{}", abs / 10, abs % 10)
    }
}
