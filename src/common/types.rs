// src/common/types.rs

use core::fmt;

/// °C per LSB of the ambient temperature register.
pub const CELSIUS_PER_LSB: f32 = 0.03125;

/// µV per LSB of the object voltage register (156.25 nV).
pub const MICROVOLTS_PER_LSB: f32 = 0.15625;

/// Converts a raw ambient temperature register value to degrees Celsius.
///
/// Pure fixed-point scaling: `raw * 1/32`. Calling it again on the same raw
/// value always gives the same result.
#[inline]
pub fn raw_to_celsius(raw: i16) -> f32 {
    raw as f32 * CELSIUS_PER_LSB
}

/// Converts a raw object voltage register value to microvolts.
#[inline]
pub fn raw_to_microvolts(raw: i16) -> f32 {
    raw as f32 * MICROVOLTS_PER_LSB
}

/// Raw ambient (die) temperature reading.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AmbientTemperature(i16);

impl AmbientTemperature {
    pub const fn from_raw(raw: i16) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> i16 {
        self.0
    }

    pub fn celsius(&self) -> f32 {
        raw_to_celsius(self.0)
    }

    /// Whether the reading lies in `[min, max]` °C, both ends inclusive.
    pub fn is_within(&self, min: f32, max: f32) -> bool {
        let c = self.celsius();
        c >= min && c <= max
    }
}

impl fmt::Display for AmbientTemperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} C", self.celsius())
    }
}

/// Raw object sensor voltage reading.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorVoltage(i16);

impl SensorVoltage {
    pub const fn from_raw(raw: i16) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> i16 {
        self.0
    }

    pub fn microvolts(&self) -> f32 {
        raw_to_microvolts(self.0)
    }
}
