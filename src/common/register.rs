// src/common/register.rs

//! TMP006 register map and the configuration word bit fields.
//!
//! All registers are 16 bits wide and travel most-significant byte first.

use core::fmt;

/// Register pointer values understood by the TMP006.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    /// Object (thermopile) sensor voltage, signed, 156.25 nV per LSB.
    Voltage = 0x00,
    /// Die (ambient) temperature, signed, 1/32 °C per LSB.
    AmbientTemperature = 0x01,
    Configuration = 0x02,
    ManufacturerId = 0xFE,
    DeviceId = 0xFF,
}

impl Register {
    #[inline]
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

// --- Configuration register masks ---

/// Software reset, self-clearing.
pub const RESET_MASK: u16 = 0x8000;
/// Operation mode, bits 14..12.
pub const MODE_MASK: u16 = 0x7000;
/// Conversion rate, bits 11..9.
pub const RATE_MASK: u16 = 0x0E00;
/// DRDY pin enable, bit 8.
pub const DRDY_ENABLE_MASK: u16 = 0x0100;
/// Conversion result ready, bit 7. Set by the sensor, read-only.
pub const DRDY_STATUS_MASK: u16 = 0x0080;

const RATE_SHIFT: u16 = 9;

/// Expected contents of `Register::ManufacturerId`.
pub const MANUFACTURER_ID: u16 = 0x5449;
/// Expected contents of `Register::DeviceId`.
pub const DEVICE_ID: u16 = 0x0067;

/// Conversion rate field.
///
/// The sensor numbers its rates fastest-first, so the encoding runs opposite
/// to the conversion frequency. Every variant maps to its bit pattern through
/// an explicit table below; do not replace it with arithmetic.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConversionRate {
    /// 4 conversions per second, encoding `000`.
    Rate4Hz,
    /// 2 conversions per second, encoding `001`.
    Rate2Hz,
    /// 1 conversion per second, encoding `010`. Power-on default.
    Rate1Hz,
    /// 0.5 conversions per second, encoding `011`.
    Rate500mHz,
    /// 0.25 conversions per second, encoding `100`.
    Rate250mHz,
}

impl ConversionRate {
    /// All rates in encoding order.
    pub const ALL: [ConversionRate; 5] = [
        ConversionRate::Rate4Hz,
        ConversionRate::Rate2Hz,
        ConversionRate::Rate1Hz,
        ConversionRate::Rate500mHz,
        ConversionRate::Rate250mHz,
    ];

    /// Field value, already shifted into bits 11..9.
    pub const fn field_bits(self) -> u16 {
        let code: u16 = match self {
            ConversionRate::Rate4Hz => 0b000,
            ConversionRate::Rate2Hz => 0b001,
            ConversionRate::Rate1Hz => 0b010,
            ConversionRate::Rate500mHz => 0b011,
            ConversionRate::Rate250mHz => 0b100,
        };
        code << RATE_SHIFT
    }

    /// Decodes the rate field of a configuration word. Codes `101`..`111`
    /// are reserved by the sensor and yield `None`.
    pub const fn from_field_bits(word: u16) -> Option<Self> {
        match (word & RATE_MASK) >> RATE_SHIFT {
            0b000 => Some(ConversionRate::Rate4Hz),
            0b001 => Some(ConversionRate::Rate2Hz),
            0b010 => Some(ConversionRate::Rate1Hz),
            0b011 => Some(ConversionRate::Rate500mHz),
            0b100 => Some(ConversionRate::Rate250mHz),
            _ => None,
        }
    }

    /// Time between two completed conversions, in milliseconds.
    pub const fn period_ms(self) -> u32 {
        match self {
            ConversionRate::Rate4Hz => 250,
            ConversionRate::Rate2Hz => 500,
            ConversionRate::Rate1Hz => 1000,
            ConversionRate::Rate500mHz => 2000,
            ConversionRate::Rate250mHz => 4000,
        }
    }

    pub fn conversions_per_second(self) -> f32 {
        match self {
            ConversionRate::Rate4Hz => 4.0,
            ConversionRate::Rate2Hz => 2.0,
            ConversionRate::Rate1Hz => 1.0,
            ConversionRate::Rate500mHz => 0.5,
            ConversionRate::Rate250mHz => 0.25,
        }
    }
}

impl fmt::Display for ConversionRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConversionRate::Rate4Hz => "4",
            ConversionRate::Rate2Hz => "2",
            ConversionRate::Rate1Hz => "1",
            ConversionRate::Rate500mHz => "0.5",
            ConversionRate::Rate250mHz => "0.25",
        };
        f.write_str(label)
    }
}

/// Operation mode field. Only the two modes below are ever written; the
/// remaining encodings are reserved.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperationMode {
    /// `000`: conversion aborted, low-power shutdown.
    PowerDown,
    /// `111`: sensor and die temperature converted continuously.
    ContinuousConversion,
}

impl OperationMode {
    pub const fn field_bits(self) -> u16 {
        match self {
            OperationMode::PowerDown => 0x0000,
            OperationMode::ContinuousConversion => 0x7000,
        }
    }

    pub const fn from_field_bits(word: u16) -> Option<Self> {
        match word & MODE_MASK {
            0x0000 => Some(OperationMode::PowerDown),
            0x7000 => Some(OperationMode::ContinuousConversion),
            _ => None,
        }
    }
}

/// DRDY pin enable field.
///
/// When enabled the sensor pulls the DRDY pin low on every completed
/// conversion. When disabled, readiness has to be polled through the status
/// bit of the configuration word.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataReadyPinMode {
    Disabled,
    Enabled,
}

impl DataReadyPinMode {
    pub const fn field_bits(self) -> u16 {
        match self {
            DataReadyPinMode::Disabled => 0x0000,
            DataReadyPinMode::Enabled => DRDY_ENABLE_MASK,
        }
    }

    pub const fn from_field_bits(word: u16) -> Self {
        if word & DRDY_ENABLE_MASK != 0 {
            DataReadyPinMode::Enabled
        } else {
            DataReadyPinMode::Disabled
        }
    }
}

/// Snapshot of the configuration register.
///
/// This is only ever a snapshot: the reset bit clears itself and the status
/// bit is driven by the sensor, so a fresh read is needed before each
/// modification.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigWord(u16);

impl ConfigWord {
    /// Continuous conversion, 1 conversion/s, DRDY pin disabled.
    pub const POWER_ON_DEFAULT: ConfigWord = ConfigWord(0x7400);

    /// The word that triggers a software reset: reset bit alone.
    pub const RESET: ConfigWord = ConfigWord(RESET_MASK);

    #[inline]
    pub const fn from_bits(bits: u16) -> Self {
        ConfigWord(bits)
    }

    #[inline]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Bits of `self` selected by `mask`.
    #[inline]
    pub const fn field(self, mask: u16) -> u16 {
        self.0 & mask
    }

    /// Clears `mask` and ORs in `value`, which is itself masked so a field
    /// write can never spill into its neighbours.
    #[inline]
    pub const fn with_field(self, mask: u16, value: u16) -> Self {
        ConfigWord((self.0 & !mask) | (value & mask))
    }

    pub const fn with_conversion_rate(self, rate: ConversionRate) -> Self {
        self.with_field(RATE_MASK, rate.field_bits())
    }

    pub const fn with_operation_mode(self, mode: OperationMode) -> Self {
        self.with_field(MODE_MASK, mode.field_bits())
    }

    pub const fn with_data_ready_pin(self, mode: DataReadyPinMode) -> Self {
        self.with_field(DRDY_ENABLE_MASK, mode.field_bits())
    }

    pub const fn conversion_rate(self) -> Option<ConversionRate> {
        ConversionRate::from_field_bits(self.0)
    }

    pub const fn operation_mode(self) -> Option<OperationMode> {
        OperationMode::from_field_bits(self.0)
    }

    pub const fn data_ready_pin(self) -> DataReadyPinMode {
        DataReadyPinMode::from_field_bits(self.0)
    }

    pub const fn is_result_ready(self) -> bool {
        self.0 & DRDY_STATUS_MASK != 0
    }

    pub const fn is_reset_pending(self) -> bool {
        self.0 & RESET_MASK != 0
    }
}

impl From<ConfigWord> for u16 {
    fn from(value: ConfigWord) -> Self {
        value.0
    }
}

impl fmt::Display for ConfigWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_encoding_table() {
        assert_eq!(ConversionRate::Rate4Hz.field_bits(), 0x0000);
        assert_eq!(ConversionRate::Rate2Hz.field_bits(), 0x0200);
        assert_eq!(ConversionRate::Rate1Hz.field_bits(), 0x0400);
        assert_eq!(ConversionRate::Rate500mHz.field_bits(), 0x0600);
        assert_eq!(ConversionRate::Rate250mHz.field_bits(), 0x0800);
    }

    #[test]
    fn test_rate_decoding() {
        for rate in ConversionRate::ALL {
            assert_eq!(ConversionRate::from_field_bits(rate.field_bits() | 0x7180), Some(rate));
        }
        assert_eq!(ConversionRate::from_field_bits(0x0A00), None);
        assert_eq!(ConversionRate::from_field_bits(0x0E00), None);
    }

    #[test]
    fn test_rate_period_matches_frequency() {
        for rate in ConversionRate::ALL {
            let expected = (1000.0 / rate.conversions_per_second()) as u32;
            assert_eq!(rate.period_ms(), expected);
        }
    }

    #[test]
    fn test_mode_fields() {
        assert_eq!(OperationMode::from_field_bits(0x7400), Some(OperationMode::ContinuousConversion));
        assert_eq!(OperationMode::from_field_bits(0x0400), Some(OperationMode::PowerDown));
        assert_eq!(OperationMode::from_field_bits(0x3400), None);
        assert_eq!(DataReadyPinMode::from_field_bits(0x7500), DataReadyPinMode::Enabled);
        assert_eq!(DataReadyPinMode::from_field_bits(0x7480), DataReadyPinMode::Disabled);
    }

    #[test]
    fn test_power_on_default_decodes() {
        let word = ConfigWord::POWER_ON_DEFAULT;
        assert_eq!(word.operation_mode(), Some(OperationMode::ContinuousConversion));
        assert_eq!(word.conversion_rate(), Some(ConversionRate::Rate1Hz));
        assert_eq!(word.data_ready_pin(), DataReadyPinMode::Disabled);
        assert!(!word.is_result_ready());
        assert!(!word.is_reset_pending());
        assert!(ConfigWord::RESET.is_reset_pending());
    }

    #[test]
    fn test_field_writes_touch_only_their_field() {
        let word = ConfigWord::from_bits(0x7580);
        assert_eq!(word.with_conversion_rate(ConversionRate::Rate250mHz).bits(), 0x7980);
        assert_eq!(word.with_operation_mode(OperationMode::PowerDown).bits(), 0x0580);
        assert_eq!(word.with_data_ready_pin(DataReadyPinMode::Disabled).bits(), 0x7480);
        // Out-of-field bits in the value are dropped.
        assert_eq!(word.with_field(DRDY_ENABLE_MASK, 0xFFFF).bits(), 0x7580);
    }
}
