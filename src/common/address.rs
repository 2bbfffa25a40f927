// src/common/address.rs

use super::error::Tmp006Error;
use core::convert::TryFrom;
use core::fmt;

/// Strapping of one TMP006 address-select pin (ADR0 or ADR1).
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinState {
    Low,
    High,
    /// Tied to the bus data line.
    Sda,
    /// Tied to the bus clock line.
    Scl,
}

/// 7-bit bus address of a TMP006, resolved from its two address-select pins.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusAddress(u8);

impl BusAddress {
    /// Address with both select pins pulled low.
    pub const BASE_ADDRESS: BusAddress = BusAddress(0x40);

    /// Resolves the address from the ADR0/ADR1 pin straps.
    ///
    /// ADR0 may only be low or high; ADR1 may additionally be tied to SDA or
    /// SCL. Any other combination is rejected with `InvalidArgument`.
    pub fn from_pins(a0: PinState, a1: PinState) -> Result<Self, Tmp006Error<()>> {
        let a0_offset = match a0 {
            PinState::Low => 0,
            PinState::High => 4,
            PinState::Sda | PinState::Scl => return Err(Tmp006Error::InvalidArgument),
        };
        let a1_offset = match a1 {
            PinState::Low => 0,
            PinState::High => 1,
            PinState::Sda => 2,
            PinState::Scl => 3,
        };
        Ok(BusAddress(Self::BASE_ADDRESS.0 | a0_offset | a1_offset))
    }

    #[inline]
    pub const fn as_u8(&self) -> u8 {
        self.0
    }
}

impl Default for BusAddress {
    fn default() -> Self {
        Self::BASE_ADDRESS
    }
}

impl TryFrom<(PinState, PinState)> for BusAddress {
    type Error = Tmp006Error<()>;

    fn try_from((a0, a1): (PinState, PinState)) -> Result<Self, Self::Error> {
        Self::from_pins(a0, a1)
    }
}

impl From<BusAddress> for u8 {
    fn from(value: BusAddress) -> Self {
        value.0
    }
}

impl fmt::Display for BusAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}
