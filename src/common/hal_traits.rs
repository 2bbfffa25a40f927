// src/common/hal_traits.rs

use core::fmt::Debug;

/// Byte-level register access over the two-wire bus.
///
/// This is the only way the driver reaches the sensor. Implementations do
/// not retry; whatever goes wrong on the bus comes back as `Self::Error`.
pub trait RegisterTransport {
    /// Associated error type for bus errors.
    type Error: Debug;

    /// Reads `buffer.len()` bytes starting at `register` of the device at
    /// 7-bit `address`.
    fn read(&mut self, address: u8, register: u8, buffer: &mut [u8]) -> Result<(), Self::Error>;

    /// Writes `bytes` to `register` of the device at 7-bit `address`.
    fn write(&mut self, address: u8, register: u8, bytes: &[u8]) -> Result<(), Self::Error>;
}

/// Delay used by the harness between two polls of the shared state.
///
/// The harness busy-waits; this only sets how fine-grained that wait is.
/// Note: This could be replaced by `embedded_hal::delay::DelayNs` directly,
/// see `HalDelay`.
pub trait PollDelay {
    /// Delay for at least the specified number of microseconds.
    fn delay_us(&mut self, us: u32);

    /// Delay for at least the specified number of milliseconds.
    fn delay_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            self.delay_us(1000);
        }
    }
}

pub use super::shared::Callback;

/// A periodic 1 ms timer interrupt.
pub trait TickSource<'a> {
    /// Registers `callback` to be fired from the timer interrupt on every tick.
    /// A later registration replaces an earlier one.
    fn subscribe_tick(&mut self, callback: Callback<'a>);
}

/// A falling-edge interrupt on the sensor's DRDY pin.
pub trait EdgeSource<'a> {
    /// Registers `callback` to be fired from the edge interrupt each time the
    /// DRDY pin falls. A later registration replaces an earlier one.
    fn subscribe_edge(&mut self, callback: Callback<'a>);
}

/// embedded-hal 1.0 adapters.
#[cfg(feature = "impl-embedded-hal")]
mod hal_impls {
    use super::{PollDelay, RegisterTransport};
    use arrayvec::ArrayVec;
    use core::fmt::Debug;
    use embedded_hal::delay::DelayNs;
    use embedded_hal::i2c::I2c;

    /// Longest register payload written in one transaction.
    pub const MAX_WRITE_PAYLOAD: usize = 2;

    /// Errors from [`I2cTransport`].
    #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
    pub enum I2cTransportError<E: Debug> {
        /// Error reported by the I2C peripheral.
        #[error("I2C bus error: {0:?}")]
        Bus(E),
        /// Payload does not fit in one register write frame.
        #[error("Register write payload too long: {len} bytes")]
        PayloadTooLong { len: usize },
    }

    /// Uses any `embedded_hal::i2c::I2c` bus as a [`RegisterTransport`].
    ///
    /// Reads are a write of the register pointer followed by a repeated-start
    /// read; writes send the pointer and payload in one write.
    #[derive(Debug)]
    pub struct I2cTransport<I> {
        i2c: I,
    }

    impl<I: I2c> I2cTransport<I> {
        pub fn new(i2c: I) -> Self {
            I2cTransport { i2c }
        }

        /// Gives the bus back.
        pub fn release(self) -> I {
            self.i2c
        }
    }

    impl<I: I2c> RegisterTransport for I2cTransport<I> {
        type Error = I2cTransportError<I::Error>;

        fn read(&mut self, address: u8, register: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
            self.i2c
                .write_read(address, &[register], buffer)
                .map_err(I2cTransportError::Bus)
        }

        fn write(&mut self, address: u8, register: u8, bytes: &[u8]) -> Result<(), Self::Error> {
            let mut frame: ArrayVec<u8, { MAX_WRITE_PAYLOAD + 1 }> = ArrayVec::new();
            frame.push(register);
            frame
                .try_extend_from_slice(bytes)
                .map_err(|_| I2cTransportError::PayloadTooLong { len: bytes.len() })?;
            self.i2c.write(address, &frame).map_err(I2cTransportError::Bus)
        }
    }

    /// Uses any `embedded_hal::delay::DelayNs` as a [`PollDelay`].
    #[derive(Debug)]
    pub struct HalDelay<D> {
        delay: D,
    }

    impl<D: DelayNs> HalDelay<D> {
        pub fn new(delay: D) -> Self {
            HalDelay { delay }
        }

        pub fn release(self) -> D {
            self.delay
        }
    }

    impl<D: DelayNs> PollDelay for HalDelay<D> {
        fn delay_us(&mut self, us: u32) {
            self.delay.delay_us(us);
        }

        fn delay_ms(&mut self, ms: u32) {
            self.delay.delay_ms(ms);
        }
    }

}

#[cfg(feature = "impl-embedded-hal")]
pub use hal_impls::{HalDelay, I2cTransport, I2cTransportError, MAX_WRITE_PAYLOAD};
