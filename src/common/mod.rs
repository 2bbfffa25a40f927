// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod address;
pub mod error;
pub mod hal_traits;
pub(crate) mod log;
pub mod register;
pub mod shared;
pub mod timing;
pub mod types;

// --- Re-export key types/traits/functions for easier access ---

// From address.rs
pub use address::{BusAddress, PinState};

// From error.rs
pub use error::Tmp006Error;

// From hal_traits.rs
pub use hal_traits::{Callback, EdgeSource, PollDelay, RegisterTransport, TickSource};

// From register.rs
pub use register::{ConfigWord, ConversionRate, DataReadyPinMode, OperationMode, Register};

// From shared.rs
pub use shared::SharedState;

// From types.rs
pub use types::{raw_to_celsius, raw_to_microvolts, AmbientTemperature, SensorVoltage};

// timing.rs constants are reached through common::timing::*

// --- Feature-gated re-exports ---

// embedded-hal adapters (from hal_traits.rs)
#[cfg(feature = "impl-embedded-hal")]
pub use hal_traits::{HalDelay, I2cTransport, I2cTransportError};
