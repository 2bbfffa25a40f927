// src/lib.rs

#![cfg_attr(not(test), no_std)] // std only for host tests

pub mod common;
pub mod driver;
pub mod harness;

// Re-export key types for convenience
pub use common::{BusAddress, PinState, Tmp006Error};
pub use driver::Tmp006;
pub use harness::{Harness, HarnessConfig, SharedState};
