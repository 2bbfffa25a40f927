// src/harness/mod.rs

// Timing validation battery for the TMP006 driver
pub mod config;
pub mod runner;
pub mod scenario;

#[cfg(test)]
pub(crate) mod sim;

// Re-export the harness surface
pub use config::HarnessConfig;
pub use runner::{Harness, HarnessError};
pub use scenario::{BatteryReport, Outcome, Phase, Scenario, ScenarioFailure, ScenarioReport};
pub use crate::common::shared::{Callback, SharedState};
