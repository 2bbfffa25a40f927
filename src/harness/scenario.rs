// src/harness/scenario.rs

use crate::common::{
    error::Tmp006Error,
    register::{ConversionRate, DataReadyPinMode, Register},
};
use arrayvec::ArrayVec;
use core::fmt::{self, Debug};

/// One test case of the battery.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Scenario {
    /// Manufacturer and device ID registers hold the TMP006 values.
    Identity,
    /// Every configuration field reads back as written; reset restores the
    /// power-on default.
    ConfigRoundTrip,
    /// The expected number of results arrives at `rate` by the deadline.
    /// `drdy` selects edge-driven (`Enabled`) or polled (`Disabled`)
    /// consumption.
    ConversionRate { rate: ConversionRate, drdy: DataReadyPinMode },
    /// No result at all while powered down.
    PowerDown { drdy: DataReadyPinMode },
}

impl Scenario {
    /// Rates in the order the battery runs them.
    pub const RATE_ORDER: [ConversionRate; 5] = [
        ConversionRate::Rate1Hz,
        ConversionRate::Rate2Hz,
        ConversionRate::Rate4Hz,
        ConversionRate::Rate500mHz,
        ConversionRate::Rate250mHz,
    ];

    /// Number of scenarios in [`Scenario::battery`].
    pub const BATTERY_LEN: usize = 2 + 2 * Self::RATE_ORDER.len() + 2;

    /// The full battery, in run order.
    pub fn battery() -> ArrayVec<Scenario, { Scenario::BATTERY_LEN }> {
        let mut battery = ArrayVec::new();
        battery.push(Scenario::Identity);
        battery.push(Scenario::ConfigRoundTrip);
        for drdy in [DataReadyPinMode::Enabled, DataReadyPinMode::Disabled] {
            for rate in Self::RATE_ORDER {
                battery.push(Scenario::ConversionRate { rate, drdy });
            }
        }
        battery.push(Scenario::PowerDown { drdy: DataReadyPinMode::Enabled });
        battery.push(Scenario::PowerDown { drdy: DataReadyPinMode::Disabled });
        battery
    }
}

fn interrupt_label(drdy: DataReadyPinMode) -> &'static str {
    match drdy {
        DataReadyPinMode::Enabled => "enabled",
        DataReadyPinMode::Disabled => "disabled",
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scenario::Identity => f.write_str("Read manufacturer ID"),
            Scenario::ConfigRoundTrip => f.write_str("Writing into config register"),
            Scenario::ConversionRate { rate, drdy } => write!(
                f,
                "Check {} conversion per second rate with interrupt {} (wait)",
                rate,
                interrupt_label(*drdy)
            ),
            Scenario::PowerDown { drdy } => {
                write!(f, "Check power down mode with interrupt {} (wait)", interrupt_label(*drdy))
            }
        }
    }
}

/// Where a scenario is in its run.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Shared counters and flag zeroed.
    Setup,
    /// Reset, then rate, DRDY mode and operation mode applied.
    Configuring,
    /// Consuming results (or watching for their absence) until the deadline.
    Awaiting,
    /// Liveness or absence checked.
    Verifying,
    Done,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    Pass,
    Fail,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Outcome::Pass => "PASS",
            Outcome::Fail => "FAIL",
        })
    }
}

/// Why a scenario failed. Ends that scenario only, never the battery.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScenarioFailure<E: Debug> {
    /// A register transaction failed on the bus.
    #[error("Transport error: {0:?}")]
    Transport(E),

    #[error("Invalid argument")]
    InvalidArgument,

    /// The sensor went silent for the whole per-result timeout before the
    /// deadline.
    #[error("No result within the result timeout")]
    ResultTimeout,

    /// Fewer results than expected arrived at or before the deadline.
    #[error("Missed deadline: {observed} of {expected} results in time")]
    MissedDeadline { expected: u32, observed: u32 },

    /// A register did not hold the expected value.
    #[error("Unexpected value in {register:?} (mask {mask:#06x}): expected {expected:#06x}, found {found:#06x}")]
    UnexpectedRegister { register: Register, mask: u16, expected: u16, found: u16 },

    /// Ambient reading outside the plausible window.
    #[error("Ambient temperature out of range: raw {raw}")]
    TemperatureOutOfRange { raw: i16 },

    /// A result was seen while the sensor should be powered down.
    #[error("Result observed in power-down: counter {results}")]
    ResultDuringPowerDown { results: u32 },
}

impl<E: Debug> From<Tmp006Error<E>> for ScenarioFailure<E> {
    fn from(e: Tmp006Error<E>) -> Self {
        match e {
            Tmp006Error::InvalidArgument => ScenarioFailure::InvalidArgument,
            Tmp006Error::Transport(e) => ScenarioFailure::Transport(e),
        }
    }
}

impl<E: Debug> ScenarioFailure<E> {
    /// Short payload-free description, suitable for any log backend.
    pub fn kind(&self) -> &'static str {
        match self {
            ScenarioFailure::Transport(_) => "transport error",
            ScenarioFailure::InvalidArgument => "invalid argument",
            ScenarioFailure::ResultTimeout => "result timeout",
            ScenarioFailure::MissedDeadline { .. } => "missed deadline",
            ScenarioFailure::UnexpectedRegister { .. } => "unexpected register value",
            ScenarioFailure::TemperatureOutOfRange { .. } => "temperature out of range",
            ScenarioFailure::ResultDuringPowerDown { .. } => "result during power-down",
        }
    }
}

/// Result of one scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioReport<E: Debug> {
    pub scenario: Scenario,
    pub outcome: Outcome,
    /// Phase the scenario was in when it failed.
    pub failed_in: Option<Phase>,
    pub failure: Option<ScenarioFailure<E>>,
    /// Result counter at the end of the run.
    pub results: u32,
}

impl<E: Debug> ScenarioReport<E> {
    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Pass
    }
}

/// `"<scenario> -> PASS"` / `"<scenario> -> FAIL"`.
impl<E: Debug> fmt::Display for ScenarioReport<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.scenario, self.outcome)
    }
}

/// Results of a full battery.
#[derive(Debug, Clone)]
pub struct BatteryReport<E: Debug> {
    pub reports: ArrayVec<ScenarioReport<E>, { Scenario::BATTERY_LEN }>,
    /// Whether the closing reset reached the sensor.
    pub defaults_restored: bool,
}

impl<E: Debug> BatteryReport<E> {
    pub fn all_passed(&self) -> bool {
        self.reports.iter().all(ScenarioReport::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ScenarioReport<E>> {
        self.reports.iter().filter(|r| !r.passed())
    }

    pub fn get(&self, scenario: Scenario) -> Option<&ScenarioReport<E>> {
        self.reports.iter().find(|r| r.scenario == scenario)
    }
}
