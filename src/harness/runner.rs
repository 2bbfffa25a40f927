// src/harness/runner.rs

use super::{
    config::HarnessConfig,
    scenario::{BatteryReport, Outcome, Phase, Scenario, ScenarioFailure, ScenarioReport},
};
use crate::common::{
    hal_traits::{EdgeSource, PollDelay, RegisterTransport, TickSource},
    log,
    register::{
        ConfigWord, ConversionRate, DataReadyPinMode, OperationMode, Register, DEVICE_ID,
        DRDY_ENABLE_MASK, MANUFACTURER_ID, MODE_MASK, RATE_MASK,
    },
    shared::SharedState,
};
use crate::driver::Tmp006;
use arrayvec::ArrayVec;
use core::fmt::{self, Write};

type StepResult<E> = Result<(), ScenarioFailure<E>>;

/// Errors that end a battery run early.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HarnessError {
    /// The output sink refused a line.
    #[error("Output sink rejected a line")]
    Output(#[from] fmt::Error),
}

/// Runs the TMP006 timing battery.
///
/// Owns the driver and the poll delay; shares the counters with the tick and
/// DRDY interrupts through `shared`. Everything runs on the caller's thread,
/// busy-waiting in `config.poll_interval` steps.
#[derive(Debug)]
pub struct Harness<'a, T, D>
where
    T: RegisterTransport,
    D: PollDelay,
{
    device: Tmp006<T>,
    delay: D,
    shared: &'a SharedState,
    config: HarnessConfig,
}

impl<'a, T, D> Harness<'a, T, D>
where
    T: RegisterTransport,
    D: PollDelay,
{
    /// Wires `shared` into both event sources and takes over the driver.
    pub fn new<S, G>(
        device: Tmp006<T>,
        delay: D,
        shared: &'a SharedState,
        ticks: &mut S,
        edges: &mut G,
        config: HarnessConfig,
    ) -> Self
    where
        S: TickSource<'a>,
        G: EdgeSource<'a>,
    {
        ticks.subscribe_tick(shared.tick_callback());
        edges.subscribe_edge(shared.edge_callback());
        Harness { device, delay, shared, config }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn device(&mut self) -> &mut Tmp006<T> {
        &mut self.device
    }

    pub fn release(self) -> (Tmp006<T>, D) {
        (self.device, self.delay)
    }

    /// Runs every scenario of [`Scenario::battery`], writes one line per
    /// scenario to `out` between the `~~~TEST~~~` / `~~~TEST END~~~`
    /// markers, and resets the sensor at the end.
    ///
    /// Scenario failures never stop the run. A failing sink stops output
    /// only; the remaining scenarios and the closing reset still run before
    /// the error is returned.
    pub fn run<W: Write>(&mut self, out: &mut W) -> Result<BatteryReport<T::Error>, HarnessError> {
        log::info!("harness: battery start");
        let mut output = writeln!(out, "~~~TEST~~~");
        let mut reports = ArrayVec::new();

        for scenario in Scenario::battery() {
            let report = self.run_scenario(scenario);
            if output.is_ok() {
                output = writeln!(out, "{}", report);
            }
            reports.push(report);
        }

        let defaults_restored = match self.device.reset() {
            Ok(()) => true,
            Err(_) => {
                log::error!("harness: closing reset failed, sensor configuration unknown");
                false
            }
        };

        if output.is_ok() {
            output = writeln!(out, "~~~TEST END~~~");
        }
        output?;

        let report = BatteryReport { reports, defaults_restored };
        log::info!("harness: battery done, all passed: {}", report.all_passed());
        Ok(report)
    }

    /// Runs a single scenario to completion.
    pub fn run_scenario(&mut self, scenario: Scenario) -> ScenarioReport<T::Error> {
        let mut phase = Phase::Setup;
        let result = match scenario {
            Scenario::Identity => self.check_identity(&mut phase),
            Scenario::ConfigRoundTrip => self.check_config_round_trip(&mut phase),
            Scenario::ConversionRate { rate, drdy } => self.check_conversion_rate(rate, drdy, &mut phase),
            Scenario::PowerDown { drdy } => self.check_power_down(drdy, &mut phase),
        };
        let results = self.shared.results();

        match result {
            Ok(()) => {
                log::info!("harness: {:?} passed, {} results", scenario, results);
                ScenarioReport { scenario, outcome: Outcome::Pass, failed_in: None, failure: None, results }
            }
            Err(failure) => {
                log::warning!("harness: {:?} failed in {:?}: {}", scenario, phase, failure.kind());
                ScenarioReport {
                    scenario,
                    outcome: Outcome::Fail,
                    failed_in: Some(phase),
                    failure: Some(failure),
                    results,
                }
            }
        }
    }

    // --- Scenarios ---

    fn check_identity(&mut self, phase: &mut Phase) -> StepResult<T::Error> {
        self.setup(phase);
        enter(phase, Phase::Verifying);
        let manufacturer = self.device.read_manufacturer_id()?;
        expect_register(Register::ManufacturerId, 0xFFFF, MANUFACTURER_ID, manufacturer)?;
        let device = self.device.read_device_id()?;
        expect_register(Register::DeviceId, 0xFFFF, DEVICE_ID, device)?;
        enter(phase, Phase::Done);
        Ok(())
    }

    fn check_config_round_trip(&mut self, phase: &mut Phase) -> StepResult<T::Error> {
        self.setup(phase);
        enter(phase, Phase::Configuring);
        for rate in ConversionRate::ALL {
            self.device.set_conversion_rate(rate)?;
            self.expect_config(RATE_MASK, rate.field_bits())?;
        }
        for drdy in [DataReadyPinMode::Disabled, DataReadyPinMode::Enabled] {
            self.device.set_data_ready_pin_mode(drdy)?;
            self.expect_config(DRDY_ENABLE_MASK, drdy.field_bits())?;
        }
        for mode in [OperationMode::PowerDown, OperationMode::ContinuousConversion] {
            self.device.set_operation_mode(mode)?;
            self.expect_config(MODE_MASK, mode.field_bits())?;
        }

        enter(phase, Phase::Verifying);
        self.device.reset()?;
        self.expect_config(0xFFFF, ConfigWord::POWER_ON_DEFAULT.bits())?;
        enter(phase, Phase::Done);
        Ok(())
    }

    /// Cadence: at least `expected_conversions` results must be flagged at
    /// or before the deadline. Results first seen after it do not count.
    fn check_conversion_rate(
        &mut self,
        rate: ConversionRate,
        drdy: DataReadyPinMode,
        phase: &mut Phase,
    ) -> StepResult<T::Error> {
        self.setup(phase);

        enter(phase, Phase::Configuring);
        // Reset first, or it would undo the rate and DRDY settings.
        self.device.reset()?;
        self.device.set_conversion_rate(rate)?;
        self.device.set_data_ready_pin_mode(drdy)?;

        enter(phase, Phase::Awaiting);
        let deadline = self.config.deadline_ticks(rate);
        let timeout = self.config.result_timeout_ticks();
        let mut on_time = 0;
        let mut silent = false;
        while self.shared.ticks() <= deadline {
            let until = deadline.min(self.shared.ticks().saturating_add(timeout));
            if !self.await_result(drdy, until)? {
                silent = until < deadline;
                break;
            }
            self.consume_result()?;
            on_time += 1;
        }

        enter(phase, Phase::Verifying);
        let expected = self.config.expected_conversions;
        if on_time < expected {
            if silent {
                log::warning!("harness: sensor silent after {} results", on_time);
                return Err(ScenarioFailure::ResultTimeout);
            }
            return Err(ScenarioFailure::MissedDeadline { expected, observed: on_time });
        }
        enter(phase, Phase::Done);
        Ok(())
    }

    /// Absence: the result counter stays at zero for the whole window.
    fn check_power_down(&mut self, drdy: DataReadyPinMode, phase: &mut Phase) -> StepResult<T::Error> {
        self.setup(phase);

        enter(phase, Phase::Configuring);
        self.device.reset()?;
        self.device.set_conversion_rate(ConversionRate::Rate1Hz)?;
        self.device.set_data_ready_pin_mode(drdy)?;
        self.device.set_operation_mode(OperationMode::PowerDown)?;

        enter(phase, Phase::Awaiting);
        let window = self.config.power_down_window_ticks();
        let step = self.config.poll_interval_us();
        while self.shared.ticks() < window {
            if drdy == DataReadyPinMode::Disabled {
                self.poll_status()?;
            }
            let results = self.shared.results();
            if results != 0 {
                return Err(ScenarioFailure::ResultDuringPowerDown { results });
            }
            self.delay.delay_us(step);
        }

        enter(phase, Phase::Verifying);
        let results = self.shared.results();
        if results != 0 {
            return Err(ScenarioFailure::ResultDuringPowerDown { results });
        }
        enter(phase, Phase::Done);
        Ok(())
    }

    // --- Helpers ---

    fn setup(&mut self, phase: &mut Phase) {
        *phase = Phase::Setup;
        self.shared.reset();
    }

    /// Spins until a result is flagged or the tick counter passes `until`.
    /// With the DRDY pin disabled the status bit is polled and a hit is
    /// recorded the way the DRDY handler would.
    ///
    /// Returns `false` if the first result seen was flagged after `until`.
    fn await_result(&mut self, drdy: DataReadyPinMode, until: u32) -> Result<bool, ScenarioFailure<T::Error>> {
        let step = self.config.poll_interval_us();
        loop {
            let ready = self.shared.is_ready()
                || (drdy == DataReadyPinMode::Disabled && self.poll_status()?);
            if self.shared.ticks() > until {
                return Ok(false);
            }
            if ready {
                return Ok(true);
            }
            self.delay.delay_us(step);
        }
    }

    /// One poll of the status bit; on a hit, counts the result and raises the
    /// flag from the mainline.
    fn poll_status(&mut self) -> Result<bool, ScenarioFailure<T::Error>> {
        match self.device.poll_result() {
            Ok(()) => {
                self.shared.on_result_ready();
                Ok(true)
            }
            Err(nb::Error::WouldBlock) => Ok(false),
            Err(nb::Error::Other(e)) => Err(e.into()),
        }
    }

    /// Reads and checks the latest ambient temperature, then clears the flag.
    fn consume_result(&mut self) -> StepResult<T::Error> {
        let reading = self.device.ambient_temperature()?;
        self.shared.clear_ready();
        log::trace!("harness: ambient raw {}", reading.raw());
        if !reading.is_within(self.config.min_celsius, self.config.max_celsius) {
            return Err(ScenarioFailure::TemperatureOutOfRange { raw: reading.raw() });
        }
        Ok(())
    }

    fn expect_config(&mut self, mask: u16, expected: u16) -> StepResult<T::Error> {
        let found = self.device.read_config()?.field(mask);
        expect_register(Register::Configuration, mask, expected, found)
    }
}

fn enter(phase: &mut Phase, next: Phase) {
    log::debug!("harness: phase {:?}", next);
    *phase = next;
}

fn expect_register<E: fmt::Debug>(register: Register, mask: u16, expected: u16, found: u16) -> StepResult<E> {
    if found == expected {
        Ok(())
    } else {
        Err(ScenarioFailure::UnexpectedRegister { register, mask, expected, found })
    }
}
