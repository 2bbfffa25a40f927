// src/harness/config.rs

use crate::common::register::ConversionRate;
use crate::common::timing;
use core::time::Duration;

/// Tunables of the timing harness. `Default` gives the values the battery
/// was calibrated with.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HarnessConfig {
    /// Results a rate scenario must see at or before its deadline.
    pub expected_conversions: u32,
    /// Slack added to every rate deadline.
    pub epsilon: Duration,
    /// Longest wait for a single result.
    pub result_timeout: Duration,
    /// How long a powered-down sensor must stay silent.
    pub power_down_window: Duration,
    /// Busy-wait step of the mainline loop. Clamped to one tick.
    pub poll_interval: Duration,
    /// Lower bound of a plausible ambient reading, °C.
    pub min_celsius: f32,
    /// Upper bound of a plausible ambient reading, °C.
    pub max_celsius: f32,
}

impl HarnessConfig {
    pub const fn new() -> Self {
        HarnessConfig {
            expected_conversions: timing::EXPECTED_CONVERSIONS,
            epsilon: timing::DEADLINE_EPSILON,
            result_timeout: timing::RESULT_TIMEOUT,
            power_down_window: timing::POWER_DOWN_WINDOW,
            poll_interval: timing::POLL_INTERVAL,
            min_celsius: 18.0,
            max_celsius: 26.0,
        }
    }

    pub const fn with_expected_conversions(mut self, count: u32) -> Self {
        self.expected_conversions = count;
        self
    }

    pub const fn with_epsilon(mut self, epsilon: Duration) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub const fn with_result_timeout(mut self, timeout: Duration) -> Self {
        self.result_timeout = timeout;
        self
    }

    pub const fn with_power_down_window(mut self, window: Duration) -> Self {
        self.power_down_window = window;
        self
    }

    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub const fn with_temperature_window(mut self, min_celsius: f32, max_celsius: f32) -> Self {
        self.min_celsius = min_celsius;
        self.max_celsius = max_celsius;
        self
    }

    /// Poll step actually used, in µs: at least 1, at most one tick.
    pub fn poll_interval_us(&self) -> u32 {
        let max = timing::TICK_PERIOD.as_micros();
        self.poll_interval.as_micros().clamp(1, max) as u32
    }

    /// Deadline of a rate scenario at `rate`, in ticks from scenario start.
    pub fn deadline_ticks(&self, rate: ConversionRate) -> u32 {
        timing::deadline_ticks(rate, self.expected_conversions, self.epsilon)
    }

    pub fn result_timeout_ticks(&self) -> u32 {
        timing::to_ticks(self.result_timeout)
    }

    pub fn power_down_window_ticks(&self) -> u32 {
        timing::to_ticks(self.power_down_window)
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::new()
    }
}
