// src/common/timing.rs

use super::register::ConversionRate;
use core::time::Duration;

// Nominal values. The harness keeps its own copy of these in `HarnessConfig`
// so they can be tuned per board; the constants here are the defaults.
// Waiting is counted in ticks of the 1 ms time base, see `to_ticks`.

/// Period of the harness time base (one tick).
pub const TICK_PERIOD: Duration = Duration::from_millis(1);

/// Results a rate scenario expects within its deadline.
pub const EXPECTED_CONVERSIONS: u32 = 2;

/// Slack added to every rate deadline for the sensor's worst-case
/// conversion-time tolerance.
pub const DEADLINE_EPSILON: Duration = Duration::from_millis(50);

/// Longest wait for any single result before the sensor counts as silent.
pub const RESULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Length of the window in which a powered-down sensor must stay silent.
pub const POWER_DOWN_WINDOW: Duration = Duration::from_secs(2);

/// Busy-wait step of the mainline loop. Must stay at or below one tick.
pub const POLL_INTERVAL: Duration = Duration::from_micros(100);

/// Whole ticks in `duration`, rounded down, saturating at `u32::MAX`.
pub const fn to_ticks(duration: Duration) -> u32 {
    let ticks = duration.as_micros() / TICK_PERIOD.as_micros();
    if ticks > u32::MAX as u128 {
        u32::MAX
    } else {
        ticks as u32
    }
}

/// Tick count after which a rate scenario stops accepting results.
///
/// `(expected / rate_hz + epsilon)` in ticks, evaluated on the integer period
/// so no rounding creeps in: 0.25 conv/s with the defaults gives 8050.
/// Saturates instead of wrapping.
pub const fn deadline_ticks(rate: ConversionRate, expected_conversions: u32, epsilon: Duration) -> u32 {
    let period = to_ticks(Duration::from_millis(rate.period_ms() as u64));
    expected_conversions.saturating_mul(period).saturating_add(to_ticks(epsilon))
}
