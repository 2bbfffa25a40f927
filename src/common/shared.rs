// src/common/shared.rs

use core::fmt;
use portable_atomic::{AtomicBool, AtomicU32, Ordering};

/// State shared between the two interrupt handlers and the mainline loop.
///
/// Each field has a single writer in interrupt context: the tick handler
/// owns `ticks`, the DRDY handler owns `results` and `ready`. The mainline
/// only zeroes them at scenario start and clears `ready` after consuming a
/// result (and, in polled mode, stands in for the DRDY handler itself).
/// Nothing else is touched from interrupt context.
///
/// Put it in a `static` when the handlers need `'static` callbacks:
///
/// ```
/// use tmp006::harness::SharedState;
/// static SHARED: SharedState = SharedState::new();
/// ```
#[derive(Debug)]
pub struct SharedState {
    ticks: AtomicU32,
    results: AtomicU32,
    ready: AtomicBool,
}

impl SharedState {
    pub const fn new() -> Self {
        SharedState {
            ticks: AtomicU32::new(0),
            results: AtomicU32::new(0),
            ready: AtomicBool::new(false),
        }
    }

    /// Tick interrupt body. Wraps on overflow.
    #[inline]
    pub fn on_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Release);
    }

    /// DRDY interrupt body: count the result, then raise the flag.
    #[inline]
    pub fn on_result_ready(&self) {
        self.results.fetch_add(1, Ordering::Release);
        self.ready.store(true, Ordering::Release);
    }

    /// Zeroes all three fields. Called by the mainline at scenario start.
    pub fn reset(&self) {
        self.ticks.store(0, Ordering::Release);
        self.results.store(0, Ordering::Release);
        self.ready.store(false, Ordering::Release);
    }

    #[inline]
    pub fn ticks(&self) -> u32 {
        self.ticks.load(Ordering::Acquire)
    }

    #[inline]
    pub fn results(&self) -> u32 {
        self.results.load(Ordering::Acquire)
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Marks the current result as consumed.
    #[inline]
    pub fn clear_ready(&self) {
        self.ready.store(false, Ordering::Release);
    }

    /// Ticks elapsed since `since`, correct across one wrap.
    #[inline]
    pub fn elapsed_since(&self, since: u32) -> u32 {
        self.ticks().wrapping_sub(since)
    }

    /// Callback for a [`TickSource`](super::hal_traits::TickSource).
    pub fn tick_callback(&self) -> Callback<'_> {
        Callback { state: self, handler: SharedState::on_tick }
    }

    /// Callback for an [`EdgeSource`](super::hal_traits::EdgeSource).
    pub fn edge_callback(&self) -> Callback<'_> {
        Callback { state: self, handler: SharedState::on_result_ready }
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

/// Zero-argument handler handed to an event source.
///
/// Bound to one [`SharedState`]; firing it runs the matching interrupt body
/// and returns immediately.
#[derive(Copy, Clone)]
pub struct Callback<'a> {
    state: &'a SharedState,
    handler: fn(&SharedState),
}

impl Callback<'_> {
    #[inline]
    pub fn fire(&self) {
        (self.handler)(self.state)
    }
}

impl fmt::Debug for Callback<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback").finish_non_exhaustive()
    }
}
