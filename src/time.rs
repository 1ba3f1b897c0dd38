//! # Time source
//!
//! A monotonic, high-resolution timestamp abstraction. Only differences
//! between two [`Timestamp`]s are meaningful — the epoch itself is
//! unspecified and fixed once, at first use, for the lifetime of the
//! process.
//!
//! No other component in this crate reads wall-clock time directly; the
//! scheduler and the A* task instead take a [`Clock`] handle, so tests can
//! supply deterministic timing instead of depending on OS jitter.

use std::sync::OnceLock;
use std::time::Instant;

/// Microseconds from an unspecified monotonic epoch. Only differences are
/// meaningful.
pub type Timestamp = i64;

fn epoch() -> Instant {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    *EPOCH.get_or_init(Instant::now)
}

/// Current monotonic time, in microseconds since the process-wide epoch.
pub fn now() -> Timestamp {
    epoch().elapsed().as_micros() as Timestamp
}

/// Convert a [`Timestamp`] to milliseconds, losslessly, as `f64`.
pub const fn milliseconds(t: Timestamp) -> f64 {
    t as f64 / 1_000.0
}

/// Convert a [`Timestamp`] to seconds, losslessly, as `f64`.
pub const fn seconds(t: Timestamp) -> f64 {
    t as f64 / 1_000_000.0
}

/// Convert milliseconds to a [`Timestamp`].
pub fn timestamp_from_millis(ms: f64) -> Timestamp {
    (ms * 1_000.0) as Timestamp
}

/// Convert seconds to a [`Timestamp`].
pub fn timestamp_from_secs(s: f64) -> Timestamp {
    (s * 1_000_000.0) as Timestamp
}

/// A source of monotonic time. The host provides the real implementation
/// ([`SystemClock`]); tests use [`ManualClock`] to drive deterministic
/// scheduler scenarios without depending on wall-clock jitter.
pub trait Clock {
    /// Current monotonic time, in microseconds.
    fn now(&self) -> Timestamp;
}

/// The default [`Clock`], backed by [`now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        now()
    }
}

/// A [`Clock`] whose time only advances when told to. Used by scheduler
/// and A*-task tests that need exact control over elapsed time per step.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    current: std::cell::Cell<Timestamp>,
}

impl ManualClock {
    /// Create a manual clock starting at time zero.
    pub fn new() -> Self {
        Self {
            current: std::cell::Cell::new(0),
        }
    }

    /// Advance the clock by `dt` microseconds.
    pub fn advance(&self, dt: Timestamp) {
        self.current.set(self.current.get() + dt);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.current.get()
    }
}
