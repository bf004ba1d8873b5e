//! Real-time pacing constants and the swappable time source.
//!
//! # Design
//!
//! The drive loop advances the vehicle once per fixed tick of real time and
//! then sleeps for the remainder of the tick.  Sleeping is the loop's only
//! suspension point, so it goes through the [`TimeSource`] trait: production
//! code uses [`WallClock`] (a blocking `thread::sleep`), tests inject
//! [`ManualClock`] and run the full state machine without waiting on wall
//! time.
//!
//! Simulated time runs faster than real time: one simulated hour elapses in
//! [`MILLIS_PER_SIM_HOUR`] real milliseconds (72 s, a 50× speed-up), so a
//! vehicle doing `v` km/h covers `v * TICK_MS / MILLIS_PER_SIM_HOUR` km per
//! tick.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Duration of one motion-model tick, in real milliseconds.
pub const TICK_MS: u64 = 50;

/// Duration of one motion-model tick.
pub const TICK: Duration = Duration::from_millis(TICK_MS);

/// Real milliseconds per simulated hour.  72 000 ms means one simulated
/// hour passes in 72 real seconds.
pub const MILLIS_PER_SIM_HOUR: f64 = 72_000.0;

/// Distance covered in one tick at `speed` (in the route's rate unit per
/// hour), in the matching distance unit.
#[inline]
pub fn distance_per_tick(speed: f64) -> f64 {
    speed * TICK_MS as f64 / MILLIS_PER_SIM_HOUR
}

// ── TimeSource ────────────────────────────────────────────────────────────────

/// Pluggable pacing source for the drive loop.
///
/// Implementations must be `Send + Sync`: the facade clones its time source
/// into the drive worker thread while observers keep polling from others.
pub trait TimeSource: Send + Sync {
    /// Suspend the calling thread for `d` — or account for it, for virtual
    /// clocks that never block.
    fn sleep(&self, d: Duration);
}

/// Production time source: blocking wall-clock sleep.
#[derive(Copy, Clone, Debug, Default)]
pub struct WallClock;

impl TimeSource for WallClock {
    fn sleep(&self, d: Duration) {
        std::thread::sleep(d);
    }
}

/// Virtual time source for tests: never blocks, counts the ticks and the
/// virtual time that would have elapsed.
///
/// Clones share the same counters, so a test can keep one handle while the
/// drive loop consumes another.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    ticks:    Arc<AtomicU64>,
    slept_ms: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `sleep` calls observed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }

    /// Total virtual time slept.
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.slept_ms.load(Ordering::SeqCst))
    }
}

impl TimeSource for ManualClock {
    fn sleep(&self, d: Duration) {
        self.ticks.fetch_add(1, Ordering::SeqCst);
        self.slept_ms.fetch_add(d.as_millis() as u64, Ordering::SeqCst);
    }
}
