//! Monotonic nanosecond clock source.
//!
//! A thin wrapper over [`std::time::Instant`]: the standard library already
//! guarantees monotonicity on every platform Rust supports, so there is no
//! native clock to fall back to and no failure mode to model beyond "the host
//! has no monotonic clock at all", which `Instant` cannot represent — see
//! [`Timer::checked_now_ns`] for the one case we do check explicitly.

use std::time::Instant;

/// Monotonic nanosecond-resolution clock.
///
/// Construction never fails: `Instant::now()` itself cannot fail on a
/// supported host. [`ClockUnavailable`](crate::error::Error::ClockUnavailable)
/// exists for the one real failure mode, an epoch so large that elapsed
/// nanoseconds since start overflow `u64`, which [`Timer::now_ns`] detects by
/// saturating and [`Timer::checked_now_ns`] reports explicitly.
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Timer {
            start: Instant::now(),
        }
    }

    /// Monotonic reading in nanoseconds since this timer was created.
    ///
    /// Never goes backwards on the same thread. Saturates at `u64::MAX`
    /// rather than panicking if elapsed time ever overflows (not reachable
    /// in practice — `u64` nanoseconds spans over 580 years).
    pub fn now_ns(&self) -> u64 {
        self.start.elapsed().as_nanos().min(u128::from(u64::MAX)) as u64
    }

    /// Like [`Timer::now_ns`] but surfaces overflow as an error instead of
    /// saturating, for callers (the Driver) that must treat clock failure as
    /// fatal per the error-handling contract.
    pub fn checked_now_ns(&self) -> Result<u64, crate::error::Error> {
        let elapsed = self.start.elapsed().as_nanos();
        u64::try_from(elapsed).map_err(|_| crate::error::Error::ClockUnavailable)
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
