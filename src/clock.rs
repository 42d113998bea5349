//! Monotonic clock and the two ways a timing value is printed.
//!
//! Readings are offsets from the moment the [`Clock`] was created, not
//! calendar time, so wall-clock adjustments never skew a duration. The clock
//! is tokio's [`Instant`], which means tests running on a paused runtime get
//! exact, repeatable numbers.

use std::fmt;
use std::time::Duration;

use tokio::time::Instant;

/// A monotonic time source with a fixed origin.
///
/// `Copy` and immutable: every invocation reads it independently.
#[derive(Clone, Copy, Debug)]
pub struct Clock {
    origin: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }

    /// Time elapsed since the clock was created.
    pub fn now(&self) -> Duration {
        Instant::now().saturating_duration_since(self.origin)
    }
}

impl Default for Clock {
    fn default() -> Self { Self::new() }
}

// ── Formatting ────────────────────────────────────────────────────────────────

/// A clock reading rendered as `<whole seconds>s <sub-second millis>ms`.
///
/// ```rust
/// use std::time::Duration;
/// use tsu_timing::clock::Reading;
///
/// assert_eq!(Reading(Duration::new(3, 250_500_000)).to_string(), "3s 250.5ms");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reading(pub Duration);

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let millis = f64::from(self.0.subsec_nanos()) / 1e6;
        write!(f, "{}s {}ms", self.0.as_secs(), millis)
    }
}

/// An elapsed duration rendered as decimal milliseconds, e.g. `12.5ms`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Elapsed(pub Duration);

impl Elapsed {
    pub fn as_millis_f64(&self) -> f64 {
        (self.0.as_secs() as f64 * 1e9 + f64::from(self.0.subsec_nanos())) / 1e6
    }
}

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.as_millis_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reading_splits_seconds_and_millis() {
        assert_eq!(Reading(Duration::ZERO).to_string(), "0s 0ms");
        assert_eq!(Reading(Duration::from_millis(1_500)).to_string(), "1s 500ms");
        assert_eq!(Reading(Duration::new(7, 1_250_000)).to_string(), "7s 1.25ms");
    }

    #[test]
    fn elapsed_counts_whole_seconds_as_millis() {
        assert_eq!(Elapsed(Duration::from_millis(50)).to_string(), "50ms");
        assert_eq!(Elapsed(Duration::new(2, 500_000)).to_string(), "2000.5ms");
        assert_eq!(Elapsed(Duration::ZERO).to_string(), "0ms");
    }

    #[tokio::test(start_paused = true)]
    async fn clock_follows_the_runtime_clock() {
        let clock = Clock::new();
        assert_eq!(clock.now(), Duration::ZERO);

        tokio::time::advance(Duration::from_millis(1_500)).await;
        assert_eq!(clock.now(), Duration::from_millis(1_500));
    }
}
