//! Pipeline time primitives.
//!
//! Every event in the pipeline carries an originating [`Timestamp`]: the
//! estimated wall-clock moment the described phenomenon happened, expressed
//! in nanosecond ticks since the Unix epoch. Components compare these
//! estimates against the current pipeline time through the [`Clock`] trait,
//! which allows mock time in tests.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A point in pipeline time, in nanosecond ticks since the Unix epoch.
///
/// Timestamps are estimates produced upstream (a recognizer guessing when a
/// word was spoken), so arriving values may jitter backwards. All arithmetic
/// here saturates instead of panicking.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// The earliest representable timestamp.
    pub const MIN: Timestamp = Timestamp(i64::MIN);

    /// Creates a timestamp from raw nanosecond ticks.
    pub const fn from_nanos(nanos: i64) -> Self {
        Timestamp(nanos)
    }

    /// Creates a timestamp from milliseconds since the epoch.
    pub const fn from_millis(millis: i64) -> Self {
        Timestamp(millis.saturating_mul(1_000_000))
    }

    /// Returns the raw nanosecond tick count.
    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    /// Returns the timestamp one tick (nanosecond) later.
    pub const fn next_tick(self) -> Self {
        Timestamp(self.0.saturating_add(1))
    }

    /// Returns the timestamp advanced by `duration`.
    pub fn plus(self, duration: Duration) -> Self {
        let nanos = i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX);
        Timestamp(self.0.saturating_add(nanos))
    }

    /// Returns the timestamp moved back by `duration`.
    pub fn minus(self, duration: Duration) -> Self {
        let nanos = i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX);
        Timestamp(self.0.saturating_sub(nanos))
    }

    /// Signed tick distance from `earlier` to `self`.
    ///
    /// Negative when `self` precedes `earlier`, which happens when upstream
    /// estimates overlap.
    pub const fn nanos_since(self, earlier: Timestamp) -> i64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Elapsed time from `earlier` to `self`, or zero if `self` is not later.
    pub fn saturating_duration_since(self, earlier: Timestamp) -> Duration {
        if self.0 > earlier.0 {
            Duration::from_nanos(self.0.wrapping_sub(earlier.0) as u64)
        } else {
            Duration::ZERO
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ns", self.0)
    }
}

/// Trait for reading the current pipeline time, allowing mock time in tests.
pub trait Clock: Send + Sync {
    /// Returns the current pipeline time.
    fn now(&self) -> Timestamp;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Real system clock reading `SystemTime::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(elapsed) => {
                Timestamp::from_nanos(i64::try_from(elapsed.as_nanos()).unwrap_or(i64::MAX))
            }
            Err(before) => {
                let nanos = i64::try_from(before.duration().as_nanos()).unwrap_or(i64::MAX);
                Timestamp::from_nanos(nanos.saturating_neg())
            }
        }
    }
}

/// Mock clock for tests that allows manual time advancement.
///
/// Clones share the same underlying time, so a clone handed to a component
/// under test can be advanced from the test body.
#[derive(Debug, Clone, Default)]
pub struct MockClock {
    current: Arc<AtomicI64>,
}

impl MockClock {
    /// Creates a mock clock starting at the given timestamp.
    pub fn new(start: Timestamp) -> Self {
        Self {
            current: Arc::new(AtomicI64::new(start.as_nanos())),
        }
    }

    /// Advances the mock clock by the given duration.
    pub fn advance(&self, duration: Duration) {
        let nanos = i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX);
        self.current.fetch_add(nanos, Ordering::SeqCst);
    }

    /// Sets the mock clock to an absolute timestamp.
    pub fn set(&self, time: Timestamp) {
        self.current.store(time.as_nanos(), Ordering::SeqCst);
    }
}

impl Clock for MockClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_nanos(self.current.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_tick_advances_one_nanosecond() {
        let t = Timestamp::from_nanos(100);
        assert_eq!(t.next_tick(), Timestamp::from_nanos(101));
    }

    #[test]
    fn test_next_tick_saturates_at_max() {
        let t = Timestamp::from_nanos(i64::MAX);
        assert_eq!(t.next_tick(), Timestamp::from_nanos(i64::MAX));
    }

    #[test]
    fn test_plus_minus_round_trip() {
        let t = Timestamp::from_millis(1_000);
        let later = t.plus(Duration::from_millis(250));
        assert_eq!(later.nanos_since(t), 250_000_000);
        assert_eq!(later.minus(Duration::from_millis(250)), t);
    }

    #[test]
    fn test_nanos_since_is_signed() {
        let a = Timestamp::from_nanos(500);
        let b = Timestamp::from_nanos(800);
        assert_eq!(b.nanos_since(a), 300);
        assert_eq!(a.nanos_since(b), -300);
    }

    #[test]
    fn test_saturating_duration_since_clamps_to_zero() {
        let a = Timestamp::from_nanos(500);
        let b = Timestamp::from_nanos(800);
        assert_eq!(b.saturating_duration_since(a), Duration::from_nanos(300));
        assert_eq!(a.saturating_duration_since(b), Duration::ZERO);
    }

    #[test]
    fn test_system_clock_is_past_epoch() {
        let now = SystemClock.now();
        assert!(now > Timestamp::from_nanos(0));
    }

    #[test]
    fn test_mock_clock_advance_is_visible_to_clones() {
        let clock = MockClock::new(Timestamp::from_millis(10));
        let shared = clock.clone();
        clock.advance(Duration::from_millis(5));
        assert_eq!(shared.now(), Timestamp::from_millis(15));
    }

    #[test]
    fn test_mock_clock_set_overrides_time() {
        let clock = MockClock::new(Timestamp::from_millis(10));
        clock.set(Timestamp::from_millis(99));
        assert_eq!(clock.now(), Timestamp::from_millis(99));
    }

    #[test]
    fn test_arc_dyn_clock_delegates() {
        let clock: Arc<dyn Clock> = Arc::new(MockClock::new(Timestamp::from_millis(42)));
        assert_eq!(clock.now(), Timestamp::from_millis(42));
    }

    #[test]
    fn test_display_shows_nanoseconds() {
        let t = Timestamp::from_nanos(1500);
        assert_eq!(t.to_string(), "1500ns");
    }
}
