//! Time source abstraction.
//!
//! The limiter never reads the system clock directly. Injecting the clock
//! lets tests drive window boundaries deterministically.

use chrono::{DateTime, Utc};

/// Supplies the current time to the limiter.
///
/// Implementations must be thread-safe; the limiter is shared across tasks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ManualClock;
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_system_clock_is_monotonic_enough() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::epoch();
        let start = clock.now();

        clock.advance(Duration::seconds(42));
        assert_eq!(clock.now() - start, Duration::seconds(42));

        clock.advance_secs(18);
        assert_eq!(clock.now() - start, Duration::seconds(60));
    }
}
