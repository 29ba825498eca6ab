//! Fixed-window admission policy.
//!
//! The policy is a pure function of `(now, entry)`: callers own the entry and
//! the clock read, which keeps the algorithm trivially testable. Windows are
//! discrete and non-overlapping; a key's counter accumulates within the
//! current window and is zeroed once the window has fully elapsed.

use chrono::{DateTime, Duration, Utc};

/// Per-key counter state for the current window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowEntry {
    /// Requests admitted in the current window.
    pub count: u32,
    /// When the current window began.
    pub window_start: DateTime<Utc>,
}

impl WindowEntry {
    /// A brand-new window starting now, with nothing counted yet.
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            count: 0,
            window_start: now,
        }
    }
}

/// Outcome of a single admission decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowDecision {
    /// Whether the request was admitted.
    pub allowed: bool,
    /// Quota left in the current window after this decision.
    pub remaining: u32,
    /// Whole seconds until the window rolls over (0 when admitted).
    pub retry_after_secs: u64,
    /// Absolute end of the current window.
    pub reset_at: DateTime<Utc>,
}

/// Whether the entry's window has fully elapsed at `now`.
pub fn window_elapsed(entry: &WindowEntry, now: DateTime<Utc>, window_secs: u64) -> bool {
    now.signed_duration_since(entry.window_start) >= Duration::seconds(window_secs as i64)
}

/// Roll the entry over to a fresh window if the current one has elapsed.
pub fn roll_over_if_elapsed(entry: &mut WindowEntry, now: DateTime<Utc>, window_secs: u64) {
    if window_elapsed(entry, now, window_secs) {
        entry.count = 0;
        entry.window_start = now;
    }
}

/// Decide admission for one request against the entry, mutating it in place.
///
/// Rollover is applied first, so a request arriving at or past the window
/// boundary always starts a fresh window. An admitted request increments the
/// counter; a rejected one leaves it untouched, so `count` can never exceed
/// `limit`.
pub fn admit(
    entry: &mut WindowEntry,
    now: DateTime<Utc>,
    limit: u32,
    window_secs: u64,
) -> WindowDecision {
    roll_over_if_elapsed(entry, now, window_secs);

    let reset_at = window_end(entry, window_secs);
    if entry.count < limit {
        entry.count += 1;
        WindowDecision {
            allowed: true,
            remaining: limit - entry.count,
            retry_after_secs: 0,
            reset_at,
        }
    } else {
        WindowDecision {
            allowed: false,
            remaining: 0,
            retry_after_secs: seconds_until_reset(entry, now, window_secs),
            reset_at,
        }
    }
}

/// Absolute end of the entry's current window.
pub fn window_end(entry: &WindowEntry, window_secs: u64) -> DateTime<Utc> {
    entry.window_start + Duration::seconds(window_secs as i64)
}

/// Whole seconds until the entry's window rolls over, never negative.
///
/// Sub-second remainders round up, so a caller told to wait N seconds is
/// guaranteed the window has rolled over after waiting that long. A result of
/// 0 means the window has already elapsed and the next call starts fresh.
pub fn seconds_until_reset(entry: &WindowEntry, now: DateTime<Utc>, window_secs: u64) -> u64 {
    let remaining_ms = window_end(entry, window_secs)
        .signed_duration_since(now)
        .num_milliseconds();

    if remaining_ms <= 0 {
        0
    } else {
        (remaining_ms as u64).div_ceil(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_admits_up_to_limit() {
        let now = start();
        let mut entry = WindowEntry::fresh(now);

        for expected_remaining in (0..5).rev() {
            let decision = admit(&mut entry, now, 5, 60);
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
        }

        let decision = admit(&mut entry, now, 5, 60);
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
        assert_eq!(entry.count, 5, "rejection must not increment the counter");
    }

    #[test]
    fn test_rejection_reports_retry_after() {
        let now = start();
        let mut entry = WindowEntry::fresh(now);
        for _ in 0..2 {
            admit(&mut entry, now, 2, 60);
        }

        let later = now + Duration::seconds(30);
        let decision = admit(&mut entry, later, 2, 60);
        assert!(!decision.allowed);
        assert_eq!(decision.retry_after_secs, 30);
        assert_eq!(decision.reset_at, now + Duration::seconds(60));
    }

    #[test]
    fn test_retry_after_rounds_up_subsecond_remainders() {
        let now = start();
        let mut entry = WindowEntry::fresh(now);
        admit(&mut entry, now, 1, 60);

        let later = now + Duration::milliseconds(59_500);
        let decision = admit(&mut entry, later, 1, 60);
        assert!(!decision.allowed);
        // 500ms left in the window still costs a whole second of waiting.
        assert_eq!(decision.retry_after_secs, 1);
    }

    #[test]
    fn test_rollover_at_exact_boundary() {
        let now = start();
        let mut entry = WindowEntry::fresh(now);
        admit(&mut entry, now, 1, 60);

        let boundary = now + Duration::seconds(60);
        let decision = admit(&mut entry, boundary, 1, 60);
        assert!(decision.allowed);
        assert_eq!(entry.window_start, boundary);
        assert_eq!(entry.count, 1);
    }

    #[test]
    fn test_zero_limit_always_rejects() {
        let now = start();
        let mut entry = WindowEntry::fresh(now);

        let decision = admit(&mut entry, now, 0, 60);
        assert!(!decision.allowed);
        assert_eq!(entry.count, 0);
    }

    #[test]
    fn test_seconds_until_reset_floors_at_zero() {
        let now = start();
        let entry = WindowEntry::fresh(now);

        let long_past = now + Duration::seconds(3600);
        assert_eq!(seconds_until_reset(&entry, long_past, 60), 0);
    }

    #[test]
    fn test_clock_going_backwards_does_not_roll_over() {
        let now = start();
        let mut entry = WindowEntry::fresh(now);
        admit(&mut entry, now, 5, 60);

        let earlier = now - Duration::seconds(10);
        assert!(!window_elapsed(&entry, earlier, 60));
        let decision = admit(&mut entry, earlier, 5, 60);
        assert!(decision.allowed);
        assert_eq!(entry.count, 2);
    }
}
