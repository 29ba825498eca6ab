//! Core rate limiter implementation.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, trace};

use crate::error::{GatekeeperError, Result};

use super::clock::{Clock, SystemClock};
use super::rules::LimitRules;
use super::store::KeyStore;
use super::window::{self, WindowEntry};

/// How long past its window end an idle entry survives before the sweep
/// removes it, by default.
const DEFAULT_EVICTION_GRACE_SECS: u64 = 300;

/// The core rate limiter that manages per-key window counters.
///
/// This struct is thread-safe and can be shared across multiple tasks. The
/// clock is injected so tests can drive window boundaries deterministically.
pub struct RateLimiter<C: Clock = SystemClock> {
    /// Window counters indexed by rate limit key
    store: KeyStore,
    /// Default limit plus per-key overrides
    rules: LimitRules,
    /// Time source
    clock: C,
    /// Idle grace period used by `evict_stale`
    eviction_grace_secs: u64,
}

/// Result of an admission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckDecision {
    /// Whether the request was admitted.
    pub allowed: bool,
    /// The limit applied to this key.
    pub limit: u32,
    /// Quota left in the current window.
    pub remaining: u32,
    /// Whole seconds until the window rolls over (0 when admitted).
    pub retry_after_secs: u64,
    /// Absolute end of the current window.
    pub reset_at: DateTime<Utc>,
}

/// Read-only view of a key's quota.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaStatus {
    /// The limit applied to this key.
    pub limit: u32,
    /// Quota left in the current window.
    pub remaining: u32,
    /// Whole seconds until the window rolls over.
    pub reset_in_secs: u64,
    /// Absolute end of the current window.
    pub reset_at: DateTime<Utc>,
}

impl RateLimiter<SystemClock> {
    /// Create a rate limiter on the system clock.
    pub fn new(rules: LimitRules) -> Self {
        Self::with_clock(rules, SystemClock)
    }
}

impl<C: Clock> RateLimiter<C> {
    /// Create a rate limiter with an explicit clock.
    pub fn with_clock(rules: LimitRules, clock: C) -> Self {
        Self {
            store: KeyStore::new(),
            rules,
            clock,
            eviction_grace_secs: DEFAULT_EVICTION_GRACE_SECS,
        }
    }

    /// Override the idle grace period used by [`RateLimiter::evict_stale`].
    pub fn with_eviction_grace(mut self, secs: u64) -> Self {
        self.eviction_grace_secs = secs;
        self
    }

    /// Decide admission for one request under the key.
    ///
    /// A rejection is a normal outcome (`allowed == false`), not an error;
    /// the error path is reserved for invalid input.
    pub fn check(&self, key: &str) -> Result<CheckDecision> {
        let key = validate_key(key)?;
        let rule = self.rules.limit_for(key);
        let now = self.clock.now();

        trace!(key, limit = rule.limit, "Checking rate limit");

        let decision = self.store.with_entry(key, now, |entry| {
            window::admit(entry, now, rule.limit, rule.window_secs)
        });

        if !decision.allowed {
            debug!(
                key,
                retry_after_secs = decision.retry_after_secs,
                "Rate limit exceeded"
            );
        }

        Ok(CheckDecision {
            allowed: decision.allowed,
            limit: rule.limit,
            remaining: decision.remaining,
            retry_after_secs: decision.retry_after_secs,
            reset_at: decision.reset_at,
        })
    }

    /// Report the key's quota without consuming any of it.
    ///
    /// A key with no entry, or whose window has already elapsed, is reported
    /// at full quota with a window that would start now. No state is written
    /// either way, so a later `check` still begins its own fresh window.
    pub fn status(&self, key: &str) -> Result<QuotaStatus> {
        let key = validate_key(key)?;
        let rule = self.rules.limit_for(key);
        let now = self.clock.now();

        let status = match self.store.peek(key) {
            Some(entry) if !window::window_elapsed(&entry, now, rule.window_secs) => QuotaStatus {
                limit: rule.limit,
                remaining: rule.limit.saturating_sub(entry.count),
                reset_in_secs: window::seconds_until_reset(&entry, now, rule.window_secs),
                reset_at: window::window_end(&entry, rule.window_secs),
            },
            _ => QuotaStatus {
                limit: rule.limit,
                remaining: rule.limit,
                reset_in_secs: rule.window_secs,
                reset_at: now + Duration::seconds(rule.window_secs as i64),
            },
        };

        Ok(status)
    }

    /// Force a fresh window for the key. Idempotent; other keys are
    /// unaffected.
    pub fn reset(&self, key: &str) -> Result<()> {
        let key = validate_key(key)?;
        let now = self.clock.now();

        self.store.overwrite(key, WindowEntry::fresh(now));
        debug!(key, "Rate limit reset");
        Ok(())
    }

    /// Remove entries whose window ended longer ago than the grace period.
    ///
    /// Purely a memory bound: an evicted key behaves exactly like a
    /// never-seen one on its next request.
    pub fn evict_stale(&self) {
        let now = self.clock.now();

        // The sweep races with request handlers inserting new keys, so the
        // eviction count comes from the retain pass itself rather than
        // comparing store sizes sampled around it.
        let mut evicted = 0usize;
        self.store.retain(|key, entry| {
            let rule = self.rules.limit_for(key);
            let idle_deadline = window::window_end(entry, rule.window_secs)
                + Duration::seconds(self.eviction_grace_secs as i64);
            let keep = now < idle_deadline;
            if !keep {
                evicted += 1;
            }
            keep
        });

        if evicted > 0 {
            debug!(evicted, remaining = self.store.len(), "Evicted stale entries");
        }
    }

    /// Number of live entries in the store.
    pub fn entry_count(&self) -> usize {
        self.store.len()
    }
}

fn validate_key(key: &str) -> Result<&str> {
    if key.trim().is_empty() {
        return Err(GatekeeperError::InvalidKey(
            "key must be a non-empty string".to_string(),
        ));
    }
    Ok(key)
}
