//! Rate limiting engine: clock, fixed-window policy, key store, and the
//! limiter that ties them together.

pub mod clock;
pub mod limiter;
pub mod rules;
pub mod store;
pub mod window;

pub use clock::{Clock, SystemClock};
pub use limiter::{CheckDecision, QuotaStatus, RateLimiter};
pub use rules::{KeyOverride, LimitRule, LimitRules};
