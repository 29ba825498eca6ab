//! Rate limit rules: a global default with per-key overrides.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default quota when nothing is configured.
pub const DEFAULT_LIMIT: u32 = 5;
/// Default window length when nothing is configured.
pub const DEFAULT_WINDOW_SECS: u64 = 60;

/// The resolved limit applied to one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitRule {
    /// Maximum requests admitted per window.
    pub limit: u32,
    /// Window length in seconds.
    pub window_secs: u64,
}

/// A configured per-key override.
///
/// The window is optional; when omitted the key keeps the global window and
/// only its quota changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyOverride {
    pub limit: u32,
    #[serde(default)]
    pub window_secs: Option<u64>,
}

/// Limit configuration for the whole limiter.
#[derive(Debug, Clone)]
pub struct LimitRules {
    default: LimitRule,
    overrides: HashMap<String, KeyOverride>,
}

impl LimitRules {
    pub fn new(default_limit: u32, window_secs: u64) -> Self {
        Self {
            default: LimitRule {
                limit: default_limit,
                window_secs,
            },
            overrides: HashMap::new(),
        }
    }

    pub fn with_overrides(
        default_limit: u32,
        window_secs: u64,
        overrides: HashMap<String, KeyOverride>,
    ) -> Self {
        Self {
            default: LimitRule {
                limit: default_limit,
                window_secs,
            },
            overrides,
        }
    }

    /// Resolve the rule for a key: the exact-match override if one exists,
    /// the global default otherwise.
    pub fn limit_for(&self, key: &str) -> LimitRule {
        match self.overrides.get(key) {
            Some(o) => LimitRule {
                limit: o.limit,
                window_secs: o.window_secs.unwrap_or(self.default.window_secs),
            },
            None => self.default,
        }
    }
}

impl Default for LimitRules {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, DEFAULT_WINDOW_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rule_applies_to_unknown_keys() {
        let rules = LimitRules::new(10, 30);
        let rule = rules.limit_for("anyone");
        assert_eq!(rule.limit, 10);
        assert_eq!(rule.window_secs, 30);
    }

    #[test]
    fn test_override_replaces_limit_and_keeps_global_window() {
        let mut overrides = HashMap::new();
        overrides.insert(
            "premium".to_string(),
            KeyOverride {
                limit: 100,
                window_secs: None,
            },
        );
        let rules = LimitRules::with_overrides(5, 60, overrides);

        let rule = rules.limit_for("premium");
        assert_eq!(rule.limit, 100);
        assert_eq!(rule.window_secs, 60);

        assert_eq!(rules.limit_for("basic").limit, 5);
    }

    #[test]
    fn test_override_can_replace_window_too() {
        let mut overrides = HashMap::new();
        overrides.insert(
            "bursty".to_string(),
            KeyOverride {
                limit: 2,
                window_secs: Some(10),
            },
        );
        let rules = LimitRules::with_overrides(5, 60, overrides);

        let rule = rules.limit_for("bursty");
        assert_eq!(rule.limit, 2);
        assert_eq!(rule.window_secs, 10);
    }

    #[test]
    fn test_override_parses_from_yaml() {
        let o: KeyOverride = serde_yaml::from_str("limit: 7").unwrap();
        assert_eq!(o.limit, 7);
        assert_eq!(o.window_secs, None);

        let o: KeyOverride = serde_yaml::from_str("limit: 7\nwindow_secs: 15").unwrap();
        assert_eq!(o.window_secs, Some(15));
    }
}
