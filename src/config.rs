//! Configuration management for Gatekeeper.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;

use crate::error::{GatekeeperError, Result};
use crate::ratelimit::{KeyOverride, LimitRules};

/// Upper bound on configured durations: one year in seconds. Keeps window
/// arithmetic far away from the point where `chrono::Duration::seconds`
/// would panic on an oversized value.
pub const MAX_DURATION_SECS: u64 = 31_536_000;

/// Main configuration for the Gatekeeper service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatekeeperConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limiting: RateLimitingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    "127.0.0.1:3001".parse().unwrap()
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitingConfig {
    /// Requests admitted per key per window
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// Window length in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// How long past its window end an idle entry survives before eviction
    #[serde(default = "default_eviction_grace_secs")]
    pub eviction_grace_secs: u64,

    /// How often the background eviction sweep runs, in seconds
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Per-key limit overrides
    #[serde(default)]
    pub overrides: HashMap<String, KeyOverride>,
}

impl Default for RateLimitingConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            window_secs: default_window_secs(),
            eviction_grace_secs: default_eviction_grace_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            overrides: HashMap::new(),
        }
    }
}

fn default_limit() -> u32 {
    crate::ratelimit::rules::DEFAULT_LIMIT
}

fn default_window_secs() -> u64 {
    crate::ratelimit::rules::DEFAULT_WINDOW_SECS
}

fn default_eviction_grace_secs() -> u64 {
    300
}

fn default_sweep_interval_secs() -> u64 {
    60
}

impl GatekeeperConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: GatekeeperConfig = serde_yaml::from_str(&contents)
            .map_err(|e| GatekeeperError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges. Must also be called after CLI overrides.
    pub fn validate(&self) -> Result<()> {
        self.rate_limiting.validate()
    }
}

impl RateLimitingConfig {
    /// Build the limiter's rules from this configuration.
    pub fn rules(&self) -> LimitRules {
        LimitRules::with_overrides(
            self.default_limit,
            self.window_secs,
            self.overrides.clone(),
        )
    }

    /// Reject zero-length or oversized durations before they reach window
    /// arithmetic or the sweep interval.
    pub fn validate(&self) -> Result<()> {
        check_duration("window_secs", self.window_secs)?;
        check_duration("sweep_interval_secs", self.sweep_interval_secs)?;
        if self.eviction_grace_secs > MAX_DURATION_SECS {
            return Err(GatekeeperError::Config(format!(
                "eviction_grace_secs must be at most {} seconds, got {}",
                MAX_DURATION_SECS, self.eviction_grace_secs
            )));
        }
        for (key, o) in &self.overrides {
            if let Some(window_secs) = o.window_secs {
                check_duration(&format!("overrides.{}.window_secs", key), window_secs)?;
            }
        }
        Ok(())
    }
}

fn check_duration(field: &str, secs: u64) -> Result<()> {
    if secs == 0 || secs > MAX_DURATION_SECS {
        return Err(GatekeeperError::Config(format!(
            "{} must be between 1 and {} seconds, got {}",
            field, MAX_DURATION_SECS, secs
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatekeeperConfig::default();
        assert_eq!(config.server.listen_addr, default_listen_addr());
        assert_eq!(config.rate_limiting.default_limit, 5);
        assert_eq!(config.rate_limiting.window_secs, 60);
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
server:
  listen_addr: 0.0.0.0:8080
rate_limiting:
  default_limit: 20
  window_secs: 10
  overrides:
    premium-user:
      limit: 200
"#;
        let config: GatekeeperConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server.listen_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.rate_limiting.default_limit, 20);
        assert_eq!(config.rate_limiting.window_secs, 10);

        let rules = config.rate_limiting.rules();
        assert_eq!(rules.limit_for("premium-user").limit, 200);
        assert_eq!(rules.limit_for("premium-user").window_secs, 10);
        assert_eq!(rules.limit_for("anyone").limit, 20);
    }

    #[test]
    fn test_validate_rejects_zero_window() {
        let mut config = GatekeeperConfig::default();
        config.rate_limiting.window_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(GatekeeperError::Config(_))
        ));
    }

    #[test]
    fn test_validate_rejects_oversized_durations() {
        let mut config = GatekeeperConfig::default();
        config.rate_limiting.window_secs = MAX_DURATION_SECS + 1;
        assert!(config.validate().is_err());

        let mut config = GatekeeperConfig::default();
        config.rate_limiting.eviction_grace_secs = u64::MAX;
        assert!(config.validate().is_err());

        let mut config = GatekeeperConfig::default();
        config.rate_limiting.overrides.insert(
            "bursty".to_string(),
            KeyOverride {
                limit: 2,
                window_secs: Some(u64::MAX),
            },
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(GatekeeperConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let yaml = r#"
rate_limiting:
  default_limit: 3
"#;
        let config: GatekeeperConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.rate_limiting.default_limit, 3);
        assert_eq!(config.rate_limiting.window_secs, 60);
        assert_eq!(config.server.listen_addr, default_listen_addr());
    }
}
