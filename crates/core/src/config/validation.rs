//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

/// Upper bound for the age thresholds: ten years.
const MAX_AGE_SECS: u64 = 10 * 365 * 86_400;

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `refresh_timeout_ms` is shorter than `timeout_ms` or exceeds 10 minutes
    /// - `stale_after_secs` is 0 or not below `evict_after_secs`
    /// - either age threshold exceeds 10 years
    /// - `max_concurrent_refreshes` is 0
    /// - `user_agent` is empty
    /// - `sweep_at` is not `HH:MM`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.refresh_timeout_ms < self.timeout_ms {
            return Err(invalid("refresh_timeout_ms", "must not be shorter than timeout_ms"));
        }
        if self.refresh_timeout_ms > 600_000 {
            return Err(invalid("refresh_timeout_ms", "must not exceed 10 minutes (600000ms)"));
        }

        if self.stale_after_secs == 0 {
            return Err(invalid("stale_after_secs", "must be greater than 0"));
        }
        if self.stale_after_secs > MAX_AGE_SECS {
            return Err(invalid("stale_after_secs", "must not exceed 10 years (315360000s)"));
        }
        if self.evict_after_secs > MAX_AGE_SECS {
            return Err(invalid("evict_after_secs", "must not exceed 10 years (315360000s)"));
        }
        if self.evict_after_secs <= self.stale_after_secs {
            return Err(invalid("evict_after_secs", "must be greater than stale_after_secs"));
        }

        if self.max_concurrent_refreshes == 0 {
            return Err(invalid("max_concurrent_refreshes", "must be at least 1"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        self.sweep_time()?;

        if self.min_request_interval_ms > 60_000 {
            tracing::warn!(
                min_request_interval_ms = self.min_request_interval_ms,
                "min_request_interval_ms above one minute will make live lookups time out"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_timeout_too_small() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_timeout_exceeds_limit() {
        let config = AppConfig { timeout_ms: 301_000, refresh_timeout_ms: 400_000, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));
    }

    #[test]
    fn test_validate_refresh_shorter_than_live() {
        let config = AppConfig { timeout_ms: 20_000, refresh_timeout_ms: 5_000, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "refresh_timeout_ms"));
    }

    #[test]
    fn test_validate_eviction_must_outlast_staleness() {
        let config = AppConfig { stale_after_secs: 86_400, evict_after_secs: 86_400, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "evict_after_secs"));

        let config = AppConfig { stale_after_secs: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "stale_after_secs"));
    }

    #[test]
    fn test_validate_age_thresholds_bounded() {
        let config = AppConfig { evict_after_secs: u64::MAX, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "evict_after_secs"));

        let config = AppConfig { evict_after_secs: 10_000_000_000_000, ..Default::default() };
        assert!(config.validate().is_err());

        let config =
            AppConfig { stale_after_secs: MAX_AGE_SECS + 1, evict_after_secs: MAX_AGE_SECS + 2, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "stale_after_secs"));

        let config = AppConfig { evict_after_secs: MAX_AGE_SECS, ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_refresh_concurrency() {
        let config = AppConfig { max_concurrent_refreshes: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "max_concurrent_refreshes"));
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }

    #[test]
    fn test_validate_bad_sweep_time() {
        let config = AppConfig { sweep_at: "3am".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "sweep_at"));
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AppConfig {
            timeout_ms: 100,
            refresh_timeout_ms: 100,
            stale_after_secs: 1,
            evict_after_secs: 2,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
