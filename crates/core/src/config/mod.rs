//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (CITECACHE_*)
//! 2. TOML config file (if CITECACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use chrono::{NaiveTime, TimeDelta};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::resolver::{FreshnessPolicy, ResolverConfig};

mod validation;

pub use validation::ConfigError;

/// How the server exposes lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// HTTP read endpoint.
    #[default]
    Http,
    /// MCP tools over stdio.
    Stdio,
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (CITECACHE_*)
/// 2. TOML config file (if CITECACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite citation store.
    ///
    /// Set via CITECACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Base URL of the upstream citation index API.
    ///
    /// Set via CITECACHE_UPSTREAM_BASE_URL environment variable.
    /// Required only once the upstream client is built.
    #[serde(default)]
    pub upstream_base_url: Option<String>,

    /// User-Agent string for upstream requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Timeout for the synchronous fetch on a cache miss, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Timeout for background refreshes, in milliseconds.
    #[serde(default = "default_refresh_timeout_ms")]
    pub refresh_timeout_ms: u64,

    /// Minimum spacing between upstream requests, in milliseconds.
    #[serde(default = "default_min_request_interval_ms")]
    pub min_request_interval_ms: u64,

    /// Background refreshes allowed in flight at once.
    #[serde(default = "default_max_concurrent_refreshes")]
    pub max_concurrent_refreshes: usize,

    /// Age after which a cached record is served stale and refreshed.
    #[serde(default = "default_stale_after_secs")]
    pub stale_after_secs: u64,

    /// Age after which the sweep deletes a cached record.
    #[serde(default = "default_evict_after_secs")]
    pub evict_after_secs: u64,

    /// Whether the server runs the daily sweep itself.
    ///
    /// Disable when an external scheduler runs `citecache-sweep`.
    #[serde(default = "default_true")]
    pub sweep_enabled: bool,

    /// Daily sweep time, `HH:MM` in UTC.
    #[serde(default = "default_sweep_at")]
    pub sweep_at: String,

    /// Socket address for the HTTP transport.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// `http` or `stdio`.
    #[serde(default)]
    pub transport: Transport,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./citecache.sqlite")
}

fn default_user_agent() -> String {
    "citecache/0.1".into()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_refresh_timeout_ms() -> u64 {
    60_000
}

fn default_min_request_interval_ms() -> u64 {
    250
}

fn default_max_concurrent_refreshes() -> usize {
    4
}

fn default_stale_after_secs() -> u64 {
    86_400 // 24h
}

fn default_evict_after_secs() -> u64 {
    604_800 // 7 days
}

fn default_true() -> bool {
    true
}

fn default_sweep_at() -> String {
    "03:00".into()
}

fn default_listen_addr() -> String {
    "0.0.0.0:3000".into()
}

fn secs_to_delta(secs: u64) -> TimeDelta {
    i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .unwrap_or(TimeDelta::MAX)
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            upstream_base_url: None,
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            refresh_timeout_ms: default_refresh_timeout_ms(),
            min_request_interval_ms: default_min_request_interval_ms(),
            max_concurrent_refreshes: default_max_concurrent_refreshes(),
            stale_after_secs: default_stale_after_secs(),
            evict_after_secs: default_evict_after_secs(),
            sweep_enabled: true,
            sweep_at: default_sweep_at(),
            listen_addr: default_listen_addr(),
            transport: Transport::Http,
        }
    }
}

impl AppConfig {
    /// Live fetch timeout as Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Background refresh timeout as Duration.
    pub fn refresh_timeout(&self) -> Duration {
        Duration::from_millis(self.refresh_timeout_ms)
    }

    pub fn min_request_interval(&self) -> Duration {
        Duration::from_millis(self.min_request_interval_ms)
    }

    /// Age thresholds. Values beyond the representable range saturate;
    /// `validate()` rejects them before they get here.
    pub fn freshness_policy(&self) -> FreshnessPolicy {
        FreshnessPolicy::new(secs_to_delta(self.stale_after_secs), secs_to_delta(self.evict_after_secs))
    }

    /// Settings injected into the citation service.
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            policy: self.freshness_policy(),
            live_timeout: self.timeout(),
            refresh_timeout: self.refresh_timeout(),
            max_concurrent_refreshes: self.max_concurrent_refreshes,
        }
    }

    /// Parsed daily sweep time.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `sweep_at` is not `HH:MM`.
    pub fn sweep_time(&self) -> Result<NaiveTime, ConfigError> {
        NaiveTime::parse_from_str(self.sweep_at.trim(), "%H:%M").map_err(|e| ConfigError::Invalid {
            field: "sweep_at".into(),
            reason: format!("expected HH:MM, got {:?} ({e})", self.sweep_at),
        })
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `CITECACHE_`
    /// 2. TOML file from `CITECACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("CITECACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("CITECACHE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Upstream base URL, checked only when the fetcher is built.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if no upstream URL is configured.
    pub fn require_upstream_base_url(&self) -> Result<&str, ConfigError> {
        self.upstream_base_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ConfigError::Missing {
                field: "upstream_base_url".into(),
                hint: "Set CITECACHE_UPSTREAM_BASE_URL environment variable".into(),
            })
    }
}
