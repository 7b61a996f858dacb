//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `plugdash.toml` in the working directory unless `--config`
//! points elsewhere. Every field has a default so the file is optional.
//! Environment variables take precedence over file values.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;

use plugdash_adapter_http_reqwest::DEFAULT_BASE_URL;

/// Largest UTC offset accepted for peak-hour detection.
const MAX_OFFSET_HOURS: i32 = 14;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend connection settings.
    pub api: ApiConfig,
    /// Where the access token is kept.
    pub auth: AuthConfig,
    /// Refresh cadence for `watch` commands.
    pub polling: PollingConfig,
    /// Analytics tuning.
    pub analytics: AnalyticsConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the REST backend.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// File holding the bearer token between runs.
    pub token_path: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub interval_secs: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Local offset from UTC, used to decide which hours are peak.
    pub utc_offset_hours: i32,
    /// Seed for the synthetic tariff and fallback readings.
    pub tariff_seed: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `path` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is malformed, or if the
    /// resulting values are invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(
        &mut self,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = var("PLUGDASH_API_URL") {
            self.api.base_url = val;
        }
        if let Some(val) = var("PLUGDASH_TOKEN_PATH") {
            self.auth.token_path = PathBuf::from(val);
        }
        if let Some(val) = var("PLUGDASH_POLL_SECS") {
            self.polling.interval_secs = val.trim().parse().map_err(|_| {
                ConfigError::Validation(format!(
                    "PLUGDASH_POLL_SECS must be a number of seconds, got {val:?}"
                ))
            })?;
        }
        if let Some(val) = var("PLUGDASH_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let base_url = self.api.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "api.base_url must be an http(s) URL, got {base_url:?}"
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "api.timeout_secs must be non-zero".to_string(),
            ));
        }
        if self.polling.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "polling.interval_secs must be non-zero".to_string(),
            ));
        }
        if !(-MAX_OFFSET_HOURS..=MAX_OFFSET_HOURS).contains(&self.analytics.utc_offset_hours) {
            return Err(ConfigError::Validation(format!(
                "analytics.utc_offset_hours must be within ±{MAX_OFFSET_HOURS}"
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.polling.interval_secs)
    }

    /// The configured local offset, UTC when out of range.
    #[must_use]
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.analytics.utc_offset_hours.saturating_mul(3600))
            .unwrap_or(Utc.fix())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_path: PathBuf::from(".plugdash-token"),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { interval_secs: 30 }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: 0,
            tariff_seed: 42,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "plugdash=info,plugdash_app=info,plugdash_adapter_http_reqwest=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
