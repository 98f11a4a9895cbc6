use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Station Data API
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub api_skip_tls_verify: bool,

    // Polling
    pub poll_interval_ms: u64,
    pub detail_refresh_interval_ms: u64,
    pub trend_concurrency: usize,

    // Detail panel watched by the headless dashboard
    pub detail_station_id: Option<i64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            api_token: None,
            api_skip_tls_verify: false,
            poll_interval_ms: 5000,
            detail_refresh_interval_ms: 10_000,
            trend_concurrency: 5,
            detail_station_id: None,
        }
    }
}

impl Config {
    /// Load configuration from `.env` and environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if a polling interval is zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from `lookup`, falling back to defaults for
    /// unset or unparseable values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if a polling interval is zero.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let parse_or = |key: &str, default| {
            lookup(key)
                .and_then(|value| value.trim().parse().ok())
                .unwrap_or(default)
        };

        let config = Self {
            // Station Data API
            api_base_url: lookup("STATION_API_BASE_URL")
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty())
                .unwrap_or(defaults.api_base_url),
            api_token: lookup("STATION_API_TOKEN")
                .map(|token| token.trim().to_string())
                .filter(|token| !token.is_empty()),
            api_skip_tls_verify: lookup("STATION_API_SKIP_TLS_VERIFY")
                .and_then(|value| value.trim().parse().ok())
                .unwrap_or(defaults.api_skip_tls_verify),

            // Polling
            poll_interval_ms: parse_or("POLL_INTERVAL_MS", defaults.poll_interval_ms),
            detail_refresh_interval_ms: parse_or(
                "DETAIL_REFRESH_INTERVAL_MS",
                defaults.detail_refresh_interval_ms,
            ),
            trend_concurrency: lookup("TREND_CONCURRENCY")
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(defaults.trend_concurrency)
                .max(1),

            detail_station_id: lookup("DETAIL_STATION_ID")
                .and_then(|id| id.trim().parse().ok()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the runtime cannot schedule.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the offending variable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("POLL_INTERVAL_MS"));
        }
        if self.detail_refresh_interval_ms == 0 {
            return Err(ConfigError::Invalid("DETAIL_REFRESH_INTERVAL_MS"));
        }
        Ok(())
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub fn detail_refresh_interval(&self) -> Duration {
        Duration::from_millis(self.detail_refresh_interval_ms)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
