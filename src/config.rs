//! Client configuration.
//!
//! Loaded from YAML, from the environment, or built in code through
//! [`CrptClientBuilder`](crate::client::CrptClientBuilder).
//!
//! ```yaml
//! time_unit: minutes
//! window_count: 1
//! request_limit: 5
//! max_attempts: 6
//! retry_delay_ms: 1000
//! ```

use crate::resilience::rate_limiter::WindowLimiterConfig;
use crate::resilience::retry::{RetryPolicy, DEFAULT_MAX_ATTEMPTS};
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://ismp.crpt.ru";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Unit the rate-limit window is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    pub fn as_duration(self) -> Duration {
        match self {
            TimeUnit::Milliseconds => Duration::from_millis(1),
            TimeUnit::Seconds => Duration::from_secs(1),
            TimeUnit::Minutes => Duration::from_secs(60),
            TimeUnit::Hours => Duration::from_secs(60 * 60),
            TimeUnit::Days => Duration::from_secs(24 * 60 * 60),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub time_unit: TimeUnit,
    /// Window length in `time_unit`s.
    pub window_count: u32,
    /// Requests allowed per window. Has no usable default.
    pub request_limit: u32,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    pub base_url: String,
    pub http_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            time_unit: TimeUnit::Minutes,
            window_count: 1,
            request_limit: 0,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay_ms: 1000,
            base_url: DEFAULT_BASE_URL.to_string(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// `request_limit` requests per one `time_unit`, everything else default.
    pub fn new(time_unit: TimeUnit, request_limit: u32) -> Self {
        Self {
            time_unit,
            request_limit,
            ..Default::default()
        }
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&raw)
    }

    /// Apply `CRPT_*` environment overrides:
    /// - `CRPT_REQUEST_LIMIT`
    /// - `CRPT_WINDOW_SECS` (switches the unit to seconds)
    /// - `CRPT_MAX_ATTEMPTS`
    /// - `CRPT_RETRY_DELAY_MS`
    /// - `CRPT_BASE_URL`
    /// - `CRPT_HTTP_TIMEOUT_SECS`
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Same as [`with_env_overrides`](Self::with_env_overrides) with a custom lookup.
    /// Unparsable or out-of-range values are ignored.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let num = |key: &str| lookup(key).and_then(|s| s.trim().parse::<u64>().ok());
        let count = |key: &str| lookup(key).and_then(|s| s.trim().parse::<u32>().ok());

        if let Some(v) = count("CRPT_REQUEST_LIMIT") {
            self.request_limit = v;
        }
        if let Some(v) = count("CRPT_WINDOW_SECS") {
            self.time_unit = TimeUnit::Seconds;
            self.window_count = v;
        }
        if let Some(v) = count("CRPT_MAX_ATTEMPTS") {
            self.max_attempts = v;
        }
        if let Some(v) = num("CRPT_RETRY_DELAY_MS") {
            self.retry_delay_ms = v;
        }
        if let Some(v) = lookup("CRPT_BASE_URL").filter(|s| !s.trim().is_empty()) {
            self.base_url = v.trim().to_string();
        }
        if let Some(v) = num("CRPT_HTTP_TIMEOUT_SECS") {
            self.http_timeout_secs = v;
        }
        self
    }

    pub fn window(&self) -> Duration {
        self.time_unit.as_duration() * self.window_count
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn limiter_config(&self) -> WindowLimiterConfig {
        WindowLimiterConfig::new(self.request_limit, self.window())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, self.retry_delay())
    }

    pub fn validate(&self) -> Result<()> {
        if self.request_limit == 0 {
            return Err(invalid("config.request_limit", "request_limit must be positive"));
        }
        if self.window_count == 0 {
            return Err(invalid("config.window_count", "window_count must be positive"));
        }
        if self.max_attempts == 0 {
            return Err(invalid("config.max_attempts", "max_attempts must be at least 1"));
        }
        if self.http_timeout_secs == 0 {
            return Err(invalid(
                "config.http_timeout_secs",
                "http_timeout_secs must be positive",
            ));
        }
        url::Url::parse(&self.base_url).map_err(|e| {
            Error::configuration_with_context(
                "base_url is not a valid URL",
                ErrorContext::new()
                    .with_field_path("config.base_url")
                    .with_details(e.to_string())
                    .with_source("client_config"),
            )
        })?;
        Ok(())
    }
}

fn invalid(field: &str, msg: &str) -> Error {
    Error::configuration_with_context(
        msg,
        ErrorContext::new()
            .with_field_path(field)
            .with_source("client_config"),
    )
}
