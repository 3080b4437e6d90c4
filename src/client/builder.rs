use crate::client::core::CrptClient;
use crate::config::{ClientConfig, TimeUnit};
use crate::resilience::rate_limiter::WindowLimiter;
use crate::transport::{HttpTransport, Transport};
use crate::{Error, ErrorContext, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use url::Url;

/// Builder for creating clients with custom configuration.
///
/// Starts with no request limit; `build` fails until one is set.
pub struct CrptClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    /// Override base URL (primarily for testing with mock servers)
    base_url_override: Option<String>,
}

impl CrptClientBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            transport: None,
            base_url_override: None,
        }
    }

    /// Start from defaults with `CRPT_*` environment overrides applied.
    pub fn from_env() -> Self {
        Self::new().config(ClientConfig::default().with_env_overrides())
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Allow `limit` requests per one `unit`.
    pub fn request_limit(mut self, unit: TimeUnit, limit: u32) -> Self {
        self.config.time_unit = unit;
        self.config.window_count = 1;
        self.config.request_limit = limit;
        self
    }

    /// Window of `count` `unit`s. Keeps the current request limit.
    pub fn window(mut self, unit: TimeUnit, count: u32) -> Self {
        self.config.time_unit = unit;
        self.config.window_count = count;
        self
    }

    pub fn max_attempts(mut self, n: u32) -> Self {
        self.config.max_attempts = n;
        self
    }

    /// Delay between attempts, at millisecond precision.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.config.retry_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.config.http_timeout_secs = timeout.as_secs().max(1);
        self
    }

    /// Use a custom transport instead of the default reqwest one.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Override the registry base URL.
    ///
    /// This is primarily for testing with mock servers.
    pub fn base_url_override(mut self, base_url: impl Into<String>) -> Self {
        self.base_url_override = Some(base_url.into());
        self
    }

    /// Build the client and start its rate-limit ticker.
    ///
    /// Must be called inside a tokio runtime.
    pub fn build(self) -> Result<CrptClient> {
        let mut config = self.config;
        if let Some(url) = self.base_url_override {
            config.base_url = url;
        }
        config.validate()?;

        let base_url = Url::parse(&config.base_url).map_err(|e| {
            Error::configuration_with_context(
                "base_url is not a valid URL",
                ErrorContext::new()
                    .with_field_path("config.base_url")
                    .with_details(e.to_string())
                    .with_source("client_builder"),
            )
        })?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(t) => t,
            None => Arc::new(HttpTransport::new(config.http_timeout())?),
        };

        let limiter = Arc::new(WindowLimiter::new(config.limiter_config())?);

        info!(
            request_limit = config.request_limit,
            window_ms = config.window().as_millis(),
            max_attempts = config.max_attempts,
            retry_delay_ms = config.retry_delay_ms,
            base_url = config.base_url.as_str(),
            "crpt client ready"
        );

        CrptClient::from_parts(config, &base_url, transport, limiter)
    }
}

impl Default for CrptClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
