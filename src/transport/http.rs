use super::{DocumentRequest, Transport, TransportError, TransportResponse};
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use reqwest::Proxy;
use std::env;
use std::time::Duration;

/// reqwest-backed [`Transport`].
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a client with production-friendly defaults.
    ///
    /// `timeout` applies to the whole request. Pool and proxy settings are
    /// env-overridable:
    /// - `CRPT_HTTP_POOL_MAX_IDLE_PER_HOST` (default 8)
    /// - `CRPT_HTTP_POOL_IDLE_TIMEOUT_SECS` (default 90)
    /// - `CRPT_PROXY_URL`
    pub fn new(timeout: Duration) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(
                env::var("CRPT_HTTP_POOL_MAX_IDLE_PER_HOST")
                    .ok()
                    .and_then(|s| s.parse::<usize>().ok())
                    .unwrap_or(8),
            )
            .pool_idle_timeout(Some(Duration::from_secs(
                env::var("CRPT_HTTP_POOL_IDLE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(90),
            )));

        if let Ok(proxy_url) = env::var("CRPT_PROXY_URL") {
            if let Ok(proxy) = Proxy::all(&proxy_url) {
                builder = builder.proxy(proxy);
            }
        }

        let client = builder.build().map_err(|e| {
            Error::configuration_with_context(
                format!("failed to build HTTP client: {}", e),
                ErrorContext::new().with_source("http_transport"),
            )
        })?;

        Ok(Self { client })
    }

    /// Wrap an already configured reqwest client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        request: &DocumentRequest,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let response = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone())
            .body(request.body.clone())
            .send()
            .await?;

        let status = response.status().as_u16();
        // A body that fails to decode should not turn a status into a transport error.
        let body = response.text().await.unwrap_or_default();
        Ok(TransportResponse { status, body })
    }
}
