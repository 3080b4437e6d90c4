use crate::client::request::{build_create_request, document_endpoint};
use crate::client::signals::SignalsSnapshot;
use crate::client::types::{CallStats, CancelHandle};
use crate::config::{ClientConfig, TimeUnit};
use crate::resilience::rate_limiter::WindowLimiter;
use crate::resilience::retry::{AttemptOutcome, RetryExecutor};
use crate::transport::Transport;
use crate::types::{Document, Signature};
use crate::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

/// Rate-limited, retrying client for the document-creation endpoint.
///
/// Share one instance (behind an `Arc`) between all tasks that submit
/// documents; the request quota is enforced per instance.
pub struct CrptClient {
    pub(crate) config: ClientConfig,
    pub(crate) endpoint: Url,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) limiter: Arc<WindowLimiter>,
    pub(crate) executor: RetryExecutor,
}

impl CrptClient {
    /// `request_limit` requests per one `time_unit`, 6 attempts, 1 s between attempts.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(time_unit: TimeUnit, request_limit: u32) -> Result<Self> {
        crate::client::CrptClientBuilder::new()
            .request_limit(time_unit, request_limit)
            .build()
    }

    pub(crate) fn from_parts(
        config: ClientConfig,
        base_url: &Url,
        transport: Arc<dyn Transport>,
        limiter: Arc<WindowLimiter>,
    ) -> Result<Self> {
        let endpoint = document_endpoint(base_url)?;
        let executor = RetryExecutor::new(config.retry_policy(), limiter.clone());
        Ok(Self {
            config,
            endpoint,
            transport,
            limiter,
            executor,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Submit one document.
    ///
    /// Waits for a permit before every attempt. Returns once the registry
    /// answered 200; any error means no acceptance was observed.
    pub async fn submit(
        &self,
        document: &Document,
        signature: impl Into<Signature>,
    ) -> Result<CallStats> {
        self.submit_with_cancel(document, signature, &CancelHandle::new())
            .await
    }

    /// Like [`submit`](Self::submit), abortable through `cancel` while waiting
    /// for a permit or between attempts.
    pub async fn submit_with_cancel(
        &self,
        document: &Document,
        signature: impl Into<Signature>,
        cancel: &CancelHandle,
    ) -> Result<CallStats> {
        let signature = signature.into();
        let body = document.to_json()?;
        let request = build_create_request(&self.endpoint, body, &signature)?;
        let client_request_id = Uuid::new_v4().to_string();

        let transport = &self.transport;
        let request = &request;
        let request_id = client_request_id.as_str();
        let result = self
            .executor
            .execute_with_cancel(
                move |attempt| async move {
                    debug!(
                        attempt,
                        client_request_id = request_id,
                        "sending document"
                    );
                    AttemptOutcome::from_send(transport.send(request).await)
                },
                cancel.token(),
            )
            .await;

        match result {
            Ok(report) => {
                info!(
                    http_status = report.status,
                    attempts = report.attempts,
                    client_request_id = client_request_id.as_str(),
                    endpoint = self.endpoint.path(),
                    duration_ms = report.elapsed.as_millis(),
                    "document accepted"
                );
                Ok(CallStats {
                    endpoint: self.endpoint.path().to_string(),
                    http_status: report.status,
                    attempts: report.attempts,
                    retry_count: report.attempts.saturating_sub(1),
                    duration_ms: report.elapsed.as_millis(),
                    client_request_id,
                })
            }
            Err(e) => {
                warn!(
                    client_request_id = client_request_id.as_str(),
                    endpoint = self.endpoint.path(),
                    error = %e,
                    "document submission failed"
                );
                Err(e)
            }
        }
    }

    /// Snapshot current runtime signals (facts only).
    pub fn signals(&self) -> Result<SignalsSnapshot> {
        Ok(SignalsSnapshot {
            rate_limiter: self.limiter.snapshot()?,
            shutdown: self.limiter.is_shutdown(),
        })
    }

    /// Stop the limiter's reset ticker.
    ///
    /// Submissions already waiting for a permit are not released; cancel them
    /// through their [`CancelHandle`] if needed.
    pub fn shutdown(&self) {
        if !self.limiter.is_shutdown() {
            info!("crpt client shutting down");
        }
        self.limiter.shutdown();
    }
}
