//! Bounded retry around a single rate-limited operation.
//!
//! Every attempt, retries included, first takes a permit from the shared
//! [`WindowLimiter`], then runs the operation once and classifies the result
//! as an [`AttemptOutcome`]. Failures before the last attempt are logged and
//! followed by a fixed delay; only the final failure reaches the caller.

use super::rate_limiter::WindowLimiter;
use crate::error::InterruptStage;
use crate::transport::{TransportError, TransportResponse};
use crate::{Error, ErrorContext, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 6;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// How many times to try and how long to wait in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::configuration_with_context(
                "max_attempts must be at least 1",
                ErrorContext::new()
                    .with_field_path("retry.max_attempts")
                    .with_source("retry_policy"),
            ));
        }
        Ok(())
    }

    /// Decide what happens after `attempt` (1-based) failed.
    pub(crate) fn decide(&self, attempt: u32) -> Decision {
        if attempt < self.max_attempts {
            Decision::Retry { delay: self.delay }
        } else {
            Decision::Fail
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY)
    }
}

/// Internal decision for how to proceed after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Decision {
    Retry { delay: Duration },
    Fail,
}

/// Result of one attempt.
#[derive(Debug)]
pub enum AttemptOutcome {
    Success { status: u16, body: String },
    FailureStatus { status: u16, body: String },
    TransportFailure(TransportError),
}

impl AttemptOutcome {
    /// Classify a send result: exactly 200 is success, any other status is a
    /// retryable failure.
    pub fn from_send(result: std::result::Result<TransportResponse, TransportError>) -> Self {
        match result {
            Ok(resp) if resp.is_accepted() => AttemptOutcome::Success {
                status: resp.status,
                body: resp.body,
            },
            Ok(resp) => AttemptOutcome::FailureStatus {
                status: resp.status,
                body: resp.body,
            },
            Err(e) => AttemptOutcome::TransportFailure(e),
        }
    }
}

/// What a successful run looked like.
#[derive(Debug, Clone)]
pub struct AttemptReport {
    /// Attempts made, including the successful one.
    pub attempts: u32,
    pub status: u16,
    pub body: String,
    pub elapsed: Duration,
}

pub struct RetryExecutor {
    policy: RetryPolicy,
    limiter: Arc<WindowLimiter>,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy, limiter: Arc<WindowLimiter>) -> Self {
        Self { policy, limiter }
    }

    /// Run `operation` until it succeeds or the attempt budget is spent.
    pub async fn execute<F, Fut>(&self, operation: F) -> Result<AttemptReport>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = AttemptOutcome>,
    {
        self.execute_with_cancel(operation, &CancellationToken::new())
            .await
    }

    /// Like [`execute`](Self::execute). Cancelling `cancel` while waiting for a
    /// permit or between attempts ends the run with [`Error::Interrupted`];
    /// a send already in progress is left to finish.
    pub async fn execute_with_cancel<F, Fut>(
        &self,
        mut operation: F,
        cancel: &CancellationToken,
    ) -> Result<AttemptReport>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = AttemptOutcome>,
    {
        let start = Instant::now();
        let max_attempts = self.policy.max_attempts;
        let mut last_failure: Option<(u16, String)> = None;

        for attempt in 1..=max_attempts {
            self.limiter
                .acquire_with_cancel(cancel)
                .await
                .map_err(|e| match e {
                    Error::Interrupted { stage, .. } => Error::Interrupted { stage, attempt },
                    other => other,
                })?;

            match operation(attempt).await {
                AttemptOutcome::Success { status, body } => {
                    debug!(attempt, http_status = status, "attempt succeeded");
                    return Ok(AttemptReport {
                        attempts: attempt,
                        status,
                        body,
                        elapsed: start.elapsed(),
                    });
                }
                AttemptOutcome::FailureStatus { status, body } => {
                    warn!(
                        attempt,
                        max_attempts,
                        http_status = status,
                        body = body.as_str(),
                        "Failed to execute request"
                    );
                    last_failure = Some((status, body));
                }
                AttemptOutcome::TransportFailure(source) => {
                    if attempt >= max_attempts {
                        return Err(Error::Transport {
                            attempts: attempt,
                            source,
                        });
                    }
                    warn!(
                        attempt,
                        max_attempts,
                        error = %source,
                        "transport failure, will retry"
                    );
                }
            }

            if let Decision::Retry { delay } = self.policy.decide(attempt) {
                Self::pause(delay, attempt, cancel).await?;
            }
        }

        let (last_status, last_body) = last_failure.unwrap_or_default();
        Err(Error::Exhausted {
            max_attempts,
            last_status,
            last_body,
        })
    }

    async fn pause(delay: Duration, attempt: u32, cancel: &CancellationToken) -> Result<()> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::Interrupted {
                stage: InterruptStage::RetryDelay,
                attempt,
            }),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }
}
