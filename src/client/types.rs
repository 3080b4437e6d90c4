use tokio_util::sync::CancellationToken;

/// Per-call statistics for a successful submission.
#[derive(Debug, Clone)]
pub struct CallStats {
    pub endpoint: String,
    pub http_status: u16,
    /// Attempts made, including the successful one. Each took one permit.
    pub attempts: u32,
    pub retry_count: u32,
    pub duration_ms: u128,
    /// Our own correlation id, used in log events for this call.
    pub client_request_id: String,
}

/// Cancels an in-flight submission.
///
/// Firing the handle aborts a submission that is waiting for a permit or
/// sleeping between attempts; it surfaces as
/// [`Error::Interrupted`](crate::Error::Interrupted). A send that is already
/// on the wire is allowed to finish.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub(crate) fn token(&self) -> &CancellationToken {
        &self.token
    }
}
