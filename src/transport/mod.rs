//! Outbound transport seam.
//!
//! The retry executor never talks to the network directly; it calls a
//! [`Transport`] once per attempt. [`HttpTransport`] is the production
//! implementation, tests plug in their own.

mod http;

pub use http::HttpTransport;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Method;
use url::Url;

/// A fully assembled request, ready to be sent as many times as needed.
#[derive(Debug, Clone)]
pub struct DocumentRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: String,
}

/// What came back from one send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// The remote API only treats exactly 200 as accepted.
    pub fn is_accepted(&self) -> bool {
        self.status == 200
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform a single network send. No retries here.
    async fn send(
        &self,
        request: &DocumentRequest,
    ) -> std::result::Result<TransportResponse, TransportError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}
