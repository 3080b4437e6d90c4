//! Mock HTTP server setup for integration tests

use crpt_client::{CrptClient, CrptClientBuilder, TimeUnit};
use mockito::{Matcher, Mock, Server, ServerGuard};
use std::time::Duration;

pub const CREATE_PATH: &str = "/api/v3/lk/documents/create";

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self { server, base_url }
    }

    /// Client pointed at the mock server, with a generous quota and short delays.
    pub fn create_test_client(&self, max_attempts: u32) -> crpt_client::Result<CrptClient> {
        CrptClientBuilder::new()
            .request_limit(TimeUnit::Minutes, 100)
            .max_attempts(max_attempts)
            .retry_delay(Duration::from_millis(10))
            .base_url_override(&self.base_url)
            .build()
    }

    /// Mock the document-creation endpoint for a given signature, expecting `hits` calls.
    pub async fn mock_create(
        &mut self,
        signature: &str,
        status: usize,
        body: &str,
        hits: usize,
    ) -> Mock {
        self.server
            .mock("POST", CREATE_PATH)
            .match_header("content-type", "application/json")
            .match_header("signature", signature)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .expect(hits)
            .create_async()
            .await
    }

    /// Like `mock_create`, additionally matching part of the JSON body.
    pub async fn mock_create_matching(
        &mut self,
        signature: &str,
        body: serde_json::Value,
        status: usize,
    ) -> Mock {
        self.server
            .mock("POST", CREATE_PATH)
            .match_header("content-type", "application/json")
            .match_header("signature", signature)
            .match_body(Matcher::PartialJson(body))
            .with_status(status)
            .with_body(r#"{"value":"ok"}"#)
            .expect(1)
            .create_async()
            .await
    }
}
