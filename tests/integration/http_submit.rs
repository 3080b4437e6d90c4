//! Wire format and retry behavior over real HTTP.

use super::mock_server::MockServerFixture;
use crpt_client::transport::HttpTransport;
use crpt_client::{CrptClientBuilder, Document, Error, Product, TimeUnit};
use std::sync::Arc;
use serde_json::json;
use std::time::Duration;

fn sample_document() -> Document {
    Document {
        import_request: true,
        owner_inn: Some("7700000001".into()),
        producer_inn: Some("7700000002".into()),
        production_date: Some("2020-01-23".into()),
        ..Document::introduce_goods("doc-42").with_participant_inn("7700000000")
    }
    .with_product(Product {
        certificate_document: Some("CONFORMITY_CERTIFICATE".into()),
        tnved_code: Some("6401100000".into()),
        uit_code: Some("010460043993125621JgXJ5.T".into()),
        ..Default::default()
    })
}

#[tokio::test]
async fn test_submit_sends_expected_request() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_create_matching(
            "c2lnbmF0dXJl",
            json!({
                "doc_id": "doc-42",
                "doc_type": "LP_INTRODUCE_GOODS",
                "importRequest": true,
                "description": {"participantInn": "7700000000"},
                "products": [{"tnved_code": "6401100000"}]
            }),
            200,
        )
        .await;

    let client = fixture.create_test_client(3).unwrap();
    let stats = client
        .submit(&sample_document(), "c2lnbmF0dXJl")
        .await
        .unwrap();

    assert_eq!(stats.http_status, 200);
    assert_eq!(stats.attempts, 1);
    assert_eq!(stats.retry_count, 0);
    assert_eq!(stats.endpoint, "/api/v3/lk/documents/create");
    assert_eq!(client.signals().unwrap().rate_limiter.available, 99);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_non_200_is_retried_until_exhausted() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_create("sig", 503, r#"{"error":"busy"}"#, 3)
        .await;

    let client = fixture.create_test_client(3).unwrap();
    let err = client.submit(&sample_document(), "sig").await.unwrap_err();

    match err {
        Error::Exhausted {
            max_attempts,
            last_status,
            last_body,
        } => {
            assert_eq!(max_attempts, 3);
            assert_eq!(last_status, 503);
            assert!(last_body.contains("busy"));
        }
        other => panic!("expected Exhausted, got {other}"),
    }
    assert_eq!(client.signals().unwrap().rate_limiter.available, 97);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_created_status_is_not_success() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture.mock_create("sig", 201, "{}", 2).await;

    let client = fixture.create_test_client(2).unwrap();
    let err = client.submit(&sample_document(), "sig").await.unwrap_err();

    assert!(matches!(err, Error::Exhausted { last_status: 201, .. }));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let client = CrptClientBuilder::new()
        .request_limit(TimeUnit::Minutes, 10)
        .max_attempts(3)
        .retry_delay(Duration::from_millis(5))
        .http_timeout(Duration::from_secs(2))
        .base_url_override("http://127.0.0.1:1")
        .build()
        .unwrap();

    let err = client.submit(&sample_document(), "sig").await.unwrap_err();

    assert!(matches!(err, Error::Transport { attempts: 3, .. }));
    assert_eq!(client.signals().unwrap().rate_limiter.available, 7);
}

#[tokio::test]
async fn test_gateway_prefix_with_custom_reqwest_client() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/crpt/api/v3/lk/documents/create")
        .match_header("signature", "sig")
        .with_status(200)
        .expect(1)
        .create_async()
        .await;

    let transport = HttpTransport::with_client(
        reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap(),
    );
    let client = CrptClientBuilder::new()
        .request_limit(TimeUnit::Minutes, 10)
        .transport(Arc::new(transport))
        .base_url_override(format!("{}/crpt", fixture.base_url))
        .build()
        .unwrap();

    let stats = client.submit(&sample_document(), "sig").await.unwrap();

    assert_eq!(stats.endpoint, "/crpt/api/v3/lk/documents/create");
    assert_eq!(stats.attempts, 1);
    mock.assert_async().await;
}
