//! Rate-limit and retry behavior of `CrptClient::submit`, driven by a
//! scripted transport on a paused clock.

use async_trait::async_trait;
use crpt_client::transport::{DocumentRequest, Transport, TransportError, TransportResponse};
use crpt_client::{
    CancelHandle, CrptClient, CrptClientBuilder, Document, Error, InterruptStage, TimeUnit,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
enum Step {
    Status(u16),
    Refused,
}

/// Plays back `script`, then repeats `fallback` forever.
struct ScriptedTransport {
    script: Mutex<VecDeque<Step>>,
    fallback: Step,
    calls: AtomicU32,
    last_request: Mutex<Option<DocumentRequest>>,
}

impl ScriptedTransport {
    fn new(script: Vec<Step>, fallback: Step) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: AtomicU32::new(0),
            last_request: Mutex::new(None),
        })
    }

    fn always(step: Step) -> Arc<Self> {
        Self::new(Vec::new(), step)
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(
        &self,
        request: &DocumentRequest,
    ) -> Result<TransportResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.fallback);
        match step {
            Step::Status(code) => Ok(TransportResponse::new(code, format!("status {}", code))),
            Step::Refused => Err(TransportError::Other("connection refused".into())),
        }
    }
}

fn client_with(transport: Arc<ScriptedTransport>, limit: u32) -> CrptClient {
    CrptClientBuilder::new()
        .request_limit(TimeUnit::Minutes, limit)
        .transport(transport)
        .build()
        .unwrap()
}

fn document() -> Document {
    Document::introduce_goods("doc-1").with_participant_inn("7700000000")
}

#[tokio::test(start_paused = true)]
async fn test_success_on_first_attempt() {
    let transport = ScriptedTransport::always(Step::Status(200));
    let client = client_with(transport.clone(), 10);
    let start = Instant::now();

    let stats = client.submit(&document(), "sig").await.unwrap();

    assert_eq!(stats.attempts, 1);
    assert_eq!(transport.calls(), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(client.signals().unwrap().rate_limiter.available, 9);

    let request = transport.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(request.method, reqwest::Method::POST);
    assert_eq!(request.url.path(), "/api/v3/lk/documents/create");
    assert_eq!(request.headers["content-type"], "application/json");
    assert_eq!(request.headers["signature"], "sig");
    assert!(request.body.contains(r#""doc_id":"doc-1""#));
}

#[tokio::test(start_paused = true)]
async fn test_success_after_failures_waits_between_attempts() {
    let transport = ScriptedTransport::new(
        vec![Step::Status(500), Step::Status(429), Step::Refused],
        Step::Status(200),
    );
    let client = client_with(transport.clone(), 10);
    let start = Instant::now();

    let stats = client.submit(&document(), "sig").await.unwrap();

    assert_eq!(stats.attempts, 4);
    assert_eq!(stats.retry_count, 3);
    assert_eq!(transport.calls(), 4);
    assert_eq!(start.elapsed(), Duration::from_millis(3000));
    assert_eq!(client.signals().unwrap().rate_limiter.available, 6);
}

#[tokio::test(start_paused = true)]
async fn test_always_failing_status_exhausts_budget() {
    let transport = ScriptedTransport::always(Step::Status(400));
    let client = client_with(transport.clone(), 10);
    let start = Instant::now();

    let err = client.submit(&document(), "sig").await.unwrap_err();

    assert!(matches!(
        err,
        Error::Exhausted {
            max_attempts: 6,
            last_status: 400,
            ..
        }
    ));
    assert_eq!(transport.calls(), 6);
    assert_eq!(start.elapsed(), Duration::from_millis(5000));
    assert_eq!(client.signals().unwrap().rate_limiter.available, 4);
}

#[tokio::test(start_paused = true)]
async fn test_always_refused_is_fatal_after_last_attempt() {
    let transport = ScriptedTransport::always(Step::Refused);
    let client = client_with(transport.clone(), 10);

    let err = client.submit(&document(), "sig").await.unwrap_err();

    match err {
        Error::Transport { attempts, source } => {
            assert_eq!(attempts, 6);
            assert!(source.to_string().contains("connection refused"));
        }
        other => panic!("expected Transport, got {other}"),
    }
    assert_eq!(transport.calls(), 6);
}

#[tokio::test(start_paused = true)]
async fn test_retries_wait_for_next_window() {
    // Two permits per minute: the third attempt has to wait for the reset.
    let transport = ScriptedTransport::new(
        vec![Step::Status(500), Step::Status(500)],
        Step::Status(200),
    );
    let client = client_with(transport.clone(), 2);
    let start = Instant::now();

    let stats = client.submit(&document(), "sig").await.unwrap();

    assert_eq!(stats.attempts, 3);
    assert_eq!(start.elapsed(), Duration::from_secs(60));
    let signals = client.signals().unwrap();
    assert_eq!(signals.rate_limiter.resets, 1);
    assert_eq!(signals.rate_limiter.available, 1);
}

#[tokio::test(start_paused = true)]
async fn test_five_per_minute_sixth_waits_for_tick() {
    let transport = ScriptedTransport::always(Step::Status(200));
    let client = Arc::new(client_with(transport.clone(), 5));
    let start = Instant::now();

    let mut handles = Vec::new();
    for _ in 0..6 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client.submit(&document(), "sig").await.map(|_| start.elapsed())
        }));
    }

    let mut finished = Vec::new();
    for h in handles {
        finished.push(h.await.unwrap().unwrap());
    }
    finished.sort();

    assert_eq!(&finished[..5], &[Duration::ZERO; 5]);
    assert_eq!(finished[5], Duration::from_secs(60));
    assert_eq!(transport.calls(), 6);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_while_waiting_for_permit() {
    let transport = ScriptedTransport::always(Step::Status(200));
    let client = Arc::new(client_with(transport.clone(), 1));
    client.submit(&document(), "sig").await.unwrap();

    let cancel = CancelHandle::new();
    let waiter = {
        let client = client.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { client.submit_with_cancel(&document(), "sig", &cancel).await })
    };

    tokio::time::sleep(Duration::from_secs(10)).await;
    cancel.cancel();

    let err = waiter.await.unwrap().unwrap_err();
    assert!(matches!(
        err,
        Error::Interrupted {
            stage: InterruptStage::Acquire,
            attempt: 1
        }
    ));
    assert_eq!(transport.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_between_attempts_skips_remaining_budget() {
    let transport = ScriptedTransport::always(Step::Status(503));
    let client = Arc::new(client_with(transport.clone(), 10));

    let cancel = CancelHandle::new();
    let task = {
        let client = client.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { client.submit_with_cancel(&document(), "sig", &cancel).await })
    };

    tokio::time::sleep(Duration::from_millis(500)).await;
    cancel.cancel();

    let err = task.await.unwrap().unwrap_err();
    assert!(err.is_interrupted());
    assert!(matches!(
        err,
        Error::Interrupted {
            stage: InterruptStage::RetryDelay,
            attempt: 1
        }
    ));
    assert_eq!(transport.calls(), 1);
    assert_eq!(client.signals().unwrap().rate_limiter.available, 9);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_leaves_remaining_permits_usable() {
    let transport = ScriptedTransport::always(Step::Status(200));
    let client = client_with(transport.clone(), 2);
    client.shutdown();

    client.submit(&document(), "sig").await.unwrap();
    client.submit(&document(), "sig").await.unwrap();

    let blocked =
        tokio::time::timeout(Duration::from_secs(300), client.submit(&document(), "sig")).await;
    assert!(blocked.is_err());
    assert_eq!(transport.calls(), 2);
    assert!(client.signals().unwrap().shutdown);
}
