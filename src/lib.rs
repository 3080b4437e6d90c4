//! # crpt-client
//!
//! Rate-limited, retrying client for the CRPT document-creation API.
//!
//! ## Overview
//!
//! The registry enforces a hard ceiling on requests per time window. This crate
//! lets many tasks submit documents through one shared [`CrptClient`] while
//! never exceeding that ceiling, and retries transient failures a bounded
//! number of times.
//!
//! - **Window limiter**: at most `request_limit` attempts per window; excess
//!   callers wait for the next window.
//! - **Retry executor**: up to `max_attempts` attempts per document, each one
//!   taking its own permit, with a fixed delay in between.
//! - **Submitter**: builds `POST /api/v3/lk/documents/create` with the JSON
//!   body and `Signature` header and hands it to the executor.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use crpt_client::{CrptClient, Document, TimeUnit};
//!
//! #[tokio::main]
//! async fn main() -> crpt_client::Result<()> {
//!     let client = CrptClient::new(TimeUnit::Minutes, 5)?;
//!
//!     let doc = Document::introduce_goods("doc-1").with_participant_inn("7700000000");
//!     let stats = client.submit(&doc, "c2lnbmF0dXJl").await?;
//!     println!("accepted after {} attempt(s)", stats.attempts);
//!
//!     client.shutdown();
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Client, builder, per-call stats and cancellation |
//! | [`config`] | YAML/env configuration |
//! | [`resilience`] | Window limiter and retry executor |
//! | [`transport`] | Transport seam and the reqwest implementation |
//! | [`types`] | Document payload and signature |

pub mod client;
pub mod config;
pub mod resilience;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use client::{CallStats, CancelHandle, CrptClient, CrptClientBuilder, SignalsSnapshot};
pub use config::{ClientConfig, TimeUnit};
pub use types::{Document, Product, Signature};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext, InterruptStage};
