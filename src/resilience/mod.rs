//! # Resilience Primitives Module
//!
//! Rate limiting and bounded retries for outbound document calls.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`rate_limiter`] | Fixed-window permit limiter with a background reset ticker |
//! | [`retry`] | Retry executor that takes one permit per attempt |
//!
//! ## Window Limiter
//!
//! At most `capacity` permits are handed out per window. When they run out,
//! callers wait until the ticker restores the full capacity:
//!
//! ```rust,no_run
//! use crpt_client::resilience::rate_limiter::{WindowLimiter, WindowLimiterConfig};
//! use std::time::Duration;
//!
//! # async fn demo() -> crpt_client::Result<()> {
//! let limiter = WindowLimiter::new(WindowLimiterConfig::new(5, Duration::from_secs(60)))?;
//! limiter.acquire().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Retry Executor
//!
//! ```rust,no_run
//! use crpt_client::resilience::retry::{AttemptOutcome, RetryExecutor, RetryPolicy};
//! # use crpt_client::resilience::rate_limiter::{WindowLimiter, WindowLimiterConfig};
//! # use std::sync::Arc;
//! # use std::time::Duration;
//!
//! # async fn demo() -> crpt_client::Result<()> {
//! # let limiter = Arc::new(WindowLimiter::new(WindowLimiterConfig::new(5, Duration::from_secs(60)))?);
//! let executor = RetryExecutor::new(RetryPolicy::default(), limiter);
//! let report = executor
//!     .execute(|_attempt| async {
//!         AttemptOutcome::Success { status: 200, body: String::new() }
//!     })
//!     .await?;
//! assert_eq!(report.attempts, 1);
//! # Ok(())
//! # }
//! ```

pub mod rate_limiter;
pub mod retry;
