use crate::error::InterruptStage;
use crate::{Error, ErrorContext, Result};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct WindowLimiterSnapshot {
    pub capacity: u32,
    pub available: u32,
    pub window: Duration,
    /// Number of reset ticks observed since construction.
    pub resets: u64,
    /// Time until the next reset tick. `None` once the ticker has been stopped.
    pub next_reset_in: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct WindowLimiterConfig {
    /// Permits per window.
    pub capacity: u32,
    /// Length of one window.
    pub window: Duration,
}

impl WindowLimiterConfig {
    pub fn new(capacity: u32, window: Duration) -> Self {
        Self { capacity, window }
    }

    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::configuration_with_context(
                "rate limiter capacity must be positive",
                ErrorContext::new()
                    .with_field_path("limiter.capacity")
                    .with_source("window_limiter"),
            ));
        }
        if self.window.is_zero() {
            return Err(Error::configuration_with_context(
                "rate limiter window must be longer than zero",
                ErrorContext::new()
                    .with_field_path("limiter.window")
                    .with_source("window_limiter"),
            ));
        }
        Ok(())
    }
}

#[derive(Debug)]
struct State {
    available: u32,
    resets: u64,
    next_reset: Instant,
}

struct Shared {
    capacity: u32,
    window: Duration,
    state: Mutex<State>,
    notify: Notify,
}

impl Shared {
    fn take_permit(&self) -> Result<bool> {
        let mut st = self.state.lock().map_err(|_| {
            Error::runtime_with_context(
                "WindowLimiter poisoned",
                ErrorContext::new().with_source("window_limiter"),
            )
        })?;
        if st.available > 0 {
            st.available -= 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Restore the full capacity in one step and wake every waiter.
    fn reset(&self) {
        match self.state.lock() {
            Ok(mut st) => {
                let restored = self.capacity - st.available;
                st.available = self.capacity;
                st.resets += 1;
                st.next_reset = Instant::now() + self.window;
                debug!(
                    permits_restored = restored,
                    capacity = self.capacity,
                    "window limiter reset"
                );
            }
            Err(_) => {
                warn!("window limiter state poisoned, skipping reset");
                return;
            }
        }
        self.notify.notify_waiters();
    }
}

/// Fixed-window rate limiter.
///
/// Holds `capacity` permits. Each [`acquire`](Self::acquire) consumes one;
/// permits are never handed back by callers. A background task restores the
/// full capacity once per window, so the limiter caps attempts per window
/// rather than in-flight requests.
///
/// Dropping the limiter or calling [`shutdown`](Self::shutdown) stops the
/// ticker. Tasks already waiting in `acquire` at that point are not woken and
/// will wait until their own cancellation fires.
pub struct WindowLimiter {
    shared: Arc<Shared>,
    ticker: CancellationToken,
}

impl WindowLimiter {
    /// Create the limiter and spawn its reset ticker on the current tokio runtime.
    ///
    /// The first reset happens one full window after construction.
    pub fn new(cfg: WindowLimiterConfig) -> Result<Self> {
        cfg.validate()?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            Error::configuration_with_context(
                "WindowLimiter requires a running tokio runtime",
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("window_limiter"),
            )
        })?;

        let first_reset = Instant::now() + cfg.window;
        let shared = Arc::new(Shared {
            capacity: cfg.capacity,
            window: cfg.window,
            state: Mutex::new(State {
                available: cfg.capacity,
                resets: 0,
                next_reset: first_reset,
            }),
            notify: Notify::new(),
        });

        let ticker = CancellationToken::new();
        let mut interval = tokio::time::interval_at(first_reset, cfg.window);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let task_shared = shared.clone();
        let task_token = ticker.clone();
        runtime.spawn(async move {
            loop {
                tokio::select! {
                    _ = task_token.cancelled() => {
                        debug!("window limiter ticker stopped");
                        break;
                    }
                    _ = interval.tick() => task_shared.reset(),
                }
            }
        });

        Ok(Self { shared, ticker })
    }

    pub fn capacity(&self) -> u32 {
        self.shared.capacity
    }

    pub fn window(&self) -> Duration {
        self.shared.window
    }

    /// Acquire one permit, waiting for the next window if none is left.
    pub async fn acquire(&self) -> Result<()> {
        self.acquire_inner(None).await
    }

    /// Like [`acquire`](Self::acquire), but gives up with
    /// [`Error::Interrupted`] as soon as `cancel` fires.
    pub async fn acquire_with_cancel(&self, cancel: &CancellationToken) -> Result<()> {
        self.acquire_inner(Some(cancel)).await
    }

    async fn acquire_inner(&self, cancel: Option<&CancellationToken>) -> Result<()> {
        loop {
            if cancel.map(|c| c.is_cancelled()).unwrap_or(false) {
                return Err(Self::interrupted());
            }

            // Register for the next reset before looking at the counter so a
            // reset landing in between is not missed.
            let notified = self.shared.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.shared.take_permit()? {
                return Ok(());
            }

            match cancel {
                Some(token) => {
                    tokio::select! {
                        _ = token.cancelled() => return Err(Self::interrupted()),
                        _ = &mut notified => {}
                    }
                }
                None => notified.await,
            }
        }
    }

    fn interrupted() -> Error {
        Error::Interrupted {
            stage: InterruptStage::Acquire,
            attempt: 0,
        }
    }

    /// Take a permit if one is available right now.
    pub fn try_acquire(&self) -> Result<bool> {
        self.shared.take_permit()
    }

    pub fn snapshot(&self) -> Result<WindowLimiterSnapshot> {
        let st = self.shared.state.lock().map_err(|_| {
            Error::runtime_with_context(
                "WindowLimiter poisoned",
                ErrorContext::new().with_source("window_limiter"),
            )
        })?;
        let next_reset_in = if self.ticker.is_cancelled() {
            None
        } else {
            Some(st.next_reset.saturating_duration_since(Instant::now()))
        };
        Ok(WindowLimiterSnapshot {
            capacity: self.shared.capacity,
            available: st.available,
            window: self.shared.window,
            resets: st.resets,
            next_reset_in,
        })
    }

    /// Stop the reset ticker. Idempotent.
    pub fn shutdown(&self) {
        self.ticker.cancel();
    }

    pub fn is_shutdown(&self) -> bool {
        self.ticker.is_cancelled()
    }
}

impl Drop for WindowLimiter {
    fn drop(&mut self) {
        self.ticker.cancel();
    }
}
