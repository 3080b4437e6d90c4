use crate::resilience::rate_limiter::WindowLimiterSnapshot;

/// A lightweight snapshot of runtime "signals" for orchestration.
///
/// Facts only: applications decide what to do with them (e.g. delay a batch
/// when `rate_limiter.available` is zero).
#[derive(Debug, Clone)]
pub struct SignalsSnapshot {
    pub rate_limiter: WindowLimiterSnapshot,
    pub shutdown: bool,
}
