// crates/resilience/src/rate_limiter.rs
//! Fixed-spacing rate limiting

use crate::clock::{Clock, SystemClock};
use crate::error::{ResilienceError, ResilienceResult};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Enforces a minimum interval of `60 / requests_per_minute` seconds between calls
///
/// Clones share the same state, so one limiter can pace every call site that
/// draws from the same request budget.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    min_interval: Duration,
    clock: Arc<dyn Clock>,
    state: Arc<Mutex<RateLimiterState>>,
}

#[derive(Debug, Default)]
struct RateLimiterState {
    last_call: Option<Instant>,
}

impl RateLimiter {
    /// Creates a limiter on the system clock
    pub fn per_minute(requests_per_minute: u32) -> Self {
        Self::with_clock(requests_per_minute, Arc::new(SystemClock))
    }

    /// Creates a limiter on a custom clock
    pub fn with_clock(requests_per_minute: u32, clock: Arc<dyn Clock>) -> Self {
        let rpm = requests_per_minute.max(1);
        Self {
            min_interval: Duration::from_secs_f64(60.0 / f64::from(rpm)),
            clock,
            state: Arc::new(Mutex::new(RateLimiterState::default())),
        }
    }

    /// Waits until the next call is allowed, then claims the slot
    ///
    /// Returns how long the caller was made to wait.
    pub fn acquire(&self) -> ResilienceResult<Duration> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| ResilienceError::LockPoisoned("rate limiter"))?;

        let mut waited = Duration::ZERO;
        if let Some(last) = state.last_call {
            let elapsed = self.clock.now().saturating_duration_since(last);
            if elapsed < self.min_interval {
                waited = self.min_interval - elapsed;
                self.clock.sleep(waited);
            }
        }

        state.last_call = Some(self.clock.now());
        Ok(waited)
    }

    /// Forgets the last call so the next one proceeds immediately
    pub fn reset(&self) -> ResilienceResult<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| ResilienceError::LockPoisoned("rate limiter"))?;
        state.last_call = None;
        Ok(())
    }

    /// Minimum spacing between calls
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Clock the limiter sleeps on
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }
}
