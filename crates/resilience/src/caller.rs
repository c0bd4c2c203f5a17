// crates/resilience/src/caller.rs
//! Rate-limited, throttle-aware call wrapper

use crate::clock::Clock;
use crate::rate_limiter::RateLimiter;
use crate::retry::RetryPolicy;
use log::{debug, warn};
use std::fmt;
use std::sync::Arc;

/// Classifies an error as a throttling response
pub trait Throttle {
    /// Whether the remote asked the caller to slow down
    fn is_throttled(&self) -> bool;
}

/// Wraps every remote call with pacing, backoff and cooldown
///
/// Each attempt waits on the shared [`RateLimiter`] first. A throttled failure
/// sleeps for the policy's backoff, or for the long cooldown (followed by a
/// limiter reset) once only two attempts remain. Other failures return
/// immediately.
#[derive(Debug, Clone)]
pub struct RemoteCaller {
    limiter: RateLimiter,
    policy: RetryPolicy,
    clock: Arc<dyn Clock>,
}

impl RemoteCaller {
    /// Creates a caller sleeping on the limiter's clock
    pub fn new(limiter: RateLimiter, policy: RetryPolicy) -> Self {
        let clock = limiter.clock();
        Self {
            limiter,
            policy,
            clock,
        }
    }

    /// Returns the shared limiter
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Returns the retry policy
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Runs `operation`, retrying throttled failures
    ///
    /// When every attempt is throttled the last throttled error is returned.
    pub fn call<T, E, F>(&self, label: &str, mut operation: F) -> Result<T, E>
    where
        E: Throttle + fmt::Display,
        F: FnMut() -> Result<T, E>,
    {
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 0;

        loop {
            if let Err(e) = self.limiter.acquire() {
                warn!("{}: rate limiter unavailable: {}", label, e);
            }

            let error = match operation() {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_throttled() => return Err(e),
                Err(e) => e,
            };

            if attempt + 1 >= max_attempts {
                warn!(
                    "{}: still throttled after {} attempts: {}",
                    label, max_attempts, error
                );
                return Err(error);
            }

            if self.policy.should_cool_down(attempt) {
                let cooldown = self.policy.cooldown();
                warn!(
                    "{}: throttled (attempt {}/{}), cooling down for {:?}",
                    label,
                    attempt + 1,
                    max_attempts,
                    cooldown
                );
                self.clock.sleep(cooldown);
                if let Err(e) = self.limiter.reset() {
                    warn!("{}: could not reset rate limiter: {}", label, e);
                }
            } else {
                let delay = self.policy.delay_for_attempt(attempt);
                warn!(
                    "{}: throttled (attempt {}/{}), backing off for {:?}",
                    label,
                    attempt + 1,
                    max_attempts,
                    delay
                );
                self.clock.sleep(delay);
            }

            attempt += 1;
            debug!("{}: retrying (attempt {}/{})", label, attempt + 1, max_attempts);
        }
    }
}
