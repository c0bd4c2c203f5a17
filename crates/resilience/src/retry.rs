// crates/resilience/src/retry.rs
//! Retry policies with exponential backoff and cooldown

use rand::Rng;
use std::time::Duration;

/// Fraction of the backoff added as random jitter, at most
const JITTER_FRACTION: f64 = 0.1;

/// Retry policy configuration
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first attempt)
    max_attempts: usize,
    /// Backoff base, doubled per attempt
    initial_delay: Duration,
    /// Backoff cap, applied before jitter
    max_delay: Duration,
    /// Long sleep used for the last attempts
    cooldown: Duration,
    /// Whether to use jitter
    use_jitter: bool,
}

impl RetryPolicy {
    /// Creates a new retry policy
    pub fn new(max_attempts: usize) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(20),
            cooldown: Duration::from_secs(65),
            use_jitter: true,
        }
    }

    /// Sets the initial delay
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the maximum delay
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the cooldown sleep
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Sets whether to use jitter
    pub fn with_jitter(mut self, use_jitter: bool) -> Self {
        self.use_jitter = use_jitter;
        self
    }

    /// Backoff after the zero-based failed attempt `attempt`
    ///
    /// `min(max_delay, initial_delay * 2^attempt)`, then scaled by up to 10%
    /// jitter when enabled.
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let base = self.initial_delay.as_secs_f64() * 2f64.powi(exponent);
        let capped = base.min(self.max_delay.as_secs_f64());

        let factor = if self.use_jitter {
            1.0 + rand::thread_rng().gen::<f64>() * JITTER_FRACTION
        } else {
            1.0
        };

        Duration::from_secs_f64(capped * factor)
    }

    /// Whether the zero-based attempt is one of the last two
    pub fn should_cool_down(&self, attempt: usize) -> bool {
        attempt + 2 >= self.max_attempts
    }

    /// Returns the maximum number of attempts
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Returns the cooldown sleep
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(6)
    }
}
