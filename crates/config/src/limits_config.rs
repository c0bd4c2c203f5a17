//! Remote call budget section: `[limits]`

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use sheetbridge_resilience::{RateLimiter, RemoteCaller, RetryPolicy};
use std::time::Duration;

/// Rate limiting and retry settings shared by both stores
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LimitsConfig {
    pub requests_per_minute: u32,

    /// Attempts per call, the first one included
    pub max_retries: usize,

    pub backoff_base_secs: f64,

    pub backoff_cap_secs: f64,

    /// Pause before the last attempts of a call that keeps getting throttled
    pub cooldown_secs: f64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: 30,
            max_retries: 6,
            backoff_base_secs: 1.0,
            backoff_cap_secs: 20.0,
            cooldown_secs: 65.0,
        }
    }
}

impl LimitsConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries)
            .with_initial_delay(Duration::from_secs_f64(self.backoff_base_secs.max(0.0)))
            .with_max_delay(Duration::from_secs_f64(self.backoff_cap_secs.max(0.0)))
            .with_cooldown(Duration::from_secs_f64(self.cooldown_secs.max(0.0)))
    }

    pub fn rate_limiter(&self) -> RateLimiter {
        RateLimiter::per_minute(self.requests_per_minute)
    }

    /// One caller whose limiter is shared by every clone
    pub fn remote_caller(&self) -> RemoteCaller {
        RemoteCaller::new(self.rate_limiter(), self.retry_policy())
    }
}

impl ConfigSection for LimitsConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![
            Validator::in_range(
                self.requests_per_minute,
                1,
                6000,
                "limits.requests_per_minute",
            ),
            Validator::in_range(self.max_retries, 1, 20, "limits.max_retries"),
            Validator::in_range(self.backoff_base_secs, 0.0, 60.0, "limits.backoff_base_secs"),
            Validator::in_range(
                self.backoff_cap_secs,
                self.backoff_base_secs,
                600.0,
                "limits.backoff_cap_secs",
            ),
            Validator::in_range(self.cooldown_secs, 0.0, 3600.0, "limits.cooldown_secs"),
        ])
    }

    fn merge(&mut self, other: Self) {
        self.requests_per_minute = other.requests_per_minute;
        self.max_retries = other.max_retries;
        self.backoff_base_secs = other.backoff_base_secs;
        self.backoff_cap_secs = other.backoff_cap_secs;
        self.cooldown_secs = other.cooldown_secs;
    }

    fn section_name(&self) -> &'static str {
        "limits"
    }
}
