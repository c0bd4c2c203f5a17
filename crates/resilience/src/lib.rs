// crates/resilience/src/lib.rs
//! Resilience patterns for rate-limited remote stores
//!
//! This module provides:
//! - Fixed-spacing rate limiting shared across call sites
//! - Retry with exponential backoff and a long cooldown near exhaustion
//! - A call wrapper that only retries throttling responses
//!
//! # Example
//!
//! ```rust
//! use sheetbridge_resilience::{RateLimiter, RemoteCaller, RetryPolicy};
//! use std::time::Duration;
//!
//! let limiter = RateLimiter::per_minute(30);
//! let policy = RetryPolicy::new(6)
//!     .with_initial_delay(Duration::from_secs(1))
//!     .with_cooldown(Duration::from_secs(65));
//!
//! let caller = RemoteCaller::new(limiter, policy);
//! assert_eq!(caller.limiter().min_interval(), Duration::from_secs(2));
//! ```

mod caller;
mod clock;
mod error;
mod rate_limiter;
mod retry;

pub use caller::{RemoteCaller, Throttle};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ResilienceError, ResilienceResult};
pub use rate_limiter::RateLimiter;
pub use retry::RetryPolicy;
