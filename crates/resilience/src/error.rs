// crates/resilience/src/error.rs
//! Error types for resilience operations

use thiserror::Error;

/// Result type for resilience operations
pub type ResilienceResult<T> = Result<T, ResilienceError>;

/// Errors that can occur in resilience operations
#[derive(Debug, Error)]
pub enum ResilienceError {
    /// Shared limiter state was poisoned by a panicking holder
    #[error("Lock poisoned: {0}")]
    LockPoisoned(&'static str),
}
