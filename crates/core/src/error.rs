//! Error types shared by every sheetbridge crate
//!
//! Two families live here:
//! - [`CoreError`]: problems with keys or the mapping configuration. These are
//!   fatal and surface before any remote call is made.
//! - [`RemoteError`]: the outcome of a single failed call against one of the
//!   two stores, classified so the resilience layer knows what to retry.

use sheetbridge_resilience::Throttle;
use thiserror::Error;

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while building keys, mappings and records
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A sync key was empty or whitespace-only
    #[error("Invalid sync key: {0:?}")]
    InvalidKey(String),

    /// The column mapping configuration is missing or contradictory
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Classified failure of one remote call
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    /// The store asked us to slow down (HTTP 429 and friends)
    #[error("Remote throttled: {0}")]
    Throttled(String),

    /// Network failure or 5xx response; the same call may succeed later
    #[error("Transient remote error: {0}")]
    Transient(String),

    /// The request itself is wrong (bad field type, unknown id, auth)
    #[error("Permanent remote error: {0}")]
    Permanent(String),
}

impl RemoteError {
    /// Returns true for throttling responses
    pub fn is_throttled(&self) -> bool {
        matches!(self, Self::Throttled(_))
    }

    /// Returns true for errors that may clear up on a later run
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Throttled(_) | Self::Transient(_))
    }

    /// Returns the underlying message without the classification prefix
    pub fn message(&self) -> &str {
        match self {
            Self::Throttled(m) | Self::Transient(m) | Self::Permanent(m) => m,
        }
    }
}

impl Throttle for RemoteError {
    fn is_throttled(&self) -> bool {
        RemoteError::is_throttled(self)
    }
}
