// crates/sync-engine/src/error.rs
//! Error types for sync operations
//!
//! Only failures that make a whole run meaningless live here. A failed write
//! for one key is recorded in the run summary instead.

use sheetbridge_core::{CoreError, RemoteError};
use std::path::PathBuf;
use thiserror::Error;

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that abort a synchronization run
#[derive(Debug, Error)]
pub enum SyncError {
    /// Invalid mapping or key configuration
    #[error("Configuration error: {0}")]
    Config(#[from] CoreError),

    /// A store could not be read or prepared
    #[error("{store}: {source}")]
    Remote {
        store: String,
        #[source]
        source: RemoteError,
    },

    /// Baseline file could not be read or written
    #[error("Baseline I/O error at {path}: {source}")]
    BaselineIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Baseline store rejected an operation
    #[error("Baseline error: {0}")]
    Baseline(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SyncError {
    /// Wraps a remote failure with the name of the store it came from
    pub fn remote(store: impl Into<String>, source: RemoteError) -> Self {
        Self::Remote {
            store: store.into(),
            source,
        }
    }
}
