// crates/connectors/src/error.rs
//! Errors raised by the HTTP connectors

use sheetbridge_core::RemoteError;
use thiserror::Error;

/// Result type for connector operations
pub type ConnectorResult<T> = Result<T, ConnectorError>;

/// Raw failure of one HTTP exchange, before classification
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConnectorError {
    /// Request never got a response
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success status with the response body
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Client could not be constructed
    #[error("Client error: {0}")]
    Client(String),
}

impl ConnectorError {
    /// Returns true if the response asked the caller to slow down
    ///
    /// Quota errors come back as 429 or carry `RESOURCE_EXHAUSTED` /
    /// `RATE_LIMIT` markers in the body regardless of status.
    pub fn is_rate_limit(&self) -> bool {
        match self {
            Self::Status { status, body } => {
                *status == 429 || body.contains("RESOURCE_EXHAUSTED") || body.contains("RATE_LIMIT")
            }
            _ => false,
        }
    }
}

impl From<ConnectorError> for RemoteError {
    fn from(err: ConnectorError) -> Self {
        if err.is_rate_limit() {
            return RemoteError::Throttled(err.to_string());
        }
        match &err {
            ConnectorError::Network(_) => RemoteError::Transient(err.to_string()),
            ConnectorError::Status { status, .. } if *status >= 500 => {
                RemoteError::Transient(err.to_string())
            }
            _ => RemoteError::Permanent(err.to_string()),
        }
    }
}
