// crates/connectors/src/http.rs
//! Shared blocking HTTP plumbing

use crate::error::{ConnectorError, ConnectorResult};
use serde_json::Value;
use std::time::Duration as StdDuration;

/// Per-request timeout
const REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(30);

/// Blocking JSON client used by both HTTP connectors
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::blocking::Client,
}

impl HttpClient {
    /// Creates a client with the crate user agent and a 30 s timeout
    pub fn new() -> ConnectorResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION"),
            ))
            .build()
            .map_err(|e| ConnectorError::Client(e.to_string()))?;

        Ok(Self { client })
    }

    /// Returns the underlying client for building requests
    pub fn inner(&self) -> &reqwest::blocking::Client {
        &self.client
    }

    /// Sends a request and decodes a JSON body
    ///
    /// An empty success body decodes to `null`.
    pub fn send_json(&self, request: reqwest::blocking::RequestBuilder) -> ConnectorResult<Value> {
        let response = request
            .send()
            .map_err(|e| ConnectorError::Network(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| ConnectorError::Network(format!("Reading body failed: {}", e)))?;

        if !status.is_success() {
            return Err(ConnectorError::Status {
                status: status.as_u16(),
                body: truncate(&body, 500),
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| ConnectorError::Parse(format!("JSON parse error: {}", e)))
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
