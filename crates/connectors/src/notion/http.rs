// crates/connectors/src/notion/http.rs
//! Notion REST connector

use super::{DatabaseConnector, DatabaseItem, DatabasePage, Properties};
use crate::error::{ConnectorError, ConnectorResult};
use crate::http::HttpClient;
use reqwest::blocking::RequestBuilder;
use serde::Deserialize;
use serde_json::{json, Value};
use sheetbridge_core::RemoteError;
use std::collections::BTreeMap;

/// Default Notion API endpoint
pub const NOTION_API_BASE: &str = "https://api.notion.com/v1";

/// API version sent with every request
pub const NOTION_VERSION: &str = "2022-06-28";

/// Pages requested per query window
pub const PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<DatabaseItem>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_cursor: Option<String>,
}

/// Connector for one Notion database
#[derive(Debug, Clone)]
pub struct NotionConnector {
    http: HttpClient,
    base_url: String,
    token: String,
    database_id: String,
}

impl NotionConnector {
    /// Creates a connector authenticated with an integration token
    pub fn new(database_id: impl Into<String>, token: impl Into<String>) -> ConnectorResult<Self> {
        Ok(Self {
            http: HttpClient::new()?,
            base_url: NOTION_API_BASE.to_string(),
            token: token.into(),
            database_id: database_id.into(),
        })
    }

    /// Points the connector at a different API base
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn database_id(&self) -> &str {
        &self.database_id
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
    }

    fn database_url(&self) -> String {
        format!("{}/databases/{}", self.base_url, self.database_id)
    }

    fn send(&self, request: RequestBuilder) -> ConnectorResult<Value> {
        self.http.send_json(self.authorize(request))
    }

    fn parse_item(body: Value) -> ConnectorResult<DatabaseItem> {
        serde_json::from_value(body)
            .map_err(|e| ConnectorError::Parse(format!("Unexpected page shape: {}", e)))
    }
}

impl DatabaseConnector for NotionConnector {
    fn schema(&self) -> Result<BTreeMap<String, String>, RemoteError> {
        let body = self.send(self.http.inner().get(self.database_url()))?;
        Ok(parse_schema(&body))
    }

    fn add_properties(&self, definitions: &Properties) -> Result<(), RemoteError> {
        if definitions.is_empty() {
            return Ok(());
        }
        let request = self
            .http
            .inner()
            .patch(self.database_url())
            .json(&json!({ "properties": definitions }));
        self.send(request)?;
        Ok(())
    }

    fn query(&self, cursor: Option<&str>) -> Result<DatabasePage, RemoteError> {
        let mut body = json!({ "page_size": PAGE_SIZE });
        if let Some(cursor) = cursor {
            body["start_cursor"] = json!(cursor);
        }
        let request = self
            .http
            .inner()
            .post(format!("{}/query", self.database_url()))
            .json(&body);

        let response: QueryResponse = serde_json::from_value(self.send(request)?)
            .map_err(|e| ConnectorError::Parse(format!("Unexpected query shape: {}", e)))?;

        Ok(DatabasePage {
            items: response.results,
            next_cursor: response.next_cursor.filter(|_| response.has_more),
        })
    }

    fn create(&self, properties: &Properties) -> Result<DatabaseItem, RemoteError> {
        let body = json!({
            "parent": { "database_id": self.database_id },
            "properties": properties,
        });
        let request = self
            .http
            .inner()
            .post(format!("{}/pages", self.base_url))
            .json(&body);
        Ok(Self::parse_item(self.send(request)?)?)
    }

    fn update(&self, id: &str, properties: &Properties) -> Result<DatabaseItem, RemoteError> {
        let request = self
            .http
            .inner()
            .patch(format!("{}/pages/{}", self.base_url, id))
            .json(&json!({ "properties": properties }));
        Ok(Self::parse_item(self.send(request)?)?)
    }
}

/// Extracts `name -> type` from a database object
fn parse_schema(body: &Value) -> BTreeMap<String, String> {
    body["properties"]
        .as_object()
        .map(|props| {
            props
                .iter()
                .filter_map(|(name, def)| {
                    def["type"].as_str().map(|kind| (name.clone(), kind.to_string()))
                })
                .collect()
        })
        .unwrap_or_default()
}
