// crates/connectors/src/notion/mod.rs
//! Database store: pages of a Notion database with typed properties

mod adapter;
mod http;
mod memory;

pub use adapter::DatabaseAdapter;
pub use http::{NotionConnector, NOTION_API_BASE, NOTION_VERSION, PAGE_SIZE};
pub use memory::MemoryDatabase;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sheetbridge_core::RemoteError;
use std::collections::BTreeMap;

/// Property objects keyed by property name
pub type Properties = Map<String, Value>;

/// One page of a database as returned by a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseItem {
    pub id: String,
    /// Revision marker, RFC-3339
    #[serde(default)]
    pub last_edited_time: String,
    #[serde(default)]
    pub properties: Properties,
}

/// One window of query results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatabasePage {
    pub items: Vec<DatabaseItem>,
    /// Cursor for the next window, `None` on the last one
    pub next_cursor: Option<String>,
}

/// Database operations the database adapter needs
pub trait DatabaseConnector {
    /// Property types keyed by property name (`title`, `rich_text`, ...)
    fn schema(&self) -> Result<BTreeMap<String, String>, RemoteError>;

    /// Adds properties given as `name -> schema definition`
    fn add_properties(&self, definitions: &Properties) -> Result<(), RemoteError>;

    /// Reads one window of pages
    fn query(&self, cursor: Option<&str>) -> Result<DatabasePage, RemoteError>;

    fn create(&self, properties: &Properties) -> Result<DatabaseItem, RemoteError>;

    fn update(&self, id: &str, properties: &Properties) -> Result<DatabaseItem, RemoteError>;
}

/// Name of the title property in a schema
pub(crate) fn title_property_name(schema: &BTreeMap<String, String>) -> Option<&str> {
    schema
        .iter()
        .find(|(_, kind)| kind.as_str() == "title")
        .map(|(name, _)| name.as_str())
}
