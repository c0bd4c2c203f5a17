// crates/connectors/src/lib.rs
//! Store connectors for sheetbridge
//!
//! Each store comes in three layers:
//! - a narrow connector trait ([`TabularConnector`], [`DatabaseConnector`])
//!   with an HTTP implementation and an in-memory one for tests
//! - an adapter ([`SheetAdapter`], [`DatabaseAdapter`]) that maps records
//!   through the value codec and routes every call through a shared
//!   [`RemoteCaller`](sheetbridge_resilience::RemoteCaller)
//! - for the tabular store, [`SheetBaseline`], which keeps the sync baseline
//!   on a meta worksheet

mod error;
mod http;
pub mod notion;
pub mod sheets;

pub use error::{ConnectorError, ConnectorResult};
pub use http::HttpClient;
pub use notion::{
    DatabaseAdapter, DatabaseConnector, DatabaseItem, DatabasePage, MemoryDatabase,
    NotionConnector,
};
pub use sheets::{
    MemorySheet, SheetAdapter, SheetBaseline, SheetsConnector, TabularConnector, META_HEADERS,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_connectors_exported() {
        let _ = MemorySheet::new();
        let _ = MemoryDatabase::with_schema(&[("Name", "title")]);
        let _: ConnectorResult<SheetsConnector> = SheetsConnector::new("id", "Sheet1", "t");
        let _: ConnectorResult<NotionConnector> = NotionConnector::new("db", "t");
        assert_eq!(META_HEADERS[0], "key");
    }
}
