//! Core domain model for sheetbridge
//!
//! Shared by every other crate in the workspace:
//! - sync keys, field values and value kinds
//! - column mappings and canonical records
//! - the content hash used for change detection
//! - the field value codec for both stores
//! - the remote error taxonomy

pub mod codec;
pub mod error;
pub mod hash;
pub mod types;

pub use error::{CoreError, CoreResult, RemoteError};
pub use hash::content_hash;
pub use types::{
    CanonicalRecord, ColumnMapping, ConflictPolicy, Direction, FieldMappings, FieldValue,
    RemoteId, RemoteRecord, Revision, SyncKey, ValueKind, WriteReceipt,
};
