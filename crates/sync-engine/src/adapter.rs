// crates/sync-engine/src/adapter.rs
//! Uniform store operations used by the engine

use sheetbridge_core::{CanonicalRecord, RemoteError, RemoteId, RemoteRecord, WriteReceipt};

/// One store as seen by the engine
///
/// Implementations hide pagination, native identifiers and value encoding.
/// Every call is expected to go through the shared rate-limited caller.
pub trait StoreAdapter {
    /// Short store name used in logs and errors
    fn name(&self) -> &str;

    /// Reads every record, following pagination to the end
    ///
    /// Never cached: each call re-reads the full remote state.
    fn list_all(&mut self, key_field: &str) -> Result<Vec<RemoteRecord>, RemoteError>;

    /// Creates a record when `id` is `None`, otherwise overwrites its mapped fields
    fn upsert(
        &mut self,
        id: Option<&RemoteId>,
        record: &CanonicalRecord,
    ) -> Result<WriteReceipt, RemoteError>;

    /// Adds any missing columns or properties; idempotent
    fn ensure_columns(&mut self, names: &[String]) -> Result<(), RemoteError>;
}

impl<T: StoreAdapter + ?Sized> StoreAdapter for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn list_all(&mut self, key_field: &str) -> Result<Vec<RemoteRecord>, RemoteError> {
        (**self).list_all(key_field)
    }

    fn upsert(
        &mut self,
        id: Option<&RemoteId>,
        record: &CanonicalRecord,
    ) -> Result<WriteReceipt, RemoteError> {
        (**self).upsert(id, record)
    }

    fn ensure_columns(&mut self, names: &[String]) -> Result<(), RemoteError> {
        (**self).ensure_columns(names)
    }
}
