//! Domain types for sheetbridge
//!
//! - `key`: the sync key shared by both stores
//! - `value`: field values and value kinds
//! - `mapping`: column mappings and the validated mapping set
//! - `record`: canonical records, remote ids and revision markers
//! - `policy`: conflict policy and sync direction

mod key;
mod mapping;
mod policy;
mod record;
mod value;

pub use key::SyncKey;
pub use mapping::{ColumnMapping, FieldMappings};
pub use policy::{ConflictPolicy, Direction};
pub use record::{CanonicalRecord, RemoteId, RemoteRecord, Revision, WriteReceipt};
pub use value::{FieldValue, ValueKind};
