// crates/sync-engine/src/lib.rs
//! Two-store reconciliation engine
//!
//! This module keeps a configured set of fields convergent between a tabular
//! store (A, no revision marker) and a database store (B, with a
//! last-modified marker):
//! - Key assignment for records that lack one
//! - Three-way diff against a persisted baseline
//! - Policy-driven conflict resolution
//! - Ordered, per-key isolated application of writes
//!
//! # Example
//!
//! ```rust,no_run
//! use sheetbridge_core::{ColumnMapping, FieldMappings, ValueKind};
//! use sheetbridge_sync_engine::{JsonFileBaseline, StoreAdapter, SyncConfig, SyncEngine};
//!
//! fn reconcile<A: StoreAdapter, B: StoreAdapter>(sheet: A, database: B) {
//!     let mappings = FieldMappings::new(
//!         "ID",
//!         vec![
//!             ColumnMapping::new("ID", "ID", ValueKind::Text),
//!             ColumnMapping::new("Name", "Name", ValueKind::Title),
//!         ],
//!     )
//!     .unwrap();
//!
//!     let baseline = JsonFileBaseline::new(".sheetbridge/baseline.json");
//!     let mut engine = SyncEngine::new(mappings, SyncConfig::default(), sheet, database, baseline);
//!     let summary = engine.run().unwrap();
//!     println!("{} conflicts", summary.conflicts.len());
//! }
//! ```

mod adapter;
mod apply;
mod baseline;
mod conflict;
mod diff;
mod engine;
mod error;
mod keys;
mod types;

pub use adapter::StoreAdapter;
pub use apply::{ordered_steps, ApplyStep};
pub use baseline::{BaselineEntry, BaselineStore, JsonFileBaseline, MemoryBaseline};
pub use conflict::{ConflictResolver, Resolution};
pub use diff::{classify_key, DiffClassifier, DiffPlan, IndexedRecord, StoreIndex};
pub use engine::{SyncConfig, SyncEngine};
pub use error::{SyncError, SyncResult};
pub use types::{FailureStage, KeyFailure, RunSummary, SyncAction};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_exports_accessible() {
        let _: SyncConfig = SyncConfig::default();
        let _: RunSummary = RunSummary::default();
        let _: MemoryBaseline = MemoryBaseline::new();
        let _: DiffPlan = DiffPlan::default();
    }
}
