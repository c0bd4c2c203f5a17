// crates/sync-engine/tests/common/mod.rs
//! Shared fixtures for engine integration tests

#![allow(dead_code)]

use sheetbridge_core::{
    CanonicalRecord, ColumnMapping, FieldMappings, FieldValue, RemoteError, RemoteId,
    RemoteRecord, Revision, ValueKind, WriteReceipt,
};
use sheetbridge_sync_engine::StoreAdapter;

pub fn mappings() -> FieldMappings {
    FieldMappings::new(
        "ID",
        vec![
            ColumnMapping::new("ID", "ID", ValueKind::Text),
            ColumnMapping::new("Name", "Name", ValueKind::Title),
            ColumnMapping::new("Count", "Count", ValueKind::Number),
        ],
    )
    .unwrap()
}

pub fn record(m: &FieldMappings, key: &str, name: &str, count: f64) -> CanonicalRecord {
    CanonicalRecord::empty(m)
        .with_value("ID", FieldValue::text(key))
        .with_value("Name", FieldValue::text(name))
        .with_value("Count", FieldValue::Number(count))
}

/// Marker `n` minutes after a fixed origin
pub fn stamp(n: u32) -> Revision {
    Revision::new(format!("2024-01-01T{:02}:{:02}:00.000Z", n / 60, n % 60))
}

/// In-process store; revision-bearing stores bump a marker on every write
#[derive(Debug)]
pub struct FakeStore {
    name: &'static str,
    revisioned: bool,
    records: Vec<RemoteRecord>,
    next_id: usize,
    tick: u32,
    upsert_calls: usize,
    fail_upserts: Vec<usize>,
    fail_list: bool,
    pub ensured: Vec<String>,
}

impl FakeStore {
    pub fn sheet() -> Self {
        Self::new("sheet", false)
    }

    pub fn database() -> Self {
        Self::new("database", true)
    }

    fn new(name: &'static str, revisioned: bool) -> Self {
        Self {
            name,
            revisioned,
            records: Vec::new(),
            next_id: 1,
            tick: 0,
            upsert_calls: 0,
            fail_upserts: Vec::new(),
            fail_list: false,
            ensured: Vec::new(),
        }
    }

    /// Seeds a record as if it had been created outside the engine
    pub fn with(mut self, record: CanonicalRecord) -> Self {
        self.insert(record);
        self
    }

    /// Seeds a record with an explicit revision marker
    pub fn with_revision(mut self, record: CanonicalRecord, revision: Revision) -> Self {
        let id = self.fresh_id();
        self.records.push(RemoteRecord::new(id, Some(revision), record));
        self
    }

    /// Makes the n-th upsert (1-based) fail with a transient error
    pub fn failing_upsert(mut self, call: usize) -> Self {
        self.fail_upserts.push(call);
        self
    }

    pub fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    /// Edits a record outside the engine
    pub fn edit(&mut self, key: &str, field: &str, value: FieldValue) {
        let revision = self.next_revision();
        if let Some(remote) = self
            .records
            .iter_mut()
            .find(|r| r.record.get("ID").as_text() == key)
        {
            remote.record.set(field, value);
            remote.revision = revision;
        }
    }

    pub fn get(&self, key: &str) -> Option<&RemoteRecord> {
        self.records
            .iter()
            .find(|r| r.record.get("ID").as_text() == key)
    }

    pub fn records(&self) -> &[RemoteRecord] {
        &self.records
    }

    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls
    }

    fn insert(&mut self, record: CanonicalRecord) -> WriteReceipt {
        let id = self.fresh_id();
        let revision = self.next_revision();
        self.records.push(RemoteRecord::new(id.clone(), revision.clone(), record));
        WriteReceipt { id, revision }
    }

    fn fresh_id(&mut self) -> RemoteId {
        let id = RemoteId::new(format!("{}-{}", self.name, self.next_id));
        self.next_id += 1;
        id
    }

    fn next_revision(&mut self) -> Option<Revision> {
        if !self.revisioned {
            return None;
        }
        self.tick += 1;
        // stay clear of markers used by seeded fixtures
        Some(stamp(600 + self.tick))
    }
}

impl StoreAdapter for FakeStore {
    fn name(&self) -> &str {
        self.name
    }

    fn list_all(&mut self, _key_field: &str) -> Result<Vec<RemoteRecord>, RemoteError> {
        if self.fail_list {
            return Err(RemoteError::Transient("503 Service Unavailable".to_string()));
        }
        Ok(self.records.clone())
    }

    fn upsert(
        &mut self,
        id: Option<&RemoteId>,
        record: &CanonicalRecord,
    ) -> Result<WriteReceipt, RemoteError> {
        self.upsert_calls += 1;
        if self.fail_upserts.contains(&self.upsert_calls) {
            return Err(RemoteError::Transient("502 Bad Gateway".to_string()));
        }

        match id {
            None => Ok(self.insert(record.clone())),
            Some(id) => {
                let revision = self.next_revision();
                let remote = self
                    .records
                    .iter_mut()
                    .find(|r| &r.id == id)
                    .ok_or_else(|| RemoteError::Permanent(format!("unknown id {id}")))?;
                remote.record = record.clone();
                remote.revision = revision.clone();
                Ok(WriteReceipt {
                    id: id.clone(),
                    revision,
                })
            }
        }
    }

    fn ensure_columns(&mut self, names: &[String]) -> Result<(), RemoteError> {
        for name in names {
            if !self.ensured.contains(name) {
                self.ensured.push(name.clone());
            }
        }
        Ok(())
    }
}
