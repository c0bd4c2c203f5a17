// crates/sync-engine/src/diff.rs
//! Three-way diff of both stores against the baseline

use crate::baseline::BaselineEntry;
use crate::types::SyncAction;
use log::{debug, warn};
use sheetbridge_core::{
    content_hash, CanonicalRecord, FieldMappings, RemoteId, RemoteRecord, Revision, SyncKey,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A store record with its key and content hash resolved
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedRecord {
    pub id: RemoteId,
    pub revision: Option<Revision>,
    pub record: CanonicalRecord,
    pub hash: String,
}

/// Records of one store, keyed by sync key
#[derive(Debug, Clone, Default)]
pub struct StoreIndex {
    records: BTreeMap<SyncKey, IndexedRecord>,
}

impl StoreIndex {
    /// Indexes keyed records; a duplicate key keeps the last record read
    pub fn build(
        store: &str,
        mappings: &FieldMappings,
        records: impl IntoIterator<Item = (SyncKey, RemoteRecord)>,
    ) -> Self {
        let mut index = BTreeMap::new();
        for (key, remote) in records {
            let hash = content_hash(mappings, &remote.record);
            let indexed = IndexedRecord {
                id: remote.id,
                revision: remote.revision,
                record: remote.record,
                hash,
            };
            if let Some(previous) = index.insert(key.clone(), indexed) {
                warn!(
                    "{}: duplicate key {} (record {} replaced by a later one)",
                    store, key, previous.id
                );
            }
        }
        Self { records: index }
    }

    pub fn get(&self, key: &SyncKey) -> Option<&IndexedRecord> {
        self.records.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &SyncKey> {
        self.records.keys()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// One action per key in the union of both stores
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiffPlan {
    actions: BTreeMap<SyncKey, SyncAction>,
}

impl DiffPlan {
    /// Action chosen for a key
    pub fn action(&self, key: &SyncKey) -> Option<SyncAction> {
        self.actions.get(key).copied()
    }

    /// Keys with the given action, in sorted order
    pub fn keys_for(&self, action: SyncAction) -> Vec<&SyncKey> {
        self.actions
            .iter()
            .filter(|(_, a)| **a == action)
            .map(|(k, _)| k)
            .collect()
    }

    /// Number of keys with the given action
    pub fn count(&self, action: SyncAction) -> usize {
        self.actions.values().filter(|a| **a == action).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SyncKey, SyncAction)> {
        self.actions.iter().map(|(k, a)| (k, *a))
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl FromIterator<(SyncKey, SyncAction)> for DiffPlan {
    fn from_iter<I: IntoIterator<Item = (SyncKey, SyncAction)>>(iter: I) -> Self {
        Self {
            actions: iter.into_iter().collect(),
        }
    }
}

/// Turns two store snapshots plus the baseline into a [`DiffPlan`]
#[derive(Debug)]
pub struct DiffClassifier<'m> {
    mappings: &'m FieldMappings,
}

impl<'m> DiffClassifier<'m> {
    pub fn new(mappings: &'m FieldMappings) -> Self {
        Self { mappings }
    }

    /// Classifies every key present in either store, in sorted key order
    pub fn classify(
        &self,
        store_a: &StoreIndex,
        store_b: &StoreIndex,
        baseline: &HashMap<SyncKey, BaselineEntry>,
    ) -> DiffPlan {
        let keys: BTreeSet<&SyncKey> = store_a.keys().chain(store_b.keys()).collect();

        let actions = keys
            .into_iter()
            .map(|key| {
                let action = classify_key(
                    self.mappings,
                    store_a.get(key),
                    store_b.get(key),
                    baseline.get(key),
                );
                debug!("{}: {}", key, action);
                (key.clone(), action)
            })
            .collect();

        DiffPlan { actions }
    }
}

/// Decides the action for one key
///
/// With both records present and differing, a side counts as changed when
/// its content hash moved away from the baseline hash. The database side
/// uses its revision marker instead whenever both it and the baseline carry
/// one. Without a baseline both sides count as changed. When values differ
/// but neither side appears changed (normalization drift), the database
/// store wins.
pub fn classify_key(
    mappings: &FieldMappings,
    a: Option<&IndexedRecord>,
    b: Option<&IndexedRecord>,
    baseline: Option<&BaselineEntry>,
) -> SyncAction {
    let (a, b) = match (a, b) {
        (Some(a), Some(b)) => (a, b),
        (Some(_), None) => return SyncAction::CreateInB,
        (None, Some(_)) => return SyncAction::CreateInA,
        (None, None) => return SyncAction::NoOp,
    };

    if a.record.values_equal(&b.record, mappings) {
        return SyncAction::NoOp;
    }

    let (changed_a, changed_b) = match baseline {
        None => (true, true),
        Some(entry) => {
            let changed_a = a.hash != entry.last_hash;
            let changed_b = match (&b.revision, &entry.last_remote_revision) {
                (Some(current), Some(last)) => current.is_after(last),
                _ => b.hash != entry.last_hash,
            };
            (changed_a, changed_b)
        }
    };

    match (changed_a, changed_b) {
        (true, true) => SyncAction::Conflict,
        (true, false) => SyncAction::UpdateBFromA,
        (false, true) => SyncAction::UpdateAFromB,
        // values drifted without either side changing
        (false, false) => SyncAction::UpdateAFromB,
    }
}
