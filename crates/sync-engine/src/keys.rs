// crates/sync-engine/src/keys.rs
//! Key extraction and assignment for freshly read records

use crate::adapter::StoreAdapter;
use crate::types::{FailureStage, KeyFailure, RunSummary};
use log::{debug, info, warn};
use sheetbridge_core::{FieldMappings, FieldValue, RemoteRecord, SyncKey};

/// Pairs every record with its sync key, generating missing keys
///
/// A generated key is written back to the record's own store before the
/// record takes part in the diff; if that write fails the record is left
/// out of this run. Blank records are ignored. In a dry run keys are
/// generated but nothing is written.
pub fn assign_keys<S: StoreAdapter + ?Sized>(
    store: &mut S,
    mappings: &FieldMappings,
    records: Vec<RemoteRecord>,
    dry_run: bool,
    summary: &mut RunSummary,
) -> Vec<(SyncKey, RemoteRecord)> {
    let mut keyed = Vec::with_capacity(records.len());

    for mut remote in records {
        if remote.record.is_blank() {
            debug!("{}: skipping blank record {}", store.name(), remote.id);
            continue;
        }

        if let Some(key) = remote.record.key(mappings) {
            keyed.push((key, remote));
            continue;
        }

        let key = SyncKey::generate();
        remote
            .record
            .set(mappings.key_field(), FieldValue::text(key.as_str()));

        if dry_run {
            info!("{}: would assign key {} to {}", store.name(), key, remote.id);
            summary.keys_assigned += 1;
            keyed.push((key, remote));
            continue;
        }

        match store.upsert(Some(&remote.id), &remote.record) {
            Ok(receipt) => {
                info!("{}: assigned key {} to {}", store.name(), key, remote.id);
                if receipt.revision.is_some() {
                    remote.revision = receipt.revision;
                }
                summary.keys_assigned += 1;
                keyed.push((key, remote));
            }
            Err(e) => {
                warn!(
                    "{}: could not write key {} to {}: {}",
                    store.name(),
                    key,
                    remote.id,
                    e
                );
                summary.failures.push(KeyFailure::new(
                    format!("{}:{}", store.name(), remote.id),
                    FailureStage::AssignKey,
                    e.to_string(),
                ));
            }
        }
    }

    keyed
}
