// crates/sync-engine/src/apply.rs
//! Applying planned writes and recording the baseline

use crate::adapter::StoreAdapter;
use crate::baseline::{BaselineEntry, BaselineStore};
use crate::conflict::Resolution;
use crate::diff::{DiffPlan, IndexedRecord, StoreIndex};
use crate::types::{FailureStage, KeyFailure, RunSummary, SyncAction};
use log::{debug, info, warn};
use sheetbridge_core::{content_hash, FieldMappings, RemoteId, Revision, SyncKey, WriteReceipt};

/// Order in which plain actions are applied, before resolved conflicts
const APPLY_ORDER: [SyncAction; 4] = [
    SyncAction::CreateInA,
    SyncAction::CreateInB,
    SyncAction::UpdateAFromB,
    SyncAction::UpdateBFromA,
];

/// One write to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyStep {
    pub key: SyncKey,
    pub action: SyncAction,
    /// True when the step came out of conflict resolution
    pub resolved_conflict: bool,
}

/// Lists every write in apply order
///
/// Creates in A, creates in B, updates to A, updates to B, then the
/// policy-resolved conflicts. Keys are sorted within each group.
pub fn ordered_steps(plan: &DiffPlan, resolution: &Resolution) -> Vec<ApplyStep> {
    let planned = APPLY_ORDER.iter().flat_map(|action| {
        plan.keys_for(*action).into_iter().map(|key| ApplyStep {
            key: key.clone(),
            action: *action,
            resolved_conflict: false,
        })
    });

    let resolved = resolution.resolved.iter().map(|(key, action)| ApplyStep {
        key: key.clone(),
        action: *action,
        resolved_conflict: true,
    });

    planned.chain(resolved).collect()
}

/// Executes steps against both stores with per-key isolation
///
/// A failed write is recorded and leaves the baseline untouched, so the key
/// is reclassified on the next run.
pub struct Committer<'r, A: ?Sized, B: ?Sized, S: ?Sized> {
    pub mappings: &'r FieldMappings,
    pub store_a: &'r mut A,
    pub store_b: &'r mut B,
    pub baseline: &'r mut S,
    pub dry_run: bool,
}

impl<A, B, S> Committer<'_, A, B, S>
where
    A: StoreAdapter + ?Sized,
    B: StoreAdapter + ?Sized,
    S: BaselineStore + ?Sized,
{
    /// Applies one step, updating the summary
    pub fn apply(
        &mut self,
        step: &ApplyStep,
        index_a: &StoreIndex,
        index_b: &StoreIndex,
        summary: &mut RunSummary,
    ) {
        let a = index_a.get(&step.key);
        let b = index_b.get(&step.key);

        let (source, target_id) = match (step.action, a, b) {
            (SyncAction::CreateInA, _, Some(b)) => (b, None),
            (SyncAction::CreateInB, Some(a), _) => (a, None),
            (SyncAction::UpdateAFromB, Some(a), Some(b)) => (b, Some(&a.id)),
            (SyncAction::UpdateBFromA, Some(a), Some(b)) => (a, Some(&b.id)),
            (action, _, _) => {
                warn!("{}: no snapshot to apply {} from", step.key, action);
                summary.failures.push(KeyFailure::new(
                    step.key.as_str(),
                    FailureStage::Apply(action),
                    "record missing from snapshot",
                ));
                return;
            }
        };

        if self.dry_run {
            info!("[dry-run] {}: would {}", step.key, step.action);
            summary.record_write(step.action);
            return;
        }

        let result = if step.action.writes_a() {
            self.store_a.upsert(target_id, &source.record)
        } else {
            self.store_b.upsert(target_id, &source.record)
        };

        let receipt = match result {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!("{}: {} failed: {}", step.key, step.action, e);
                summary.failures.push(KeyFailure::new(
                    step.key.as_str(),
                    FailureStage::Apply(step.action),
                    e.to_string(),
                ));
                return;
            }
        };

        debug!("{}: {} -> {}", step.key, step.action, receipt.id);
        summary.record_write(step.action);

        let (revision, remote_id) = database_provenance(step.action, b, receipt);
        let entry = BaselineEntry::new(
            step.key.clone(),
            content_hash(self.mappings, &source.record),
            revision,
            remote_id,
        );
        self.record_baseline(entry, summary);
    }

    /// Rewrites a missing or stale baseline for a key both stores agree on
    pub fn refresh(
        &mut self,
        key: &SyncKey,
        b: &IndexedRecord,
        existing: Option<&BaselineEntry>,
        summary: &mut RunSummary,
    ) {
        let stale = existing
            .map(|e| e.is_stale(&b.hash, b.revision.as_ref(), Some(&b.id)))
            .unwrap_or(true);
        if !stale {
            return;
        }

        if self.dry_run {
            debug!("[dry-run] {}: would refresh baseline", key);
            return;
        }

        let entry = BaselineEntry::new(
            key.clone(),
            b.hash.clone(),
            b.revision.clone(),
            Some(b.id.clone()),
        );
        if self.record_baseline(entry, summary) {
            summary.baselines_refreshed += 1;
        }
    }

    fn record_baseline(&mut self, entry: BaselineEntry, summary: &mut RunSummary) -> bool {
        let key = entry.key.clone();
        match self.baseline.upsert(entry) {
            Ok(()) => true,
            Err(e) => {
                warn!("{}: baseline not recorded: {}", key, e);
                summary.failures.push(KeyFailure::new(
                    key.as_str(),
                    FailureStage::Baseline,
                    e.to_string(),
                ));
                false
            }
        }
    }
}

/// Database revision and id to remember after a write
///
/// Writes to the database report fresh provenance in the receipt; writes to
/// the tabular store keep the database record's current provenance.
fn database_provenance(
    action: SyncAction,
    b: Option<&IndexedRecord>,
    receipt: WriteReceipt,
) -> (Option<Revision>, Option<RemoteId>) {
    if action.writes_b() {
        (receipt.revision, Some(receipt.id))
    } else {
        (
            b.and_then(|b| b.revision.clone()),
            b.map(|b| b.id.clone()),
        )
    }
}
