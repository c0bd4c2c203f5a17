// crates/sync-engine/src/engine.rs
//! Main sync engine

use crate::adapter::StoreAdapter;
use crate::apply::{ordered_steps, Committer};
use crate::baseline::BaselineStore;
use crate::conflict::ConflictResolver;
use crate::diff::{DiffClassifier, StoreIndex};
use crate::error::{SyncError, SyncResult};
use crate::keys::assign_keys;
use crate::types::{RunSummary, SyncAction};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use sheetbridge_core::{ConflictPolicy, Direction, FieldMappings};

/// Configuration for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// How keys changed on both sides are handled
    pub policy: ConflictPolicy,
    /// Which stores may be written
    pub direction: Direction,
    /// Classify and resolve without writing anything
    pub dry_run: bool,
}

/// Reconciles a tabular store (A) with a database store (B)
///
/// A run reads both stores in full, assigns missing keys, classifies every
/// key against the baseline, resolves conflicts, applies writes and records
/// the baseline for every successful write. Runs are strictly sequential.
pub struct SyncEngine<A, B, S> {
    mappings: FieldMappings,
    config: SyncConfig,
    store_a: A,
    store_b: B,
    baseline: S,
}

impl<A, B, S> SyncEngine<A, B, S>
where
    A: StoreAdapter,
    B: StoreAdapter,
    S: BaselineStore,
{
    /// Creates a new sync engine
    pub fn new(mappings: FieldMappings, config: SyncConfig, store_a: A, store_b: B, baseline: S) -> Self {
        Self {
            mappings,
            config,
            store_a,
            store_b,
            baseline,
        }
    }

    /// Performs one reconciliation run
    ///
    /// Only failures to prepare or read a store, or to load the baseline,
    /// abort the run. Everything per key ends up in the summary.
    pub fn run(&mut self) -> SyncResult<RunSummary> {
        let SyncConfig {
            policy,
            direction,
            dry_run,
        } = self.config;
        let mut summary = RunSummary::new(direction, dry_run);

        info!(
            "Starting sync: {} <-> {} (direction {}, policy {}{})",
            self.store_a.name(),
            self.store_b.name(),
            direction,
            policy,
            if dry_run { ", dry run" } else { "" }
        );

        if !dry_run {
            self.store_a
                .ensure_columns(&self.mappings.sheet_names())
                .map_err(|e| SyncError::remote(self.store_a.name(), e))?;
            self.store_b
                .ensure_columns(&self.mappings.database_names())
                .map_err(|e| SyncError::remote(self.store_b.name(), e))?;
        }

        let baseline = self.baseline.load_all()?;
        debug!("Loaded {} baseline entries", baseline.len());

        let key_field = self.mappings.key_field();
        let records_a = self
            .store_a
            .list_all(key_field)
            .map_err(|e| SyncError::remote(self.store_a.name(), e))?;
        let records_b = self
            .store_b
            .list_all(key_field)
            .map_err(|e| SyncError::remote(self.store_b.name(), e))?;
        info!(
            "Read {} records from {} and {} from {}",
            records_a.len(),
            self.store_a.name(),
            records_b.len(),
            self.store_b.name()
        );

        let keyed_a = assign_keys(
            &mut self.store_a,
            &self.mappings,
            records_a,
            dry_run,
            &mut summary,
        );
        let keyed_b = assign_keys(
            &mut self.store_b,
            &self.mappings,
            records_b,
            dry_run,
            &mut summary,
        );

        let index_a = StoreIndex::build(self.store_a.name(), &self.mappings, keyed_a);
        let index_b = StoreIndex::build(self.store_b.name(), &self.mappings, keyed_b);

        let plan = DiffClassifier::new(&self.mappings).classify(&index_a, &index_b, &baseline);
        let resolution = ConflictResolver::new(policy, direction).resolve(&plan);
        summary.unchanged = plan.count(SyncAction::NoOp);

        let mut committer = Committer {
            mappings: &self.mappings,
            store_a: &mut self.store_a,
            store_b: &mut self.store_b,
            baseline: &mut self.baseline,
            dry_run,
        };

        for step in ordered_steps(&plan, &resolution) {
            let allowed = (step.action.writes_a() && direction.writes_a())
                || (step.action.writes_b() && direction.writes_b());
            if !allowed {
                debug!("{}: {} skipped by direction {}", step.key, step.action, direction);
                summary.skipped += 1;
                continue;
            }
            committer.apply(&step, &index_a, &index_b, &mut summary);
        }

        for key in plan.keys_for(SyncAction::NoOp) {
            if let Some(b) = index_b.get(key) {
                committer.refresh(key, b, baseline.get(key), &mut summary);
            }
        }

        summary.conflicts = resolution
            .unresolved
            .iter()
            .map(|k| k.as_str().to_string())
            .collect();

        info!(
            "Sync finished: {} created in {}, {} created in {}, {} updated in {}, {} updated in {}, {} conflicts, {} failures",
            summary.created_in_a,
            self.store_a.name(),
            summary.created_in_b,
            self.store_b.name(),
            summary.updated_a,
            self.store_a.name(),
            summary.updated_b,
            self.store_b.name(),
            summary.conflicts.len(),
            summary.failures.len()
        );

        Ok(summary)
    }

    /// Returns the run configuration
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Returns the column mappings
    pub fn mappings(&self) -> &FieldMappings {
        &self.mappings
    }

    /// Returns the tabular store adapter
    pub fn store_a(&self) -> &A {
        &self.store_a
    }

    /// Returns the database store adapter
    pub fn store_b(&self) -> &B {
        &self.store_b
    }

    /// Returns the baseline store
    pub fn baseline(&self) -> &S {
        &self.baseline
    }

    /// Consumes the engine, returning both adapters and the baseline store
    pub fn into_parts(self) -> (A, B, S) {
        (self.store_a, self.store_b, self.baseline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_config_default() {
        let config = SyncConfig::default();
        assert_eq!(config.policy, ConflictPolicy::BWins);
        assert_eq!(config.direction, Direction::Both);
        assert!(!config.dry_run);
    }
}
