// crates/sync-engine/src/types.rs
//! Core sync types and data structures

use serde::{Deserialize, Serialize};
use sheetbridge_core::Direction;
use std::fmt;

/// What a run does with one key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncAction {
    /// Key exists only in the database store
    CreateInA,
    /// Key exists only in the tabular store
    CreateInB,
    /// Both stores already agree
    NoOp,
    /// Database values overwrite the tabular row
    UpdateAFromB,
    /// Tabular values overwrite the database record
    UpdateBFromA,
    /// Both sides changed since the baseline
    Conflict,
}

impl SyncAction {
    /// Returns true if the action writes the tabular store
    pub fn writes_a(&self) -> bool {
        matches!(self, Self::CreateInA | Self::UpdateAFromB)
    }

    /// Returns true if the action writes the database store
    pub fn writes_b(&self) -> bool {
        matches!(self, Self::CreateInB | Self::UpdateBFromA)
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CreateInA => "create_in_a",
            Self::CreateInB => "create_in_b",
            Self::NoOp => "no_op",
            Self::UpdateAFromB => "update_a_from_b",
            Self::UpdateBFromA => "update_b_from_a",
            Self::Conflict => "conflict",
        };
        f.write_str(name)
    }
}

/// Where in the run a per-key failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// Writing a generated key back to its own store
    AssignKey,
    /// Applying a create or update
    Apply(SyncAction),
    /// Recording the baseline after a successful write
    Baseline,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AssignKey => f.write_str("assign_key"),
            Self::Apply(action) => write!(f, "{}", action),
            Self::Baseline => f.write_str("baseline"),
        }
    }
}

/// One key that could not be processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyFailure {
    pub key: String,
    pub stage: FailureStage,
    pub message: String,
}

impl KeyFailure {
    /// Creates a failure entry
    pub fn new(key: impl Into<String>, stage: FailureStage, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            stage,
            message: message.into(),
        }
    }
}

/// Outcome of one synchronization run
///
/// In a dry run the counters describe what would have been written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub created_in_a: usize,
    pub created_in_b: usize,
    pub updated_a: usize,
    pub updated_b: usize,
    /// Keys whose stores already agreed
    pub unchanged: usize,
    /// Unresolved conflict keys, sorted
    pub conflicts: Vec<String>,
    pub failures: Vec<KeyFailure>,
    /// Records that were given a generated key
    pub keys_assigned: usize,
    pub baselines_refreshed: usize,
    /// Actions withheld because the run direction excludes their target
    pub skipped: usize,
    pub dry_run: bool,
    pub direction: Direction,
}

impl RunSummary {
    /// Creates an empty summary for a run
    pub fn new(direction: Direction, dry_run: bool) -> Self {
        Self {
            direction,
            dry_run,
            ..Self::default()
        }
    }

    /// Returns true if any conflict was left unresolved
    pub fn has_unresolved_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// Returns true if any key failed
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Total number of writes performed (or planned, in a dry run)
    pub fn total_writes(&self) -> usize {
        self.created_in_a + self.created_in_b + self.updated_a + self.updated_b
    }

    pub(crate) fn record_write(&mut self, action: SyncAction) {
        match action {
            SyncAction::CreateInA => self.created_in_a += 1,
            SyncAction::CreateInB => self.created_in_b += 1,
            SyncAction::UpdateAFromB => self.updated_a += 1,
            SyncAction::UpdateBFromA => self.updated_b += 1,
            SyncAction::NoOp | SyncAction::Conflict => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_targets() {
        assert!(SyncAction::CreateInA.writes_a());
        assert!(SyncAction::UpdateAFromB.writes_a());
        assert!(SyncAction::CreateInB.writes_b());
        assert!(SyncAction::UpdateBFromA.writes_b());
        assert!(!SyncAction::NoOp.writes_a() && !SyncAction::NoOp.writes_b());
        assert!(!SyncAction::Conflict.writes_a() && !SyncAction::Conflict.writes_b());
    }

    #[test]
    fn test_record_write_counts() {
        let mut summary = RunSummary::new(Direction::Both, false);
        summary.record_write(SyncAction::CreateInA);
        summary.record_write(SyncAction::UpdateBFromA);
        summary.record_write(SyncAction::UpdateBFromA);
        summary.record_write(SyncAction::NoOp);

        assert_eq!(summary.created_in_a, 1);
        assert_eq!(summary.updated_b, 2);
        assert_eq!(summary.total_writes(), 3);
    }

    #[test]
    fn test_summary_json() {
        let mut summary = RunSummary::new(Direction::ToB, true);
        summary.conflicts.push("K1".to_string());
        summary.failures.push(KeyFailure::new(
            "K2",
            FailureStage::Apply(SyncAction::CreateInB),
            "boom",
        ));

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["direction"], "to_b");
        assert_eq!(json["dry_run"], true);
        assert_eq!(json["conflicts"][0], "K1");
        assert_eq!(json["failures"][0]["stage"]["apply"], "create_in_b");
        assert!(summary.has_unresolved_conflicts());
    }

    #[test]
    fn test_failure_stage_display() {
        assert_eq!(FailureStage::AssignKey.to_string(), "assign_key");
        assert_eq!(
            FailureStage::Apply(SyncAction::UpdateAFromB).to_string(),
            "update_a_from_b"
        );
    }
}
