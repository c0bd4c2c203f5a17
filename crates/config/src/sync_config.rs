//! Reconciliation section: `[sync]`

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use sheetbridge_core::{ColumnMapping, ConflictPolicy, Direction, FieldMappings, ValueKind};
use std::path::PathBuf;

/// Where the baseline is persisted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BaselineKind {
    /// JSON file on the local disk
    #[default]
    File,
    /// Hidden worksheet in the synced spreadsheet
    Sheet,
}

impl std::fmt::Display for BaselineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BaselineKind::File => write!(f, "file"),
            BaselineKind::Sheet => write!(f, "sheet"),
        }
    }
}

/// What to reconcile and how
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SyncSettings {
    /// Sheet column holding the sync key
    pub key: String,

    pub conflict_policy: ConflictPolicy,

    pub direction: Direction,

    /// Classify and report without writing anything
    pub dry_run: bool,

    pub baseline: BaselineKind,

    /// Baseline file when `baseline = "file"`
    pub baseline_path: PathBuf,

    /// Ordered column mappings; also the hashing order
    pub columns: Vec<ColumnMapping>,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            key: "ID".to_string(),
            conflict_policy: ConflictPolicy::default(),
            direction: Direction::default(),
            dry_run: false,
            baseline: BaselineKind::File,
            baseline_path: PathBuf::from(".sheetbridge/baseline.json"),
            columns: Vec::new(),
        }
    }
}

impl SyncSettings {
    /// Template mappings written by `init`
    pub fn example_columns() -> Vec<ColumnMapping> {
        vec![
            ColumnMapping::new("ID", "ID", ValueKind::Text),
            ColumnMapping::new("Name", "Name", ValueKind::Title),
            ColumnMapping::new("Status", "Status", ValueKind::SingleChoice),
            ColumnMapping::new("Due", "Due", ValueKind::Date),
            ColumnMapping::new("Done", "Done", ValueKind::Boolean),
        ]
    }

    /// Builds the validated mapping set
    pub fn to_mappings(&self) -> sheetbridge_core::CoreResult<FieldMappings> {
        FieldMappings::new(self.key.trim(), self.columns.clone())
    }
}

impl ConfigSection for SyncSettings {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut results = vec![Validator::not_empty(&self.key, "sync.key")];

        if self.baseline == BaselineKind::File && self.baseline_path.as_os_str().is_empty() {
            results.push(Err(ValidationError::new(
                "sync.baseline_path",
                "must not be empty when sync.baseline is \"file\"",
            )));
        }

        if let Err(e) = self.to_mappings() {
            results.push(Err(ValidationError::new("sync.columns", e.to_string())));
        }

        Validator::collect_errors(results)
    }

    fn merge(&mut self, other: Self) {
        self.key = other.key;
        self.conflict_policy = other.conflict_policy;
        self.direction = other.direction;
        self.dry_run = other.dry_run;
        self.baseline = other.baseline;
        self.baseline_path = other.baseline_path;
        if !other.columns.is_empty() {
            self.columns = other.columns;
        }
    }

    fn section_name(&self) -> &'static str {
        "sync"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> SyncSettings {
        SyncSettings {
            columns: SyncSettings::example_columns(),
            ..Default::default()
        }
    }

    #[test]
    fn test_example_is_valid() {
        assert!(settings().validate().is_ok());
        assert_eq!(settings().to_mappings().unwrap().len(), 5);
    }

    #[test]
    fn test_missing_columns() {
        let errors = SyncSettings::default().validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "sync.columns");
    }

    #[test]
    fn test_key_must_be_mapped() {
        let mut config = settings();
        config.key = "Missing".to_string();
        let errors = config.validate().unwrap_err();
        assert!(errors[0].message.contains("Missing"));
    }

    #[test]
    fn test_file_baseline_needs_path() {
        let mut config = settings();
        config.baseline_path = PathBuf::new();
        assert!(config.validate().is_err());

        config.baseline = BaselineKind::Sheet;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_merge_keeps_columns_when_other_has_none() {
        let mut base = settings();
        let other = SyncSettings {
            dry_run: true,
            direction: Direction::ToB,
            ..Default::default()
        };
        base.merge(other);
        assert!(base.dry_run);
        assert_eq!(base.direction, Direction::ToB);
        assert_eq!(base.columns.len(), 5);
    }

    #[test]
    fn test_baseline_kind_display() {
        assert_eq!(BaselineKind::File.to_string(), "file");
        assert_eq!(BaselineKind::Sheet.to_string(), "sheet");
    }
}
