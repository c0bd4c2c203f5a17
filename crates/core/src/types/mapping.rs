//! Column mappings between the two stores

use crate::error::{CoreError, CoreResult};
use crate::types::ValueKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One mapped column: sheet header, database property and value kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    /// Header of the column in the tabular store; also the canonical field name
    pub sheet: String,
    /// Property name in the database store
    #[serde(rename = "notion")]
    pub database: String,
    /// Declared value kind
    #[serde(rename = "type", default)]
    pub kind: ValueKind,
}

impl ColumnMapping {
    /// Creates a new mapping
    pub fn new(sheet: impl Into<String>, database: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            sheet: sheet.into(),
            database: database.into(),
            kind,
        }
    }

    /// Canonical field name used inside records
    pub fn field(&self) -> &str {
        &self.sheet
    }
}

/// The ordered, validated set of mappings plus the designated key field
///
/// Immutable for a run. Every comparison and hash iterates in declared order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMappings {
    key_field: String,
    columns: Vec<ColumnMapping>,
}

impl FieldMappings {
    /// Validates and builds the mapping set
    ///
    /// Fails when there are no columns, when a name repeats on either side,
    /// or when the key field is not one of the mapped sheet columns.
    pub fn new(key_field: impl Into<String>, columns: Vec<ColumnMapping>) -> CoreResult<Self> {
        let key_field = key_field.into();

        if key_field.trim().is_empty() {
            return Err(CoreError::Config("key field must not be empty".to_string()));
        }
        if columns.is_empty() {
            return Err(CoreError::Config(
                "at least one column mapping is required".to_string(),
            ));
        }

        let mut sheet_names = HashSet::new();
        let mut database_names = HashSet::new();
        for column in &columns {
            if column.sheet.trim().is_empty() || column.database.trim().is_empty() {
                return Err(CoreError::Config(
                    "every column mapping needs both a sheet and a notion name".to_string(),
                ));
            }
            if !sheet_names.insert(column.sheet.as_str()) {
                return Err(CoreError::Config(format!(
                    "sheet column '{}' is mapped more than once",
                    column.sheet
                )));
            }
            if !database_names.insert(column.database.as_str()) {
                return Err(CoreError::Config(format!(
                    "notion property '{}' is mapped more than once",
                    column.database
                )));
            }
        }

        if !sheet_names.contains(key_field.as_str()) {
            return Err(CoreError::Config(format!(
                "key column '{}' is not among the mapped sheet columns",
                key_field
            )));
        }

        Ok(Self { key_field, columns })
    }

    /// Canonical name of the key field
    pub fn key_field(&self) -> &str {
        &self.key_field
    }

    /// Mapping that carries the key
    pub fn key_mapping(&self) -> &ColumnMapping {
        // `new` guarantees presence; the first column is an unreachable fallback
        self.columns
            .iter()
            .find(|c| c.sheet == self.key_field)
            .unwrap_or(&self.columns[0])
    }

    /// All mappings in declared order
    pub fn columns(&self) -> &[ColumnMapping] {
        &self.columns
    }

    /// Iterates mappings in declared order
    pub fn iter(&self) -> std::slice::Iter<'_, ColumnMapping> {
        self.columns.iter()
    }

    /// Number of mapped columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Always false for a validated set
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Sheet header names in declared order
    pub fn sheet_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.sheet.clone()).collect()
    }

    /// Database property names in declared order
    pub fn database_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.database.clone()).collect()
    }

    /// Looks up a mapping by its database property name
    pub fn by_database_name(&self, name: &str) -> Option<&ColumnMapping> {
        self.columns.iter().find(|c| c.database == name)
    }

    /// Returns true when some mapping targets the database title property
    pub fn has_title(&self) -> bool {
        self.columns.iter().any(|c| c.kind == ValueKind::Title)
    }
}

impl<'a> IntoIterator for &'a FieldMappings {
    type Item = &'a ColumnMapping;
    type IntoIter = std::slice::Iter<'a, ColumnMapping>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}
