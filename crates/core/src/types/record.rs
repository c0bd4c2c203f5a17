//! Canonical records and their remote provenance

use crate::types::{FieldMappings, FieldValue, SyncKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

static NULL: FieldValue = FieldValue::Null;

/// Store-agnostic field map holding exactly the mapped columns
///
/// Absent values are stored as [`FieldValue::Null`], never omitted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CanonicalRecord {
    values: BTreeMap<String, FieldValue>,
}

impl CanonicalRecord {
    /// Builds a record with one value per mapping, produced by `value_of`
    pub fn from_fn<F>(mappings: &FieldMappings, mut value_of: F) -> Self
    where
        F: FnMut(&crate::types::ColumnMapping) -> FieldValue,
    {
        let values = mappings
            .iter()
            .map(|m| (m.field().to_string(), value_of(m)))
            .collect();
        Self { values }
    }

    /// Builds a record with every mapped field set to `Null`
    pub fn empty(mappings: &FieldMappings) -> Self {
        Self::from_fn(mappings, |_| FieldValue::Null)
    }

    /// Value of a field, `Null` when unknown
    pub fn get(&self, field: &str) -> &FieldValue {
        self.values.get(field).unwrap_or(&NULL)
    }

    /// Replaces the value of an existing field; unknown fields are ignored
    pub fn set(&mut self, field: &str, value: FieldValue) -> bool {
        match self.values.get_mut(field) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Returns a copy with one field replaced
    pub fn with_value(mut self, field: &str, value: FieldValue) -> Self {
        self.set(field, value);
        self
    }

    /// Extracts the sync key, if the key field holds a valid one
    pub fn key(&self, mappings: &FieldMappings) -> Option<SyncKey> {
        SyncKey::parse(&self.get(mappings.key_field()).as_text()).ok()
    }

    /// Column-by-column text comparison in mapping order
    pub fn values_equal(&self, other: &CanonicalRecord, mappings: &FieldMappings) -> bool {
        self.differing_fields(other, mappings).is_empty()
    }

    /// Names of the fields whose text differs
    pub fn differing_fields<'m>(
        &self,
        other: &CanonicalRecord,
        mappings: &'m FieldMappings,
    ) -> Vec<&'m str> {
        mappings
            .iter()
            .filter(|m| self.get(m.field()).as_text() != other.get(m.field()).as_text())
            .map(|m| m.field())
            .collect()
    }

    /// Number of fields held
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the record holds no fields
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True when every value is null or blank text
    pub fn is_blank(&self) -> bool {
        self.values.values().all(|v| v.as_text().trim().is_empty())
    }
}

/// Opaque identifier of an entity inside one store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteId(String);

impl RemoteId {
    /// Wraps a store identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RemoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store-native, monotonically non-decreasing change marker
///
/// Markers are usually RFC-3339 timestamps and compare as instants; anything
/// else falls back to lexicographic order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Revision(String);

impl Revision {
    /// Wraps a marker
    pub fn new(marker: impl Into<String>) -> Self {
        Self(marker.into())
    }

    /// Returns the marker as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this marker is strictly later than `other`
    pub fn is_after(&self, other: &Revision) -> bool {
        match (self.instant(), other.instant()) {
            (Some(a), Some(b)) => a > b,
            _ => self.0 > other.0,
        }
    }

    fn instant(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(self.0.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entity as read from a store
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRecord {
    pub id: RemoteId,
    pub revision: Option<Revision>,
    pub record: CanonicalRecord,
}

impl RemoteRecord {
    /// Creates a remote record
    pub fn new(id: RemoteId, revision: Option<Revision>, record: CanonicalRecord) -> Self {
        Self {
            id,
            revision,
            record,
        }
    }
}

/// What a store reports back after a successful write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReceipt {
    pub id: RemoteId,
    pub revision: Option<Revision>,
}
