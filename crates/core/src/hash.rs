//! Content hashing of canonical records
//!
//! The digest stands in for a revision marker on stores that have none: it is
//! computed over the field values only, in mapping order, so it compares
//! across stores that use different native identifiers.

use crate::types::{CanonicalRecord, FieldMappings};
use sha2::{Digest, Sha256};

/// SHA-256 hex digest of `field=value|field=value...` in mapping order
pub fn content_hash(mappings: &FieldMappings, record: &CanonicalRecord) -> String {
    let joined = mappings
        .iter()
        .map(|m| format!("{}={}", m.field(), record.get(m.field()).as_text().trim()))
        .collect::<Vec<_>>()
        .join("|");
    hex::encode(Sha256::digest(joined.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ColumnMapping, FieldValue, ValueKind};

    fn mappings() -> FieldMappings {
        FieldMappings::new(
            "ID",
            vec![
                ColumnMapping::new("ID", "ID", ValueKind::Text),
                ColumnMapping::new("Name", "Name", ValueKind::Title),
                ColumnMapping::new("Done", "Done", ValueKind::Boolean),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_hash_is_stable() {
        let m = mappings();
        let record = CanonicalRecord::empty(&m)
            .with_value("ID", FieldValue::text("K1"))
            .with_value("Done", FieldValue::Bool(true));
        assert_eq!(content_hash(&m, &record), content_hash(&m, &record));
        assert_eq!(content_hash(&m, &record).len(), 64);
    }

    #[test]
    fn test_hash_ignores_assignment_order() {
        let m = mappings();
        let a = CanonicalRecord::empty(&m)
            .with_value("ID", FieldValue::text("K1"))
            .with_value("Name", FieldValue::text("Alpha"));
        let b = CanonicalRecord::empty(&m)
            .with_value("Name", FieldValue::text("Alpha"))
            .with_value("ID", FieldValue::text("K1"));
        assert_eq!(content_hash(&m, &a), content_hash(&m, &b));
    }

    #[test]
    fn test_hash_trims_values() {
        let m = mappings();
        let a = CanonicalRecord::empty(&m).with_value("Name", FieldValue::text("Alpha"));
        let b = CanonicalRecord::empty(&m).with_value("Name", FieldValue::text("  Alpha "));
        assert_eq!(content_hash(&m, &a), content_hash(&m, &b));
    }

    #[test]
    fn test_hash_changes_with_values() {
        let m = mappings();
        let a = CanonicalRecord::empty(&m).with_value("Name", FieldValue::text("Alpha"));
        let b = CanonicalRecord::empty(&m).with_value("Name", FieldValue::text("Beta"));
        assert_ne!(content_hash(&m, &a), content_hash(&m, &b));
    }
}
