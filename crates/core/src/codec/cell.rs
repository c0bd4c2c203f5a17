//! Tabular store codec: cell text <-> canonical values

use super::{coerce, parse_bool};
use crate::types::{FieldValue, ValueKind};

/// Reads a cell into a canonical value
pub fn cell_to_value(cell: &str, kind: ValueKind) -> FieldValue {
    coerce(&FieldValue::Text(cell.to_string()), kind)
}

/// True when a raw cell holds nothing for its kind
///
/// An unchecked checkbox renders as `FALSE` in a spreadsheet, so for
/// boolean columns only a truthy cell counts as content.
pub fn cell_is_empty(cell: &str, kind: ValueKind) -> bool {
    match kind {
        ValueKind::Boolean => !parse_bool(cell),
        _ => cell.trim().is_empty(),
    }
}

/// Renders a canonical value as cell text
pub fn value_to_cell(value: &FieldValue, kind: ValueKind) -> String {
    coerce(value, kind).as_text()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_cells() {
        assert_eq!(cell_to_value("Y", ValueKind::Boolean), FieldValue::Bool(true));
        assert_eq!(cell_to_value("", ValueKind::Boolean), FieldValue::Bool(false));
        assert_eq!(value_to_cell(&FieldValue::Bool(true), ValueKind::Boolean), "TRUE");
    }

    #[test]
    fn test_empty_cells() {
        assert!(cell_is_empty("  ", ValueKind::Text));
        assert!(!cell_is_empty("0", ValueKind::Number));
        assert!(cell_is_empty("FALSE", ValueKind::Boolean));
        assert!(cell_is_empty("", ValueKind::Boolean));
        assert!(!cell_is_empty("TRUE", ValueKind::Boolean));
    }

    #[test]
    fn test_number_cells() {
        assert_eq!(cell_to_value("12.50", ValueKind::Number), FieldValue::Number(12.5));
        assert_eq!(cell_to_value("n/a", ValueKind::Number), FieldValue::Null);
        assert_eq!(value_to_cell(&FieldValue::Number(12.0), ValueKind::Number), "12");
        assert_eq!(value_to_cell(&FieldValue::Null, ValueKind::Number), "");
    }

    #[test]
    fn test_date_cells() {
        assert_eq!(
            cell_to_value("2024-05-01 09:00:00", ValueKind::Date),
            FieldValue::text("2024-05-01T09:00:00Z")
        );
        assert_eq!(cell_to_value("soon", ValueKind::Date), FieldValue::Null);
    }

    #[test]
    fn test_multi_choice_cells() {
        assert_eq!(
            cell_to_value("red,green", ValueKind::MultiChoice),
            FieldValue::text("red, green")
        );
        assert_eq!(
            value_to_cell(&FieldValue::text("red, green"), ValueKind::MultiChoice),
            "red, green"
        );
    }

    #[test]
    fn test_text_cells_keep_content() {
        assert_eq!(cell_to_value(" spaced ", ValueKind::Text), FieldValue::text(" spaced "));
        assert_eq!(cell_to_value("", ValueKind::Title), FieldValue::Null);
    }
}
