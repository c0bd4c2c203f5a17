//! Field value codec
//!
//! Converts between canonical [`FieldValue`]s and each store's native
//! representation. Every function here is total: input that does not fit the
//! declared kind degrades to `Null` (or an empty native value) instead of
//! failing.
//!
//! - `cell`: tabular store, where every value is cell text
//! - `property`: database store, where values are typed property objects

mod cell;
mod date;
mod property;

pub use cell::{cell_is_empty, cell_to_value, value_to_cell};
pub use date::{
    format_datetime, normalize_date, normalize_date_range, parse_datetime, split_date_range,
    DATE_RANGE_SEPARATOR,
};
pub use property::{
    property_is_empty, property_schema, property_to_value, title_property, value_to_property,
};

use crate::types::{FieldValue, ValueKind};

const TRUTHY: &[&str] = &["true", "1", "yes", "y", "t"];

/// Interprets text as a boolean; anything outside the truthy set is false
pub fn parse_bool(raw: &str) -> bool {
    let lowered = raw.trim().to_ascii_lowercase();
    TRUTHY.contains(&lowered.as_str())
}

/// Parses a number, ignoring thousands separators; `None` when not numeric
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Splits a comma-joined multi-choice value, trimming and dropping empties
pub fn split_choices(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Joins choices back into the canonical `a, b` form
pub fn join_choices<S: AsRef<str>>(choices: &[S]) -> String {
    choices
        .iter()
        .map(|c| c.as_ref())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Canonicalizes a value for a kind
///
/// Both store codecs pass through here so that the same logical value always
/// ends up with the same canonical representation.
pub fn coerce(value: &FieldValue, kind: ValueKind) -> FieldValue {
    match kind {
        ValueKind::Boolean => FieldValue::Bool(match value {
            FieldValue::Bool(b) => *b,
            FieldValue::Number(n) => *n != 0.0,
            FieldValue::Text(s) => parse_bool(s),
            FieldValue::Null => false,
        }),
        ValueKind::Number => match value {
            FieldValue::Number(n) if n.is_finite() => FieldValue::Number(*n),
            FieldValue::Text(s) => parse_number(s).map_or(FieldValue::Null, FieldValue::Number),
            _ => FieldValue::Null,
        },
        ValueKind::Date => match value {
            FieldValue::Text(s) => {
                normalize_date_range(s).map_or(FieldValue::Null, FieldValue::Text)
            }
            _ => FieldValue::Null,
        },
        ValueKind::MultiChoice => {
            let choices = split_choices(&value.as_text());
            if choices.is_empty() {
                FieldValue::Null
            } else {
                FieldValue::Text(join_choices(&choices))
            }
        }
        _ => match value {
            FieldValue::Null => FieldValue::Null,
            FieldValue::Text(s) if s.trim().is_empty() => FieldValue::Null,
            FieldValue::Text(s) => FieldValue::Text(s.clone()),
            other => FieldValue::Text(other.as_text()),
        },
    }
}
