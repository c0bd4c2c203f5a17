//! Database store codec: typed property objects <-> canonical values

use super::{coerce, split_choices, split_date_range, DATE_RANGE_SEPARATOR};
use crate::types::{FieldValue, ValueKind};
use serde_json::{json, Value};

/// Reads a property object into a canonical value
pub fn property_to_value(property: &Value, kind: ValueKind) -> FieldValue {
    let raw = match kind {
        ValueKind::Title => rich_text_plain(&property["title"]),
        ValueKind::Text => rich_text_plain(&property["rich_text"]),
        ValueKind::Number => property["number"]
            .as_f64()
            .map_or(FieldValue::Null, FieldValue::Number),
        ValueKind::Boolean => FieldValue::Bool(property["checkbox"].as_bool().unwrap_or(false)),
        ValueKind::Date => date_field(&property["date"]),
        ValueKind::SingleChoice => string_field(&property["select"]["name"]),
        ValueKind::Status => string_field(&property["status"]["name"]),
        ValueKind::MultiChoice => {
            let names: Vec<&str> = property["multi_select"]
                .as_array()
                .map(|items| items.iter().filter_map(|i| i["name"].as_str()).collect())
                .unwrap_or_default();
            FieldValue::Text(names.join(", "))
        }
        ValueKind::Url => string_field(&property["url"]),
        ValueKind::Email => string_field(&property["email"]),
        ValueKind::Phone => string_field(&property["phone_number"]),
    };
    coerce(&raw, kind)
}

/// Builds the property object written for a canonical value
pub fn value_to_property(value: &FieldValue, kind: ValueKind) -> Value {
    let value = coerce(value, kind);
    let text = match &value {
        FieldValue::Null => None,
        other => Some(other.as_text()),
    };

    match kind {
        ValueKind::Title => json!({ "title": rich_text_blocks(text.as_deref()) }),
        ValueKind::Text => json!({ "rich_text": rich_text_blocks(text.as_deref()) }),
        ValueKind::Number => match value {
            FieldValue::Number(n) => json!({ "number": n }),
            _ => json!({ "number": null }),
        },
        ValueKind::Boolean => json!({ "checkbox": matches!(value, FieldValue::Bool(true)) }),
        ValueKind::Date => match text.as_deref().map(split_date_range) {
            Some((start, end)) => json!({ "date": { "start": start, "end": end } }),
            None => json!({ "date": null }),
        },
        ValueKind::SingleChoice => json!({ "select": text.map(|name| json!({ "name": name })) }),
        ValueKind::Status => json!({ "status": text.map(|name| json!({ "name": name })) }),
        ValueKind::MultiChoice => {
            let items: Vec<Value> = split_choices(text.as_deref().unwrap_or_default())
                .into_iter()
                .map(|name| json!({ "name": name }))
                .collect();
            json!({ "multi_select": items })
        }
        ValueKind::Url => json!({ "url": text }),
        ValueKind::Email => json!({ "email": text }),
        ValueKind::Phone => json!({ "phone_number": text }),
    }
}

/// True when a raw property object holds nothing for its kind
///
/// A checkbox always has a value, so only a checked box counts as content.
pub fn property_is_empty(property: &Value, kind: ValueKind) -> bool {
    let blank = |value: &Value| value.as_str().map_or(true, |s| s.trim().is_empty());
    match kind {
        ValueKind::Title => rich_text_plain(&property["title"]).as_text().trim().is_empty(),
        ValueKind::Text => rich_text_plain(&property["rich_text"]).as_text().trim().is_empty(),
        ValueKind::Number => property["number"].is_null(),
        ValueKind::Boolean => !property["checkbox"].as_bool().unwrap_or(false),
        ValueKind::Date => blank(&property["date"]["start"]),
        ValueKind::SingleChoice => blank(&property["select"]["name"]),
        ValueKind::Status => blank(&property["status"]["name"]),
        ValueKind::MultiChoice => property["multi_select"]
            .as_array()
            .map_or(true, |items| items.is_empty()),
        ValueKind::Url => blank(&property["url"]),
        ValueKind::Email => blank(&property["email"]),
        ValueKind::Phone => blank(&property["phone_number"]),
    }
}

/// Title property object carrying plain text
pub fn title_property(text: &str) -> Value {
    json!({ "title": rich_text_blocks(Some(text)) })
}

/// Schema definition used when adding a missing property
///
/// A database has exactly one title and status options cannot be created
/// through the API, so both are added as their nearest creatable type.
pub fn property_schema(kind: ValueKind) -> Value {
    let type_name = match kind {
        ValueKind::Title => ValueKind::Text.as_str(),
        ValueKind::Status => ValueKind::SingleChoice.as_str(),
        other => other.as_str(),
    };
    json!({ type_name: {} })
}

fn rich_text_plain(parts: &Value) -> FieldValue {
    let text: String = parts
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .map(|p| {
                    p["plain_text"]
                        .as_str()
                        .or_else(|| p["text"]["content"].as_str())
                        .unwrap_or_default()
                })
                .collect()
        })
        .unwrap_or_default();
    FieldValue::Text(text)
}

fn rich_text_blocks(text: Option<&str>) -> Value {
    match text {
        Some(content) if !content.is_empty() => {
            json!([{ "type": "text", "text": { "content": content } }])
        }
        _ => json!([]),
    }
}

/// Date object as `start` or `start..end`
fn date_field(date: &Value) -> FieldValue {
    match (date["start"].as_str(), date["end"].as_str()) {
        (Some(start), Some(end)) => {
            FieldValue::Text(format!("{}{}{}", start, DATE_RANGE_SEPARATOR, end))
        }
        (Some(start), None) => FieldValue::Text(start.to_string()),
        (None, _) => FieldValue::Null,
    }
}

fn string_field(value: &Value) -> FieldValue {
    value
        .as_str()
        .map_or(FieldValue::Null, |s| FieldValue::Text(s.to_string()))
}
