//! Field values and value kinds

use serde::{Deserialize, Serialize};
use std::fmt;

/// The declared type of a mapped column
///
/// Names are parsed leniently: both the generic names (`text`, `boolean`,
/// `single_choice`) and the native database names (`rich_text`, `checkbox`,
/// `select`) are accepted. Unknown names fall back to [`ValueKind::Text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ValueKind {
    #[default]
    Text,
    Title,
    Number,
    Boolean,
    Date,
    SingleChoice,
    MultiChoice,
    Url,
    Email,
    Phone,
    Status,
}

impl ValueKind {
    /// Parses a kind name, falling back to `Text` for anything unknown
    pub fn parse(name: &str) -> Self {
        Self::from_name(name).unwrap_or(Self::Text)
    }

    /// Parses a kind name, returning `None` for unknown names
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
        let kind = match normalized.as_str() {
            "text" | "rich_text" | "richtext" => Self::Text,
            "title" => Self::Title,
            "number" => Self::Number,
            "boolean" | "bool" | "checkbox" => Self::Boolean,
            "date" | "datetime" => Self::Date,
            "select" | "single_choice" | "single_select" => Self::SingleChoice,
            "multi_select" | "multi_choice" | "multiselect" => Self::MultiChoice,
            "url" => Self::Url,
            "email" => Self::Email,
            "phone" | "phone_number" => Self::Phone,
            "status" => Self::Status,
            _ => return None,
        };
        Some(kind)
    }

    /// Canonical name, matching the database property type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "rich_text",
            Self::Title => "title",
            Self::Number => "number",
            Self::Boolean => "checkbox",
            Self::Date => "date",
            Self::SingleChoice => "select",
            Self::MultiChoice => "multi_select",
            Self::Url => "url",
            Self::Email => "email",
            Self::Phone => "phone_number",
            Self::Status => "status",
        }
    }
}

impl From<String> for ValueKind {
    fn from(name: String) -> Self {
        Self::parse(&name)
    }
}

impl From<ValueKind> for String {
    fn from(kind: ValueKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A canonical scalar value
///
/// Dates are carried as normalized ISO-8601 UTC text and multi-choice values
/// as comma-joined text, so four variants cover every kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Creates a text value
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Returns true for `Null`
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Text used for column-by-column comparison and hashing
    pub fn as_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(true) => "TRUE".to_string(),
            Self::Bool(false) => "FALSE".to_string(),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}
