//! Per-section validation
//!
//! Every section checks all of its fields and returns every failure, so a
//! broken file is fixed in one edit instead of one error at a time.

pub use crate::error::ValidationError;

/// A `[table]` of the config file
pub trait ConfigSection: Default {
    fn validate(&self) -> Result<(), Vec<ValidationError>>;

    /// Overlays `other` onto `self`; `other` wins except where a section says otherwise
    fn merge(&mut self, other: Self);

    /// TOML table name
    fn section_name(&self) -> &'static str;
}

/// Field checks shared by the sections
pub struct Validator;

impl Validator {
    /// Inclusive bounds
    pub fn in_range<T>(value: T, min: T, max: T, field: &str) -> Result<(), ValidationError>
    where
        T: PartialOrd + std::fmt::Display + Copy,
    {
        if (min..=max).contains(&value) {
            Ok(())
        } else {
            Err(ValidationError::with_value(
                field,
                format!("must be between {min} and {max}"),
                value,
            ))
        }
    }

    /// Rejects empty and whitespace-only text
    pub fn not_empty(value: &str, field: &str) -> Result<(), ValidationError> {
        match value.trim() {
            "" => Err(ValidationError::new(field, "must not be empty")),
            _ => Ok(()),
        }
    }

    pub fn required(value: Option<&str>, field: &str) -> Result<(), ValidationError> {
        value
            .ok_or_else(|| ValidationError::new(field, "is required"))
            .and_then(|v| Self::not_empty(v, field))
    }

    pub fn http_url(value: &str, field: &str) -> Result<(), ValidationError> {
        if ["https://", "http://"].iter().any(|scheme| value.starts_with(scheme)) {
            Ok(())
        } else {
            Err(ValidationError::with_value(field, "must be an http(s) URL", value))
        }
    }

    /// Keeps only the failures
    pub fn collect_errors(
        checks: Vec<Result<(), ValidationError>>,
    ) -> Result<(), Vec<ValidationError>> {
        let failed: Vec<ValidationError> = checks.into_iter().filter_map(Result::err).collect();
        if failed.is_empty() {
            Ok(())
        } else {
            Err(failed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_range_bounds_are_inclusive() {
        assert!(Validator::in_range(1, 1, 6000, "rpm").is_ok());
        assert!(Validator::in_range(6000, 1, 6000, "rpm").is_ok());
        assert!(Validator::in_range(0, 1, 6000, "rpm").is_err());
        assert!(Validator::in_range(20.5, 0.0, 20.0, "cap").is_err());
    }

    #[test]
    fn test_not_empty() {
        assert!(Validator::not_empty("1AbC", "sheets.spreadsheet_id").is_ok());
        assert!(Validator::not_empty(" \t", "sheets.spreadsheet_id").is_err());
    }

    #[test]
    fn test_required() {
        assert!(Validator::required(Some("secret"), "notion.token").is_ok());
        assert_eq!(
            Validator::required(Some(""), "notion.token").unwrap_err().message,
            "must not be empty"
        );
        assert_eq!(
            Validator::required(None, "notion.token").unwrap_err().message,
            "is required"
        );
    }

    #[test]
    fn test_http_url() {
        assert!(Validator::http_url("https://api.notion.com/v1", "notion.api_base").is_ok());
        assert!(Validator::http_url("http://127.0.0.1:8080", "notion.api_base").is_ok());
        assert!(Validator::http_url("ftp://example.com", "notion.api_base").is_err());
    }

    #[test]
    fn test_collect_errors_keeps_failures_in_order() {
        let errors = Validator::collect_errors(vec![
            Ok(()),
            Err(ValidationError::new("sheets.token", "is required")),
            Ok(()),
            Err(ValidationError::new("notion.token", "is required")),
        ])
        .unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["sheets.token", "notion.token"]);
    }
}
