//! Config loading failures

use std::path::PathBuf;
use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Everything that can stop a config file from becoming a [`Config`](crate::Config)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// One or more fields failed validation, joined with `; `
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Config version {found} is newer than the supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("Invalid column mapping: {0}")]
    Mapping(#[from] sheetbridge_core::CoreError),

    #[error("{path} already exists")]
    AlreadyExists { path: PathBuf },

    #[error("Cannot create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub fn from_validation(errors: &[ValidationError]) -> Self {
        let joined: Vec<String> = errors.iter().map(ToString::to_string).collect();
        Self::Invalid(joined.join("; "))
    }
}

/// One rejected field, addressed by its dotted TOML path
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} {message}{}", got_suffix(.value))]
pub struct ValidationError {
    /// e.g. `limits.requests_per_minute`
    pub field: String,
    pub message: String,
    pub value: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value: None,
        }
    }

    pub fn with_value(
        field: impl Into<String>,
        message: impl Into<String>,
        value: impl ToString,
    ) -> Self {
        Self {
            value: Some(value.to_string()),
            ..Self::new(field, message)
        }
    }
}

fn got_suffix(value: &Option<String>) -> String {
    value
        .as_ref()
        .map(|v| format!(" (got `{}`)", v))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_error_without_value() {
        let err = ValidationError::new("sync.key", "must not be empty");
        assert_eq!(err.to_string(), "sync.key must not be empty");
    }

    #[test]
    fn test_field_error_with_value() {
        let err = ValidationError::with_value(
            "limits.requests_per_minute",
            "must be between 1 and 6000",
            0,
        );
        assert_eq!(
            err.to_string(),
            "limits.requests_per_minute must be between 1 and 6000 (got `0`)"
        );
    }

    #[test]
    fn test_from_validation_joins_fields() {
        let err = ConfigError::from_validation(&[
            ValidationError::new("sheets.token", "is required"),
            ValidationError::new("notion.token", "is required"),
        ]);
        assert_eq!(
            err.to_string(),
            "Invalid configuration: sheets.token is required; notion.token is required"
        );
    }

    #[test]
    fn test_unsupported_version_message() {
        let err = ConfigError::UnsupportedVersion {
            found: 3,
            supported: 1,
        };
        assert!(err.to_string().contains("version 3"));
    }
}
