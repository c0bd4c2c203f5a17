//! Sync key: the identifier that ties one logical record across both stores

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of one logical record across both stores
///
/// Keys compare as exact strings. Empty and whitespace-only values are never
/// valid keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SyncKey(String);

impl SyncKey {
    /// Parses a key from a raw field value
    pub fn parse(raw: &str) -> CoreResult<Self> {
        if raw.trim().is_empty() {
            return Err(CoreError::InvalidKey(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    /// Generates a fresh random key
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SyncKey {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SyncKey> for String {
    fn from(key: SyncKey) -> Self {
        key.0
    }
}

impl std::fmt::Display for SyncKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
