//! sheetbridge configuration
//!
//! One TOML file describes both stores, the reconciliation settings and the
//! remote call budget. Each section implements [`ConfigSection`], so every
//! invalid field is reported in one pass.
//!
//! # Example
//!
//! ```rust,no_run
//! use sheetbridge_config::ConfigLoader;
//!
//! let config = ConfigLoader::new("sheetbridge.toml").load()?;
//! let mappings = config.to_mappings()?;
//! println!("{} columns keyed by {}", mappings.len(), mappings.key_field());
//! # Ok::<(), sheetbridge_config::ConfigError>(())
//! ```

mod error;
mod limits_config;
mod loader;
mod stores_config;
mod sync_config;
mod validation;

pub use error::{ConfigError, ConfigResult, ValidationError};
pub use limits_config::LimitsConfig;
pub use loader::{apply_env, ConfigLoader, CONFIG_FILE_NAME};
pub use stores_config::{NotionConfig, SheetsConfig, NOTION_TOKEN_ENV, SHEETS_TOKEN_ENV};
pub use sync_config::{BaselineKind, SyncSettings};
pub use validation::{ConfigSection, Validator};

use serde::{Deserialize, Serialize};
use sheetbridge_core::FieldMappings;

/// Current config file format version
pub const CONFIG_VERSION: u32 = 1;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Config file format version
    pub version: u32,

    pub sheets: SheetsConfig,

    pub notion: NotionConfig,

    pub sync: SyncSettings,

    pub limits: LimitsConfig,
}

impl Config {
    /// Validates every section, returning all failures in file order
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        collect_section(&self.sheets, &mut errors);
        collect_section(&self.notion, &mut errors);
        collect_section(&self.sync, &mut errors);
        collect_section(&self.limits, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Merges this config with another, preferring values from `other`
    pub fn merge(&mut self, other: Config) {
        self.sheets.merge(other.sheets);
        self.notion.merge(other.notion);
        self.sync.merge(other.sync);
        self.limits.merge(other.limits);
    }

    /// Column mappings of the `[sync]` section
    pub fn to_mappings(&self) -> ConfigResult<FieldMappings> {
        Ok(self.sync.to_mappings()?)
    }
}

fn collect_section<S: ConfigSection>(section: &S, errors: &mut Vec<ValidationError>) {
    if let Err(mut found) = section.validate() {
        log::debug!("[{}] has {} invalid field(s)", section.section_name(), found.len());
        errors.append(&mut found);
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            sheets: SheetsConfig::default(),
            notion: NotionConfig::default(),
            sync: SyncSettings::default(),
            limits: LimitsConfig::default(),
        }
    }
}
