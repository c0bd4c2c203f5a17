//! Reading and initializing config files
//!
//! Loading is strict: an empty, unparsable or invalid file is an error,
//! and tokens missing from the file are taken from the environment before
//! validation runs. `write_default` writes a commented template atomically
//! and never overwrites an existing file.

use crate::stores_config::{resolve_token, NOTION_TOKEN_ENV, SHEETS_TOKEN_ENV};
use crate::{Config, ConfigError, ConfigResult, CONFIG_VERSION};
use directories::ProjectDirs;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// File name used when no path is given
pub const CONFIG_FILE_NAME: &str = "sheetbridge.toml";

const DEFAULT_TEMPLATE: &str = r#"# sheetbridge configuration
version = 1

[sheets]
spreadsheet_id = "YOUR_SPREADSHEET_ID"
worksheet = "Sheet1"
meta_worksheet = "_SyncMeta"
# token = "..."            # or set SHEETS_TOKEN
# token_env = "SHEETS_TOKEN"

[notion]
database_id = "YOUR_DATABASE_ID"
# token = "..."            # or set NOTION_TOKEN
# token_env = "NOTION_TOKEN"

[sync]
key = "ID"
conflict_policy = "notion_wins"   # sheets_wins | notion_wins | fail
direction = "both"                # both | to_sheets | to_notion
dry_run = false
baseline = "file"                 # file | sheet
baseline_path = ".sheetbridge/baseline.json"

[[sync.columns]]
sheet = "ID"
notion = "ID"
type = "rich_text"

[[sync.columns]]
sheet = "Name"
notion = "Name"
type = "title"

[[sync.columns]]
sheet = "Status"
notion = "Status"
type = "select"

[[sync.columns]]
sheet = "Due"
notion = "Due"
type = "date"

[[sync.columns]]
sheet = "Done"
notion = "Done"
type = "checkbox"

[limits]
requests_per_minute = 30
max_retries = 6
backoff_base_secs = 1.0
backoff_cap_secs = 20.0
cooldown_secs = 65.0
"#;

/// Loads and initializes one config file
pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Platform config path, falling back to the working directory
    pub fn default_path() -> PathBuf {
        match ProjectDirs::from("", "", "sheetbridge") {
            Some(dirs) => dirs.config_dir().join(CONFIG_FILE_NAME),
            None => {
                log::debug!("No home directory found, using ./{}", CONFIG_FILE_NAME);
                PathBuf::from(CONFIG_FILE_NAME)
            }
        }
    }

    /// Loads, fills tokens from the process environment and validates
    pub fn load(&self) -> ConfigResult<Config> {
        self.load_with_env(|name| std::env::var(name).ok())
    }

    /// Same as [`load`](Self::load) with an explicit environment lookup
    pub fn load_with_env<F>(&self, lookup: F) -> ConfigResult<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = self.read()?;
        apply_env(&mut config, lookup);

        if let Err(errors) = config.validate() {
            return Err(ConfigError::from_validation(&errors));
        }

        log::debug!("Loaded config from {}", self.config_path.display());
        Ok(config)
    }

    /// Parses the file without touching the environment or validating
    pub fn read(&self) -> ConfigResult<Config> {
        let contents =
            fs::read_to_string(&self.config_path).map_err(|e| ConfigError::Read {
                path: self.config_path.clone(),
                source: e,
            })?;

        if contents.trim().is_empty() {
            return Err(ConfigError::Read {
                path: self.config_path.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "Config file is empty or contains only whitespace",
                ),
            });
        }

        let config: Config = toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: self.config_path.clone(),
            source: e,
        })?;

        if config.version > CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: config.version,
                supported: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Writes the commented template, refusing to overwrite
    pub fn write_default(&self) -> ConfigResult<()> {
        if self.config_path.exists() {
            return Err(ConfigError::AlreadyExists {
                path: self.config_path.clone(),
            });
        }

        let dir = self.parent_dir();
        ensure_directory_exists(&dir)?;

        let temp_file = NamedTempFile::new_in(&dir).map_err(ConfigError::Io)?;
        self.write_atomic(temp_file, DEFAULT_TEMPLATE)?;

        log::info!("Wrote config template to {}", self.config_path.display());
        Ok(())
    }

    fn parent_dir(&self) -> PathBuf {
        match self.config_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    fn write_atomic(&self, mut temp_file: NamedTempFile, content: &str) -> ConfigResult<()> {
        temp_file
            .write_all(content.as_bytes())
            .map_err(ConfigError::Io)?;
        temp_file.flush().map_err(ConfigError::Io)?;

        temp_file
            .persist_noclobber(&self.config_path)
            .map_err(|e| ConfigError::Write {
                path: self.config_path.clone(),
                source: e.error,
            })?;

        Ok(())
    }
}

/// Fills missing tokens from `token_env` or the default variables
pub fn apply_env<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    resolve_token(
        &mut config.sheets.token,
        config.sheets.token_env.as_deref(),
        SHEETS_TOKEN_ENV,
        &lookup,
    );
    resolve_token(
        &mut config.notion.token,
        config.notion.token_env.as_deref(),
        NOTION_TOKEN_ENV,
        &lookup,
    );
}

fn ensure_directory_exists(path: &Path) -> ConfigResult<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| ConfigError::CreateDir {
            path: path.to_path_buf(),
            source: e,
        })?;
        log::info!("Created config directory: {}", path.display());
    }
    Ok(())
}
