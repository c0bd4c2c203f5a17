//! Store connection sections: `[sheets]` and `[notion]`

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};

/// Environment variable read when `sheets.token` and `sheets.token_env` are unset
pub const SHEETS_TOKEN_ENV: &str = "SHEETS_TOKEN";

/// Environment variable read when `notion.token` and `notion.token_env` are unset
pub const NOTION_TOKEN_ENV: &str = "NOTION_TOKEN";

/// Spreadsheet connection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SheetsConfig {
    /// Id from the spreadsheet URL
    pub spreadsheet_id: String,

    /// Title of the synced worksheet
    pub worksheet: String,

    /// Title of the worksheet holding the baseline when `sync.baseline = "sheet"`
    pub meta_worksheet: String,

    /// OAuth bearer token; usually supplied through the environment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Name of the environment variable holding the token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,

    pub api_base: String,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            worksheet: "Sheet1".to_string(),
            meta_worksheet: "_SyncMeta".to_string(),
            token: None,
            token_env: None,
            api_base: "https://sheets.googleapis.com/v4".to_string(),
        }
    }
}

impl ConfigSection for SheetsConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut results = vec![
            Validator::not_empty(&self.spreadsheet_id, "sheets.spreadsheet_id"),
            Validator::not_empty(&self.worksheet, "sheets.worksheet"),
            Validator::not_empty(&self.meta_worksheet, "sheets.meta_worksheet"),
            Validator::http_url(&self.api_base, "sheets.api_base"),
            Validator::required(self.token.as_deref(), "sheets.token"),
        ];

        if self.meta_worksheet.trim() == self.worksheet.trim() {
            results.push(Err(ValidationError::with_value(
                "sheets.meta_worksheet",
                "must differ from sheets.worksheet",
                &self.meta_worksheet,
            )));
        }

        Validator::collect_errors(results)
    }

    fn merge(&mut self, other: Self) {
        self.spreadsheet_id = other.spreadsheet_id;
        self.worksheet = other.worksheet;
        self.meta_worksheet = other.meta_worksheet;
        if other.token.is_some() {
            self.token = other.token;
        }
        if other.token_env.is_some() {
            self.token_env = other.token_env;
        }
        self.api_base = other.api_base;
    }

    fn section_name(&self) -> &'static str {
        "sheets"
    }
}

/// Database connection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NotionConfig {
    /// Id of the database
    pub database_id: String,

    /// Integration token; usually supplied through the environment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Name of the environment variable holding the token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,

    pub api_base: String,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            database_id: String::new(),
            token: None,
            token_env: None,
            api_base: "https://api.notion.com/v1".to_string(),
        }
    }
}

impl ConfigSection for NotionConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![
            Validator::not_empty(&self.database_id, "notion.database_id"),
            Validator::http_url(&self.api_base, "notion.api_base"),
            Validator::required(self.token.as_deref(), "notion.token"),
        ])
    }

    fn merge(&mut self, other: Self) {
        self.database_id = other.database_id;
        if other.token.is_some() {
            self.token = other.token;
        }
        if other.token_env.is_some() {
            self.token_env = other.token_env;
        }
        self.api_base = other.api_base;
    }

    fn section_name(&self) -> &'static str {
        "notion"
    }
}

/// Fills an empty token from `token_env`, then from `fallback_env`
pub(crate) fn resolve_token<F>(
    token: &mut Option<String>,
    token_env: Option<&str>,
    fallback_env: &str,
    lookup: F,
) where
    F: Fn(&str) -> Option<String>,
{
    if token.as_deref().is_some_and(|t| !t.trim().is_empty()) {
        return;
    }

    let from_env = token_env
        .and_then(|name| lookup(name))
        .or_else(|| lookup(fallback_env))
        .filter(|t| !t.trim().is_empty());
    if from_env.is_some() {
        *token = from_env;
    }
}
