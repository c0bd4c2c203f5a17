//! Integration tests for the configuration system

use sheetbridge_config::{
    BaselineKind, Config, ConfigError, ConfigLoader, ConfigSection, LimitsConfig, SyncSettings,
    CONFIG_VERSION,
};
use sheetbridge_core::{ConflictPolicy, Direction, ValueKind};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

fn setup_test_dir() -> Result<(TempDir, PathBuf), Box<dyn std::error::Error>> {
    let _ = env_logger::builder().is_test(true).try_init();
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("sheetbridge.toml");
    Ok((temp_dir, config_path))
}

fn no_env(_: &str) -> Option<String> {
    None
}

const HAND_WRITTEN: &str = r#"
version = 1

[sheets]
spreadsheet_id = "1AbCdEf"
worksheet = "Tasks"
token = "ya29.file-token"

[notion]
database_id = "0123456789abcdef"
token_env = "TEAM_NOTION_TOKEN"

[sync]
key = "Ticket"
conflict_policy = "sheets_wins"
direction = "to_notion"
baseline = "sheet"

[[sync.columns]]
sheet = "Ticket"
notion = "Ticket ID"
type = "rich_text"

[[sync.columns]]
sheet = "Summary"
notion = "Name"
type = "title"

[[sync.columns]]
sheet = "Points"
notion = "Estimate"
type = "number"

[[sync.columns]]
sheet = "Labels"
notion = "Tags"
type = "multi_select"

[limits]
requests_per_minute = 60
"#;

#[test]
fn test_full_lifecycle() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, config_path) = setup_test_dir()?;
    let loader = ConfigLoader::new(&config_path);

    loader.write_default()?;
    assert!(config_path.exists());

    let config = loader.load_with_env(|name| Some(format!("{}-value", name)))?;
    assert_eq!(config.version, CONFIG_VERSION);
    assert_eq!(config.sync.conflict_policy, ConflictPolicy::BWins);
    assert_eq!(config.sync.direction, Direction::Both);
    assert_eq!(config.sync.baseline, BaselineKind::File);
    assert_eq!(config.sheets.token.as_deref(), Some("SHEETS_TOKEN-value"));

    let mappings = config.to_mappings()?;
    assert_eq!(mappings.key_field(), "ID");
    assert!(mappings.has_title());

    assert!(matches!(
        loader.write_default(),
        Err(ConfigError::AlreadyExists { .. })
    ));

    Ok(())
}

#[test]
fn test_hand_written_config() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, config_path) = setup_test_dir()?;
    fs::write(&config_path, HAND_WRITTEN)?;

    let config = ConfigLoader::new(&config_path).load_with_env(|name| match name {
        "TEAM_NOTION_TOKEN" => Some("secret_team".to_string()),
        _ => None,
    })?;

    assert_eq!(config.sheets.worksheet, "Tasks");
    assert_eq!(config.sheets.meta_worksheet, "_SyncMeta");
    assert_eq!(config.sheets.token.as_deref(), Some("ya29.file-token"));
    assert_eq!(config.notion.token.as_deref(), Some("secret_team"));
    assert_eq!(config.notion.api_base, "https://api.notion.com/v1");
    assert_eq!(config.sync.conflict_policy, ConflictPolicy::AWins);
    assert_eq!(config.sync.direction, Direction::ToB);
    assert_eq!(config.sync.baseline, BaselineKind::Sheet);
    assert_eq!(config.limits.requests_per_minute, 60);
    assert_eq!(config.limits.max_retries, 6);

    let mappings = config.to_mappings()?;
    assert_eq!(mappings.key_field(), "Ticket");
    assert_eq!(
        mappings.database_names(),
        vec!["Ticket ID", "Name", "Estimate", "Tags"]
    );
    assert_eq!(mappings.columns()[3].kind, ValueKind::MultiChoice);

    Ok(())
}

#[test]
fn test_invalid_values_are_all_reported() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, config_path) = setup_test_dir()?;
    let broken = HAND_WRITTEN
        .replace("requests_per_minute = 60", "requests_per_minute = 0")
        .replace("key = \"Ticket\"", "key = \"Nope\"");
    fs::write(&config_path, broken)?;

    let result = ConfigLoader::new(&config_path).load_with_env(no_env);
    let message = match result {
        Err(ConfigError::Invalid(msg)) => msg,
        other => panic!("expected validation error, got {:?}", other),
    };
    assert!(message.contains("notion.token"));
    assert!(message.contains("sync.columns"));
    assert!(message.contains("limits.requests_per_minute"));

    Ok(())
}

#[test]
fn test_unknown_policy_is_parse_error() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, config_path) = setup_test_dir()?;
    fs::write(
        &config_path,
        HAND_WRITTEN.replace("\"sheets_wins\"", "\"coin_flip\""),
    )?;

    let result = ConfigLoader::new(&config_path).load_with_env(no_env);
    assert!(matches!(result, Err(ConfigError::Parse { .. })));

    Ok(())
}

#[test]
fn test_serialization_roundtrip() -> Result<(), Box<dyn std::error::Error>> {
    let mut original = Config::default();
    original.sheets.spreadsheet_id = "1AbC".to_string();
    original.notion.database_id = "db".to_string();
    original.sync.columns = SyncSettings::example_columns();
    original.sync.conflict_policy = ConflictPolicy::Fail;

    let toml_string = toml::to_string(&original)?;
    assert!(!toml_string.contains("token"));

    let deserialized: Config = toml::from_str(&toml_string)?;
    assert_eq!(original, deserialized);

    Ok(())
}

#[test]
fn test_limits_build_resilience_types() {
    let limits = LimitsConfig {
        requests_per_minute: 120,
        max_retries: 3,
        cooldown_secs: 10.0,
        ..Default::default()
    };
    assert!(limits.validate().is_ok());

    let caller = limits.remote_caller();
    assert_eq!(caller.limiter().min_interval(), Duration::from_millis(500));
    assert_eq!(caller.policy().max_attempts(), 3);
    assert_eq!(caller.policy().cooldown(), Duration::from_secs(10));
}
