use super::*;
use sheetbridge_config::SyncSettings;
use sheetbridge_connectors::{MemoryDatabase, MemorySheet};
use sheetbridge_resilience::{ManualClock, RateLimiter, RetryPolicy};
use sheetbridge_sync_engine::{FailureStage, KeyFailure, SyncAction};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn config() -> Config {
    let mut config = Config::default();
    config.sheets.spreadsheet_id = "1AbC".to_string();
    config.sheets.token = Some("ya29.token".to_string());
    config.notion.database_id = "db".to_string();
    config.notion.token = Some("secret_x".to_string());
    config.sync.columns = SyncSettings::example_columns();
    config
}

fn caller() -> RemoteCaller {
    RemoteCaller::new(
        RateLimiter::with_clock(6_000, Arc::new(ManualClock::new())),
        RetryPolicy::default().with_jitter(false),
    )
}

#[test]
fn test_config_path_explicit_and_default() {
    let explicit = "custom.toml".to_string();
    assert_eq!(config_path(Some(&explicit)), PathBuf::from("custom.toml"));
    assert!(config_path(None).ends_with("sheetbridge.toml"));
}

#[test]
fn test_run_config_uses_config_values() {
    let mut config = config();
    config.sync.conflict_policy = ConflictPolicy::Fail;
    config.sync.direction = Direction::ToA;

    let run = run_config(&config, None, false).unwrap();
    assert_eq!(run.policy, ConflictPolicy::Fail);
    assert_eq!(run.direction, Direction::ToA);
    assert!(!run.dry_run);
}

#[test]
fn test_run_config_command_line_overrides() {
    let config = config();

    let run = run_config(&config, Some("to-notion"), true).unwrap();
    assert_eq!(run.direction, Direction::ToB);
    assert!(run.dry_run);

    let run = run_config(&config, Some("to-sheets"), false).unwrap();
    assert_eq!(run.direction, Direction::ToA);

    assert!(run_config(&config, Some("sideways"), false).is_err());
}

#[test]
fn test_dry_run_flag_cannot_be_unset_from_command_line() {
    let mut config = config();
    config.sync.dry_run = true;
    assert!(run_config(&config, None, false).unwrap().dry_run);
}

#[test]
fn test_exit_code() {
    let mut summary = RunSummary::new(Direction::Both, false);
    assert_eq!(exit_code(&summary, ConflictPolicy::Fail), 0);

    summary.conflicts.push("K1".to_string());
    assert_eq!(exit_code(&summary, ConflictPolicy::Fail), EXIT_CONFLICTS);
    assert_eq!(exit_code(&summary, ConflictPolicy::BWins), 0);

    summary.conflicts.clear();
    summary.failures.push(KeyFailure::new(
        "K2",
        FailureStage::Apply(SyncAction::CreateInB),
        "HTTP 400",
    ));
    assert_eq!(exit_code(&summary, ConflictPolicy::Fail), 0);
}

#[test]
fn test_summary_lines() {
    let mut summary = RunSummary::new(Direction::ToB, false);
    summary.created_in_b = 3;
    summary.updated_a = 1;

    let lines = summary_lines(&summary);
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[1], "Created in Notion:  3");
    assert_eq!(lines[2], "Updated in Sheets:  1");

    summary.keys_assigned = 2;
    summary.skipped = 4;
    let lines = summary_lines(&summary);
    assert_eq!(lines.len(), 7);
    assert!(lines[5].contains('2'));
    assert!(lines[6].contains("to_b"));
}

#[test]
fn test_mapping_lines_mark_key() {
    let mappings = config().to_mappings().unwrap();
    let lines = mapping_lines(&mappings);
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "ID -> ID [rich_text] (key)");
    assert_eq!(lines[1], "Name -> Name [title]");
}

#[test]
fn test_baseline_description() {
    let mut config = config();
    assert!(baseline_description(&config).starts_with("file "));

    config.sync.baseline = BaselineKind::Sheet;
    assert_eq!(baseline_description(&config), "worksheet '_SyncMeta'");
}

#[test]
fn test_connectors_need_tokens() {
    let mut config = config();
    assert!(sheets_connector(&config).is_ok());
    assert!(notion_connector(&config).is_ok());

    config.notion.token = None;
    assert!(notion_connector(&config).is_err());
}

#[test]
fn test_init_then_refuse_overwrite() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("sheetbridge.toml");

    init(&path).unwrap();
    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("[[sync.columns]]"));

    assert!(init(&path).is_err());
    assert_eq!(fs::read_to_string(&path).unwrap(), written);
}

#[test]
fn test_check_rejects_incomplete_config() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("sheetbridge.toml");
    fs::write(&path, "version = 1\n[sync]\nkey = \"ID\"\n").unwrap();

    let err = check(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to load config"));
}

#[test]
fn test_execute_with_file_baseline() {
    let temp_dir = TempDir::new().unwrap();
    let baseline_path = temp_dir.path().join("state").join("baseline.json");
    let config = config();
    let mappings = config.to_mappings().unwrap();

    let sheet = MemorySheet::with_rows(
        &["ID", "Name", "Status", "Due", "Done"],
        &[
            vec!["K1", "Write docs", "Todo", "2024-05-01", "FALSE"],
            vec!["K2", "Ship", "Done", "", "TRUE"],
        ],
    );
    let database = MemoryDatabase::with_schema(&[
        ("Name", "title"),
        ("ID", "rich_text"),
        ("Status", "select"),
        ("Due", "date"),
        ("Done", "checkbox"),
    ]);

    let run = |dry_run: bool| {
        let caller = caller();
        execute(
            mappings.clone(),
            SyncConfig {
                policy: ConflictPolicy::BWins,
                direction: Direction::Both,
                dry_run,
            },
            SheetAdapter::new(sheet.clone(), mappings.clone(), caller.clone()),
            DatabaseAdapter::new(database.clone(), mappings.clone(), caller),
            JsonFileBaseline::new(baseline_path.clone()),
        )
        .unwrap()
    };

    let preview = run(true);
    assert_eq!(preview.created_in_b, 2);
    assert_eq!(database.write_count(), 0);
    assert!(!baseline_path.exists());

    let first = run(false);
    assert_eq!(first.created_in_b, 2);
    assert_eq!(database.items().len(), 2);
    assert!(baseline_path.exists());

    let second = run(false);
    assert_eq!(second.total_writes(), 0);
    assert_eq!(second.unchanged, 2);
    assert_eq!(exit_code(&second, ConflictPolicy::Fail), 0);
}
