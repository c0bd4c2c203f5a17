// FILE: crates/cli/src/commands.rs

use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use console::style;
use sheetbridge_config::{BaselineKind, Config, ConfigLoader};
use sheetbridge_connectors::{
    DatabaseAdapter, NotionConnector, SheetAdapter, SheetBaseline, SheetsConnector,
};
use sheetbridge_core::{ConflictPolicy, Direction, FieldMappings};
use sheetbridge_resilience::RemoteCaller;
use sheetbridge_sync_engine::{
    BaselineStore, JsonFileBaseline, RunSummary, StoreAdapter, SyncConfig, SyncEngine,
};
use std::path::{Path, PathBuf};

/// Exit code when the `fail` policy leaves conflicts behind
pub const EXIT_CONFLICTS: i32 = 2;

/// Explicit `--config` value or the platform default
pub fn config_path(arg: Option<&String>) -> PathBuf {
    arg.map(PathBuf::from)
        .unwrap_or_else(ConfigLoader::default_path)
}

/// Run one reconciliation and return the process exit code
pub fn sync(config_path: &Path, matches: &ArgMatches) -> Result<i32> {
    let config = load_config(config_path)?;
    let mappings = config.to_mappings().context("Invalid column mappings")?;
    let run_config = run_config(
        &config,
        matches.get_one::<String>("direction").map(String::as_str),
        matches.get_flag("dry-run"),
    )?;

    let caller = config.limits.remote_caller();
    let sheets = sheets_connector(&config)?;
    let sheet = SheetAdapter::new(sheets.clone(), mappings.clone(), caller.clone());
    let database = DatabaseAdapter::new(notion_connector(&config)?, mappings.clone(), caller.clone());
    let baseline = baseline_store(&config, &sheets, caller);

    log::info!(
        "Syncing worksheet '{}' with database {} (direction {}, policy {}{})",
        config.sheets.worksheet,
        config.notion.database_id,
        run_config.direction,
        run_config.policy,
        if run_config.dry_run { ", dry run" } else { "" }
    );

    let summary = execute(mappings, run_config, sheet, database, baseline)?;

    if matches.get_flag("json") {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to encode summary")?
        );
    } else {
        print_summary(&summary);
    }

    Ok(exit_code(&summary, run_config.policy))
}

/// Load and validate the config, then describe what a run would touch
pub fn check(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let mappings = config.to_mappings().context("Invalid column mappings")?;

    println!("\n{}", style("Configuration OK").bold().green());
    println!("{}", "=".repeat(60));
    println!("File:       {}", config_path.display());
    println!(
        "Sheets:     {} / {}",
        config.sheets.spreadsheet_id, config.sheets.worksheet
    );
    println!("Notion:     {}", config.notion.database_id);
    println!("Policy:     {}", config.sync.conflict_policy);
    println!("Direction:  {}", config.sync.direction);
    println!("Baseline:   {}", baseline_description(&config));
    println!(
        "Limits:     {} req/min, {} attempts, {}s cooldown",
        config.limits.requests_per_minute, config.limits.max_retries, config.limits.cooldown_secs
    );

    println!("\n{} Column Mappings", style(mappings.len()).bold().cyan());
    for line in mapping_lines(&mappings) {
        println!("  {}", line);
    }

    Ok(())
}

/// Write the config template
pub fn init(config_path: &Path) -> Result<()> {
    ConfigLoader::new(config_path)
        .write_default()
        .with_context(|| format!("Failed to initialize {}", config_path.display()))?;

    println!(
        "{} Config template written to {}",
        style("✓").green().bold(),
        config_path.display()
    );
    println!("  Fill in the spreadsheet and database ids, then set SHEETS_TOKEN and NOTION_TOKEN.");
    Ok(())
}

fn load_config(config_path: &Path) -> Result<Config> {
    ConfigLoader::new(config_path)
        .load()
        .with_context(|| format!("Failed to load config from {}", config_path.display()))
}

/// Config values with command-line overrides applied
fn run_config(config: &Config, direction: Option<&str>, dry_run: bool) -> Result<SyncConfig> {
    let direction = match direction {
        Some(name) => Direction::parse(name).ok_or_else(|| anyhow!("Unknown direction '{}'", name))?,
        None => config.sync.direction,
    };

    Ok(SyncConfig {
        policy: config.sync.conflict_policy,
        direction,
        dry_run: dry_run || config.sync.dry_run,
    })
}

fn sheets_connector(config: &Config) -> Result<SheetsConnector> {
    let token = config
        .sheets
        .token
        .as_deref()
        .ok_or_else(|| anyhow!("sheets.token is not set"))?;

    Ok(SheetsConnector::new(
        config.sheets.spreadsheet_id.as_str(),
        config.sheets.worksheet.as_str(),
        token,
    )
    .context("Failed to create Sheets client")?
    .with_base_url(config.sheets.api_base.as_str()))
}

fn notion_connector(config: &Config) -> Result<NotionConnector> {
    let token = config
        .notion
        .token
        .as_deref()
        .ok_or_else(|| anyhow!("notion.token is not set"))?;

    Ok(NotionConnector::new(config.notion.database_id.as_str(), token)
        .context("Failed to create Notion client")?
        .with_base_url(config.notion.api_base.as_str()))
}

fn baseline_store(
    config: &Config,
    sheets: &SheetsConnector,
    caller: RemoteCaller,
) -> Box<dyn BaselineStore> {
    match config.sync.baseline {
        BaselineKind::File => Box::new(JsonFileBaseline::new(config.sync.baseline_path.clone())),
        BaselineKind::Sheet => Box::new(SheetBaseline::new(
            sheets.for_worksheet(config.sheets.meta_worksheet.as_str()),
            caller,
        )),
    }
}

fn baseline_description(config: &Config) -> String {
    match config.sync.baseline {
        BaselineKind::File => format!("file {}", config.sync.baseline_path.display()),
        BaselineKind::Sheet => format!("worksheet '{}'", config.sheets.meta_worksheet),
    }
}

/// Runs the engine over already-built stores
fn execute<A, B, S>(
    mappings: FieldMappings,
    run_config: SyncConfig,
    sheet: A,
    database: B,
    baseline: S,
) -> Result<RunSummary>
where
    A: StoreAdapter,
    B: StoreAdapter,
    S: BaselineStore,
{
    let mut engine = SyncEngine::new(mappings, run_config, sheet, database, baseline);
    engine.run().context("Sync run aborted")
}

fn exit_code(summary: &RunSummary, policy: ConflictPolicy) -> i32 {
    if policy == ConflictPolicy::Fail && summary.has_unresolved_conflicts() {
        EXIT_CONFLICTS
    } else {
        0
    }
}

fn mapping_lines(mappings: &FieldMappings) -> Vec<String> {
    mappings
        .iter()
        .map(|column| {
            let marker = if column.sheet == mappings.key_field() { " (key)" } else { "" };
            format!(
                "{} -> {} [{}]{}",
                column.sheet,
                column.database,
                column.kind.as_str(),
                marker
            )
        })
        .collect()
}

fn summary_lines(summary: &RunSummary) -> Vec<String> {
    let mut lines = vec![
        format!("Created in Sheets:  {}", summary.created_in_a),
        format!("Created in Notion:  {}", summary.created_in_b),
        format!("Updated in Sheets:  {}", summary.updated_a),
        format!("Updated in Notion:  {}", summary.updated_b),
        format!("Unchanged:          {}", summary.unchanged),
    ];
    if summary.keys_assigned > 0 {
        lines.push(format!("Keys assigned:      {}", summary.keys_assigned));
    }
    if summary.baselines_refreshed > 0 {
        lines.push(format!("Baselines refreshed: {}", summary.baselines_refreshed));
    }
    if summary.skipped > 0 {
        lines.push(format!(
            "Skipped ({}):    {}",
            summary.direction, summary.skipped
        ));
    }
    lines
}

fn print_summary(summary: &RunSummary) {
    let title = if summary.dry_run {
        style("Dry run (nothing written)").bold().yellow()
    } else {
        style("Sync complete").bold().green()
    };
    println!("\n{}", title);
    println!("{}", "=".repeat(60));

    for line in summary_lines(summary) {
        println!("{}", line);
    }

    if summary.has_unresolved_conflicts() {
        println!(
            "\n{} {} unresolved conflict(s):",
            style("!").yellow().bold(),
            summary.conflicts.len()
        );
        for key in &summary.conflicts {
            println!("  {}", key);
        }
    }

    if summary.has_failures() {
        println!(
            "\n{} {} key(s) failed:",
            style("✗").red().bold(),
            summary.failures.len()
        );
        for failure in &summary.failures {
            println!("  {} [{}] {}", failure.key, failure.stage, failure.message);
        }
    }
}

#[cfg(test)]
mod tests;
