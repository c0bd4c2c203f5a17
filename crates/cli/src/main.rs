// FILE: crates/cli/src/main.rs

use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use console::style;

mod commands;

fn build_cli() -> Command {
    Command::new("sheetbridge")
        .version(env!("CARGO_PKG_VERSION"))
        .author("sheetbridge contributors")
        .about("Keeps a spreadsheet and a Notion database in sync")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Path to the config file (defaults to the platform config directory)")
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log every remote call and classification")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("sync")
                .about("Reconcile both stores once")
                .arg(
                    Arg::new("direction")
                        .short('d')
                        .long("direction")
                        .value_name("DIRECTION")
                        .help("Which stores may be written (overrides the config)")
                        .value_parser(["both", "to-sheets", "to-notion"]),
                )
                .arg(
                    Arg::new("dry-run")
                        .short('n')
                        .long("dry-run")
                        .help("Classify and report without writing anything")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the run summary as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("check").about("Load and validate the config, then print the mappings"))
        .subcommand(Command::new("init").about("Write a config template"))
}

fn run() -> Result<i32> {
    let matches = build_cli().get_matches();

    let default_filter = if matches.get_flag("verbose") { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let config_path = commands::config_path(matches.get_one::<String>("config"));

    match matches.subcommand() {
        Some(("sync", sub_matches)) => commands::sync(&config_path, sub_matches),
        Some(("check", _)) => commands::check(&config_path).map(|_| 0),
        Some(("init", _)) => commands::init(&config_path).map(|_| 0),
        _ => {
            build_cli().print_help()?;
            Ok(0)
        }
    }
}

fn main() {
    let code = match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", style("error:").red().bold(), e);
            1
        }
    };
    std::process::exit(code);
}
