pub mod commands;
pub mod logging;
pub mod sink;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::commands::run::RunArgs;

#[derive(Debug, Parser)]
#[command(
    name = "eshop-deals",
    about = "eShop price notifier",
    long_about = "Look up eShop titles and prices and post a price summary to a Slack webhook.",
    after_help = "Examples:\n  eshop-deals run --all\n  eshop-deals run --search mario --dry-run\n  eshop-deals run --list \"zelda,metroid dread\"\n  eshop-deals doctor --json"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to an eshop-deals.toml config file")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Resolve one price query and post the result to the webhook")]
    Run(RunArgs),
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, webhook readiness, and the watchlist")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let config_path = cli.config;

    let result = match cli.command {
        Command::Run(args) => commands::run::run(&args, config_path),
        Command::Config => commands::CommandResult {
            exit_code: commands::EXIT_OK,
            output: commands::config::run(config_path),
        },
        Command::Doctor { json } => commands::CommandResult {
            exit_code: commands::EXIT_OK,
            output: commands::doctor::run(json, config_path),
        },
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
