//! CLI entry and dispatch.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use qsoboard_core::config::Config;
use qsoboard_core::worker;

mod commands;

#[derive(Parser)]
#[command(name = "qsoboard")]
#[command(version)]
#[command(about = "Contest statistics dashboard for amateur-radio contacts")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to the config file
    #[arg(
        long,
        global = true,
        env = "QSOBOARD_CONFIG",
        default_value = Config::DEFAULT_PATH,
        value_name = "PATH"
    )]
    config: PathBuf,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Run the full-screen dashboard (default)
    Run,
    /// Print one aggregation pass as tables
    Report,
    /// Manage the contact database
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum DbCommands {
    /// Create the contact log schema if missing
    Init,
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let Cli {
        command,
        config: config_path,
    } = Cli::parse();

    match command.unwrap_or(Commands::Run) {
        // Config commands must work with a missing or broken file.
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path(&config_path);
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(&config_path),
        },
        Commands::Run => {
            let config = load_config(&config_path)?;
            // one tokio runtime for everything; the worker runs on its pool
            worker::block_on_detached(commands::run::run(&config))?
        }
        Commands::Report => commands::report::run(&load_config(&config_path)?),
        Commands::Db { command } => match command {
            DbCommands::Init => commands::db::init(&load_config(&config_path)?),
        },
    }
}

fn load_config(path: &Path) -> Result<Config> {
    let config = Config::load_from(path).context("load config")?;
    config
        .validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(config)
}
