//! CLI subcommand definitions and handlers.
//!
//! Uses clap derive to define the subcommand hierarchy:
//! - `run` (default) -- start the bot on the console transport
//! - `config show|path` -- inspect configuration
//! - `version` -- print build/version info

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Single-slot poll bot.
#[derive(Parser, Debug)]
#[command(
    name = "quorum",
    version = env!("CARGO_PKG_VERSION"),
    about = "quorum — one poll at a time, one vote per voter"
)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the bot (default when no subcommand is given).
    Run,

    /// Inspect configuration.
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Print version, build date, and git commit information.
    Version,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the loaded configuration (auth token redacted) as JSON.
    Show,

    /// Print the resolved configuration file path.
    Path,
}

// ---------------------------------------------------------------------------
// Subcommand handlers
// ---------------------------------------------------------------------------

use crate::config;

/// Run the `config show` subcommand.
pub fn handle_config_show(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::load_config(path)?;
    let pretty = serde_json::to_string_pretty(&cfg.redacted())?;
    println!("{pretty}");
    Ok(())
}

/// Run the `version` subcommand.
pub fn handle_version() {
    println!("quorum {}", env!("CARGO_PKG_VERSION"));
    println!("commit: {}", env!("QUORUM_GIT_HASH"));
    println!("built: {}", env!("QUORUM_BUILD_DATE"));
}
