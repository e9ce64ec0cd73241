//! CLI command definitions and dispatch.

pub mod config;
pub mod share;
pub mod sweep;

use clap::{Parser, Subcommand};

use dropshare_api::{AppComponents, build_components};
use dropshare_core::config::AppConfig;
use dropshare_core::error::AppError;

use crate::output::OutputFormat;

/// DropShare administration
#[derive(Debug, Parser)]
#[command(name = "dropshare", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file. Without it, `config/default.toml` plus the
    /// `DROPSHARE_ENV` overlay is used.
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List all shares with their policy state
    List,
    /// Show one share (password protection is bypassed)
    Inspect {
        /// Share id
        id: String,
    },
    /// Delete a share now
    Reap {
        /// Share id
        id: String,
        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },
    /// Run one reaper sweep
    Sweep,
    /// Configuration inspection
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config_path = self.config.as_deref();
        match &self.command {
            Commands::List => share::list(config_path, self.format).await,
            Commands::Inspect { id } => share::inspect(config_path, id, self.format).await,
            Commands::Reap { id, force } => share::reap(config_path, id, *force).await,
            Commands::Sweep => sweep::execute(config_path, self.format).await,
            Commands::Config(args) => config::execute(args, config_path, self.format).await,
        }
    }
}

/// Helper: load configuration from an explicit file or the default layout
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig, AppError> {
    match config_path {
        Some(path) => AppConfig::load_file(path),
        None => {
            let env =
                std::env::var("DROPSHARE_ENV").unwrap_or_else(|_| "development".to_string());
            AppConfig::load(&env)
        }
    }
}

/// Helper: build the same components the server runs with
pub async fn connect(config_path: Option<&str>) -> Result<AppComponents, AppError> {
    let config = load_config(config_path)?;
    build_components(config).await
}
