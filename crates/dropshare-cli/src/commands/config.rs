//! Configuration inspection commands.

use clap::{Args, Subcommand};

use dropshare_core::config::AppConfig;
use dropshare_core::config::database::StoreBackend;
use dropshare_core::error::AppError;
use dropshare_database::connection::mask_password;

use crate::output::{self, OutputFormat};

/// Config command arguments
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommands,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration with secrets masked
    Show,
    /// Load and validate the configuration
    Validate,
}

/// Execute a config command
pub async fn execute(
    args: &ConfigArgs,
    config_path: Option<&str>,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommands::Show => show(config_path, format),
        ConfigCommands::Validate => validate(config_path),
    }
}

fn show(config_path: Option<&str>, format: OutputFormat) -> Result<(), AppError> {
    let config = masked(super::load_config(config_path)?);

    let fields = [
        ("Bind address", config.server.bind_address()),
        (
            "Public base URL",
            config.server.public_base_url.clone().unwrap_or_else(|| "(relative)".to_string()),
        ),
        ("Store backend", config.database.backend.to_string()),
        ("Database URL", or_unset(&config.database.url)),
        ("Uploads path", config.storage.uploads_path().display().to_string()),
        ("Records path", config.storage.shares_path().display().to_string()),
        ("Max file size", config.storage.max_file_size_bytes.to_string()),
        ("Max files", config.storage.max_files_per_share.to_string()),
        ("Default TTL (h)", config.share.default_ttl_hours.to_string()),
        ("Max TTL (h)", config.share.max_ttl_hours.to_string()),
        ("Default max DLs", config.share.default_max_downloads.to_string()),
        (
            "Token secret",
            config.auth.token_secret.clone().unwrap_or_else(|| "(random per start)".to_string()),
        ),
        ("Reaper", reaper_summary(&config)),
        ("Notifications", notification_summary(&config)),
        ("Log", format!("{} ({})", config.logging.level, config.logging.format)),
    ];
    output::print_item(&config, &fields, format)
}

fn validate(config_path: Option<&str>) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    if config.database.backend == StoreBackend::Json && !config.storage.shares_path().exists() {
        output::print_kv("Note", "record directory does not exist yet; it is created on start");
    }
    if config.notification.enabled && !config.notification.telegram.is_configured() {
        output::print_error("notification.enabled is set but the Telegram bot is not configured");
    }
    output::print_success("Configuration is valid");
    Ok(())
}

/// Replace every secret with a placeholder.
fn masked(mut config: AppConfig) -> AppConfig {
    config.database.url = mask_password(&config.database.url);
    if config.auth.token_secret.is_some() {
        config.auth.token_secret = Some("****".to_string());
    }
    if !config.notification.telegram.bot_token.is_empty() {
        config.notification.telegram.bot_token = "****".to_string();
    }
    config
}

fn or_unset(value: &str) -> String {
    if value.is_empty() {
        "(unset)".to_string()
    } else {
        value.to_string()
    }
}

fn reaper_summary(config: &AppConfig) -> String {
    if config.worker.enabled {
        format!(
            "{} (startup sweep: {}, orphan grace: {}m)",
            config.worker.reaper_schedule,
            config.worker.sweep_on_startup,
            config.worker.orphan_grace_minutes
        )
    } else {
        "disabled".to_string()
    }
}

fn notification_summary(config: &AppConfig) -> String {
    let notification = &config.notification;
    if !notification.enabled {
        "disabled".to_string()
    } else if notification.telegram.is_configured() {
        format!("{} (chat {})", notification.provider, notification.telegram.chat_id)
    } else {
        format!("{} (not configured)", notification.provider)
    }
}
