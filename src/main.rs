//! DropShare server: temporary file shares with expiry, download limits
//! and optional passwords.
//!
//! Main entry point that loads configuration, sets up logging and hands
//! over to the API crate.

use tracing_subscriber::{EnvFilter, fmt};

use dropshare_core::config::AppConfig;
use dropshare_core::error::AppError;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!("Starting DropShare v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = dropshare_api::run_server(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from `DROPSHARE_CONFIG`, or from `config/` with the
/// `DROPSHARE_ENV` overlay.
fn load_configuration() -> Result<AppConfig, AppError> {
    if let Ok(path) = std::env::var("DROPSHARE_CONFIG") {
        return AppConfig::load_file(&path);
    }
    let env = std::env::var("DROPSHARE_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}
