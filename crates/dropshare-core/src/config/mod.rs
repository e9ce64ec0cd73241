//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field carries a serde default so that an empty
//! configuration file still yields a runnable server.

pub mod app;
pub mod auth;
pub mod database;
pub mod logging;
pub mod notification;
pub mod share;
pub mod storage;
pub mod worker;

use serde::{Deserialize, Serialize};

use self::app::ServerConfig;
use self::auth::AuthConfig;
use self::database::DatabaseConfig;
use self::logging::LoggingConfig;
use self::notification::NotificationConfig;
use self::share::ShareConfig;
use self::storage::StorageConfig;
use self::worker::WorkerConfig;

use crate::error::AppError;

/// Prefix of environment variables that override configuration values.
pub const ENV_PREFIX: &str = "DROPSHARE";

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Metadata store settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Payload storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Share policy defaults and bounds.
    #[serde(default)]
    pub share: ShareConfig,
    /// Password and access token settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Background reaper settings.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Upload notification settings.
    #[serde(default)]
    pub notification: NotificationConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `DROPSHARE__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config", env)
    }

    /// Load configuration from an explicit directory.
    pub fn load_from(dir: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(&format!("{dir}/default")).required(false))
            .add_source(config::File::with_name(&format!("{dir}/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Load configuration from a single TOML file, without overlays.
    pub fn load_file(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(true))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject configurations the server cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        let share = &self.share;
        if !share.default_ttl_hours.is_finite() || share.default_ttl_hours <= 0.0 {
            return Err(AppError::configuration(
                "share.default_ttl_hours must be a positive number",
            ));
        }
        if !share.max_ttl_hours.is_finite() || share.max_ttl_hours < share.default_ttl_hours {
            return Err(AppError::configuration(
                "share.max_ttl_hours must be at least share.default_ttl_hours",
            ));
        }
        if self.storage.max_files_per_share == 0 {
            return Err(AppError::configuration(
                "storage.max_files_per_share must be greater than zero",
            ));
        }
        if self.storage.max_file_size_bytes == 0 {
            return Err(AppError::configuration(
                "storage.max_file_size_bytes must be greater than zero",
            ));
        }
        if self.worker.orphan_grace_minutes > worker::MAX_ORPHAN_GRACE_MINUTES {
            return Err(AppError::configuration(format!(
                "worker.orphan_grace_minutes must be at most {}",
                worker::MAX_ORPHAN_GRACE_MINUTES
            )));
        }
        if self.database.backend == database::StoreBackend::Postgres
            && self.database.url.trim().is_empty()
        {
            return Err(AppError::configuration(
                "database.url is required for the postgres backend",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.share.default_ttl_hours, 24.0);
        assert_eq!(config.database.backend, database::StoreBackend::Json);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str("", config::FileFormat::Toml))
            .build()
            .and_then(|c| c.try_deserialize())
            .expect("empty config deserializes");
        assert_eq!(config.storage.data_root, "./data");
        assert_eq!(config.worker.reaper_schedule, "0 0 * * * *");
    }

    #[test]
    fn test_overrides_are_applied() {
        let toml = r#"
            [server]
            port = 8088

            [share]
            default_ttl_hours = 2.5
            max_ttl_hours = 48

            [database]
            backend = "postgres"
            url = "postgres://localhost/dropshare"
        "#;
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .and_then(|c| c.try_deserialize())
            .expect("config deserializes");
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.share.default_ttl_hours, 2.5);
        assert_eq!(config.database.backend, database::StoreBackend::Postgres);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_postgres_without_url_is_rejected() {
        let mut config = AppConfig::default();
        config.database.backend = database::StoreBackend::Postgres;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_max_ttl_below_default_is_rejected() {
        let mut config = AppConfig::default();
        config.share.max_ttl_hours = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_orphan_grace_is_bounded() {
        let mut config = AppConfig::default();
        config.worker.orphan_grace_minutes = worker::MAX_ORPHAN_GRACE_MINUTES;
        assert!(config.validate().is_ok());

        config.worker.orphan_grace_minutes = u64::MAX;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("orphan_grace_minutes"));
    }
}
