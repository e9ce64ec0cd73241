//! Upload notifications.
//!
//! Delivery is best-effort: the lifecycle manager sends from a detached
//! task and only logs failures.

pub mod message;
pub mod telegram;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use dropshare_core::AppResult;
use dropshare_core::config::notification::NotificationConfig;
use dropshare_entity::ShareSummary;

pub use telegram::TelegramNotifier;

/// Receives a summary of every newly created share.
#[async_trait]
pub trait ShareNotifier: Send + Sync + 'static {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Whether calling [`ShareNotifier::notify`] does anything.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Deliver the notification.
    async fn notify(&self, summary: &ShareSummary) -> AppResult<()>;
}

/// Notifier used when notifications are off.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl ShareNotifier for NoopNotifier {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn is_enabled(&self) -> bool {
        false
    }

    async fn notify(&self, _summary: &ShareSummary) -> AppResult<()> {
        Ok(())
    }
}

/// Build the notifier selected by configuration.
///
/// Misconfiguration is logged once and falls back to [`NoopNotifier`].
pub fn notifier_from_config(config: &NotificationConfig) -> Arc<dyn ShareNotifier> {
    if !config.enabled {
        info!("Share notifications disabled");
        return Arc::new(NoopNotifier);
    }

    match config.provider.as_str() {
        "telegram" => {
            if !config.telegram.is_configured() {
                warn!("Telegram notifications enabled but bot_token or chat_id is missing");
                return Arc::new(NoopNotifier);
            }
            match TelegramNotifier::new(&config.telegram, config.timeout_seconds) {
                Ok(notifier) => {
                    info!("Telegram share notifications enabled");
                    Arc::new(notifier)
                }
                Err(e) => {
                    warn!(error = %e, "Failed to build Telegram client; notifications disabled");
                    Arc::new(NoopNotifier)
                }
            }
        }
        other => {
            warn!(provider = other, "Unknown notification provider; notifications disabled");
            Arc::new(NoopNotifier)
        }
    }
}
