//! Telegram Bot API notifier.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use dropshare_core::config::notification::TelegramConfig;
use dropshare_core::error::{AppError, ErrorKind};
use dropshare_core::AppResult;
use dropshare_entity::ShareSummary;

use super::ShareNotifier;
use super::message::compose_share_message;

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Sends share notifications to a Telegram chat.
#[derive(Clone)]
pub struct TelegramNotifier {
    client: reqwest::Client,
    endpoint: String,
    chat_id: String,
}

impl std::fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

impl TelegramNotifier {
    /// Build a notifier from Telegram settings.
    pub fn new(config: &TelegramConfig, timeout_seconds: u64) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds.max(1)))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::ExternalService, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/bot{}/sendMessage",
                config.api_base.trim_end_matches('/'),
                config.bot_token.trim()
            ),
            chat_id: config.chat_id.trim().to_string(),
        })
    }
}

#[async_trait]
impl ShareNotifier for TelegramNotifier {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn notify(&self, summary: &ShareSummary) -> AppResult<()> {
        let text = compose_share_message(summary);
        let response = self
            .client
            .post(&self.endpoint)
            .json(&SendMessage {
                chat_id: &self.chat_id,
                text: &text,
            })
            .send()
            .await
            // Strip the URL: it contains the bot token.
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    "Telegram request failed",
                    e.without_url(),
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::external_service(format!(
                "Telegram API error: {status}"
            )));
        }
        Ok(())
    }
}
