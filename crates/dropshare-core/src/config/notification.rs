//! Upload notification configuration.

use serde::{Deserialize, Serialize};

/// Notification delivery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Whether a message is sent for each new share.
    #[serde(default)]
    pub enabled: bool,
    /// Delivery provider. Only `"telegram"` is supported.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Telegram bot settings.
    #[serde(default)]
    pub telegram: TelegramConfig,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_provider(),
            timeout_seconds: default_timeout(),
            telegram: TelegramConfig::default(),
        }
    }
}

/// Telegram Bot API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token issued by BotFather.
    #[serde(default)]
    pub bot_token: String,
    /// Target chat id.
    #[serde(default)]
    pub chat_id: String,
    /// Bot API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            chat_id: String::new(),
            api_base: default_api_base(),
        }
    }
}

impl TelegramConfig {
    /// Whether both the token and the chat id are present.
    pub fn is_configured(&self) -> bool {
        !self.bot_token.trim().is_empty() && !self.chat_id.trim().is_empty()
    }
}

fn default_provider() -> String {
    "telegram".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_api_base() -> String {
    "https://api.telegram.org".to_string()
}
