//! Share access token configuration.

use serde::{Deserialize, Serialize};

/// Authentication configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for signing access tokens.
    ///
    /// When unset, a random secret is generated at startup, so tokens do not
    /// survive a restart.
    #[serde(default)]
    pub token_secret: Option<String>,
    /// Lifetime of an access token in minutes (capped by the share's expiry).
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_minutes: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: None,
            access_token_ttl_minutes: default_access_ttl(),
        }
    }
}

fn default_access_ttl() -> i64 {
    30
}
