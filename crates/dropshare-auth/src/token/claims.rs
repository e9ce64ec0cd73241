//! Claims carried by a share access token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Scope value of tokens that grant read access to one share.
pub const SHARE_READ_SCOPE: &str = "share:read";

/// JWT claims payload of a share access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareAccessClaims {
    /// Subject: the share id the token unlocks.
    pub sub: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Unique token id.
    pub jti: Uuid,
    /// Granted scope.
    pub scope: String,
}

impl ShareAccessClaims {
    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }
}
