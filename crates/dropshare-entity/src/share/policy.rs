//! Share policy evaluation.
//!
//! Accessibility is always re-derived from the record and the current time.
//! Nothing here caches a verdict or touches storage; callers decide whether
//! to reap.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::model::ShareRecord;

/// Current accessibility of a share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyState {
    /// The share can be inspected and downloaded.
    Active,
    /// The share's lifetime has passed.
    Expired,
    /// The share's download limit has been reached.
    Exhausted,
}

impl PolicyState {
    /// Evaluate a record at `now`.
    ///
    /// Expiry wins over exhaustion when both hold.
    pub fn evaluate(record: &ShareRecord, now: DateTime<Utc>) -> Self {
        if now > record.expires_at {
            Self::Expired
        } else if record.max_downloads > 0 && record.download_count >= record.max_downloads {
            Self::Exhausted
        } else {
            Self::Active
        }
    }

    /// Whether the share may still be served.
    pub fn is_active(self) -> bool {
        self == Self::Active
    }

    /// Client-facing reason used in `Gone` errors.
    pub fn reason(self) -> &'static str {
        match self {
            Self::Active => "Share is active",
            Self::Expired => "Share has expired",
            Self::Exhausted => "Download limit reached",
        }
    }
}

impl std::fmt::Display for PolicyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Expired => write!(f, "expired"),
            Self::Exhausted => write!(f, "exhausted"),
        }
    }
}

impl ShareRecord {
    /// Shorthand for [`PolicyState::evaluate`].
    pub fn policy_state(&self, now: DateTime<Utc>) -> PolicyState {
        PolicyState::evaluate(self, now)
    }
}
