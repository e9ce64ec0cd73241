//! Outcome of the store's atomic download increment.

use serde::{Deserialize, Serialize};

/// Result of `increment_download_count` on an existing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CounterUpdate {
    /// The counter was incremented; holds the new value.
    Incremented {
        /// Counter value after the increment.
        download_count: u32,
    },
    /// The limit was already reached; the counter was left unchanged.
    LimitReached,
}

impl CounterUpdate {
    /// Whether the caller may serve the download.
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Incremented { .. })
    }
}
