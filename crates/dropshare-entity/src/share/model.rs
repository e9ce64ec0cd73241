//! Share record model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dropshare_core::ShareId;

/// One uploaded file inside a share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    /// Name as supplied by the uploader, used for `Content-Disposition`.
    pub original_name: String,
    /// Name of the payload file inside the share directory.
    pub stored_name: String,
    /// Payload size in bytes.
    pub size_bytes: u64,
    /// MIME type reported at upload (or guessed from the extension).
    pub mime_type: String,
}

/// The persisted record of one upload batch.
///
/// Only `download_count` changes after creation, and only through the
/// store's atomic increment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRecord {
    /// External handle and storage key.
    pub share_id: ShareId,
    /// Files in upload order; the position is the download index.
    pub files: Vec<FileEntry>,
    /// When the share was created.
    pub created_at: DateTime<Utc>,
    /// When the share stops being accessible.
    pub expires_at: DateTime<Utc>,
    /// Download limit; `0` means unlimited.
    #[serde(default)]
    pub max_downloads: u32,
    /// Number of counted downloads so far.
    #[serde(default)]
    pub download_count: u32,
    /// Argon2 PHC string, absent when no password is required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
}

impl ShareRecord {
    /// Whether a password (or access token) is needed to read this share.
    pub fn requires_password(&self) -> bool {
        self.password_hash.is_some()
    }

    /// Whether the share has no download limit.
    pub fn is_unlimited(&self) -> bool {
        self.max_downloads == 0
    }

    /// Downloads left before the share is exhausted, or `None` when unlimited.
    pub fn remaining_downloads(&self) -> Option<u32> {
        if self.is_unlimited() {
            None
        } else {
            Some(self.max_downloads.saturating_sub(self.download_count))
        }
    }

    /// Sum of all file sizes.
    pub fn total_size_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size_bytes).sum()
    }

    /// Look up a file by its download index.
    pub fn file(&self, index: usize) -> Option<&FileEntry> {
        self.files.get(index)
    }
}
