//! Read-only projections of a share.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dropshare_core::ShareId;

use super::model::ShareRecord;

/// One file as shown to a share recipient.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileView {
    /// Download index.
    pub index: usize,
    /// Original file name.
    pub name: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// MIME type.
    pub mime_type: String,
}

/// What a recipient sees after a successful Inspect.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareView {
    /// Share id.
    pub share_id: ShareId,
    /// Files in download-index order.
    pub files: Vec<FileView>,
    /// Sum of file sizes.
    pub total_size_bytes: u64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Expiry time.
    pub expires_at: DateTime<Utc>,
    /// Human-readable time left, e.g. `"5h"`.
    pub expires_in: String,
    /// Download limit (`0` = unlimited).
    pub max_downloads: u32,
    /// Counted downloads so far.
    pub download_count: u32,
    /// Downloads left, `None` when unlimited.
    pub remaining_downloads: Option<u32>,
    /// Whether the share is password protected.
    pub password_protected: bool,
}

impl ShareView {
    /// Project a record, with `expires_in` already formatted by the caller.
    pub fn from_record(record: &ShareRecord, expires_in: String) -> Self {
        Self {
            share_id: record.share_id.clone(),
            files: record
                .files
                .iter()
                .enumerate()
                .map(|(index, f)| FileView {
                    index,
                    name: f.original_name.clone(),
                    size_bytes: f.size_bytes,
                    mime_type: f.mime_type.clone(),
                })
                .collect(),
            total_size_bytes: record.total_size_bytes(),
            created_at: record.created_at,
            expires_at: record.expires_at,
            expires_in,
            max_downloads: record.max_downloads,
            download_count: record.download_count,
            remaining_downloads: record.remaining_downloads(),
            password_protected: record.requires_password(),
        }
    }
}

/// What the uploader gets back from Create, and what notifications describe.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareSummary {
    /// Share id.
    pub share_id: ShareId,
    /// `(name, size)` of each file, in order.
    pub files: Vec<(String, u64)>,
    /// Sum of file sizes.
    pub total_size_bytes: u64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Expiry time.
    pub expires_at: DateTime<Utc>,
    /// Human-readable lifetime, e.g. `"2 days"`.
    pub expiry_description: String,
    /// Download limit (`0` = unlimited).
    pub max_downloads: u32,
    /// Whether the share is password protected.
    pub password_protected: bool,
}

impl ShareSummary {
    /// Build a summary, with `expiry_description` formatted by the caller.
    pub fn from_record(record: &ShareRecord, expiry_description: String) -> Self {
        Self {
            share_id: record.share_id.clone(),
            files: record
                .files
                .iter()
                .map(|f| (f.original_name.clone(), f.size_bytes))
                .collect(),
            total_size_bytes: record.total_size_bytes(),
            created_at: record.created_at,
            expires_at: record.expires_at,
            expiry_description,
            max_downloads: record.max_downloads,
            password_protected: record.requires_password(),
        }
    }

    /// Number of files in the share.
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}
