//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dropshare_core::ShareId;
use dropshare_entity::{ShareSummary, ShareView};

/// Successful upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Always `true`.
    pub success: bool,
    /// New share id.
    pub share_id: ShareId,
    /// Human-readable lifetime, e.g. `"23h"`.
    pub expiry_time: String,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
    /// Download limit (`0` = unlimited).
    pub max_downloads: u32,
    /// Number of files in the share.
    pub file_count: usize,
    /// Whether a password is required.
    pub password_protected: bool,
    /// Where recipients inspect the share.
    pub download_url: String,
}

impl UploadResponse {
    /// Build the response for a created share.
    pub fn new(summary: &ShareSummary, public_base_url: Option<&str>) -> Self {
        let base = public_base_url.unwrap_or("").trim_end_matches('/');
        Self {
            success: true,
            share_id: summary.share_id.clone(),
            expiry_time: summary.expiry_description.clone(),
            expires_at: summary.expires_at,
            max_downloads: summary.max_downloads,
            file_count: summary.file_count(),
            password_protected: summary.password_protected,
            download_url: format!("{base}/api/shares/{}", summary.share_id),
        }
    }
}

/// Successful inspect.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareResponse {
    /// Always `true`.
    pub success: bool,
    /// The share.
    pub share: ShareView,
    /// Issued when a correct password was presented.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Expiry of `access_token`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_expires_at: Option<DateTime<Utc>>,
}

/// Successful password verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    /// Always `true`.
    pub success: bool,
    /// Token accepted by inspect and download.
    pub access_token: String,
    /// When the token stops being accepted.
    pub expires_at: DateTime<Utc>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Seconds since start.
    pub uptime_seconds: u64,
    /// Metadata store backend and state.
    pub store: ComponentHealth,
    /// Payload storage state.
    pub storage: ComponentHealth,
}

/// State of one dependency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Backend name.
    pub backend: String,
    /// Whether the last check succeeded.
    pub healthy: bool,
}
