//! Payload storage configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Payload storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for all runtime data.
    #[serde(default = "default_data_root")]
    pub data_root: String,
    /// Directory (relative to `data_root`) holding one folder per share.
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: String,
    /// Directory (relative to `data_root`) holding JSON share records.
    #[serde(default = "default_shares_dir")]
    pub shares_dir: String,
    /// Maximum size of a single uploaded file (default 5 GiB).
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: u64,
    /// Maximum size of a whole upload request (default 6 GiB).
    #[serde(default = "default_max_request_size")]
    pub max_request_size_bytes: u64,
    /// Maximum number of files in one share.
    #[serde(default = "default_max_files")]
    pub max_files_per_share: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            uploads_dir: default_uploads_dir(),
            shares_dir: default_shares_dir(),
            max_file_size_bytes: default_max_file_size(),
            max_request_size_bytes: default_max_request_size(),
            max_files_per_share: default_max_files(),
        }
    }
}

impl StorageConfig {
    /// Absolute-or-relative path of the payload root.
    pub fn uploads_path(&self) -> PathBuf {
        PathBuf::from(&self.data_root).join(&self.uploads_dir)
    }

    /// Path of the JSON record directory.
    pub fn shares_path(&self) -> PathBuf {
        PathBuf::from(&self.data_root).join(&self.shares_dir)
    }
}

fn default_data_root() -> String {
    "./data".to_string()
}

fn default_uploads_dir() -> String {
    "uploads".to_string()
}

fn default_shares_dir() -> String {
    "shares".to_string()
}

fn default_max_file_size() -> u64 {
    5 * 1024 * 1024 * 1024
}

fn default_max_request_size() -> u64 {
    6 * 1024 * 1024 * 1024
}

fn default_max_files() -> usize {
    100
}
