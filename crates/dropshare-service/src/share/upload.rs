//! Upload drafts: payload files written before the share record exists.
//!
//! A draft owns a freshly reserved share id and its payload directory. Files
//! are streamed into it one by one; [`ShareLifecycleManager::create`] then
//! turns the draft into a share, or the draft is discarded and its directory
//! removed. A draft that is dropped without either still schedules removal
//! of its directory.
//!
//! The draft holds its share's write lock until it settles, so the orphan
//! sweep never mistakes a running upload for leftover payload.
//!
//! [`ShareLifecycleManager::create`]: super::lifecycle::ShareLifecycleManager::create

use std::sync::Arc;

use bytes::Bytes;
use futures::{Stream, StreamExt, pin_mut};
use tokio::sync::OwnedRwLockWriteGuard;
use tracing::{debug, warn};

use dropshare_core::traits::storage::StorageProvider;
use dropshare_core::{AppError, AppResult, ShareId};
use dropshare_entity::FileEntry;
use dropshare_storage::{mime_from_path, share_dir, stored_file_name, stored_file_path};

use super::locks::ShareLocks;

/// MIME type used when neither the client nor the extension tells.
const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Upper bounds applied while files are streamed in.
#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
    /// Maximum bytes in one file.
    pub max_file_size_bytes: u64,
    /// Maximum number of files in one share.
    pub max_files_per_share: usize,
}

/// A file held fully in memory, for callers that already have the bytes.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    /// Original file name.
    pub name: String,
    /// Declared MIME type, if any.
    pub mime_type: Option<String>,
    /// File contents.
    pub data: Bytes,
}

impl IncomingFile {
    /// Build an incoming file without a declared MIME type.
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type: None,
            data: data.into(),
        }
    }
}

/// Share options chosen by the uploader.
#[derive(Clone, Default)]
pub struct CreateShareOptions {
    /// Lifetime in hours; the configured default when `None`.
    pub ttl_hours: Option<f64>,
    /// Download limit (`0` = unlimited); the configured default when `None`.
    pub max_downloads: Option<u32>,
    /// Plaintext password. Blank passwords mean no protection.
    pub password: Option<String>,
}

impl std::fmt::Debug for CreateShareOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateShareOptions")
            .field("ttl_hours", &self.ttl_hours)
            .field("max_downloads", &self.max_downloads)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Payload files of a share that has not been created yet.
pub struct UploadDraft {
    pub(crate) share_id: ShareId,
    pub(crate) files: Vec<FileEntry>,
    limits: UploadLimits,
    storage: Arc<dyn StorageProvider>,
    locks: Arc<ShareLocks>,
    pub(crate) guard: Option<OwnedRwLockWriteGuard<()>>,
    pub(crate) settled: bool,
}

impl std::fmt::Debug for UploadDraft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadDraft")
            .field("share_id", &self.share_id)
            .field("files", &self.files.len())
            .finish()
    }
}

impl UploadDraft {
    pub(crate) fn new(
        share_id: ShareId,
        limits: UploadLimits,
        storage: Arc<dyn StorageProvider>,
        locks: Arc<ShareLocks>,
        guard: OwnedRwLockWriteGuard<()>,
    ) -> Self {
        Self {
            share_id,
            files: Vec::new(),
            limits,
            storage,
            locks,
            guard: Some(guard),
            settled: false,
        }
    }

    /// The share id reserved for this draft.
    pub fn share_id(&self) -> &ShareId {
        &self.share_id
    }

    /// Files written so far.
    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    /// Total bytes written so far.
    pub fn total_size_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size_bytes).sum()
    }

    /// Stream one file into the draft.
    ///
    /// Fails with `Validation` when the file count or the per-file size limit
    /// is exceeded, or when the source stream breaks off.
    pub async fn add_file<S, E>(
        &mut self,
        name: &str,
        mime_type: Option<&str>,
        stream: S,
    ) -> AppResult<&FileEntry>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: std::fmt::Display,
    {
        if self.files.len() >= self.limits.max_files_per_share {
            return Err(AppError::validation(format!(
                "Too many files: at most {} per share",
                self.limits.max_files_per_share
            )));
        }

        let index = self.files.len();
        let original_name = if name.trim().is_empty() {
            "file".to_string()
        } else {
            name.to_string()
        };
        let stored_name = stored_file_name(index, &original_name);
        let path = stored_file_path(&self.share_id, &stored_name);

        let mut writer = self.storage.create_writer(&path).await?;
        let mut written = 0u64;
        pin_mut!(stream);
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                AppError::validation(format!("Upload of {original_name:?} was interrupted: {e}"))
            })?;
            written += chunk.len() as u64;
            if written > self.limits.max_file_size_bytes {
                return Err(AppError::validation(format!(
                    "File {original_name:?} exceeds the maximum size of {} bytes",
                    self.limits.max_file_size_bytes
                )));
            }
            writer.write_chunk(&chunk).await?;
        }
        let size_bytes = writer.finish().await?;

        let mime_type = mime_type
            .map(str::trim)
            .filter(|m| !m.is_empty() && *m != DEFAULT_MIME_TYPE)
            .map(str::to_string)
            .or_else(|| mime_from_path(&original_name))
            .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());

        debug!(
            share_id = %self.share_id,
            index,
            size_bytes,
            "Upload file stored"
        );

        self.files.push(FileEntry {
            original_name,
            stored_name,
            size_bytes,
            mime_type,
        });
        Ok(&self.files[index])
    }

    /// Remove the draft's payload directory.
    pub(crate) async fn remove_payload(&mut self) {
        self.settled = true;
        if let Err(e) = self.storage.delete_dir(&share_dir(&self.share_id)).await {
            warn!(share_id = %self.share_id, error = %e, "Failed to remove upload draft payload");
        }
    }
}

impl Drop for UploadDraft {
    fn drop(&mut self) {
        let guard = self.guard.take();
        if self.settled {
            drop(guard);
            self.locks.forget(&self.share_id);
            return;
        }
        let storage = Arc::clone(&self.storage);
        let locks = Arc::clone(&self.locks);
        let share_id = self.share_id.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    let dir = share_dir(&share_id);
                    if let Err(e) = storage.delete_dir(&dir).await {
                        warn!(dir = %dir, error = %e, "Failed to remove abandoned upload draft");
                    }
                    drop(guard);
                    locks.forget(&share_id);
                });
            }
            Err(_) => {
                drop(guard);
                locks.forget(&share_id);
                warn!(
                    share_id = %share_id,
                    "Upload draft dropped outside a runtime; payload left for the reaper"
                );
            }
        }
    }
}
