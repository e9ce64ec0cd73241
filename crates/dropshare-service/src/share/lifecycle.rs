//! The share lifecycle manager.
//!
//! Every access re-evaluates the share's policy from the stored record and
//! the current time. A share found expired or exhausted is reaped on the
//! spot (or as soon as in-flight downloads drain) and reported as `Gone`.
//! Download limits are enforced by the store's atomic increment, never by a
//! read followed by a write.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{Duration, Utc};
use futures::stream;
use tokio::sync::OwnedRwLockReadGuard;
use tracing::{debug, info, warn};

use dropshare_auth::{AccessToken, PasswordHasher, ShareTokenIssuer};
use dropshare_core::config::AppConfig;
use dropshare_core::error::ErrorKind;
use dropshare_core::traits::storage::{ByteStream, StorageProvider};
use dropshare_core::{AppError, AppResult, ShareId};
use dropshare_database::ShareStore;
use dropshare_entity::{CounterUpdate, PolicyState, ShareRecord, ShareSummary, ShareView};
use dropshare_storage::{share_dir, stored_file_path};

use super::credentials::Credentials;
use super::format::describe_expiry;
use super::locks::ShareLocks;
use super::stream::GuardedStream;
use super::upload::{CreateShareOptions, IncomingFile, UploadDraft, UploadLimits};
use crate::notification::ShareNotifier;

/// Attempts at finding an unused share id before giving up.
const MAX_ID_ATTEMPTS: usize = 5;

/// Policy values the manager enforces.
#[derive(Debug, Clone)]
pub struct LifecycleSettings {
    /// Lifetime used when the uploader gives none, in hours.
    pub default_ttl_hours: f64,
    /// Longest accepted lifetime, in hours.
    pub max_ttl_hours: f64,
    /// Download limit used when the uploader gives none.
    pub default_max_downloads: u32,
    /// Maximum bytes per file.
    pub max_file_size_bytes: u64,
    /// Maximum files per share.
    pub max_files_per_share: usize,
}

impl LifecycleSettings {
    /// Take the relevant values from the application configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            default_ttl_hours: config.share.default_ttl_hours,
            max_ttl_hours: config.share.max_ttl_hours,
            default_max_downloads: config.share.default_max_downloads,
            max_file_size_bytes: config.storage.max_file_size_bytes,
            max_files_per_share: config.storage.max_files_per_share,
        }
    }

    fn upload_limits(&self) -> UploadLimits {
        UploadLimits {
            max_file_size_bytes: self.max_file_size_bytes,
            max_files_per_share: self.max_files_per_share,
        }
    }
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// A successful Inspect.
#[derive(Debug, Clone)]
pub struct ShareAccess {
    /// Read-only projection of the share.
    pub view: ShareView,
    /// Token issued because a correct password was presented.
    pub access_token: Option<AccessToken>,
}

/// A counted download ready to be streamed.
pub struct FileDownload {
    /// Share the file belongs to.
    pub share_id: ShareId,
    /// Download index of the file.
    pub file_index: usize,
    /// Original file name.
    pub file_name: String,
    /// MIME type.
    pub mime_type: String,
    /// Payload size in bytes.
    pub size_bytes: u64,
    /// Counter value after this download.
    pub download_count: u32,
    /// Downloads left after this one, `None` when unlimited.
    pub remaining_downloads: Option<u32>,
    /// Payload bytes. Holds the share's read lock until finished or dropped.
    pub stream: ByteStream,
}

impl std::fmt::Debug for FileDownload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileDownload")
            .field("share_id", &self.share_id)
            .field("file_index", &self.file_index)
            .field("file_name", &self.file_name)
            .field("size_bytes", &self.size_bytes)
            .field("download_count", &self.download_count)
            .finish()
    }
}

/// What a reap request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReapOutcome {
    /// Record and payload were deleted.
    Reaped,
    /// There was no record; leftover payload (if any) was deleted.
    AlreadyGone,
    /// Downloads are in flight; deletion runs once they finish.
    Deferred,
}

/// Creates shares, checks access, counts downloads, and reaps.
#[derive(Clone)]
pub struct ShareLifecycleManager {
    store: Arc<dyn ShareStore>,
    storage: Arc<dyn StorageProvider>,
    hasher: Arc<PasswordHasher>,
    tokens: Arc<ShareTokenIssuer>,
    notifier: Arc<dyn ShareNotifier>,
    locks: Arc<ShareLocks>,
    settings: Arc<LifecycleSettings>,
}

impl std::fmt::Debug for ShareLifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareLifecycleManager")
            .field("store", &self.store.backend())
            .field("storage", &self.storage.provider_type())
            .field("settings", &self.settings)
            .finish()
    }
}

impl ShareLifecycleManager {
    /// Creates a new lifecycle manager.
    ///
    /// `storage` must be rooted at the uploads directory.
    pub fn new(
        store: Arc<dyn ShareStore>,
        storage: Arc<dyn StorageProvider>,
        tokens: Arc<ShareTokenIssuer>,
        notifier: Arc<dyn ShareNotifier>,
        settings: LifecycleSettings,
    ) -> Self {
        Self {
            store,
            storage,
            hasher: Arc::new(PasswordHasher::new()),
            tokens,
            notifier,
            locks: Arc::new(ShareLocks::new()),
            settings: Arc::new(settings),
        }
    }

    /// The metadata store.
    pub fn store(&self) -> &Arc<dyn ShareStore> {
        &self.store
    }

    /// The payload storage provider.
    pub fn storage(&self) -> &Arc<dyn StorageProvider> {
        &self.storage
    }

    /// The enforced policy values.
    pub fn settings(&self) -> &LifecycleSettings {
        &self.settings
    }

    // ── Create ──────────────────────────────────────────────────────

    /// Reserve a share id and an empty payload directory.
    pub async fn begin_upload(&self) -> AppResult<UploadDraft> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = ShareId::generate();
            let Some(guard) = self.locks.try_write(&id) else {
                continue;
            };
            let dir = share_dir(&id);
            let reserved = match self.storage.exists(&dir).await {
                Ok(false) => self.storage.create_dir(&dir).await.map(|()| true),
                other => other.map(|exists| !exists),
            };
            if !matches!(reserved, Ok(true)) {
                drop(guard);
                self.locks.forget(&id);
                reserved?;
                continue;
            }
            debug!(share_id = %id, "Upload draft started");
            return Ok(UploadDraft::new(
                id,
                self.settings.upload_limits(),
                Arc::clone(&self.storage),
                Arc::clone(&self.locks),
                guard,
            ));
        }
        Err(AppError::internal("Could not reserve an unused share id"))
    }

    /// Abandon a draft and remove everything written for it.
    pub async fn discard(&self, mut draft: UploadDraft) {
        draft.remove_payload().await;
        debug!(share_id = %draft.share_id, "Upload draft discarded");
    }

    /// Turn a draft into a share.
    ///
    /// Nothing is kept on failure: the payload directory is removed before
    /// the error is returned.
    pub async fn create(
        &self,
        mut draft: UploadDraft,
        options: CreateShareOptions,
    ) -> AppResult<ShareSummary> {
        match self.persist(&mut draft, options).await {
            Ok(record) => {
                draft.settled = true;
                let expiry = describe_expiry(record.expires_at, Utc::now());
                let summary = ShareSummary::from_record(&record, expiry);
                info!(
                    share_id = %record.share_id,
                    files = record.files.len(),
                    total_bytes = summary.total_size_bytes,
                    max_downloads = record.max_downloads,
                    password_protected = record.requires_password(),
                    expires_at = %record.expires_at,
                    "Share created"
                );
                self.dispatch_notification(summary.clone());
                Ok(summary)
            }
            Err(e) => {
                warn!(
                    share_id = %draft.share_id,
                    error = %e,
                    "Share creation failed; rolling back"
                );
                draft.remove_payload().await;
                Err(e)
            }
        }
    }

    /// Create a share from files already in memory.
    pub async fn create_share(
        &self,
        files: Vec<IncomingFile>,
        options: CreateShareOptions,
    ) -> AppResult<ShareSummary> {
        if files.is_empty() {
            return Err(AppError::validation("No files were uploaded"));
        }
        let mut draft = self.begin_upload().await?;
        for file in files {
            let chunk = stream::iter([Ok::<Bytes, std::convert::Infallible>(file.data)]);
            if let Err(e) = draft
                .add_file(&file.name, file.mime_type.as_deref(), chunk)
                .await
            {
                self.discard(draft).await;
                return Err(e);
            }
        }
        self.create(draft, options).await
    }

    async fn persist(
        &self,
        draft: &mut UploadDraft,
        options: CreateShareOptions,
    ) -> AppResult<ShareRecord> {
        if draft.files.is_empty() {
            return Err(AppError::validation("No files were uploaded"));
        }

        let ttl_hours = options.ttl_hours.unwrap_or(self.settings.default_ttl_hours);
        let ttl = self.validate_ttl(ttl_hours)?;
        let max_downloads = options
            .max_downloads
            .unwrap_or(self.settings.default_max_downloads);

        let password_hash = match options.password.filter(|p| !p.trim().is_empty()) {
            Some(password) => Some(self.hash_password(password).await?),
            None => None,
        };

        let created_at = Utc::now();
        let mut record = ShareRecord {
            share_id: draft.share_id.clone(),
            files: draft.files.clone(),
            created_at,
            expires_at: created_at + ttl,
            max_downloads,
            download_count: 0,
            password_hash,
        };

        let mut attempts = 0;
        loop {
            match self.store.create(&record).await {
                Ok(()) => return Ok(record),
                Err(e) if e.kind == ErrorKind::Conflict && attempts + 1 < MAX_ID_ATTEMPTS => {
                    attempts += 1;
                    let fresh = ShareId::generate();
                    let Some(fresh_guard) = self.locks.try_write(&fresh) else {
                        continue;
                    };
                    warn!(
                        share_id = %record.share_id,
                        replacement = %fresh,
                        "Share id already taken; moving upload to a fresh id"
                    );
                    self.storage
                        .rename(&share_dir(&draft.share_id), &share_dir(&fresh))
                        .await?;
                    let previous = std::mem::replace(&mut draft.share_id, fresh.clone());
                    drop(draft.guard.replace(fresh_guard));
                    self.locks.forget(&previous);
                    record.share_id = fresh;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn validate_ttl(&self, ttl_hours: f64) -> AppResult<Duration> {
        if !ttl_hours.is_finite() || ttl_hours <= 0.0 {
            return Err(AppError::validation(
                "Expiry must be a positive number of hours",
            ));
        }
        if ttl_hours > self.settings.max_ttl_hours {
            return Err(AppError::validation(format!(
                "Expiry cannot exceed {} hours",
                self.settings.max_ttl_hours
            )));
        }
        let millis = (ttl_hours * 3_600_000.0).round().max(1.0) as i64;
        Ok(Duration::milliseconds(millis))
    }

    async fn hash_password(&self, password: String) -> AppResult<String> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
    }

    fn dispatch_notification(&self, summary: ShareSummary) {
        if !self.notifier.is_enabled() {
            return;
        }
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            match notifier.notify(&summary).await {
                Ok(()) => debug!(
                    share_id = %summary.share_id,
                    notifier = notifier.name(),
                    "Share notification sent"
                ),
                Err(e) => warn!(
                    share_id = %summary.share_id,
                    notifier = notifier.name(),
                    error = %e,
                    "Share notification failed"
                ),
            }
        });
    }

    // ── Access ──────────────────────────────────────────────────────

    /// Load a share and check that it may be served.
    ///
    /// Non-active shares are reaped (or queued for reaping) and reported as
    /// `Gone`. The read guard is handed back to the caller on success.
    async fn load_active(
        &self,
        id: &ShareId,
    ) -> AppResult<(ShareRecord, OwnedRwLockReadGuard<()>)> {
        let guard = self.locks.read(id).await;

        let record = match self.store.load(id).await {
            Ok(record) => record,
            Err(e) => {
                drop(guard);
                if e.is_not_found() {
                    self.locks.forget(id);
                }
                return Err(e);
            }
        };

        let state = PolicyState::evaluate(&record, Utc::now());
        if !state.is_active() {
            drop(guard);
            debug!(share_id = %id, state = %state, "Inaccessible share; reaping on access");
            if let Err(e) = self.reap_or_defer(id).await {
                warn!(share_id = %id, error = %e, "Reap on access failed");
            }
            return Err(AppError::gone(state.reason()));
        }

        Ok((record, guard))
    }

    /// Check the presented credentials against a password-protected share.
    ///
    /// Returns a fresh access token when a correct password was presented.
    async fn authorize(
        &self,
        record: &ShareRecord,
        credentials: &Credentials,
    ) -> AppResult<Option<AccessToken>> {
        let Some(hash) = record.password_hash.clone() else {
            return Ok(None);
        };

        if let Some(token) = credentials.token.as_deref() {
            match self.tokens.verify(token, &record.share_id) {
                Ok(_) => return Ok(None),
                Err(e) if credentials.password.is_none() => return Err(e),
                Err(_) => {}
            }
        }

        let presented = credentials.password.clone();
        let hasher = Arc::clone(&self.hasher);
        let valid = tokio::task::spawn_blocking(move || {
            hasher.verify_password(presented.as_deref(), &hash)
        })
        .await
        .map_err(|e| AppError::internal(format!("Password check task failed: {e}")))?;

        if !valid {
            return Err(if credentials.is_empty() {
                AppError::unauthorized("Password required")
            } else {
                AppError::unauthorized("Invalid password")
            });
        }

        self.tokens
            .issue(&record.share_id, record.expires_at)
            .map(Some)
    }

    /// Inspect a share: policy check, password check, read-only view.
    pub async fn inspect(&self, id: &ShareId, credentials: &Credentials) -> AppResult<ShareAccess> {
        let (record, _guard) = self.load_active(id).await?;
        let access_token = self.authorize(&record, credentials).await?;

        let expires_in = describe_expiry(record.expires_at, Utc::now());
        let view = ShareView::from_record(&record, expires_in);
        Ok(ShareAccess { view, access_token })
    }

    /// Exchange a share password for an access token.
    pub async fn unlock(&self, id: &ShareId, password: &str) -> AppResult<AccessToken> {
        let (record, _guard) = self.load_active(id).await?;
        let credentials = Credentials::with_password(password);
        match self.authorize(&record, &credentials).await? {
            Some(token) => Ok(token),
            None => self.tokens.issue(&record.share_id, record.expires_at),
        }
    }

    /// Perform a counted download of one file.
    ///
    /// The counter is incremented before any byte is sent, so an aborted
    /// transfer still counts.
    pub async fn download_file(
        &self,
        id: &ShareId,
        file_index: usize,
        credentials: &Credentials,
    ) -> AppResult<FileDownload> {
        let (record, guard) = self.load_active(id).await?;
        self.authorize(&record, credentials).await?;

        let file = record
            .file(file_index)
            .ok_or_else(|| AppError::out_of_range(format!("No file at index {file_index}")))?;

        let payload = self
            .storage
            .read(&stored_file_path(id, &file.stored_name))
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    AppError::storage(format!(
                        "Payload of share {id} file {file_index} is missing"
                    ))
                } else {
                    e
                }
            })?;

        let download_count = match self.store.increment_download_count(id).await? {
            CounterUpdate::Incremented { download_count } => download_count,
            CounterUpdate::LimitReached => {
                drop(payload);
                drop(guard);
                debug!(share_id = %id, "Download limit reached by a concurrent request");
                if let Err(e) = self.reap_or_defer(id).await {
                    warn!(share_id = %id, error = %e, "Reap after exhaustion failed");
                }
                return Err(AppError::gone(PolicyState::Exhausted.reason()));
            }
        };

        let remaining_downloads = if record.is_unlimited() {
            None
        } else {
            Some(record.max_downloads.saturating_sub(download_count))
        };

        info!(
            share_id = %id,
            file_index,
            download_count,
            max_downloads = record.max_downloads,
            "Download started"
        );

        Ok(FileDownload {
            share_id: id.clone(),
            file_index,
            file_name: file.original_name.clone(),
            mime_type: file.mime_type.clone(),
            size_bytes: file.size_bytes,
            download_count,
            remaining_downloads,
            stream: Box::pin(GuardedStream::new(payload, guard)),
        })
    }

    // ── Reap ────────────────────────────────────────────────────────

    /// Delete a share's payload and record, waiting for in-flight downloads.
    ///
    /// Reaping a missing share is not an error.
    pub async fn reap(&self, id: &ShareId) -> AppResult<ReapOutcome> {
        let guard = self.locks.write(id).await;
        let result = self.reap_locked(id).await;
        drop(guard);
        self.locks.forget(id);
        result
    }

    /// Reap now if nobody is reading the share, otherwise queue the reap
    /// behind the running downloads.
    pub async fn reap_or_defer(&self, id: &ShareId) -> AppResult<ReapOutcome> {
        match self.locks.try_write(id) {
            Some(guard) => {
                let result = self.reap_locked(id).await;
                drop(guard);
                self.locks.forget(id);
                result
            }
            None => {
                let manager = self.clone();
                let id = id.clone();
                debug!(share_id = %id, "Share busy; reap deferred until downloads finish");
                tokio::spawn(async move {
                    if let Err(e) = manager.reap(&id).await {
                        warn!(share_id = %id, error = %e, "Deferred reap failed");
                    }
                });
                Ok(ReapOutcome::Deferred)
            }
        }
    }

    /// Delete the payload directory of an id that has no record.
    ///
    /// Returns `false` without touching anything when the id is locked (an
    /// upload or download is running) or when a record exists.
    pub async fn remove_orphan(&self, id: &ShareId) -> AppResult<bool> {
        let Some(guard) = self.locks.try_write(id) else {
            debug!(share_id = %id, "Payload directory in use; not an orphan");
            return Ok(false);
        };
        let result = match self.store.load(id).await {
            Ok(_) => Ok(false),
            Err(e) if e.is_not_found() => self.storage.delete_dir(&share_dir(id)).await.map(|()| true),
            Err(e) => Err(e),
        };
        drop(guard);
        self.locks.forget(id);
        result
    }

    async fn reap_locked(&self, id: &ShareId) -> AppResult<ReapOutcome> {
        self.storage.delete_dir(&share_dir(id)).await?;
        let existed = self.store.delete(id).await?;
        if existed {
            info!(share_id = %id, "Share reaped");
            Ok(ReapOutcome::Reaped)
        } else {
            Ok(ReapOutcome::AlreadyGone)
        }
    }
}
