//! JSON-file share store.
//!
//! One `{shareId}.json` document per share, camelCase fields. Writes go to a
//! sibling temp file which is then renamed over the target, so readers never
//! see a half-written record. Mutations of one key are serialized through a
//! per-key async mutex, which makes the counter increment linearizable inside
//! this process. Running several processes against the same directory is not
//! supported.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use dropshare_core::{AppError, AppResult, ShareId};
use dropshare_entity::{CounterUpdate, ShareRecord};

use crate::store::ShareStore;

const RECORD_EXTENSION: &str = "json";

/// Share store backed by one JSON file per record.
#[derive(Debug)]
pub struct JsonShareStore {
    root: PathBuf,
    locks: DashMap<ShareId, Arc<Mutex<()>>>,
}

impl JsonShareStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> AppResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                dropshare_core::error::ErrorKind::Database,
                format!("Failed to create share record directory {}", root.display()),
                e,
            )
        })?;
        Ok(Self {
            root,
            locks: DashMap::new(),
        })
    }

    /// Directory holding the record files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, id: &ShareId) -> PathBuf {
        self.root.join(format!("{id}.{RECORD_EXTENSION}"))
    }

    fn lock_for(&self, id: &ShareId) -> Arc<Mutex<()>> {
        self.locks
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop the registry entry once nobody else holds the mutex.
    fn release_lock(&self, id: &ShareId) {
        self.locks
            .remove_if(id, |_, lock| Arc::strong_count(lock) == 1);
    }

    async fn write_record(&self, record: &ShareRecord) -> AppResult<()> {
        let target = self.record_path(&record.share_id);
        let tmp = target.with_extension(format!("{RECORD_EXTENSION}.tmp"));
        let body = serde_json::to_vec_pretty(record)?;

        let mut file = fs::File::create(&tmp).await?;
        file.write_all(&body).await?;
        file.sync_all().await?;
        drop(file);

        if let Err(e) = fs::rename(&tmp, &target).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}

/// Read and parse one record file; `Ok(None)` when the file is gone.
async fn read_record(path: &Path) -> AppResult<Option<ShareRecord>> {
    match fs::read(path).await {
        Ok(bytes) => {
            let record = serde_json::from_slice(&bytes).map_err(|e| {
                AppError::with_source(
                    dropshare_core::error::ErrorKind::Serialization,
                    format!("Corrupt share record {}", path.display()),
                    e,
                )
            })?;
            Ok(Some(record))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Whether a directory entry looks like `{shareId}.json`.
fn is_record_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(RECORD_EXTENSION)
        && path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|stem| ShareId::parse(stem).is_ok())
}

enum ListState {
    Start(PathBuf),
    Reading(fs::ReadDir),
    Done,
}

#[async_trait]
impl ShareStore for JsonShareStore {
    fn backend(&self) -> &'static str {
        "json"
    }

    async fn create(&self, record: &ShareRecord) -> AppResult<()> {
        let lock = self.lock_for(&record.share_id);
        let _guard = lock.lock().await;

        if fs::try_exists(self.record_path(&record.share_id)).await? {
            return Err(AppError::conflict(format!(
                "Share {} already exists",
                record.share_id
            )));
        }
        self.write_record(record).await?;
        debug!(share_id = %record.share_id, "Share record written");
        Ok(())
    }

    async fn load(&self, id: &ShareId) -> AppResult<ShareRecord> {
        read_record(&self.record_path(id))
            .await?
            .ok_or_else(|| AppError::not_found("Share not found"))
    }

    async fn increment_download_count(&self, id: &ShareId) -> AppResult<CounterUpdate> {
        let lock = self.lock_for(id);
        let guard = lock.lock().await;

        let mut record = match read_record(&self.record_path(id)).await? {
            Some(record) => record,
            None => {
                drop(guard);
                drop(lock);
                self.release_lock(id);
                return Err(AppError::not_found("Share not found"));
            }
        };

        if record.max_downloads > 0 && record.download_count >= record.max_downloads {
            return Ok(CounterUpdate::LimitReached);
        }

        record.download_count += 1;
        self.write_record(&record).await?;
        Ok(CounterUpdate::Incremented {
            download_count: record.download_count,
        })
    }

    async fn delete(&self, id: &ShareId) -> AppResult<bool> {
        let lock = self.lock_for(id);
        let guard = lock.lock().await;

        let existed = match fs::remove_file(self.record_path(id)).await {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => return Err(e.into()),
        };

        drop(guard);
        drop(lock);
        self.release_lock(id);
        Ok(existed)
    }

    fn list_all(&self) -> BoxStream<'_, AppResult<ShareRecord>> {
        stream::unfold(ListState::Start(self.root.clone()), |state| async move {
            let mut dir = match state {
                ListState::Start(root) => match fs::read_dir(&root).await {
                    Ok(dir) => dir,
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
                    Err(e) => return Some((Err(AppError::from(e)), ListState::Done)),
                },
                ListState::Reading(dir) => dir,
                ListState::Done => return None,
            };

            loop {
                let entry = match dir.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => return None,
                    Err(e) => return Some((Err(AppError::from(e)), ListState::Done)),
                };
                let path = entry.path();
                if !is_record_file(&path) {
                    continue;
                }
                match read_record(&path).await {
                    Ok(Some(record)) => return Some((Ok(record), ListState::Reading(dir))),
                    // Deleted between listing and reading.
                    Ok(None) => continue,
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Unreadable share record");
                        return Some((Err(e), ListState::Reading(dir)));
                    }
                }
            }
        })
        .boxed()
    }

    async fn health_check(&self) -> AppResult<bool> {
        match fs::metadata(&self.root).await {
            Ok(meta) => Ok(meta.is_dir()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
