//! The share metadata store contract.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use tracing::info;

use dropshare_core::config::AppConfig;
use dropshare_core::config::database::StoreBackend;
use dropshare_core::{AppResult, ShareId};
use dropshare_entity::{CounterUpdate, ShareRecord};

use crate::connection::DatabasePool;
use crate::migration::run_migrations;
use crate::stores::json::JsonShareStore;
use crate::stores::postgres::PgShareStore;

/// Persistence for share records, one record per share id.
///
/// `increment_download_count` is linearizable per key: for a record with a
/// positive limit, at most `max_downloads` calls ever return
/// [`CounterUpdate::Incremented`], however the calls interleave.
#[async_trait]
pub trait ShareStore: Send + Sync + std::fmt::Debug + 'static {
    /// Backend name for logs and health output.
    fn backend(&self) -> &'static str;

    /// Persist a new record. Fails with `Conflict` if the id already exists.
    async fn create(&self, record: &ShareRecord) -> AppResult<()>;

    /// Load a record. Fails with `NotFound` if absent.
    async fn load(&self, id: &ShareId) -> AppResult<ShareRecord>;

    /// Atomically add one to the download counter unless the limit is reached.
    ///
    /// Fails with `NotFound` if the record does not exist.
    async fn increment_download_count(&self, id: &ShareId) -> AppResult<CounterUpdate>;

    /// Remove a record. Returns whether it existed; a missing record is not
    /// an error.
    async fn delete(&self, id: &ShareId) -> AppResult<bool>;

    /// Lazily produce every stored record.
    ///
    /// Items that cannot be read are yielded as errors so the caller can log
    /// and continue.
    fn list_all(&self) -> BoxStream<'_, AppResult<ShareRecord>>;

    /// Check whether the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}

/// Open the store selected by `database.backend`.
pub async fn connect_store(config: &AppConfig) -> AppResult<Arc<dyn ShareStore>> {
    match config.database.backend {
        StoreBackend::Json => {
            let root = config.storage.shares_path();
            info!(path = %root.display(), "Using JSON share store");
            let store = JsonShareStore::open(root).await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Postgres => {
            let pool = DatabasePool::connect(&config.database).await?;
            if config.database.run_migrations {
                run_migrations(pool.pool()).await?;
            }
            Ok(Arc::new(PgShareStore::new(pool.into_pool())))
        }
    }
}
