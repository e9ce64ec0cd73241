//! PostgreSQL share store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use futures::stream::BoxStream;
use sqlx::PgPool;
use sqlx::types::Json;

use dropshare_core::error::{AppError, ErrorKind};
use dropshare_core::{AppResult, ShareId};
use dropshare_entity::{CounterUpdate, FileEntry, ShareRecord};

use crate::store::ShareStore;

const SELECT_COLUMNS: &str = "share_id, files, created_at, expires_at, max_downloads, \
                              download_count, password_hash";

/// Row shape of the `shares` table.
#[derive(Debug, sqlx::FromRow)]
struct ShareRow {
    share_id: String,
    files: Json<Vec<FileEntry>>,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    max_downloads: i64,
    download_count: i64,
    password_hash: Option<String>,
}

impl TryFrom<ShareRow> for ShareRecord {
    type Error = AppError;

    fn try_from(row: ShareRow) -> Result<Self, Self::Error> {
        let share_id = ShareId::parse(&row.share_id).map_err(|_| {
            AppError::database(format!("Stored share id {:?} is malformed", row.share_id))
        })?;
        Ok(Self {
            share_id,
            files: row.files.0,
            created_at: row.created_at,
            expires_at: row.expires_at,
            max_downloads: counter_from_db(row.max_downloads)?,
            download_count: counter_from_db(row.download_count)?,
            password_hash: row.password_hash,
        })
    }
}

fn counter_from_db(value: i64) -> AppResult<u32> {
    u32::try_from(value)
        .map_err(|_| AppError::database(format!("Counter value {value} out of range")))
}

fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, context, e)
}

/// Share store backed by the `shares` table.
#[derive(Debug, Clone)]
pub struct PgShareStore {
    pool: PgPool,
}

impl PgShareStore {
    /// Create a new store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShareStore for PgShareStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn create(&self, record: &ShareRecord) -> AppResult<()> {
        let result = sqlx::query(
            "INSERT INTO shares (share_id, files, created_at, expires_at, max_downloads, \
             download_count, password_hash) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(record.share_id.as_str())
        .bind(Json(&record.files))
        .bind(record.created_at)
        .bind(record.expires_at)
        .bind(i64::from(record.max_downloads))
        .bind(i64::from(record.download_count))
        .bind(&record.password_hash)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e)
                if e.as_database_error()
                    .is_some_and(|db| db.is_unique_violation()) =>
            {
                Err(AppError::conflict(format!(
                    "Share {} already exists",
                    record.share_id
                )))
            }
            Err(e) => Err(db_error("Failed to create share")(e)),
        }
    }

    async fn load(&self, id: &ShareId) -> AppResult<ShareRecord> {
        let row = sqlx::query_as::<_, ShareRow>(&format!(
            "SELECT {SELECT_COLUMNS} FROM shares WHERE share_id = $1"
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to load share"))?;

        row.ok_or_else(|| AppError::not_found("Share not found"))?
            .try_into()
    }

    async fn increment_download_count(&self, id: &ShareId) -> AppResult<CounterUpdate> {
        let updated: Option<i64> = sqlx::query_scalar(
            "UPDATE shares SET download_count = download_count + 1, last_downloaded_at = NOW() \
             WHERE share_id = $1 AND (max_downloads = 0 OR download_count < max_downloads) \
             RETURNING download_count",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to increment download count"))?;

        if let Some(count) = updated {
            return Ok(CounterUpdate::Incremented {
                download_count: counter_from_db(count)?,
            });
        }

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM shares WHERE share_id = $1)")
                .bind(id.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(db_error("Failed to check share existence"))?;

        if exists {
            Ok(CounterUpdate::LimitReached)
        } else {
            Err(AppError::not_found("Share not found"))
        }
    }

    async fn delete(&self, id: &ShareId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM shares WHERE share_id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete share"))?;
        Ok(result.rows_affected() > 0)
    }

    fn list_all(&self) -> BoxStream<'_, AppResult<ShareRecord>> {
        sqlx::query_as::<_, ShareRow>(
            "SELECT share_id, files, created_at, expires_at, max_downloads, download_count, \
             password_hash FROM shares ORDER BY expires_at",
        )
        .fetch(&self.pool)
        .map(|row| {
            row.map_err(db_error("Failed to list shares"))
                .and_then(ShareRecord::try_from)
        })
        .boxed()
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(db_error("Health check failed"))
    }
}

#[cfg(test)]
mod tests {
    //! These tests need a live PostgreSQL and run only when `DATABASE_URL`
    //! is set.

    use super::*;
    use crate::migration::run_migrations;
    use chrono::Duration;
    use futures::TryStreamExt;
    use std::sync::Arc;

    async fn store() -> Option<PgShareStore> {
        let url = std::env::var("DATABASE_URL").ok()?;
        let pool = PgPool::connect(&url).await.expect("connect");
        run_migrations(&pool).await.expect("migrate");
        Some(PgShareStore::new(pool))
    }

    fn record(max_downloads: u32) -> ShareRecord {
        let now = Utc::now();
        ShareRecord {
            share_id: ShareId::generate(),
            files: vec![FileEntry {
                original_name: "données.csv".to_string(),
                stored_name: "000-données.csv".to_string(),
                size_bytes: 42,
                mime_type: "text/csv".to_string(),
            }],
            created_at: now,
            expires_at: now + Duration::hours(1),
            max_downloads,
            download_count: 0,
            password_hash: Some("$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string()),
        }
    }

    #[tokio::test]
    async fn test_pg_roundtrip_and_conflict() {
        let Some(store) = store().await else { return };
        let r = record(0);
        store.create(&r).await.expect("create");
        let loaded = store.load(&r.share_id).await.expect("load");
        assert_eq!(loaded.files, r.files);
        assert_eq!(loaded.password_hash, r.password_hash);
        assert_eq!(
            store.create(&r).await.unwrap_err().kind,
            ErrorKind::Conflict
        );
        assert!(store.delete(&r.share_id).await.expect("delete"));
        assert!(!store.delete(&r.share_id).await.expect("delete again"));
    }

    #[tokio::test]
    async fn test_pg_concurrent_increments_never_exceed_limit() {
        let Some(store) = store().await else { return };
        let store = Arc::new(store);
        let r = record(2);
        store.create(&r).await.expect("create");

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = Arc::clone(&store);
            let id = r.share_id.clone();
            handles.push(tokio::spawn(async move {
                store.increment_download_count(&id).await
            }));
        }
        let mut granted = 0;
        for handle in handles {
            if handle.await.expect("join").expect("increment").is_granted() {
                granted += 1;
            }
        }
        assert_eq!(granted, 2);
        store.delete(&r.share_id).await.expect("cleanup");
    }

    #[tokio::test]
    async fn test_pg_missing_share() {
        let Some(store) = store().await else { return };
        let id = ShareId::generate();
        assert!(store.load(&id).await.unwrap_err().is_not_found());
        assert!(
            store
                .increment_download_count(&id)
                .await
                .unwrap_err()
                .is_not_found()
        );
        let all: Vec<ShareRecord> = store.list_all().try_collect().await.expect("list");
        assert!(all.iter().all(|r| r.share_id != id));
    }
}
