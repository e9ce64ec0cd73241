//! Fixtures shared by the worker tests.

use std::sync::Arc;

use chrono::Duration;

use dropshare_auth::ShareTokenIssuer;
use dropshare_database::JsonShareStore;
use dropshare_service::{
    CreateShareOptions, IncomingFile, LifecycleSettings, NoopNotifier, ShareLifecycleManager,
};
use dropshare_storage::LocalStorageProvider;

pub(crate) async fn manager() -> (tempfile::TempDir, ShareLifecycleManager) {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonShareStore::open(dir.path().join("shares")).await.unwrap();
    let storage = LocalStorageProvider::new(dir.path().join("uploads"))
        .await
        .unwrap();
    let manager = ShareLifecycleManager::new(
        Arc::new(store),
        Arc::new(storage),
        Arc::new(ShareTokenIssuer::from_secret(b"worker-test", Duration::minutes(5))),
        Arc::new(NoopNotifier),
        LifecycleSettings::default(),
    );
    (dir, manager)
}

pub(crate) fn options(ttl_hours: f64, max_downloads: u32) -> CreateShareOptions {
    CreateShareOptions {
        ttl_hours: Some(ttl_hours),
        max_downloads: Some(max_downloads),
        password: None,
    }
}

pub(crate) fn files() -> Vec<IncomingFile> {
    vec![IncomingFile::new("report.txt", "quarterly numbers")]
}

/// A share whose lifetime is over a few milliseconds after creation.
pub(crate) async fn expired_share(manager: &ShareLifecycleManager) -> dropshare_core::ShareId {
    let summary = manager
        .create_share(files(), options(0.000_001, 0))
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    summary.share_id
}
