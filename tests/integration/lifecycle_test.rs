//! Integration tests for share persistence, concurrent downloads and the reaper.

mod helpers;

use axum::body::Body;
use http::{Request, StatusCode};
use tower::ServiceExt;

use dropshare_core::ShareId;
use dropshare_service::{CreateShareOptions, IncomingFile};
use dropshare_storage::share_dir;

use helpers::{TestApp, Upload};

fn one_file() -> Upload {
    Upload::new().file("report.csv", "text/csv", b"a,b\n1,2\n")
}

#[tokio::test]
async fn test_share_survives_restart() {
    let app = TestApp::new().await;
    let share_id = app
        .create_share(one_file().field("maxDownloads", "4"))
        .await;
    let download = app.get(&format!("/api/download/{share_id}/0"), &[]).await;
    assert_eq!(download.status, StatusCode::OK);

    let app = app.restart().await;

    let inspect = app.get(&format!("/api/shares/{share_id}"), &[]).await;
    assert_eq!(inspect.status, StatusCode::OK);
    assert_eq!(inspect.body["share"]["downloadCount"], 1);
    assert_eq!(inspect.body["share"]["remainingDownloads"], 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_downloads_respect_limit() {
    let app = TestApp::new().await;
    let share_id = app
        .create_share(one_file().field("maxDownloads", "3"))
        .await;

    let mut tasks = Vec::new();
    for _ in 0..10 {
        let router = app.router.clone();
        let uri = format!("/api/download/{share_id}/0");
        tasks.push(tokio::spawn(async move {
            let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let response = router.oneshot(req).await.unwrap();
            let status = response.status();
            let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
            (status, body)
        }));
    }

    let mut served = 0;
    for task in tasks {
        let (status, body) = task.await.unwrap();
        match status {
            StatusCode::OK => {
                assert_eq!(&body[..], b"a,b\n1,2\n");
                served += 1;
            }
            StatusCode::GONE | StatusCode::NOT_FOUND => {}
            other => panic!("unexpected status {other}"),
        }
    }
    assert_eq!(served, 3);

    let after = app.get(&format!("/api/shares/{share_id}"), &[]).await;
    assert!(matches!(
        after.status,
        StatusCode::GONE | StatusCode::NOT_FOUND
    ));
}

#[tokio::test]
async fn test_reaper_sweeps_expired_and_orphaned_payloads() {
    let app = TestApp::new().await;
    let lifecycle = &app.components.state.lifecycle;

    let expired = lifecycle
        .create_share(
            vec![IncomingFile::new("old.txt", "stale")],
            CreateShareOptions {
                ttl_hours: Some(0.000_001),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .share_id;
    let active = app.create_share(one_file()).await;

    let orphan = ShareId::generate();
    lifecycle
        .storage()
        .create_dir(&share_dir(&orphan))
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(30)).await;

    let report = app.components.reaper.sweep().await;
    assert_eq!(report.scanned, 2);
    assert_eq!(report.reaped, 1);
    assert_eq!(report.orphans_removed, 1);
    assert_eq!(report.failed, 0);

    let uploads = app.config.storage.uploads_path();
    assert!(!uploads.join(expired.as_str()).exists());
    assert!(!uploads.join(orphan.as_str()).exists());
    assert!(uploads.join(&active).exists());

    let gone = app.get(&format!("/api/shares/{expired}"), &[]).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    let still_there = app.get(&format!("/api/shares/{active}"), &[]).await;
    assert_eq!(still_there.status, StatusCode::OK);
}

#[tokio::test]
async fn test_manual_reap_deletes_share() {
    let app = TestApp::new().await;
    let share_id = app.create_share(one_file()).await;
    let id = ShareId::parse(&share_id).unwrap();

    let lifecycle = &app.components.state.lifecycle;
    assert_eq!(
        lifecycle.reap(&id).await.unwrap(),
        dropshare_service::ReapOutcome::Reaped
    );
    assert_eq!(
        lifecycle.reap(&id).await.unwrap(),
        dropshare_service::ReapOutcome::AlreadyGone
    );

    let response = app.get(&format!("/api/shares/{share_id}"), &[]).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
