//! Integration tests for uploading, inspecting and downloading shares over HTTP.

mod helpers;

use http::StatusCode;
use serde_json::json;

use helpers::{TestApp, Upload};

fn two_files() -> Upload {
    Upload::new()
        .file("notes.txt", "text/plain", b"hello world")
        .file("data.bin", "application/octet-stream", &[0u8, 1, 2, 3, 4])
}

#[tokio::test]
async fn test_upload_creates_share() {
    let app = TestApp::new().await;

    let response = app
        .upload(two_files().field("ttlHours", "2.5").field("maxDownloads", "3"))
        .await;

    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    let body = &response.body;
    assert_eq!(body["success"], true);
    assert_eq!(body["fileCount"], 2);
    assert_eq!(body["maxDownloads"], 3);
    assert_eq!(body["passwordProtected"], false);
    assert_eq!(body["expiryTime"], "2h");

    let share_id = body["shareId"].as_str().unwrap();
    assert_eq!(share_id.len(), 32);
    assert_eq!(body["downloadUrl"], format!("/api/shares/{share_id}"));
}

#[tokio::test]
async fn test_upload_without_files_is_rejected() {
    let app = TestApp::new().await;

    let response = app.upload(Upload::new().field("ttlHours", "1")).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALIDATION_ERROR");
    assert_eq!(response.body["success"], false);
}

#[tokio::test]
async fn test_upload_with_bad_options_is_rejected() {
    let app = TestApp::new().await;

    for (name, value) in [
        ("ttlHours", "soon"),
        ("ttlHours", "0"),
        ("ttlHours", "100000"),
        ("maxDownloads", "-1"),
    ] {
        let response = app.upload(two_files().field(name, value)).await;
        assert_eq!(
            response.status,
            StatusCode::BAD_REQUEST,
            "{name}={value} should be rejected"
        );
    }

    let mut uploads = tokio::fs::read_dir(app.config.storage.uploads_path())
        .await
        .unwrap();
    assert!(uploads.next_entry().await.unwrap().is_none());
}

#[tokio::test]
async fn test_upload_too_many_files_is_rejected() {
    let app = TestApp::new().await;
    let mut upload = Upload::new();
    for i in 0..6 {
        upload = upload.file(&format!("f{i}.txt"), "text/plain", b"x");
    }

    let response = app.upload(upload).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_inspect_share() {
    let app = TestApp::new().await;
    let share_id = app.create_share(two_files()).await;

    let response = app.get(&format!("/api/shares/{share_id}"), &[]).await;

    assert_eq!(response.status, StatusCode::OK);
    let share = &response.body["share"];
    assert_eq!(share["shareId"], share_id.as_str());
    assert_eq!(share["passwordProtected"], false);
    assert_eq!(share["downloadCount"], 0);
    assert_eq!(share["totalSizeBytes"], 16);
    assert_eq!(share["files"][0]["name"], "notes.txt");
    assert_eq!(share["files"][0]["mimeType"], "text/plain");
    assert_eq!(share["files"][1]["index"], 1);
    assert!(response.body.get("accessToken").is_none());

    // Inspecting does not count as a download.
    let again = app.get(&format!("/api/shares/{share_id}"), &[]).await;
    assert_eq!(again.body["share"]["downloadCount"], 0);
}

#[tokio::test]
async fn test_unknown_and_malformed_ids_are_not_found() {
    let app = TestApp::new().await;

    let unknown = app
        .get("/api/shares/0123456789abcdef0123456789abcdef", &[])
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.error_code(), "NOT_FOUND");

    let malformed = app.get("/api/shares/..%2F..%2Fetc", &[]).await;
    assert_eq!(malformed.status, StatusCode::NOT_FOUND);

    let download = app.get("/api/download/not-a-share/0", &[]).await;
    assert_eq!(download.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_download_serves_file_with_headers() {
    let app = TestApp::new().await;
    let share_id = app
        .create_share(
            Upload::new()
                .file("résumé.txt", "text/plain", b"curriculum vitae")
                .field("maxDownloads", "2"),
        )
        .await;

    let response = app.get(&format!("/api/download/{share_id}/0"), &[]).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(&response.raw[..], b"curriculum vitae");
    assert_eq!(response.header("content-type"), Some("text/plain"));
    assert_eq!(response.header("content-length"), Some("16"));
    assert_eq!(response.header("cache-control"), Some("no-store"));
    assert_eq!(response.header("x-remaining-downloads"), Some("1"));
    let disposition = response.header("content-disposition").unwrap();
    assert!(disposition.starts_with("attachment;"));
    assert!(disposition.contains("filename*=UTF-8''r%C3%A9sum%C3%A9.txt"));

    let inspect = app.get(&format!("/api/shares/{share_id}"), &[]).await;
    assert_eq!(inspect.body["share"]["downloadCount"], 1);
    assert_eq!(inspect.body["share"]["remainingDownloads"], 1);
}

#[tokio::test]
async fn test_download_limit_then_gone_then_not_found() {
    let app = TestApp::new().await;
    let share_id = app
        .create_share(two_files().field("maxDownloads", "1"))
        .await;

    let first = app.get(&format!("/api/download/{share_id}/1"), &[]).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(&first.raw[..], &[0u8, 1, 2, 3, 4]);
    assert_eq!(first.header("x-remaining-downloads"), Some("0"));

    let second = app.get(&format!("/api/download/{share_id}/0"), &[]).await;
    assert_eq!(second.status, StatusCode::GONE);
    assert_eq!(second.error_code(), "GONE");

    // The exhausted share was reaped on access.
    let third = app.get(&format!("/api/shares/{share_id}"), &[]).await;
    assert_eq!(third.status, StatusCode::NOT_FOUND);
    let payload = app.config.storage.uploads_path().join(&share_id);
    assert!(!payload.exists());
}

#[tokio::test]
async fn test_download_out_of_range_is_not_counted() {
    let app = TestApp::new().await;
    let share_id = app
        .create_share(two_files().field("maxDownloads", "1"))
        .await;

    for index in ["2", "99", "-1", "first"] {
        let response = app
            .get(&format!("/api/download/{share_id}/{index}"), &[])
            .await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "index {index}");
        assert_eq!(response.error_code(), "OUT_OF_RANGE", "index {index}");
    }

    let ok = app.get(&format!("/api/download/{share_id}/0"), &[]).await;
    assert_eq!(ok.status, StatusCode::OK);
}

#[tokio::test]
async fn test_password_protected_share() {
    let app = TestApp::new().await;
    let share_id = app
        .create_share(two_files().field("password", "open sesame"))
        .await;
    let inspect_path = format!("/api/shares/{share_id}");

    let anonymous = app.get(&inspect_path, &[]).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.error_code(), "UNAUTHORIZED");

    let wrong = app
        .get(&inspect_path, &[("x-share-password", "guess")])
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let right = app
        .get(&inspect_path, &[("x-share-password", "open sesame")])
        .await;
    assert_eq!(right.status, StatusCode::OK);
    assert_eq!(right.body["share"]["passwordProtected"], true);
    assert!(right.body["accessToken"].is_string());

    let by_query = app
        .get(&format!("{inspect_path}?password=open%20sesame"), &[])
        .await;
    assert_eq!(by_query.status, StatusCode::OK);

    let blocked = app.get(&format!("/api/download/{share_id}/0"), &[]).await;
    assert_eq!(blocked.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_verify_password_issues_access_token() {
    let app = TestApp::new().await;
    let share_id = app
        .create_share(
            two_files()
                .field("password", "hunter2")
                .field("maxDownloads", "5"),
        )
        .await;

    let wrong = app
        .request(
            "POST",
            &format!("/api/shares/{share_id}/verify"),
            Some(json!({ "password": "hunter3" })),
            &[],
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let empty = app
        .request(
            "POST",
            &format!("/api/shares/{share_id}/verify"),
            Some(json!({ "password": "" })),
            &[],
        )
        .await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);

    let verified = app
        .request(
            "POST",
            &format!("/api/shares/{share_id}/verify"),
            Some(json!({ "password": "hunter2" })),
            &[],
        )
        .await;
    assert_eq!(verified.status, StatusCode::OK);
    assert!(verified.body["expiresAt"].is_string());
    let token = verified.body["accessToken"].as_str().unwrap().to_string();

    let bearer = format!("Bearer {token}");
    let download = app
        .get(
            &format!("/api/download/{share_id}/0"),
            &[("authorization", bearer.as_str())],
        )
        .await;
    assert_eq!(download.status, StatusCode::OK);
    assert_eq!(&download.raw[..], b"hello world");

    let by_query = app
        .get(&format!("/api/download/{share_id}/1?token={token}"), &[])
        .await;
    assert_eq!(by_query.status, StatusCode::OK);

    // The same token does not open a different share.
    let other = app
        .create_share(two_files().field("password", "hunter2"))
        .await;
    let foreign = app
        .get(
            &format!("/api/shares/{other}"),
            &[("authorization", bearer.as_str())],
        )
        .await;
    assert_eq!(foreign.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_legacy_verify_route() {
    let app = TestApp::new().await;
    let share_id = app
        .create_share(two_files().field("password", "pw"))
        .await;

    let response = app
        .request(
            "POST",
            &format!("/api/verify-password/{share_id}"),
            Some(json!({ "password": "pw" })),
            &[],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["accessToken"].is_string());
}

#[tokio::test]
async fn test_verify_on_unprotected_share_still_issues_token() {
    let app = TestApp::new().await;
    let share_id = app.create_share(two_files()).await;

    let response = app
        .request(
            "POST",
            &format!("/api/shares/{share_id}/verify"),
            Some(json!({ "password": "anything" })),
            &[],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_expired_share_is_gone() {
    let app = TestApp::new().await;
    let share_id = app
        .create_share(two_files().field("ttlHours", "0.000001"))
        .await;
    tokio::time::sleep(std::time::Duration::from_millis(30)).await;

    let response = app.get(&format!("/api/shares/{share_id}"), &[]).await;
    assert_eq!(response.status, StatusCode::GONE);
    assert!(
        response.body["message"]
            .as_str()
            .unwrap()
            .contains("expired")
    );

    let after = app.get(&format!("/api/shares/{share_id}"), &[]).await;
    assert_eq!(after.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;

    let response = app.get("/api/health", &[]).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["store"]["backend"], "json");
    assert_eq!(response.body["store"]["healthy"], true);
    assert_eq!(response.body["storage"]["healthy"], true);
}
