//! Shared test helpers for integration tests.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use bytes::Bytes;
use http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use dropshare_api::{AppComponents, build_app, build_components};
use dropshare_core::config::AppConfig;

/// Multipart boundary used by [`Upload`].
const BOUNDARY: &str = "dropshare-test-boundary";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Store, lifecycle manager and reaper behind the router
    pub components: AppComponents,
    /// Application config
    pub config: AppConfig,
    /// Data root; removed when the app is dropped
    pub dir: TempDir,
}

impl TestApp {
    /// Create a new test application over a fresh data root.
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        Self::open(dir).await
    }

    /// Create a test application over an existing data root.
    pub async fn open(dir: TempDir) -> Self {
        let config = test_config(&dir);
        let components = build_components(config.clone())
            .await
            .expect("Failed to build components");
        let router = build_app(components.state.clone());
        Self {
            router,
            components,
            config,
            dir,
        }
    }

    /// Drop the running components and start again over the same data.
    pub async fn restart(self) -> Self {
        let Self { dir, .. } = self;
        Self::open(dir).await
    }

    /// Send a request and parse the JSON body.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        self.send(req).await
    }

    /// Send a GET without a body.
    pub async fn get(&self, path: &str, headers: &[(&str, &str)]) -> TestResponse {
        let mut req = Request::builder().method("GET").uri(path);
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        self.send(req.body(Body::empty()).expect("Failed to build request"))
            .await
    }

    /// POST a multipart upload.
    pub async fn upload(&self, upload: Upload) -> TestResponse {
        let req = Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(upload.into_body()))
            .expect("Failed to build request");
        self.send(req).await
    }

    /// Upload and return the new share id, asserting success.
    pub async fn create_share(&self, upload: Upload) -> String {
        let response = self.upload(upload).await;
        assert_eq!(response.status, StatusCode::OK, "upload failed: {}", response.body);
        response.body["shareId"]
            .as_str()
            .expect("shareId in upload response")
            .to_string()
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let raw = axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&raw).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
            raw,
        }
    }
}

/// Test response wrapper
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body (`Null` for non-JSON bodies)
    pub body: Value,
    /// Raw body bytes
    pub raw: Bytes,
}

impl TestResponse {
    /// Header value as a string, if present.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The machine-readable error code of an error body.
    pub fn error_code(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

/// Builder for a multipart upload body.
#[derive(Debug, Default)]
pub struct Upload {
    files: Vec<(String, String, Vec<u8>)>,
    fields: Vec<(String, String)>,
}

impl Upload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, name: &str, content_type: &str, data: &[u8]) -> Self {
        self.files
            .push((name.to_string(), content_type.to_string(), data.to_vec()));
        self
    }

    pub fn field(mut self, name: &str, value: &str) -> Self {
        self.fields.push((name.to_string(), value.to_string()));
        self
    }

    fn into_body(self) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in &self.fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        for (name, content_type, data) in &self.files {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }
}

/// Configuration pointing every path into `dir`, with background work off.
pub fn test_config(dir: &TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.storage.data_root = dir.path().display().to_string();
    config.storage.max_file_size_bytes = 1024 * 1024;
    config.storage.max_files_per_share = 5;
    config.auth.token_secret = Some("integration-test-secret".to_string());
    config.worker.enabled = false;
    config.worker.orphan_grace_minutes = 0;
    config.notification.enabled = false;
    config
}
