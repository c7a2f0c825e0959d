//! Shared test infrastructure for integration tests
//!
//! Spawns the full axum app on an ephemeral port over a tempdir-backed
//! filesystem store, and provides helpers for admin-authenticated requests
//! and multipart body construction.

#![allow(dead_code)]

use photogate::api::{handlers::AppState, router, AdminCredential};
use photogate::storage::{BlobStore, FilesystemStore};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const TEST_ADMIN_PASSWORD: &str = "opensesame";

/// In-process test server wrapper
pub struct TestServer {
    pub base_url: String,
    _data_dir: TempDir,
}

impl TestServer {
    /// Start a server over a fresh temp data directory.
    pub async fn start() -> Self {
        let data_dir = TempDir::new().expect("failed to create temp dir");
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        let base_url = format!("http://{}", addr);

        let store: Arc<dyn BlobStore> = Arc::new(
            FilesystemStore::new(data_dir.path().to_path_buf(), base_url.clone())
                .await
                .expect("failed to create filesystem store"),
        );
        let state = Arc::new(AppState {
            store,
            admin: AdminCredential::new(TEST_ADMIN_PASSWORD),
        });
        let app = router(state, 32 * 1024 * 1024);

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("server error");
        });

        Self {
            base_url,
            _data_dir: data_dir,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Build a single-file multipart body with an optional `role` field.
pub fn multipart_body(
    boundary: &str,
    filename: &str,
    content_type: &str,
    data: &[u8],
    role: Option<&str>,
) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(role) = role {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"role\"\r\n\r\n{role}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; \
             filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

/// POST a multipart upload with the admin password and optional role header.
pub async fn post_upload(
    server: &TestServer,
    body: Vec<u8>,
    boundary: &str,
    password: Option<&str>,
    role_header: Option<&str>,
) -> reqwest::Response {
    let client = reqwest::Client::new();
    let mut request = client
        .post(server.url("/api/upload"))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(body);
    if let Some(password) = password {
        request = request.header("x-admin-password", password);
    }
    if let Some(role) = role_header {
        request = request.header("x-upload-role", role);
    }
    request.send().await.expect("upload request failed")
}
