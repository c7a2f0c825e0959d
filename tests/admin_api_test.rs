//! Admin surface tests: config read/write, delete-by-URL, health.

mod common;

use common::{multipart_body, post_upload, TestServer, TEST_ADMIN_PASSWORD};
use serde_json::{json, Value};

const BOUNDARY: &str = "----WebKitFormBoundaryTestSuite02";

#[tokio::test]
async fn test_config_defaults_before_first_save() {
    let server = TestServer::start().await;

    let response = reqwest::get(server.url("/api/config")).await.unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.headers()["cache-control"]
        .to_str()
        .unwrap()
        .contains("no-store"));

    let config: Value = response.json().await.unwrap();
    assert_eq!(config["title"], "You Got It!");
    assert_eq!(config["senderName"], "Eric");
    assert_eq!(config["musicUrl"], "");
}

#[tokio::test]
async fn test_config_ping_authenticates_without_writing() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let response = client
        .post(server.url("/api/config"))
        .header("x-admin-password", TEST_ADMIN_PASSWORD)
        .json(&json!({ "_ping": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let result: Value = response.json().await.unwrap();
    assert_eq!(result["success"], true);

    // The probe must not have created config.json: defaults still served.
    let config: Value = reqwest::get(server.url("/api/config"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(config["title"], "You Got It!");

    // Wrong password is rejected with the original's 401 shape.
    let response = client
        .post(server.url("/api/config"))
        .header("x-admin-password", "nope")
        .json(&json!({ "_ping": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
    let error: Value = response.json().await.unwrap();
    assert_eq!(error["error"], "Unauthorized");
}

#[tokio::test]
async fn test_config_save_is_verbatim_passthrough() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    // Arbitrary keys survive the round-trip untouched — the server does not
    // normalize the document.
    let saved = json!({
        "title": "Surprise!",
        "heroText": "Found me!",
        "musicUrl": "/blobs/audio/1-song.mp3",
        "customExtra": { "nested": [1, 2, 3] }
    });
    let response = client
        .post(server.url("/api/config"))
        .header("x-admin-password", TEST_ADMIN_PASSWORD)
        .json(&saved)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let result: Value = response.json().await.unwrap();
    assert_eq!(result["success"], true);
    assert!(result["url"].as_str().unwrap().ends_with("config.json"));

    let fetched: Value = reqwest::get(server.url("/api/config"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched, saved);
}

#[tokio::test]
async fn test_config_save_requires_admin_password() {
    let server = TestServer::start().await;

    let response = reqwest::Client::new()
        .post(server.url("/api/config"))
        .json(&json!({ "title": "Hacked" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_delete_removes_uploaded_blob() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let body = multipart_body(BOUNDARY, "gone.png", "image/png", b"bytes", Some("target"));
    let upload: Value = post_upload(&server, body, BOUNDARY, Some(TEST_ADMIN_PASSWORD), None)
        .await
        .json()
        .await
        .unwrap();
    let url = upload["url"].as_str().unwrap().to_string();

    let response = client
        .post(server.url("/api/delete"))
        .header("x-admin-password", TEST_ADMIN_PASSWORD)
        .json(&json!({ "url": url }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let result: Value = response.json().await.unwrap();
    assert_eq!(result["success"], true);

    let listing: Value = reqwest::get(server.url("/api/images"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(listing["targets"].as_array().unwrap().is_empty());

    // The public URL is gone too.
    let served = reqwest::get(&url).await.unwrap();
    assert_eq!(served.status(), 404);
}

#[tokio::test]
async fn test_delete_validations() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    // Missing url field
    let response = client
        .post(server.url("/api/delete"))
        .header("x-admin-password", TEST_ADMIN_PASSWORD)
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let error: Value = response.json().await.unwrap();
    assert_eq!(error["error"], "Missing url");

    // No password
    let response = client
        .post(server.url("/api/delete"))
        .json(&json!({ "url": "http://x/blobs/a" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await;

    let response = reqwest::get(server.url("/health")).await.unwrap();
    assert_eq!(response.status(), 200);
    let health: Value = response.json().await.unwrap();
    assert_eq!(health["status"], "ok");
    assert!(!health["version"].as_str().unwrap().is_empty());
}
