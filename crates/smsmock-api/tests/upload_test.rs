//! CDN upload relay integration tests.
//!
//! Run with: `cargo test -p smsmock-api --test upload_test`

mod helpers;

use std::time::Duration;

use axum::http::StatusCode;
use helpers::{setup_test_app, setup_test_app_with, UGUU_PATH};
use mockito::Matcher;
use serde_json::{json, Value};

/// base64 of "hello"
const HELLO_B64: &str = "aGVsbG8=";

#[tokio::test]
async fn test_upload_base64_image() {
    let mut app = setup_test_app().await;
    let mock = app
        .cdn
        .mock("POST", UGUU_PATH)
        .match_body(Matcher::Regex(
            r#"name="files\[\]"; filename="image.png""#.to_string(),
        ))
        .with_status(200)
        .with_body(r#"{"success":true,"files":[{"url":"https://a.uguu.se/hello.png"}]}"#)
        .create_async()
        .await;

    let response = app
        .client()
        .post("/api/upload")
        .json(&json!({"image": HELLO_B64}))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["cdnUrl"], "https://a.uguu.se/hello.png");
    assert_eq!(body["data"]["filename"], "image.png");
    assert_eq!(body["data"]["size"], 5);
    assert_eq!(body["data"]["message"], "Gambar berhasil diupload ke CDN");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_upload_data_url_to_catbox() {
    let mut app = setup_test_app().await;
    let mock = app.mock_catbox_success("https://files.catbox.moe/q1w2e3.png").await;

    let response = app
        .client()
        .post("/api/upload")
        .json(&json!({
            "image": format!("data:image/png;base64,{}", HELLO_B64),
            "filename": "sms-pak-eko-1.png",
            "provider": "catbox"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["data"]["cdnUrl"], "https://files.catbox.moe/q1w2e3.png");
    assert_eq!(body["data"]["filename"], "sms-pak-eko-1.png");
    assert_eq!(body["data"]["provider"], "catbox");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_upload_from_remote_url() {
    let mut app = setup_test_app().await;
    let remote = app
        .cdn
        .mock("GET", "/remote.png")
        .with_status(200)
        .with_body("remote-bytes")
        .create_async()
        .await;
    let upload = app.mock_uguu_success("https://a.uguu.se/remote.png").await;

    let url = format!("{}/remote.png", app.cdn.url());
    let response = app
        .client()
        .post("/api/upload")
        .json(&json!({"url": url}))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["data"]["cdnUrl"], "https://a.uguu.se/remote.png");
    assert_eq!(body["data"]["size"], 12);
    remote.assert_async().await;
    upload.assert_async().await;
}

#[tokio::test]
async fn test_upload_requires_image_or_url() {
    let app = setup_test_app().await;

    for body in [json!({}), json!({"image": "", "url": "  "}), json!({"filename": "a.png"})] {
        let response = app.client().post("/api/upload").json(&body).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Parameter image atau url diperlukan");
    }
}

#[tokio::test]
async fn test_upload_rejects_non_http_url() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/api/upload")
        .json(&json!({"url": "file:///etc/passwd"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_refuses_internal_urls() {
    let mut app = setup_test_app_with(|mut config| {
        config.allow_private_urls = false;
        config
    })
    .await;
    let secret = app
        .cdn
        .mock("GET", "/internal/secret")
        .with_status(200)
        .with_body("TOP-SECRET-METADATA")
        .expect(0)
        .create_async()
        .await;
    let upload = app
        .cdn
        .mock("POST", UGUU_PATH)
        .with_status(200)
        .expect(0)
        .create_async()
        .await;

    let loopback = format!("{}/internal/secret", app.cdn.url());
    for url in [
        loopback.as_str(),
        "http://169.254.169.254/latest/meta-data/",
        "http://10.0.0.5/image.png",
        "http://localhost/image.png",
    ] {
        let response = app
            .client()
            .post("/api/upload")
            .json(&json!({"url": url}))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "{url}");
        let body = response.json::<Value>();
        assert_eq!(body["code"], "INVALID_INPUT");
        assert!(body["error"].as_str().unwrap().contains("not allowed"), "{url}");
    }

    secret.assert_async().await;
    upload.assert_async().await;
}

#[tokio::test]
async fn test_request_timeout_uses_json_envelope() {
    let mut app = setup_test_app_with(|mut config| {
        config.request_timeout_secs = Some(1);
        config
    })
    .await;
    let stalled = app.mock_uguu_stalled(Duration::from_secs(3), 1).await;

    let response = app
        .client()
        .post("/api/upload")
        .json(&json!({"image": HELLO_B64}))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.json::<Value>();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "TIMEOUT");
    assert_eq!(body["error"], "Request timed out");
    stalled.assert_async().await;
}

#[tokio::test]
async fn test_stalled_cdn_gets_every_attempt() {
    let mut app = setup_test_app_with(|mut config| {
        config.cdn_timeout_secs = 1;
        config
    })
    .await;
    let stalled = app
        .mock_uguu_stalled(Duration::from_millis(1200), 3)
        .await;

    let response = app
        .client()
        .post("/api/upload")
        .json(&json!({"image": HELLO_B64}))
        .await;

    // Each attempt hits the CDN timeout; the request timeout leaves room for all three
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.json::<Value>();
    assert_eq!(body["code"], "UPLOAD_ERROR");
    assert_eq!(body["error"], "Gagal upload gambar ke CDN");
    stalled.assert_async().await;
}

#[tokio::test]
async fn test_upload_failure_envelope() {
    let mut app = setup_test_app().await;
    let mock = app.mock_uguu_failure(502, 3).await;

    let response = app
        .client()
        .post("/api/upload")
        .json(&json!({"image": HELLO_B64}))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.json::<Value>();
    assert_eq!(body["error"], "Gagal upload gambar ke CDN");
    assert!(body["details"].as_str().unwrap().contains("502"));
    assert_eq!(body["recoverable"], true);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_upload_malformed_cdn_reply() {
    let mut app = setup_test_app_with(|mut config| {
        config.max_attempts = 1;
        config
    })
    .await;
    app.cdn
        .mock("POST", UGUU_PATH)
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create_async()
        .await;

    let response = app
        .client()
        .post("/api/upload")
        .json(&json!({"image": HELLO_B64}))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.json::<Value>();
    assert!(body["details"]
        .as_str()
        .unwrap()
        .contains("malformed CDN response"));
}

#[tokio::test]
async fn test_upload_too_large() {
    let app = setup_test_app_with(|mut config| {
        config.max_upload_size_bytes = 4;
        config
    })
    .await;

    let response = app
        .client()
        .post("/api/upload")
        .json(&json!({"image": HELLO_B64}))
        .await;

    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.json::<Value>()["code"], "PAYLOAD_TOO_LARGE");
}

#[tokio::test]
async fn test_upload_invalid_base64() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/api/upload")
        .json(&json!({"image": "not base64 at all!"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}
