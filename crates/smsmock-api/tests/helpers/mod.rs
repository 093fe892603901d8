//! Test helpers: build the router against a mock CDN.
//!
//! Run from workspace root: `cargo test -p smsmock-api`.

#![allow(dead_code)]

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;
use mockito::{Mock, ServerGuard};
use smsmock_api::setup::routes;
use smsmock_api::AppState;
use smsmock_core::Config;

pub const UGUU_PATH: &str = "/upload.php";
pub const CATBOX_PATH: &str = "/user/api.php";

/// Test application: HTTP server plus the mock CDN it uploads to.
pub struct TestApp {
    pub server: TestServer,
    pub cdn: ServerGuard,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Uguu answering every upload with `url` in its JSON shape
    pub async fn mock_uguu_success(&mut self, url: &str) -> Mock {
        self.cdn
            .mock("POST", UGUU_PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(r#"{{"success":true,"files":[{{"url":"{}"}}]}}"#, url))
            .create_async()
            .await
    }

    /// Catbox answering every upload with `url` as plain text
    pub async fn mock_catbox_success(&mut self, url: &str) -> Mock {
        self.cdn
            .mock("POST", CATBOX_PATH)
            .with_status(200)
            .with_body(url)
            .create_async()
            .await
    }

    /// Uguu failing every upload, expected to be hit exactly `times` times
    pub async fn mock_uguu_failure(&mut self, status: usize, times: usize) -> Mock {
        self.cdn
            .mock("POST", UGUU_PATH)
            .with_status(status)
            .with_body("Service Unavailable")
            .expect(times)
            .create_async()
            .await
    }

    /// Uguu holding every upload for `stall` before answering, hit `times` times
    pub async fn mock_uguu_stalled(&mut self, stall: Duration, times: usize) -> Mock {
        self.cdn
            .mock("POST", UGUU_PATH)
            .with_status(200)
            .with_chunked_body(move |w| {
                std::thread::sleep(stall);
                w.write_all(br#"{"success":true,"files":[{"url":"https://a.uguu.se/late.png"}]}"#)
            })
            .expect(times)
            .create_async()
            .await
    }
}

/// Configuration pointing both providers at `cdn_url`, with a 1 ms retry delay.
///
/// The mock servers listen on loopback, so remote fetches may target private hosts.
pub fn test_config(cdn_url: &str) -> Config {
    Config {
        uguu_upload_url: format!("{}{}", cdn_url, UGUU_PATH),
        catbox_upload_url: format!("{}{}", cdn_url, CATBOX_PATH),
        retry_delay_ms: 1,
        cdn_timeout_secs: 5,
        allow_private_urls: true,
        ..Config::default()
    }
}

pub fn build_server(config: Config) -> TestServer {
    let state = Arc::new(AppState::from_config(config.clone()).expect("Failed to build app state"));
    let router = routes::setup_routes(&config, state).expect("Failed to build routes");
    TestServer::new(router).expect("Failed to create test server")
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(|config| config).await
}

/// Like [`setup_test_app`], with a chance to adjust the configuration first.
pub async fn setup_test_app_with(adjust: impl FnOnce(Config) -> Config) -> TestApp {
    let cdn = mockito::Server::new_async().await;
    let config = adjust(test_config(&cdn.url()));
    TestApp {
        server: build_server(config),
        cdn,
    }
}
