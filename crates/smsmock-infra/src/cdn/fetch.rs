use std::time::Duration;

use anyhow::Context;
use bytes::{Bytes, BytesMut};
use reqwest::{header::LOCATION, redirect::Policy, Client, Response};

use super::ssrf::validate_remote_url;
use super::UploadError;

const MAX_REDIRECTS: usize = 5;

/// Downloads a remote image so it can be relayed to a CDN.
#[derive(Clone)]
pub struct RemoteFetcher {
    http_client: Client,
    max_bytes: usize,
    allow_private: bool,
}

impl RemoteFetcher {
    /// `allow_private` lets loopback and private-network hosts through; keep it off
    /// anywhere the URL comes from a client.
    pub fn new(
        timeout: Duration,
        user_agent: &str,
        max_bytes: usize,
        allow_private: bool,
    ) -> anyhow::Result<Self> {
        // Redirects are followed by hand so every hop is validated
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .redirect(Policy::none())
            .build()
            .context("Failed to create HTTP client for remote downloads")?;

        Ok(Self {
            http_client,
            max_bytes,
            allow_private,
        })
    }

    /// Fetch `url` (public http or https hosts only), refusing bodies over the size limit.
    #[tracing::instrument(skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<Bytes, UploadError> {
        let download_error = |reason: String| UploadError::Download {
            url: url.to_string(),
            reason,
        };

        let mut response = self.get_following_redirects(url).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(download_error(format!("status {}", status)));
        }

        if let Some(length) = response.content_length() {
            if length as usize > self.max_bytes {
                return Err(UploadError::TooLarge {
                    size: length as usize,
                    limit: self.max_bytes,
                });
            }
        }

        let mut buffer = BytesMut::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| download_error(e.to_string()))?
        {
            if buffer.len() + chunk.len() > self.max_bytes {
                return Err(UploadError::TooLarge {
                    size: buffer.len() + chunk.len(),
                    limit: self.max_bytes,
                });
            }
            buffer.extend_from_slice(&chunk);
        }

        tracing::debug!(size = buffer.len(), "Downloaded remote image");
        Ok(buffer.freeze())
    }

    async fn get_following_redirects(&self, url: &str) -> Result<Response, UploadError> {
        let download_error = |reason: String| UploadError::Download {
            url: url.to_string(),
            reason,
        };

        let mut target = validate_remote_url(url, self.allow_private)
            .await
            .map_err(UploadError::ForbiddenUrl)?;

        for _ in 0..=MAX_REDIRECTS {
            let response = self
                .http_client
                .get(target.clone())
                .send()
                .await
                .map_err(|e| download_error(e.to_string()))?;

            if !response.status().is_redirection() {
                return Ok(response);
            }

            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| download_error("redirect without a Location header".to_string()))?;
            let next = target
                .join(location)
                .map_err(|e| download_error(format!("invalid redirect target: {}", e)))?;
            tracing::debug!(from = %target, to = %next, "Following redirect");

            target = validate_remote_url(next.as_str(), self.allow_private)
                .await
                .map_err(UploadError::ForbiddenUrl)?;
        }

        Err(download_error(format!("more than {} redirects", MAX_REDIRECTS)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The mock servers listen on loopback, so tests opt into private hosts
    fn fetcher(max_bytes: usize) -> RemoteFetcher {
        RemoteFetcher::new(Duration::from_secs(5), "smsmock-test", max_bytes, true).unwrap()
    }

    fn public_only_fetcher() -> RemoteFetcher {
        RemoteFetcher::new(Duration::from_secs(5), "smsmock-test", 1024, false).unwrap()
    }

    #[tokio::test]
    async fn downloads_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/pic.png")
            .with_status(200)
            .with_header("content-type", "image/png")
            .with_body(b"\x89PNG\r\n\x1a\n")
            .create_async()
            .await;

        let data = fetcher(1024)
            .fetch(&format!("{}/pic.png", server.url()))
            .await
            .unwrap();
        assert_eq!(&data[..], b"\x89PNG\r\n\x1a\n");
    }

    #[tokio::test]
    async fn not_found_is_download_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/missing.png")
            .with_status(404)
            .create_async()
            .await;

        let err = fetcher(1024)
            .fetch(&format!("{}/missing.png", server.url()))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Download { reason, .. } if reason.contains("404")));
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/big.png")
            .with_status(200)
            .with_body(vec![0u8; 64])
            .create_async()
            .await;

        let err = fetcher(16)
            .fetch(&format!("{}/big.png", server.url()))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::TooLarge { limit: 16, .. }));
    }

    #[tokio::test]
    async fn non_http_schemes_are_refused() {
        for url in ["file:///etc/passwd", "ftp://example.com/a.png", "not a url"] {
            let err = fetcher(1024).fetch(url).await.unwrap_err();
            assert!(matches!(err, UploadError::ForbiddenUrl(_)), "url {url}");
        }
    }

    #[tokio::test]
    async fn loopback_host_is_refused_without_request() {
        let mut server = mockito::Server::new_async().await;
        let secret = server
            .mock("GET", "/internal/secret")
            .with_status(200)
            .with_body("TOP-SECRET-METADATA")
            .expect(0)
            .create_async()
            .await;

        let err = public_only_fetcher()
            .fetch(&format!("{}/internal/secret", server.url()))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::ForbiddenUrl(_)));

        let err = public_only_fetcher()
            .fetch("http://169.254.169.254/latest/meta-data/")
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::ForbiddenUrl(_)));
        secret.assert_async().await;
    }

    #[tokio::test]
    async fn redirects_are_followed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/old.png")
            .with_status(302)
            .with_header("location", "/new.png")
            .create_async()
            .await;
        server
            .mock("GET", "/new.png")
            .with_status(200)
            .with_body("moved")
            .create_async()
            .await;

        let data = fetcher(1024)
            .fetch(&format!("{}/old.png", server.url()))
            .await
            .unwrap();
        assert_eq!(&data[..], b"moved");
    }

    #[tokio::test]
    async fn redirect_loops_are_cut_off() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/loop.png")
            .with_status(301)
            .with_header("location", "/loop.png")
            .create_async()
            .await;

        let err = fetcher(1024)
            .fetch(&format!("{}/loop.png", server.url()))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::Download { reason, .. } if reason.contains("redirects")));
    }
}
