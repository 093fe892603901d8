use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use smsmock_core::{CdnProvider, UploadResult};

use super::provider::normalize_cdn_response;
use super::{UploadError, Uploader};

/// Longest slice of an error body kept in [`UploadError::Status`]
const MAX_ERROR_BODY: usize = 300;

/// `multipart/form-data` uploader for one CDN provider
#[derive(Clone)]
pub struct CdnClient {
    http_client: Client,
    provider: CdnProvider,
    endpoint: String,
}

impl CdnClient {
    pub fn new(
        provider: CdnProvider,
        endpoint: &str,
        timeout: Duration,
        user_agent: &str,
    ) -> anyhow::Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .with_context(|| format!("Failed to create HTTP client for {}", provider))?;

        Ok(Self {
            http_client,
            provider,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn form(&self, data: Bytes, filename: &str, mime_type: &str) -> Result<Form, UploadError> {
        let part = Part::bytes(data.to_vec())
            .file_name(filename.to_string())
            .mime_str(mime_type)?;

        let form = self
            .provider
            .extra_fields()
            .iter()
            .fold(Form::new(), |form, (name, value)| form.text(*name, *value));

        Ok(form.part(self.provider.file_field(), part))
    }
}

#[async_trait]
impl Uploader for CdnClient {
    fn provider(&self) -> CdnProvider {
        self.provider
    }

    #[tracing::instrument(skip(self, data), fields(provider = %self.provider, size = data.len()))]
    async fn upload(
        &self,
        data: Bytes,
        filename: &str,
        mime_type: &str,
    ) -> Result<UploadResult, UploadError> {
        let form = self.form(data, filename, mime_type)?;

        let response = self
            .http_client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let body: String = body.trim().chars().take(MAX_ERROR_BODY).collect();
            tracing::warn!(status = %status, body = %body, "CDN rejected upload");
            return Err(UploadError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let url = normalize_cdn_response(&body)?;
        tracing::info!(url = %url, "Uploaded image to CDN");

        Ok(UploadResult {
            url,
            provider: self.provider,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

    fn client(provider: CdnProvider, endpoint: String) -> CdnClient {
        CdnClient::new(provider, &endpoint, Duration::from_secs(5), UA).unwrap()
    }

    #[tokio::test]
    async fn uguu_upload_reads_json_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/upload.php")
            .match_header("user-agent", UA)
            .match_header("content-type", Matcher::Regex("multipart/form-data".to_string()))
            .match_body(Matcher::Regex(r#"name="files\[\]"; filename="sms.png""#.to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success":true,"files":[{"url":"https://a.uguu.se/xyz.png"}]}"#)
            .create_async()
            .await;

        let uploader = client(CdnProvider::Uguu, format!("{}/upload.php", server.url()));
        let result = uploader
            .upload(Bytes::from_static(b"\x89PNGdata"), "sms.png", "image/png")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result.url, "https://a.uguu.se/xyz.png");
        assert_eq!(result.provider, CdnProvider::Uguu);
    }

    #[tokio::test]
    async fn catbox_upload_sends_reqtype_and_reads_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/user/api.php")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="reqtype""#.to_string()),
                Matcher::Regex("fileupload".to_string()),
                Matcher::Regex(r#"name="fileToUpload"; filename="a.jpeg""#.to_string()),
            ]))
            .with_status(200)
            .with_body("https://files.catbox.moe/abc123.jpeg")
            .create_async()
            .await;

        let uploader = client(CdnProvider::Catbox, format!("{}/user/api.php", server.url()));
        let result = uploader
            .upload(Bytes::from_static(b"\xff\xd8\xff"), "a.jpeg", "image/jpeg")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result.url, "https://files.catbox.moe/abc123.jpeg");
    }

    #[tokio::test]
    async fn non_success_status_is_reported_with_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/upload.php")
            .with_status(503)
            .with_body("Service Unavailable")
            .create_async()
            .await;

        let uploader = client(CdnProvider::Uguu, format!("{}/upload.php", server.url()));
        let err = uploader
            .upload(Bytes::from_static(b"x"), "x.png", "image/png")
            .await
            .unwrap_err();

        match err {
            UploadError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "Service Unavailable");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn garbage_body_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/upload.php")
            .with_status(200)
            .with_body("No input file(s)")
            .create_async()
            .await;

        let uploader = client(CdnProvider::Uguu, format!("{}/upload.php", server.url()));
        let err = uploader
            .upload(Bytes::from_static(b"x"), "x.png", "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::MalformedResponse(_)));
    }
}
