//! CDN relay
//!
//! Forwards encoded images to anonymous public file hosts and normalizes their
//! replies into a single URL. Nothing in here retries; callers wrap uploads in
//! [`crate::retry`] when they want that.

mod client;
mod fetch;
mod provider;
mod ssrf;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use smsmock_core::{AppError, CdnProvider, Config, UploadResult};

pub use client::CdnClient;
pub use fetch::RemoteFetcher;
pub use provider::normalize_cdn_response;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("CDN returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed CDN response: {0}")]
    MalformedResponse(String),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("download from {url} failed: {reason}")]
    Download { url: String, reason: String },

    #[error("payload of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },

    #[error("{0}")]
    ForbiddenUrl(String),
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::TooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            UploadError::ForbiddenUrl(reason) => AppError::InvalidInput(reason),
            _ => AppError::Upload(err.to_string()),
        }
    }
}

/// Destination for an encoded image
#[async_trait]
pub trait Uploader: Send + Sync {
    fn provider(&self) -> CdnProvider;

    async fn upload(
        &self,
        data: Bytes,
        filename: &str,
        mime_type: &str,
    ) -> Result<UploadResult, UploadError>;
}

/// One uploader per provider plus the configured default
#[derive(Clone)]
pub struct CdnUploaders {
    default_provider: CdnProvider,
    uguu: Arc<dyn Uploader>,
    catbox: Arc<dyn Uploader>,
}

impl CdnUploaders {
    pub fn new(
        default_provider: CdnProvider,
        uguu: Arc<dyn Uploader>,
        catbox: Arc<dyn Uploader>,
    ) -> Self {
        Self {
            default_provider,
            uguu,
            catbox,
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = |provider| -> anyhow::Result<Arc<dyn Uploader>> {
            Ok(Arc::new(CdnClient::new(
                provider,
                config.upload_endpoint(provider),
                config.cdn_timeout(),
                &config.cdn_user_agent,
            )?))
        };
        Ok(Self::new(
            config.cdn_provider,
            client(CdnProvider::Uguu)?,
            client(CdnProvider::Catbox)?,
        ))
    }

    pub fn default_provider(&self) -> CdnProvider {
        self.default_provider
    }

    /// Uploader for `provider`, or for the default provider when `None`
    pub fn get(&self, provider: Option<CdnProvider>) -> Arc<dyn Uploader> {
        match provider.unwrap_or(self.default_provider) {
            CdnProvider::Uguu => self.uguu.clone(),
            CdnProvider::Catbox => self.catbox.clone(),
        }
    }
}
