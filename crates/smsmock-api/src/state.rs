//! Application state shared by every handler.

use std::path::Path;

use anyhow::Context;
use smsmock_core::Config;
use smsmock_infra::{CdnUploaders, RemoteFetcher, RetryPolicy};
use smsmock_processing::create_renderer;

use crate::services::mockup::MockupService;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub mockups: MockupService,
    pub uploaders: CdnUploaders,
    pub fetcher: RemoteFetcher,
    pub retry_policy: RetryPolicy,
}

impl AppState {
    pub fn new(
        config: Config,
        mockups: MockupService,
        uploaders: CdnUploaders,
        fetcher: RemoteFetcher,
    ) -> Self {
        let retry_policy = RetryPolicy::from_config(&config);
        Self {
            config,
            mockups,
            uploaders,
            fetcher,
            retry_policy,
        }
    }

    /// Build the renderer, CDN clients and remote fetcher described by `config`.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let font_path = config.font_path.as_deref().map(Path::new);
        let renderer = create_renderer(config.renderer, font_path)
            .context("Failed to initialize mockup renderer")?;
        let mockups = MockupService::new(renderer, font_path)
            .context("Failed to initialize image renderer")?;

        let uploaders = CdnUploaders::from_config(&config)?;
        let fetcher = RemoteFetcher::new(
            config.cdn_timeout(),
            &config.cdn_user_agent,
            config.max_upload_size_bytes,
            config.allow_private_urls,
        )?;

        Ok(Self::new(config, mockups, uploaders, fetcher))
    }
}
