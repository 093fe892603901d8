//! Mockup pipeline: render → encode → (optional) upload under the retry wrapper.

use std::path::Path;
use std::sync::Arc;

use smsmock_core::{AppError, MockupRequest, RenderResult, RendererKind, UploadResult};
use smsmock_infra::{retry, RetryPolicy, Uploader};
use smsmock_processing::{create_renderer, encode, HtmlRenderer, RenderError, Renderer};

#[derive(Clone)]
pub struct MockupService {
    /// Strategy selected by `MOCKUP_RENDERER`
    renderer: Arc<dyn Renderer>,
    /// Surface-producing strategy used whenever image bytes are needed
    image_renderer: Arc<dyn Renderer>,
    html: HtmlRenderer,
}

impl MockupService {
    /// When the configured strategy only produces documents, images fall back to
    /// DOM capture.
    pub fn new(renderer: Arc<dyn Renderer>, font_path: Option<&Path>) -> Result<Self, RenderError> {
        let image_renderer = if renderer.kind().produces_surface() {
            renderer.clone()
        } else {
            create_renderer(RendererKind::DomCapture, font_path)?
        };
        Ok(Self::with_renderers(renderer, image_renderer))
    }

    pub fn with_renderers(renderer: Arc<dyn Renderer>, image_renderer: Arc<dyn Renderer>) -> Self {
        Self {
            renderer,
            image_renderer,
            html: HtmlRenderer::new(),
        }
    }

    pub fn renderer_kind(&self) -> RendererKind {
        self.renderer.kind()
    }

    /// GET requests answer with the HTML document instead of image bytes
    pub fn serves_html(&self) -> bool {
        !self.renderer.kind().produces_surface()
    }

    pub fn html_document(&self, request: &MockupRequest) -> String {
        self.html.document(request)
    }

    /// One render + encode pass on the blocking pool.
    pub async fn render_image(&self, request: &MockupRequest) -> Result<RenderResult, AppError> {
        let renderer = self.image_renderer.clone();
        let request = request.clone();

        tokio::task::spawn_blocking(move || -> Result<RenderResult, AppError> {
            let output = renderer.render(&request)?;
            Ok(encode(&output, request.format(), request.quality())?)
        })
        .await
        .map_err(|e| AppError::Internal(format!("Render task failed: {}", e)))?
    }

    /// Render and encode, retrying recoverable failures.
    pub async fn render_with_retry(
        &self,
        request: &MockupRequest,
        policy: RetryPolicy,
    ) -> Result<RenderResult, AppError> {
        retry(policy, "render_mockup", |_| self.render_image(request)).await
    }

    /// Render, encode and upload as one retried unit; a failed upload re-runs the render.
    pub async fn render_and_upload(
        &self,
        request: &MockupRequest,
        filename: &str,
        uploader: Arc<dyn Uploader>,
        policy: RetryPolicy,
    ) -> Result<(RenderResult, UploadResult), AppError> {
        retry(policy, "render_and_upload", |attempt| {
            let uploader = uploader.clone();
            async move {
                let rendered = self.render_image(request).await?;
                tracing::debug!(
                    attempt,
                    provider = %uploader.provider(),
                    size = rendered.size_bytes,
                    "Uploading rendered mockup"
                );
                let uploaded = uploader
                    .upload(rendered.encoded_bytes.clone(), filename, rendered.mime_type)
                    .await?;
                Ok::<_, AppError>((rendered, uploaded))
            }
        })
        .await
    }
}
