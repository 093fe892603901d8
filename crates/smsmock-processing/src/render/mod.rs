//! Rendering strategies
//!
//! A [`Renderer`] turns a [`MockupRequest`] into either an HTML document or a raw
//! RGBA surface. The concrete strategy is picked once at start-up by
//! [`create_renderer`] and shared behind an `Arc` for the life of the process.

mod dom_capture;
mod html;
mod icons;
mod raster;

use std::path::Path;
use std::sync::Arc;

use image::RgbaImage;
use smsmock_core::{AppError, MockupRequest, RendererKind};

pub use dom_capture::{DomCaptureRenderer, ROOT_ELEMENT_ID};
pub use html::HtmlRenderer;
pub use icons::HeaderIcon;
pub use raster::RasterRenderer;

/// What a renderer hands to the encoder
#[derive(Debug, Clone)]
pub enum RenderOutput {
    /// Complete HTML document
    Document(String),
    /// Pixels, not premultiplied
    Surface(RgbaImage),
}

impl RenderOutput {
    pub fn as_document(&self) -> Option<&str> {
        match self {
            RenderOutput::Document(html) => Some(html),
            RenderOutput::Surface(_) => None,
        }
    }

    pub fn as_surface(&self) -> Option<&RgbaImage> {
        match self {
            RenderOutput::Surface(surface) => Some(surface),
            RenderOutput::Document(_) => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("no usable font: {0}")]
    FontUnavailable(String),

    #[error("rendering root element '{0}' not found in document")]
    RootNotFound(String),

    #[error("invalid mockup document: {0}")]
    Document(String),

    #[error("cannot allocate a {width}x{height} surface")]
    Surface { width: u32, height: u32 },
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        AppError::Render(err.to_string())
    }
}

/// Capability shared by all rendering strategies
pub trait Renderer: Send + Sync {
    fn kind(&self) -> RendererKind;

    fn render(&self, request: &MockupRequest) -> Result<RenderOutput, RenderError>;
}

/// Build the configured strategy.
///
/// Font discovery happens here, once, so a bad `font_path` fails start-up rather
/// than every request.
pub fn create_renderer(
    kind: RendererKind,
    font_path: Option<&Path>,
) -> Result<Arc<dyn Renderer>, RenderError> {
    let renderer: Arc<dyn Renderer> = match kind {
        RendererKind::Html => Arc::new(HtmlRenderer::new()),
        RendererKind::Raster => Arc::new(RasterRenderer::from_font_path(font_path)?),
        RendererKind::DomCapture => Arc::new(DomCaptureRenderer::from_font_path(font_path)?),
    };

    tracing::info!(renderer = kind.as_str(), "Mockup renderer initialized");
    Ok(renderer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_html_renderer() {
        let renderer = create_renderer(RendererKind::Html, None).unwrap();
        assert_eq!(renderer.kind(), RendererKind::Html);
    }

    #[test]
    fn test_create_dom_capture_renderer() {
        let renderer = create_renderer(RendererKind::DomCapture, None).unwrap();
        assert_eq!(renderer.kind(), RendererKind::DomCapture);
    }

    #[test]
    fn test_bad_font_path_fails_construction() {
        let result = create_renderer(
            RendererKind::Raster,
            Some(Path::new("/nonexistent/font.ttf")),
        );
        assert!(matches!(result, Err(RenderError::FontUnavailable(_))));
    }

    #[test]
    fn test_render_error_maps_to_recoverable_app_error() {
        use smsmock_core::ErrorMetadata;

        let err: AppError = RenderError::RootNotFound(ROOT_ELEMENT_ID.to_string()).into();
        assert_eq!(err.error_code(), "RENDER_ERROR");
        assert!(err.is_recoverable());
    }
}
