use bytes::Bytes;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_DATE: &str = "08/07/2025";
pub const DEFAULT_TIME: &str = "14:55";
pub const DEFAULT_QUALITY: f32 = 0.9;
pub const MIN_QUALITY: f32 = 0.1;
pub const MAX_QUALITY: f32 = 1.0;

/// Clamp a requested quality into `[MIN_QUALITY, MAX_QUALITY]`.
///
/// NaN carries no usable value and resolves to [`DEFAULT_QUALITY`].
pub fn clamp_quality(quality: f32) -> f32 {
    if quality.is_nan() {
        return DEFAULT_QUALITY;
    }
    quality.clamp(MIN_QUALITY, MAX_QUALITY)
}

/// Output image format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
}

impl ImageFormat {
    /// Case-insensitive match on `png`, `jpeg` and `jpg`. Anything else is png.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "jpeg" | "jpg" => ImageFormat::Jpeg,
            _ => ImageFormat::Png,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
        }
    }
}

/// How the mockup is handed back to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseMode {
    /// The HTML document itself
    Html,
    /// Image bytes shown in the browser (`Content-Disposition: inline`)
    #[default]
    ImageInline,
    /// Image bytes as a download (`Content-Disposition: attachment`)
    ImageBytes,
    /// JSON envelope with the base64 image and the CDN URL
    JsonWithCdnUrl,
}

impl ResponseMode {
    pub fn is_image(self) -> bool {
        matches!(self, ResponseMode::ImageInline | ResponseMode::ImageBytes)
    }
}

/// Validated parameters of one mockup render.
///
/// Built through [`crate::resolve_mockup_request`] or [`MockupRequest::new`]; the
/// `with_*` methods consume and return the value so a constructed request is never
/// mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MockupRequest {
    sender: String,
    message: String,
    date: String,
    time: String,
    format: ImageFormat,
    quality: f32,
    mode: ResponseMode,
}

impl MockupRequest {
    /// Returns `None` when `sender` or `message` is empty after trimming.
    pub fn new(sender: impl Into<String>, message: impl Into<String>) -> Option<Self> {
        let sender = sender.into();
        let message = message.into();
        if sender.trim().is_empty() || message.trim().is_empty() {
            return None;
        }
        Some(Self {
            sender,
            message,
            date: DEFAULT_DATE.to_string(),
            time: DEFAULT_TIME.to_string(),
            format: ImageFormat::Png,
            quality: DEFAULT_QUALITY,
            mode: ResponseMode::ImageInline,
        })
    }

    /// Empty values keep the default date.
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        let date = date.into();
        if !date.trim().is_empty() {
            self.date = date;
        }
        self
    }

    /// Empty values keep the default time.
    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        let time = time.into();
        if !time.trim().is_empty() {
            self.time = time;
        }
        self
    }

    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_quality(mut self, quality: f32) -> Self {
        self.quality = clamp_quality(quality);
        self
    }

    pub fn with_mode(mut self, mode: ResponseMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn time(&self) -> &str {
        &self.time
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }

    pub fn mode(&self) -> ResponseMode {
        self.mode
    }

    /// Lowercased sender reduced to `[a-z0-9_]` words joined by `-`.
    ///
    /// Anything else (whitespace, quotes, path separators, non-ASCII) splits words,
    /// so the slug is safe both in a quoted header value and as a file name.
    pub fn sender_slug(&self) -> String {
        let slug = self
            .sender
            .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .filter(|part| !part.is_empty())
            .map(str::to_ascii_lowercase)
            .collect::<Vec<_>>()
            .join("-");
        if slug.is_empty() {
            "sender".to_string()
        } else {
            slug
        }
    }

    /// `sms-<sender-slug>-<millis>.<ext>`
    pub fn filename_at(&self, unix_millis: i64) -> String {
        format!(
            "sms-{}-{}.{}",
            self.sender_slug(),
            unix_millis,
            self.format.extension()
        )
    }

    pub fn filename(&self) -> String {
        self.filename_at(chrono::Utc::now().timestamp_millis())
    }
}

/// Encoded mockup produced by the image encoder
#[derive(Debug, Clone)]
pub struct RenderResult {
    pub encoded_bytes: Bytes,
    pub mime_type: &'static str,
    pub size_bytes: usize,
}

impl RenderResult {
    pub fn new(encoded_bytes: Bytes, format: ImageFormat) -> Self {
        let size_bytes = encoded_bytes.len();
        Self {
            encoded_bytes,
            mime_type: format.mime_type(),
            size_bytes,
        }
    }
}

/// Rendering strategy selected at process start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RendererKind {
    /// HTML/CSS string template
    Html,
    /// Direct painting onto a raster surface
    Raster,
    /// Document build + rasterization at 2x device scale
    DomCapture,
}

impl RendererKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "html" => Some(RendererKind::Html),
            "raster" | "canvas" => Some(RendererKind::Raster),
            "dom-capture" | "dom_capture" | "dom" => Some(RendererKind::DomCapture),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RendererKind::Html => "html",
            RendererKind::Raster => "raster",
            RendererKind::DomCapture => "dom-capture",
        }
    }

    /// Whether the strategy produces a pixel surface the encoder can consume
    pub fn produces_surface(self) -> bool {
        !matches!(self, RendererKind::Html)
    }
}
