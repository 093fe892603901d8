use std::io::Cursor;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat as CodecFormat, Rgb, RgbImage, RgbaImage};
use smsmock_core::{AppError, ImageFormat, RenderResult};

use crate::layout::SCREEN_BG;
use crate::render::RenderOutput;

#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    /// The renderer produced a document, not pixels
    #[error("renderer produced no raster surface")]
    NoSurface,

    #[error("surface is empty ({width}x{height})")]
    EmptySurface { width: u32, height: u32 },

    #[error("image backend failed: {0}")]
    Backend(#[from] image::ImageError),
}

impl From<EncodingError> for AppError {
    fn from(err: EncodingError) -> Self {
        match err {
            // Retrying cannot turn a document into pixels
            EncodingError::NoSurface => AppError::Configuration(err.to_string()),
            _ => AppError::Encoding(err.to_string()),
        }
    }
}

/// Map a `[0.1, 1.0]` quality onto the JPEG encoder's `1..=100` scale.
pub fn jpeg_quality(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Encode a rendered surface. `quality` only affects JPEG.
pub fn encode(
    output: &RenderOutput,
    format: ImageFormat,
    quality: f32,
) -> Result<RenderResult, EncodingError> {
    let surface = match output {
        RenderOutput::Surface(surface) => surface,
        RenderOutput::Document(_) => return Err(EncodingError::NoSurface),
    };

    let (width, height) = surface.dimensions();
    if width == 0 || height == 0 {
        return Err(EncodingError::EmptySurface { width, height });
    }

    let data = match format {
        ImageFormat::Png => encode_png(surface)?,
        ImageFormat::Jpeg => encode_jpeg(surface, jpeg_quality(quality))?,
    };

    tracing::debug!(
        format = format.extension(),
        width = width,
        height = height,
        size = data.len(),
        "Encoded mockup surface"
    );

    Ok(RenderResult::new(data, format))
}

fn encode_png(surface: &RgbaImage) -> Result<Bytes, EncodingError> {
    let mut buffer = Vec::new();
    surface.write_to(&mut Cursor::new(&mut buffer), CodecFormat::Png)?;
    Ok(Bytes::from(buffer))
}

fn encode_jpeg(surface: &RgbaImage, quality: u8) -> Result<Bytes, EncodingError> {
    let rgb = flatten(surface, SCREEN_BG.rgba().0);
    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    rgb.write_with_encoder(encoder)?;
    Ok(Bytes::from(buffer))
}

/// Composite onto an opaque background; JPEG carries no alpha channel.
fn flatten(surface: &RgbaImage, background: [u8; 4]) -> RgbImage {
    RgbImage::from_fn(surface.width(), surface.height(), |x, y| {
        let [r, g, b, a] = surface.get_pixel(x, y).0;
        let alpha = a as u32;
        let blend = |fg: u8, bg: u8| ((fg as u32 * alpha + bg as u32 * (255 - alpha)) / 255) as u8;
        Rgb([
            blend(r, background[0]),
            blend(g, background[1]),
            blend(b, background[2]),
        ])
    })
}
