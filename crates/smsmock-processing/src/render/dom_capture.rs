use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use image::RgbaImage;
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{self, fontdb::Database};
use smsmock_core::{MockupRequest, RendererKind};

use super::icons::HeaderIcon;
use super::{RenderError, RenderOutput, Renderer};
use crate::escape::escape_xml;
use crate::fonts;
use crate::layout::{self, BodyLayout, Frame, Rgb};
use crate::wrap::{truncate_to_width, wrap_text, MonospaceMetrics};

/// Element the capture step locates before rasterizing
pub const ROOT_ELEMENT_ID: &str = "sms-preview";

const MONO_FAMILY: &str = "'Courier New', Courier, monospace";
const TITLE_FAMILY: &str = "'Arial Black', Arial, sans-serif";

/// Builds the mockup as an SVG document and captures it at 2x device scale.
///
/// Text is laid out with [`MonospaceMetrics`] so line breaks do not depend on
/// which faces the host has; glyphs come from the font database, and a database
/// without a matching face simply draws no text.
pub struct DomCaptureRenderer {
    fontdb: Arc<Database>,
}

impl DomCaptureRenderer {
    pub fn new(fontdb: Arc<Database>) -> Self {
        Self { fontdb }
    }

    pub fn from_font_path(font_path: Option<&Path>) -> Result<Self, RenderError> {
        Ok(Self::new(Arc::new(fonts::font_database(font_path)?)))
    }

    /// The mockup document. The root group carries [`ROOT_ELEMENT_ID`].
    pub fn document(&self, request: &MockupRequest) -> String {
        let mut svg = String::with_capacity(8 * 1024);
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = layout::PHONE_WIDTH,
            h = layout::PHONE_HEIGHT,
        );
        let body = layout::BODY;
        let _ = write!(
            svg,
            r#"<defs><clipPath id="body-clip"><rect x="{}" y="{}" width="{}" height="{}"/></clipPath></defs>"#,
            body.x, body.y, body.width, body.height
        );
        let _ = write!(svg, r#"<g id="{}">"#, ROOT_ELEMENT_ID);

        push_rect(&mut svg, &layout::PHONE, layout::PHONE_BG);
        push_rect(&mut svg, &layout::BEZEL, layout::BEZEL_BG);
        push_rect(&mut svg, &layout::SCREEN, layout::SCREEN_BORDER);
        push_rect(&mut svg, &layout::SCREEN_INNER, layout::SCREEN_BG);
        push_rect(&mut svg, &layout::HEADER, layout::HEADER_BG);

        let main = layout::ICON_MAIN.hex();
        let alt = layout::ICON_ALT.hex();
        for icon in HeaderIcon::LEFT.iter().chain(HeaderIcon::RIGHT.iter()) {
            let position = format!(r#"x="{}" y="{}""#, icon.x(), layout::ICON_Y);
            svg.push_str(&icon.svg_element(&position, &main, &alt));
        }

        let title = truncate_to_width(
            request.sender(),
            layout::title_max_width(),
            &MonospaceMetrics::new(layout::TITLE_FONT_SIZE),
        );
        push_text(
            &mut svg,
            TextSpan {
                x: layout::HEADER.center_x(),
                y: layout::baseline(
                    layout::HEADER.y as f32,
                    layout::HEADER.height as f32,
                    layout::TITLE_FONT_SIZE,
                ),
                anchor: "middle",
                family: TITLE_FAMILY,
                size: layout::TITLE_FONT_SIZE,
                weight: 900,
                color: layout::HEADER_TEXT,
            },
            &title,
        );

        svg.push_str(r#"<g clip-path="url(#body-clip)">"#);
        let lines = wrap_text(
            request.message(),
            layout::message_max_width(),
            &MonospaceMetrics::new(layout::MESSAGE_FONT_SIZE),
        );
        let positions = BodyLayout::for_message_lines(lines.len());
        for (line, top) in lines.iter().zip(&positions.message_tops) {
            push_text(
                &mut svg,
                body_span(*top, layout::MESSAGE_LINE_HEIGHT, layout::MESSAGE_FONT_SIZE, 400, layout::MESSAGE_TEXT),
                line,
            );
        }
        let meta = |top: f32, weight: u16, color: Rgb| {
            body_span(top, layout::META_LINE_HEIGHT, layout::META_FONT_SIZE, weight, color)
        };
        push_text(&mut svg, meta(positions.dari_top, 400, layout::MUTED_TEXT), "Dari:");
        push_text(&mut svg, meta(positions.from_top, 700, layout::FROM_TEXT), request.sender());
        push_text(&mut svg, meta(positions.date_top, 700, layout::DATE_TEXT), request.date());
        push_text(&mut svg, meta(positions.time_top, 700, layout::DATE_TEXT), request.time());
        svg.push_str("</g>");

        let bar = layout::BOTTOM_BAR;
        push_rect(&mut svg, &bar, layout::BOTTOM_BG);
        let bar_baseline = layout::baseline(bar.y as f32, bar.height as f32, layout::BOTTOM_FONT_SIZE);
        let menu = |x: f32, anchor: &'static str| TextSpan {
            x,
            y: bar_baseline,
            anchor,
            family: MONO_FAMILY,
            size: layout::BOTTOM_FONT_SIZE,
            weight: 700,
            color: layout::BOTTOM_TEXT,
        };
        push_text(&mut svg, menu((bar.x + layout::BOTTOM_PADDING_X) as f32, "start"), "Pilihan");
        push_text(&mut svg, menu((bar.right() - layout::BOTTOM_PADDING_X) as f32, "end"), "Kembali");

        svg.push_str("</g></svg>");
        svg
    }

    /// Parse `svg`, locate the root element and rasterize it at [`layout::CAPTURE_SCALE`].
    pub fn capture(&self, svg: &str) -> Result<RgbaImage, RenderError> {
        let options = usvg::Options {
            fontdb: self.fontdb.clone(),
            ..usvg::Options::default()
        };
        let tree = usvg::Tree::from_str(svg, &options)
            .map_err(|e| RenderError::Document(e.to_string()))?;

        if tree.node_by_id(ROOT_ELEMENT_ID).is_none() {
            return Err(RenderError::RootNotFound(ROOT_ELEMENT_ID.to_string()));
        }

        let (width, height) = layout::capture_size();
        let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::Surface { width, height })?;
        let transform = Transform::from_scale(layout::CAPTURE_SCALE, layout::CAPTURE_SCALE);
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        pixmap_to_image(&pixmap)
    }
}

impl Renderer for DomCaptureRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::DomCapture
    }

    fn render(&self, request: &MockupRequest) -> Result<RenderOutput, RenderError> {
        let svg = self.document(request);
        let surface = self.capture(&svg)?;
        tracing::debug!(
            width = surface.width(),
            height = surface.height(),
            "Captured mockup document"
        );
        Ok(RenderOutput::Surface(surface))
    }
}

struct TextSpan {
    x: f32,
    y: f32,
    anchor: &'static str,
    family: &'static str,
    size: f32,
    weight: u16,
    color: Rgb,
}

fn body_span(top: f32, line_height: f32, size: f32, weight: u16, color: Rgb) -> TextSpan {
    TextSpan {
        x: layout::TEXT_X as f32,
        y: layout::baseline(top, line_height, size),
        anchor: "start",
        family: MONO_FAMILY,
        size,
        weight,
        color,
    }
}

fn push_rect(svg: &mut String, frame: &Frame, color: Rgb) {
    let _ = write!(
        svg,
        r#"<rect x="{}" y="{}" width="{}" height="{}" rx="{}" fill="{}"/>"#,
        frame.x,
        frame.y,
        frame.width,
        frame.height,
        frame.radius,
        color.hex()
    );
}

fn push_text(svg: &mut String, span: TextSpan, text: &str) {
    if text.is_empty() {
        return;
    }
    let _ = write!(
        svg,
        r#"<text x="{}" y="{}" text-anchor="{}" font-family="{}" font-size="{}" font-weight="{}" fill="{}" xml:space="preserve">{}</text>"#,
        span.x,
        span.y,
        span.anchor,
        span.family,
        span.size,
        span.weight,
        span.color.hex(),
        escape_xml(text)
    );
}

/// tiny-skia stores premultiplied alpha; image buffers are straight.
fn pixmap_to_image(pixmap: &Pixmap) -> Result<RgbaImage, RenderError> {
    let (width, height) = (pixmap.width(), pixmap.height());
    let mut raw = Vec::with_capacity((width * height * 4) as usize);
    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        raw.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
    }
    RgbaImage::from_raw(width, height, raw).ok_or(RenderError::Surface { width, height })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> DomCaptureRenderer {
        DomCaptureRenderer::new(Arc::new(Database::new()))
    }

    fn request() -> MockupRequest {
        MockupRequest::new("Pak Eko", "Kita ga enakan, orang seenaknya").unwrap()
    }

    #[test]
    fn document_has_root_and_escaped_text() {
        let req = MockupRequest::new("A & B", "<b>halo</b>").unwrap();
        let svg = renderer().document(&req);
        assert!(svg.contains(r#"<g id="sms-preview">"#));
        assert!(svg.contains("&lt;b&gt;halo&lt;/b&gt;"));
        assert!(svg.contains("A &amp; B"));
        assert!(svg.contains(">Dari:<"));
        assert!(svg.contains(">08/07/2025<"));
        assert!(svg.contains(">14:55<"));
    }

    #[test]
    fn control_characters_do_not_break_the_document() {
        let req = MockupRequest::new("Pak\u{1}Eko", "Test\u{b}\u{1f}")
            .unwrap()
            .with_date("08/07\u{0}/2025");
        let svg = renderer().document(&req);
        assert!(svg.contains(">PakEko<"));
        assert!(!svg.contains('\u{1}'));

        let output = renderer().render(&req).unwrap();
        assert_eq!(output.as_surface().unwrap().dimensions(), (720, 840));
    }

    #[test]
    fn captures_at_double_scale() {
        let output = renderer().render(&request()).unwrap();
        let surface = output.as_surface().unwrap();
        assert_eq!(surface.dimensions(), (720, 840));

        // Screen background shows through in the message body
        let x = ((layout::BODY.right() - 4) as f32 * layout::CAPTURE_SCALE) as u32;
        let y = ((layout::BODY.bottom() - 4) as f32 * layout::CAPTURE_SCALE) as u32;
        assert_eq!(surface.get_pixel(x, y), &layout::SCREEN_BG.rgba());

        // Header band
        let hx = (layout::HEADER.x as f32 + 2.0) as u32 * 2;
        let hy = (layout::HEADER.y as f32 + 2.0) as u32 * 2;
        assert_eq!(surface.get_pixel(hx, hy), &layout::HEADER_BG.rgba());
    }

    #[test]
    fn phone_corners_are_transparent() {
        let output = renderer().render(&request()).unwrap();
        let surface = output.as_surface().unwrap();
        assert_eq!(surface.get_pixel(0, 0).0[3], 0);
    }

    #[test]
    fn missing_root_is_reported() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"><rect width="10" height="10"/></svg>"#;
        let err = renderer().capture(svg).unwrap_err();
        assert!(matches!(err, RenderError::RootNotFound(id) if id == ROOT_ELEMENT_ID));
    }

    #[test]
    fn malformed_document_is_reported() {
        let err = renderer().capture("<svg").unwrap_err();
        assert!(matches!(err, RenderError::Document(_)));
    }
}
