use std::path::Path;

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_circle_mut,
    draw_line_segment_mut, draw_text_mut,
};
use imageproc::rect::Rect;
use smsmock_core::{MockupRequest, RendererKind};

use super::icons::HeaderIcon;
use super::{RenderError, RenderOutput, Renderer};
use crate::fonts;
use crate::layout::{self, BodyLayout, Frame, Rgb};
use crate::wrap::{truncate_to_width, wrap_text, GlyphMetrics, TextMeasure};

/// Paints the mockup directly onto a 360x420 RGBA surface.
pub struct RasterRenderer {
    font: Option<FontVec>,
}

impl RasterRenderer {
    pub fn new(font: FontVec) -> Self {
        Self { font: Some(font) }
    }

    /// Use the face at `font_path`, or the best system face when `None`.
    ///
    /// An unreadable explicit path is an error. A host without any fonts yields a
    /// renderer whose every render fails with [`RenderError::FontUnavailable`].
    pub fn from_font_path(font_path: Option<&Path>) -> Result<Self, RenderError> {
        let db = fonts::font_database(font_path)?;
        match fonts::glyph_font(&db) {
            Ok(font) => Ok(Self::new(font)),
            Err(err) if font_path.is_none() => {
                tracing::warn!(error = %err, "No system font found for raster rendering");
                Ok(Self { font: None })
            }
            Err(err) => Err(err),
        }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    fn paint(&self, font: &FontVec, request: &MockupRequest) -> RgbaImage {
        let mut canvas = RgbaImage::new(layout::PHONE_WIDTH, layout::PHONE_HEIGHT);
        let text = TextPainter { font };

        fill_rounded(&mut canvas, &layout::PHONE, layout::PHONE_BG);
        fill_rounded(&mut canvas, &layout::BEZEL, layout::BEZEL_BG);
        fill_rounded(&mut canvas, &layout::SCREEN, layout::SCREEN_BORDER);
        fill_rounded(&mut canvas, &layout::SCREEN_INNER, layout::SCREEN_BG);
        fill_rounded(&mut canvas, &layout::HEADER, layout::HEADER_BG);

        for icon in HeaderIcon::LEFT.iter().chain(HeaderIcon::RIGHT.iter()) {
            paint_icon(&mut canvas, *icon);
        }

        let title_metrics = GlyphMetrics::new(font, layout::TITLE_FONT_SIZE);
        let title = truncate_to_width(request.sender(), layout::title_max_width(), &title_metrics);
        let title_x = layout::HEADER.center_x() - title_metrics.width(&title) / 2.0;
        text.draw(
            &mut canvas,
            &title,
            title_x,
            layout::baseline(
                layout::HEADER.y as f32,
                layout::HEADER.height as f32,
                layout::TITLE_FONT_SIZE,
            ),
            layout::TITLE_FONT_SIZE,
            layout::HEADER_TEXT,
        );

        let message_metrics = GlyphMetrics::new(font, layout::MESSAGE_FONT_SIZE);
        let lines = wrap_text(request.message(), layout::message_max_width(), &message_metrics);
        let positions = BodyLayout::for_message_lines(lines.len());
        let x = layout::TEXT_X as f32;
        for (line, top) in lines.iter().zip(&positions.message_tops) {
            let baseline = layout::baseline(*top, layout::MESSAGE_LINE_HEIGHT, layout::MESSAGE_FONT_SIZE);
            text.draw(&mut canvas, line, x, baseline, layout::MESSAGE_FONT_SIZE, layout::MESSAGE_TEXT);
        }

        let meta_baseline = |top| layout::baseline(top, layout::META_LINE_HEIGHT, layout::META_FONT_SIZE);
        for (value, top, color) in [
            ("Dari:", positions.dari_top, layout::MUTED_TEXT),
            (request.sender(), positions.from_top, layout::FROM_TEXT),
            (request.date(), positions.date_top, layout::DATE_TEXT),
            (request.time(), positions.time_top, layout::DATE_TEXT),
        ] {
            text.draw(&mut canvas, value, x, meta_baseline(top), layout::META_FONT_SIZE, color);
        }

        // Painted last so overflowing body text is hidden under the bar
        let bar = layout::BOTTOM_BAR;
        fill_rounded(&mut canvas, &bar, layout::BOTTOM_BG);
        let bar_baseline = layout::baseline(bar.y as f32, bar.height as f32, layout::BOTTOM_FONT_SIZE);
        let menu_metrics = GlyphMetrics::new(font, layout::BOTTOM_FONT_SIZE);
        text.draw(
            &mut canvas,
            "Pilihan",
            (bar.x + layout::BOTTOM_PADDING_X) as f32,
            bar_baseline,
            layout::BOTTOM_FONT_SIZE,
            layout::BOTTOM_TEXT,
        );
        text.draw(
            &mut canvas,
            "Kembali",
            (bar.right() - layout::BOTTOM_PADDING_X) as f32 - menu_metrics.width("Kembali"),
            bar_baseline,
            layout::BOTTOM_FONT_SIZE,
            layout::BOTTOM_TEXT,
        );

        canvas
    }
}

impl Renderer for RasterRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Raster
    }

    fn render(&self, request: &MockupRequest) -> Result<RenderOutput, RenderError> {
        let font = self
            .font
            .as_ref()
            .ok_or_else(|| RenderError::FontUnavailable("no system font installed".to_string()))?;
        Ok(RenderOutput::Surface(self.paint(font, request)))
    }
}

struct TextPainter<'a> {
    font: &'a FontVec,
}

impl TextPainter<'_> {
    /// Draw `text` with its baseline at `baseline`.
    fn draw(&self, canvas: &mut RgbaImage, text: &str, x: f32, baseline: f32, size: f32, color: Rgb) {
        if text.is_empty() {
            return;
        }
        let scale = PxScale::from(size);
        let ascent = self.font.as_scaled(scale).ascent();
        draw_text_mut(
            canvas,
            color.rgba(),
            x.round() as i32,
            (baseline - ascent).round() as i32,
            scale,
            self.font,
            text,
        );
    }
}

/// Filled box with circular corners
fn fill_rounded(canvas: &mut RgbaImage, frame: &Frame, color: Rgb) {
    let color = color.rgba();
    let r = frame.radius.min(frame.width / 2).min(frame.height / 2);
    if r == 0 {
        draw_filled_rect_mut(canvas, Rect::at(frame.x, frame.y).of_size(frame.width, frame.height), color);
        return;
    }

    let ri = r as i32;
    draw_filled_rect_mut(
        canvas,
        Rect::at(frame.x + ri, frame.y).of_size(frame.width - 2 * r, frame.height),
        color,
    );
    draw_filled_rect_mut(
        canvas,
        Rect::at(frame.x, frame.y + ri).of_size(frame.width, frame.height - 2 * r),
        color,
    );
    for (cx, cy) in [
        (frame.x + ri, frame.y + ri),
        (frame.right() - ri - 1, frame.y + ri),
        (frame.x + ri, frame.bottom() - ri - 1),
        (frame.right() - ri - 1, frame.bottom() - ri - 1),
    ] {
        draw_filled_circle_mut(canvas, (cx, cy), ri, color);
    }
}

/// Maps icon view box units onto the 20px header slot.
struct IconPen {
    origin_x: f32,
    origin_y: f32,
    scale: f32,
}

impl IconPen {
    fn for_icon(icon: HeaderIcon) -> Self {
        let size = layout::ICON_SIZE as f32;
        let (vw, vh) = icon.view_box();
        let scale = (size / vw).min(size / vh);
        Self {
            origin_x: icon.x() as f32 + (size - vw * scale) / 2.0,
            origin_y: layout::ICON_Y as f32 + (size - vh * scale) / 2.0,
            scale,
        }
    }

    fn point(&self, x: f32, y: f32) -> (f32, f32) {
        (self.origin_x + x * self.scale, self.origin_y + y * self.scale)
    }

    fn fill_rect(&self, canvas: &mut RgbaImage, x: f32, y: f32, w: f32, h: f32, color: Rgba<u8>) {
        let (px, py) = self.point(x, y);
        let width = (w * self.scale).round().max(1.0) as u32;
        let height = (h * self.scale).round().max(1.0) as u32;
        draw_filled_rect_mut(
            canvas,
            Rect::at(px.round() as i32, py.round() as i32).of_size(width, height),
            color,
        );
    }

    /// Two-unit stroke, drawn as a pair of one-pixel lines
    fn line(&self, canvas: &mut RgbaImage, from: (f32, f32), to: (f32, f32), color: Rgba<u8>) {
        let a = self.point(from.0, from.1);
        let b = self.point(to.0, to.1);
        draw_line_segment_mut(canvas, a, b, color);
        let horizontal = (b.0 - a.0).abs() >= (b.1 - a.1).abs();
        let (dx, dy) = if horizontal { (0.0, 1.0) } else { (1.0, 0.0) };
        draw_line_segment_mut(canvas, (a.0 + dx, a.1 + dy), (b.0 + dx, b.1 + dy), color);
    }

    fn stroke_rect(&self, canvas: &mut RgbaImage, x: f32, y: f32, w: f32, h: f32, color: Rgba<u8>) {
        self.line(canvas, (x, y), (x + w, y), color);
        self.line(canvas, (x, y + h - 1.0), (x + w, y + h - 1.0), color);
        self.line(canvas, (x, y), (x, y + h), color);
        self.line(canvas, (x + w - 1.0, y), (x + w - 1.0, y + h), color);
    }

    fn circle(&self, canvas: &mut RgbaImage, cx: f32, cy: f32, r: f32, color: Rgba<u8>) {
        let (px, py) = self.point(cx, cy);
        let radius = (r * self.scale).round() as i32;
        let center = (px.round() as i32, py.round() as i32);
        draw_hollow_circle_mut(canvas, center, radius, color);
        draw_hollow_circle_mut(canvas, center, radius - 1, color);
    }
}

fn paint_icon(canvas: &mut RgbaImage, icon: HeaderIcon) {
    let pen = IconPen::for_icon(icon);
    let main = layout::ICON_MAIN.rgba();
    let alt = layout::ICON_ALT.rgba();

    match icon {
        HeaderIcon::Signal => {
            pen.fill_rect(canvas, 2.0, 16.0, 2.0, 6.0, main);
            pen.fill_rect(canvas, 6.0, 12.0, 2.0, 10.0, main);
            pen.fill_rect(canvas, 10.0, 8.0, 2.0, 14.0, alt);
            pen.fill_rect(canvas, 14.0, 4.0, 2.0, 18.0, alt);
        }
        HeaderIcon::Envelope => {
            pen.stroke_rect(canvas, 2.0, 6.0, 20.0, 12.0, main);
            pen.line(canvas, (2.0, 6.0), (12.0, 13.0), alt);
            pen.line(canvas, (12.0, 13.0), (22.0, 6.0), alt);
        }
        HeaderIcon::Alarm => {
            pen.circle(canvas, 12.0, 13.0, 6.0, main);
            pen.line(canvas, (12.0, 13.0), (12.0, 9.0), alt);
            pen.line(canvas, (12.0, 13.0), (15.0, 13.0), alt);
        }
        HeaderIcon::Vibrate => {
            pen.stroke_rect(canvas, 8.0, 6.0, 8.0, 12.0, main);
            pen.line(canvas, (2.0, 8.0), (5.0, 10.0), alt);
            pen.line(canvas, (2.0, 14.0), (5.0, 12.0), alt);
            pen.line(canvas, (22.0, 8.0), (19.0, 10.0), alt);
            pen.line(canvas, (22.0, 14.0), (19.0, 12.0), alt);
        }
        HeaderIcon::Battery => {
            pen.stroke_rect(canvas, 1.0, 3.0, 20.0, 8.0, main);
            pen.fill_rect(canvas, 22.0, 5.0, 3.0, 4.0, main);
            pen.fill_rect(canvas, 3.0, 5.0, 14.0, 4.0, alt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> Option<RasterRenderer> {
        RasterRenderer::from_font_path(None)
            .ok()
            .filter(RasterRenderer::has_font)
    }

    fn request() -> MockupRequest {
        MockupRequest::new("Pak Eko", "Kita ga enakan, orang seenaknya").unwrap()
    }

    #[test]
    fn fontless_renderer_reports_font_unavailable() {
        let renderer = RasterRenderer { font: None };
        let err = renderer.render(&request()).unwrap_err();
        assert!(matches!(err, RenderError::FontUnavailable(_)));
    }

    #[test]
    fn paints_phone_frame() {
        // Hosts without any installed font cannot paint text
        let Some(renderer) = renderer() else {
            return;
        };
        let output = renderer.render(&request()).unwrap();
        let surface = output.as_surface().unwrap();
        assert_eq!(surface.dimensions(), (layout::PHONE_WIDTH, layout::PHONE_HEIGHT));

        assert_eq!(surface.get_pixel(0, 0).0[3], 0);
        assert_eq!(surface.get_pixel(6, 200), &layout::PHONE_BG.rgba());
        assert_eq!(surface.get_pixel(38, 49), &layout::HEADER_BG.rgba());
        assert_eq!(
            surface.get_pixel((layout::BODY.right() - 3) as u32, (layout::BODY.bottom() - 3) as u32),
            &layout::SCREEN_BG.rgba()
        );
        assert_eq!(
            surface.get_pixel((layout::BOTTOM_BAR.x + 2) as u32, (layout::BOTTOM_BAR.y + 2) as u32),
            &layout::BOTTOM_BG.rgba()
        );
    }

    #[test]
    fn message_text_changes_body_pixels() {
        let Some(renderer) = renderer() else {
            return;
        };
        let output = renderer.render(&request()).unwrap();
        let surface = output.as_surface().unwrap();
        let screen = layout::SCREEN_BG.rgba();
        let top = layout::TEXT_TOP as u32;
        let inked = (layout::TEXT_X as u32..layout::TEXT_X as u32 + 120)
            .flat_map(|x| (top..top + layout::MESSAGE_LINE_HEIGHT as u32).map(move |y| (x, y)))
            .any(|(x, y)| surface.get_pixel(x, y) != &screen);
        assert!(inked);
    }

    #[test]
    fn icon_pen_keeps_battery_aspect() {
        let pen = IconPen::for_icon(HeaderIcon::Battery);
        assert!(pen.origin_y > layout::ICON_Y as f32);
        let (x, _) = pen.point(26.0, 0.0);
        assert!((x - (HeaderIcon::Battery.x() + layout::ICON_SIZE as i32) as f32).abs() < 0.01);
    }
}
