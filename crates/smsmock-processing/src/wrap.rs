//! Greedy word wrapping
//!
//! Words are appended to the current line while its measured width stays within
//! the limit. A word that does not fit starts a new line; a word wider than the
//! limit on its own still gets its own line rather than being split. Explicit
//! newlines start a new paragraph, and an empty paragraph yields an empty line,
//! matching `white-space: pre-line`.

use ab_glyph::{Font, PxScale, ScaleFont};

/// Measures the rendered width of a run of text in pixels.
pub trait TextMeasure {
    fn width(&self, text: &str) -> f32;
}

/// Fixed advance per character, approximating a monospace face.
#[derive(Debug, Clone, Copy)]
pub struct MonospaceMetrics {
    pub font_size: f32,
}

impl MonospaceMetrics {
    /// Courier New advances 0.6 em per glyph.
    pub const ADVANCE_EM: f32 = 0.6;

    pub fn new(font_size: f32) -> Self {
        Self { font_size }
    }
}

impl TextMeasure for MonospaceMetrics {
    fn width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.font_size * Self::ADVANCE_EM
    }
}

/// Exact advances (with kerning) taken from a loaded font.
pub struct GlyphMetrics<'a, F: Font> {
    font: &'a F,
    scale: PxScale,
}

impl<'a, F: Font> GlyphMetrics<'a, F> {
    pub fn new(font: &'a F, font_size: f32) -> Self {
        Self {
            font,
            scale: PxScale::from(font_size),
        }
    }
}

impl<F: Font> TextMeasure for GlyphMetrics<'_, F> {
    fn width(&self, text: &str) -> f32 {
        let scaled = self.font.as_scaled(self.scale);
        let mut width = 0.0;
        let mut previous = None;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = previous {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            previous = Some(id);
        }
        width
    }
}

/// Break `text` into lines no wider than `max_width`.
pub fn wrap_text(text: &str, max_width: f32, measure: &impl TextMeasure) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();

        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }

            let candidate = format!("{} {}", current, word);
            if measure.width(&candidate) <= max_width {
                current = candidate;
            } else {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            }
        }

        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

/// Shorten `text` with a trailing ellipsis until it fits `max_width`.
pub fn truncate_to_width(text: &str, max_width: f32, measure: &impl TextMeasure) -> String {
    if measure.width(text) <= max_width {
        return text.to_string();
    }

    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate = format!("{}…", chars.iter().collect::<String>().trim_end());
        if measure.width(&candidate) <= max_width {
            return candidate;
        }
    }
    String::new()
}
