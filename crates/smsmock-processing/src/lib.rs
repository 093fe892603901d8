//! Mockup rendering and image encoding
//!
//! Three interchangeable [`Renderer`] strategies draw the phone mockup: an HTML
//! template, direct raster painting and an SVG document rasterized at 2x. The
//! [`encoder`] turns a rendered surface into PNG or JPEG bytes.

pub mod encoder;
pub mod escape;
pub mod fonts;
pub mod layout;
pub mod render;
pub mod wrap;

pub use encoder::{encode, EncodingError};
pub use escape::{escape_html, escape_xml};
pub use render::{
    create_renderer, DomCaptureRenderer, HtmlRenderer, RasterRenderer, RenderError,
    RenderOutput, Renderer,
};
pub use wrap::{wrap_text, GlyphMetrics, MonospaceMetrics, TextMeasure};
