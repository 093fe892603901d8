//! Font discovery for the rendering strategies
//!
//! No face is bundled with the binary. The database holds the system fonts plus
//! an optional operator-supplied file, which is then promoted to every generic
//! family so both the raster and SVG paths draw with it.

use std::path::Path;

use ab_glyph::FontVec;
use resvg::usvg::fontdb::{Database, Family, Query};

use crate::render::RenderError;

/// Build the font database. A configured `font_path` that cannot be read is an error.
pub fn font_database(font_path: Option<&Path>) -> Result<Database, RenderError> {
    let mut db = Database::new();
    db.load_system_fonts();

    if let Some(path) = font_path {
        let data = std::fs::read(path).map_err(|e| {
            RenderError::FontUnavailable(format!("cannot read {}: {}", path.display(), e))
        })?;

        let before = db.len();
        db.load_font_data(data);
        let family = db
            .faces()
            .skip(before)
            .find_map(|face| face.families.first().map(|(name, _)| name.clone()))
            .ok_or_else(|| {
                RenderError::FontUnavailable(format!("{} holds no usable face", path.display()))
            })?;

        db.set_monospace_family(family.clone());
        db.set_sans_serif_family(family.clone());
        db.set_serif_family(family);

        tracing::info!(path = %path.display(), "Loaded mockup font");
    }

    tracing::debug!(faces = db.len(), "Font database ready");
    Ok(db)
}

/// Pick the face used for direct raster painting: monospace first, then sans-serif,
/// then whatever the database holds.
pub fn glyph_font(db: &Database) -> Result<FontVec, RenderError> {
    let id = db
        .query(&Query {
            families: &[Family::Monospace, Family::SansSerif],
            ..Query::default()
        })
        .or_else(|| db.faces().next().map(|face| face.id))
        .ok_or_else(|| RenderError::FontUnavailable("no fonts installed".to_string()))?;

    db.with_face_data(id, |data, index| {
        FontVec::try_from_vec_and_index(data.to_vec(), index)
    })
    .ok_or_else(|| RenderError::FontUnavailable("font data not accessible".to_string()))?
    .map_err(|e| RenderError::FontUnavailable(e.to_string()))
}
