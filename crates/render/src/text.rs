//! Text annotation: system font discovery and label drawing.
//!
//! No font is bundled with the crate. A usable TrueType font is probed
//! from the standard DejaVu/Liberation install locations at runtime;
//! when none is found, callers render without text (legend swatches and
//! tracks are unaffected). Text is annotation, not data, so a missing
//! font never fails the pipeline.

use ab_glyph::{FontVec, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;

/// Candidate font paths, most common distributions first.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/Library/Fonts/Arial.ttf",
];

/// A loaded annotation font.
pub struct MapFont {
    font: FontVec,
}

impl MapFont {
    /// Probe the standard system font locations. `None` when no
    /// candidate exists or parses; the caller logs and renders without
    /// text.
    pub fn discover() -> Option<MapFont> {
        for path in FONT_CANDIDATES {
            if let Ok(bytes) = std::fs::read(path) {
                match FontVec::try_from_vec(bytes) {
                    Ok(font) => {
                        tracing::debug!(path, "loaded annotation font");
                        return Some(MapFont { font });
                    }
                    Err(e) => {
                        tracing::warn!(path, error = %e, "font file exists but did not parse");
                    }
                }
            }
        }
        tracing::warn!("no system font found; rendering without text annotations");
        None
    }

    /// Load a font from an explicit path.
    pub fn from_path(path: &std::path::Path) -> Option<MapFont> {
        let bytes = std::fs::read(path).ok()?;
        FontVec::try_from_vec(bytes).ok().map(|font| MapFont { font })
    }

    /// Draw `text` with its top-left corner at (x, y).
    pub fn draw(
        &self,
        canvas: &mut RgbaImage,
        x: i32,
        y: i32,
        size_px: f32,
        color: Rgba<u8>,
        text: &str,
    ) {
        draw_text_mut(canvas, color, x, y, PxScale::from(size_px), &self.font, text);
    }

    /// Rough advance width of `text` at `size_px`, for right-aligned
    /// layout. A fixed per-glyph estimate is plenty for legend sizing.
    pub fn approx_width(&self, size_px: f32, text: &str) -> u32 {
        (text.chars().count() as f32 * size_px * 0.55).ceil() as u32
    }
}

impl std::fmt::Debug for MapFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapFont").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_missing_path_is_none() {
        assert!(MapFont::from_path(std::path::Path::new("/no/such/font.ttf")).is_none());
    }

    #[test]
    fn test_approx_width_scales_with_text() {
        // Discovery may fail on minimal containers; the estimate is
        // exercised only when a font exists.
        if let Some(font) = MapFont::discover() {
            let narrow = font.approx_width(14.0, "PG01");
            let wide = font.approx_width(14.0, "PG01 long label");
            assert!(wide > narrow);
            assert!(narrow > 0);
        }
    }

    #[test]
    fn test_draw_does_not_panic_on_edge_positions() {
        if let Some(font) = MapFont::discover() {
            let mut canvas = RgbaImage::from_pixel(40, 20, Rgba([255, 255, 255, 255]));
            font.draw(&mut canvas, -5, -5, 12.0, Rgba([0, 0, 0, 255]), "clip");
            font.draw(&mut canvas, 35, 15, 12.0, Rgba([0, 0, 0, 255]), "edge");
        }
    }
}
