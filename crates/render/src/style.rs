//! Track colors and line styling.
//!
//! Colors are assigned by the alphabetical index of the animal
//! identifier, so the same animal keeps the same color in the static
//! figure and in every animation frame. The categorical palette wraps
//! when more animals than colors are present.

use image::Rgba;

/// Categorical track palette, dark enough to read over pale ice
/// imagery. Hex values in index order.
const TRACK_COLORS: &[&str] = &[
    "#e41a1c", "#377eb8", "#4daf4a", "#984ea3", "#ff7f00", "#a65628", "#f781bf", "#17becf",
    "#bcbd22", "#7f7f7f",
];

/// Color for the animal at `index` in the alphabetical identifier
/// order. Wraps past the end of the palette.
pub fn track_color(index: usize) -> Rgba<u8> {
    let hex = TRACK_COLORS[index % TRACK_COLORS.len()];
    let [r, g, b] = parse_hex_color(hex).unwrap_or([128, 128, 128]);
    Rgba([r, g, b, 255])
}

/// Parse `#rrggbb` into RGB components.
fn parse_hex_color(hex: &str) -> Option<[u8; 3]> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some([r, g, b])
}

/// Polyline and marker styling for drawn tracks.
#[derive(Debug, Clone, Copy)]
pub struct TrackStyle {
    /// Stroke width in pixels. Widths above 1 are drawn as parallel
    /// offset segments.
    pub line_width: u32,

    /// Radius of the filled current/final position marker.
    pub marker_radius: i32,

    /// Draw a hollow circle at the first fix.
    pub start_marker: bool,
}

impl Default for TrackStyle {
    fn default() -> Self {
        Self {
            line_width: 2,
            marker_radius: 5,
            start_marker: true,
        }
    }
}
