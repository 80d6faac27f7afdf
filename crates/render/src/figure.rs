//! Static figure rendering: basemap layers, per-animal tracks, legend,
//! and title composed into one annotated image.

use std::path::Path;

use image::{Rgba, RgbaImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_circle_mut, draw_hollow_rect_mut,
    draw_line_segment_mut,
};
use imageproc::rect::Rect;

use icetrack_common::error::{IcetrackError, IcetrackResult};
use icetrack_geo::{ProjectedTrack, ProjectedTrackSet, Region};
use icetrack_raster::GeoRaster;

use crate::scene::MapScene;
use crate::style::{track_color, TrackStyle};
use crate::text::MapFont;

/// A basemap layer queued for compositing.
#[derive(Debug, Clone, Copy)]
pub struct RasterLayer<'a> {
    pub raster: &'a GeoRaster,
    pub opacity: f32,
}

/// Static figure styling.
#[derive(Debug, Clone)]
pub struct FigureStyle {
    /// Canvas background (RGB), visible where no raster covers.
    pub background: [u8; 3],

    /// Track stroke and marker styling.
    pub track: TrackStyle,

    /// Title line drawn top-left; skipped when no font is available.
    pub title: Option<String>,

    /// Draw the per-animal legend box.
    pub show_legend: bool,
}

impl Default for FigureStyle {
    fn default() -> Self {
        Self {
            background: [255, 255, 255],
            track: TrackStyle::default(),
            title: None,
            show_legend: true,
        }
    }
}

const LEGEND_SWATCH: i32 = 12;
const LEGEND_PAD: i32 = 8;
const LEGEND_ROW: i32 = 18;
const LEGEND_TEXT_PX: f32 = 14.0;
const TITLE_TEXT_PX: f32 = 20.0;

/// Render the full static figure: stacked rasters, every track as a
/// colored polyline with start/end markers, legend, and title.
///
/// An empty track set yields a valid basemap-only figure.
pub fn render_figure(
    region: Region,
    canvas_width: u32,
    layers: &[RasterLayer<'_>],
    tracks: &ProjectedTrackSet,
    style: &FigureStyle,
    font: Option<&MapFont>,
) -> IcetrackResult<RgbaImage> {
    let mut scene = MapScene::new(region, canvas_width, style.background)?;
    for layer in layers {
        scene.add_raster(layer.raster, layer.opacity)?;
    }

    for (index, track) in tracks.tracks.iter().enumerate() {
        draw_track(&mut scene, track, track_color(index), &style.track);
    }

    let mut image = scene.into_image();
    if style.show_legend && !tracks.is_empty() {
        draw_legend(&mut image, tracks, font);
    }
    if let (Some(title), Some(font)) = (&style.title, font) {
        font.draw(&mut image, 12, 10, TITLE_TEXT_PX, Rgba([20, 20, 20, 255]), title);
    }

    tracing::info!(
        animals = tracks.len(),
        fixes = tracks.total_points(),
        size = format!("{}x{}", image.width(), image.height()),
        "rendered static figure"
    );
    Ok(image)
}

/// Draw one track: polyline plus optional hollow start marker and a
/// filled marker at the final fix.
pub(crate) fn draw_track(
    scene: &mut MapScene,
    track: &ProjectedTrack,
    color: Rgba<u8>,
    style: &TrackStyle,
) {
    let canvas_points: Vec<(f32, f32)> = track
        .points
        .iter()
        .map(|p| scene.world_to_canvas(p.x, p.y))
        .collect();

    let canvas = scene.canvas_mut();
    for pair in canvas_points.windows(2) {
        draw_thick_segment(canvas, pair[0], pair[1], style.line_width, color);
    }

    if style.start_marker {
        if let Some(&(x, y)) = canvas_points.first() {
            draw_hollow_circle_mut(
                canvas,
                (x.round() as i32, y.round() as i32),
                style.marker_radius,
                color,
            );
        }
    }
    if let Some(&(x, y)) = canvas_points.last() {
        draw_filled_circle_mut(
            canvas,
            (x.round() as i32, y.round() as i32),
            style.marker_radius,
            color,
        );
    }
}

/// A stroke wider than one pixel is drawn as parallel segments offset
/// along both axes. imageproc clips segments leaving the canvas.
pub(crate) fn draw_thick_segment(
    canvas: &mut RgbaImage,
    start: (f32, f32),
    end: (f32, f32),
    width: u32,
    color: Rgba<u8>,
) {
    let half = (width.max(1) as i32 - 1) / 2;
    let extra = (width.max(1) as i32 - 1) % 2;
    for offset in -half..=(half + extra) {
        let o = offset as f32;
        draw_line_segment_mut(canvas, (start.0 + o, start.1), (end.0 + o, end.1), color);
        draw_line_segment_mut(canvas, (start.0, start.1 + o), (end.0, end.1 + o), color);
    }
}

/// Legend box in the top-right corner: one color swatch (and label,
/// when a font is available) per animal, in set order.
pub(crate) fn draw_legend(image: &mut RgbaImage, tracks: &ProjectedTrackSet, font: Option<&MapFont>) {
    let label_width = font
        .map(|f| {
            tracks
                .tracks
                .iter()
                .map(|t| f.approx_width(LEGEND_TEXT_PX, &t.id))
                .max()
                .unwrap_or(0) as i32
        })
        .unwrap_or(0);

    let box_width = LEGEND_PAD * 2 + LEGEND_SWATCH + if label_width > 0 { 6 + label_width } else { 0 };
    let box_height = LEGEND_PAD * 2 + LEGEND_ROW * tracks.len() as i32 - (LEGEND_ROW - LEGEND_SWATCH);
    let x0 = image.width() as i32 - box_width - 10;
    let y0 = 10;
    if x0 < 0 {
        return;
    }

    draw_filled_rect_mut(
        image,
        Rect::at(x0, y0).of_size(box_width as u32, box_height as u32),
        Rgba([255, 255, 255, 255]),
    );
    draw_hollow_rect_mut(
        image,
        Rect::at(x0, y0).of_size(box_width as u32, box_height as u32),
        Rgba([90, 90, 90, 255]),
    );

    for (index, track) in tracks.tracks.iter().enumerate() {
        let row_y = y0 + LEGEND_PAD + LEGEND_ROW * index as i32;
        draw_filled_rect_mut(
            image,
            Rect::at(x0 + LEGEND_PAD, row_y).of_size(LEGEND_SWATCH as u32, LEGEND_SWATCH as u32),
            track_color(index),
        );
        if let Some(font) = font {
            font.draw(
                image,
                x0 + LEGEND_PAD + LEGEND_SWATCH + 6,
                row_y - 2,
                LEGEND_TEXT_PX,
                Rgba([20, 20, 20, 255]),
                &track.id,
            );
        }
    }
}

/// Save a figure, choosing the format from the extension: JPEG flattens
/// alpha over white, PNG keeps it. Parent directories are created.
pub fn save_figure(image: &RgbaImage, path: &Path) -> IcetrackResult<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    match extension.as_str() {
        "jpg" | "jpeg" => {
            let rgb = image::DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            rgb.save(path)
                .map_err(|e| IcetrackError::render(format!("saving {:?}: {}", path, e)))?;
        }
        "png" => {
            image
                .save(path)
                .map_err(|e| IcetrackError::render(format!("saving {:?}: {}", path, e)))?;
        }
        other => {
            return Err(IcetrackError::render(format!(
                "unsupported figure format {:?} (use .jpg or .png)",
                other
            )));
        }
    }

    tracing::info!(path = %path.display(), "saved figure");
    Ok(())
}
