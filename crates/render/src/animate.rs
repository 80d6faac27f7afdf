//! Track animation: a frame per time step, each replaying the paths up
//! to that instant, encoded as a looping GIF.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, Rgba};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;

use icetrack_common::error::{IcetrackError, IcetrackResult};
use icetrack_geo::{ProjectedFix, ProjectedTrack, ProjectedTrackSet, Region};

use crate::figure::{draw_legend, draw_thick_segment, FigureStyle, RasterLayer};
use crate::scene::MapScene;
use crate::style::track_color;
use crate::text::MapFont;

/// Caps the schedule so a mistyped step cannot produce a multi-gigabyte
/// encode.
const MAX_FRAMES: usize = 5000;

const TIMESTAMP_TEXT_PX: f32 = 16.0;

/// Animation cadence and playback settings.
#[derive(Debug, Clone, Copy)]
pub struct AnimationConfig {
    /// Track time advanced per frame.
    pub step: Duration,

    /// Playback delay per frame in milliseconds.
    pub frame_delay_ms: u32,

    /// When set, frames draw only fixes within this trailing window
    /// (replacing path); otherwise the path grows from the start.
    pub trail: Option<Duration>,

    /// Loop the GIF forever.
    pub infinite_loop: bool,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            step: Duration::hours(6),
            frame_delay_ms: 120,
            trail: None,
            infinite_loop: true,
        }
    }
}

/// What got encoded; feeds the render report.
#[derive(Debug, Clone, Copy)]
pub struct AnimationStats {
    pub frames: usize,
    pub canvas: (u32, u32),
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Frame times from the first to the last fix across the set, stepping
/// by `step`, with a final frame pinned to the last timestamp.
///
/// An empty set yields a single untimed frame so the output is still a
/// valid GIF.
pub fn frame_schedule(
    tracks: &ProjectedTrackSet,
    step: Duration,
) -> IcetrackResult<Vec<Option<DateTime<Utc>>>> {
    if step <= Duration::zero() {
        return Err(IcetrackError::render("animation step must be positive"));
    }
    let Some((start, end)) = tracks.time_range() else {
        return Ok(vec![None]);
    };

    // Bound the schedule before allocating it.
    let span_ms = (end - start).num_milliseconds().max(0);
    let step_ms = step.num_milliseconds().max(1);
    let estimated = span_ms / step_ms + 2;
    if estimated > MAX_FRAMES as i64 {
        return Err(IcetrackError::render(format!(
            "animation schedule has {} frames (step {} over {} to {}); raise the step",
            estimated, step, start, end
        )));
    }

    let mut times = Vec::with_capacity(estimated as usize);
    let mut t = start;
    while t < end {
        times.push(Some(t));
        t += step;
    }
    times.push(Some(end));
    Ok(times)
}

/// Render the whole animation and encode it as a GIF at `output`.
///
/// The basemap is composited once; each frame redraws the track layer
/// at its time step and stamps the frame time bottom-left.
pub fn render_animation(
    region: Region,
    canvas_width: u32,
    layers: &[RasterLayer<'_>],
    tracks: &ProjectedTrackSet,
    style: &FigureStyle,
    config: &AnimationConfig,
    font: Option<&MapFont>,
    output: &Path,
) -> IcetrackResult<AnimationStats> {
    if config.frame_delay_ms == 0 {
        return Err(IcetrackError::render("frame delay must be positive"));
    }
    let schedule = frame_schedule(tracks, config.step)?;

    let mut base = MapScene::new(region, canvas_width, style.background)?;
    for layer in layers {
        base.add_raster(layer.raster, layer.opacity)?;
    }

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let writer = BufWriter::new(File::create(output)?);
    let mut encoder = GifEncoder::new(writer);
    if config.infinite_loop {
        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| IcetrackError::render(format!("setting GIF repeat: {}", e)))?;
    }

    let started = std::time::Instant::now();
    let delay = Delay::from_numer_denom_ms(config.frame_delay_ms, 1);
    for (index, frame_time) in schedule.iter().enumerate() {
        let mut scene = base.clone();
        if let Some(when) = frame_time {
            for (track_index, track) in tracks.tracks.iter().enumerate() {
                draw_track_at(&mut scene, track, track_color(track_index), style, config, *when);
            }
        }

        let mut image = scene.into_image();
        if style.show_legend && !tracks.is_empty() {
            draw_legend(&mut image, tracks, font);
        }
        if let (Some(when), Some(font)) = (frame_time, font) {
            stamp_time(&mut image, font, *when);
        }

        encoder
            .encode_frame(Frame::from_parts(image, 0, 0, delay))
            .map_err(|e| {
                IcetrackError::render(format!("encoding frame {}: {}", index, e))
            })?;

        if index % 25 == 0 {
            tracing::debug!(frame = index, total = schedule.len(), "encoded frames");
        }
    }

    let stats = AnimationStats {
        frames: schedule.len(),
        canvas: (base.width(), base.height()),
        start: schedule.first().copied().flatten(),
        end: schedule.last().copied().flatten(),
    };
    tracing::info!(
        frames = stats.frames,
        elapsed_ms = started.elapsed().as_millis(),
        path = %output.display(),
        "encoded animation"
    );
    Ok(stats)
}

/// Draw one track as it stands at `when`: the visible path slice plus a
/// marker at the interpolated current position. Before a track's first
/// fix nothing is drawn.
fn draw_track_at(
    scene: &mut MapScene,
    track: &ProjectedTrack,
    color: Rgba<u8>,
    style: &FigureStyle,
    config: &AnimationConfig,
    when: DateTime<Utc>,
) {
    let Some(first) = track.points.first() else {
        return;
    };
    if when < first.timestamp {
        return;
    }

    let visible: &[ProjectedFix] = track.points_until(when);
    let visible: &[ProjectedFix] = match config.trail {
        Some(trail) => {
            let cutoff = when - trail;
            let start = visible.partition_point(|p| p.timestamp < cutoff);
            &visible[start..]
        }
        None => visible,
    };

    let canvas_points: Vec<(f32, f32)> = visible
        .iter()
        .map(|p| scene.world_to_canvas(p.x, p.y))
        .collect();
    let marker = track
        .position_at(when)
        .map(|(x, y)| scene.world_to_canvas(x, y));

    let canvas = scene.canvas_mut();
    for pair in canvas_points.windows(2) {
        draw_thick_segment(canvas, pair[0], pair[1], style.track.line_width, color);
    }
    if let Some(&last_visible) = canvas_points.last() {
        if let Some(marker) = marker {
            // Connect the last fix to the interpolated position.
            draw_thick_segment(canvas, last_visible, marker, style.track.line_width, color);
        }
    }
    if let Some((x, y)) = marker {
        draw_filled_circle_mut(
            canvas,
            (x.round() as i32, y.round() as i32),
            style.track.marker_radius,
            color,
        );
    }
}

/// White chip with the frame's UTC timestamp, bottom-left.
fn stamp_time(image: &mut image::RgbaImage, font: &MapFont, when: DateTime<Utc>) {
    let label = when.format("%Y-%m-%d %H:%M UTC").to_string();
    let width = font.approx_width(TIMESTAMP_TEXT_PX, &label) + 12;
    let height = (TIMESTAMP_TEXT_PX * 1.5) as u32;
    let y0 = image.height() as i32 - height as i32 - 8;
    if y0 < 0 {
        return;
    }
    draw_filled_rect_mut(
        image,
        Rect::at(8, y0).of_size(width, height),
        Rgba([255, 255, 255, 255]),
    );
    font.draw(
        image,
        14,
        y0 + 3,
        TIMESTAMP_TEXT_PX,
        Rgba([20, 20, 20, 255]),
        &label,
    );
}
