//! Render the looping track animation.

use chrono::Duration;

use icetrack_common::config::AppConfig;
use icetrack_render::{
    render_animation, AnimationConfig, FigureStyle, MapFont, RenderReport, TrackStyle,
};

use super::{MapArgs, PreparedScene, ResolvedMap};

pub fn run(
    config: &AppConfig,
    args: MapArgs,
    step_hours: Option<f64>,
    frame_ms: Option<u32>,
    trail_hours: Option<f64>,
    no_loop: bool,
) -> anyhow::Result<()> {
    let resolved = ResolvedMap::new(config, &args)?;
    let output = args
        .output
        .unwrap_or_else(|| config.animation.gif_output.clone());

    let step_hours = step_hours.unwrap_or(config.animation.step_hours);
    if !(step_hours.is_finite() && step_hours > 0.0) {
        anyhow::bail!("--step-hours must be a positive number");
    }
    let trail = match trail_hours {
        Some(hours) if hours.is_finite() && hours > 0.0 => Some(hours_to_duration(hours)),
        Some(_) => anyhow::bail!("--trail-hours must be a positive number"),
        None => None,
    };
    let animation = AnimationConfig {
        step: hours_to_duration(step_hours),
        frame_delay_ms: frame_ms.unwrap_or(config.animation.frame_delay_ms),
        trail,
        infinite_loop: !no_loop && config.animation.loop_forever,
    };

    let scene = PreparedScene::load(config, &resolved)?;
    let font = MapFont::discover();

    let style = FigureStyle {
        background: config.map.background,
        track: TrackStyle::default(),
        title: None,
        show_legend: true,
    };
    let stats = render_animation(
        resolved.region,
        resolved.width,
        &scene.layers(),
        &scene.projected,
        &style,
        &animation,
        font.as_ref(),
        &output,
    )?;

    let report = RenderReport::new(
        &output,
        "animation",
        &resolved.region,
        stats.canvas,
        &scene.projected,
        Some(stats.frames),
    );
    report.write()?;

    println!("Animation written to {}", output.display());
    println!(
        "  {} frames ({} h per frame, {} ms playback delay)",
        stats.frames, step_hours, animation.frame_delay_ms
    );
    if let (Some(start), Some(end)) = (stats.start, stats.end) {
        println!("  Covers {} .. {}", start, end);
    }

    Ok(())
}

fn hours_to_duration(hours: f64) -> Duration {
    Duration::milliseconds((hours * 3_600_000.0).round() as i64)
}
