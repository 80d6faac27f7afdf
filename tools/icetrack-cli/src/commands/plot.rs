//! Render the static foraging map.

use icetrack_common::config::AppConfig;
use icetrack_render::{render_figure, save_figure, FigureStyle, MapFont, RenderReport, TrackStyle};

use super::{MapArgs, PreparedScene, ResolvedMap};

pub fn run(config: &AppConfig, args: MapArgs, title: Option<String>) -> anyhow::Result<()> {
    let resolved = ResolvedMap::new(config, &args)?;
    let output = args
        .output
        .unwrap_or_else(|| config.map.figure_output.clone());

    let scene = PreparedScene::load(config, &resolved)?;
    let font = MapFont::discover();

    let style = FigureStyle {
        background: config.map.background,
        track: TrackStyle::default(),
        title,
        show_legend: true,
    };
    let figure = render_figure(
        resolved.region,
        resolved.width,
        &scene.layers(),
        &scene.projected,
        &style,
        font.as_ref(),
    )?;
    save_figure(&figure, &output)?;

    let report = RenderReport::new(
        &output,
        "figure",
        &resolved.region,
        (figure.width(), figure.height()),
        &scene.projected,
        None,
    );
    report.write()?;

    println!("Figure written to {}", output.display());
    println!(
        "  {} animals, {} fixes, {}x{} px",
        scene.projected.len(),
        scene.projected.total_points(),
        figure.width(),
        figure.height()
    );
    if report.fixes_outside_region > 0 {
        println!(
            "  Note: {} fixes fall outside the region and were clipped",
            report.fixes_outside_region
        );
    }

    Ok(())
}
