//! Summarize a GPS track dataset.

use std::path::PathBuf;

use icetrack_common::config::AppConfig;
use icetrack_track_model::{load_tracks, LoadOptions};

pub fn run(config: &AppConfig, tracks: Option<PathBuf>, json: bool) -> anyhow::Result<()> {
    let path = tracks.unwrap_or_else(|| config.data.tracks.clone());

    // Unfiltered load: info describes the dataset as it is on disk.
    let set = load_tracks(&path, &LoadOptions::default())
        .map_err(|e| anyhow::anyhow!("Failed to load tracks: {e}"))?;
    let summary = set.summary();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Dataset: {}", path.display());
    println!("  Animals: {}", summary.animals);
    println!("  Fixes: {}", summary.total_fixes);
    if let (Some(start), Some(end)) = (summary.start, summary.end) {
        println!("  Time range: {} .. {}", start, end);
    }
    if let Some((min_lon, min_lat, max_lon, max_lat)) = summary.geo_bounds {
        println!(
            "  Bounds: lon [{:.3}, {:.3}]  lat [{:.3}, {:.3}]",
            min_lon, max_lon, min_lat, max_lat
        );
    }
    println!();

    println!("Per animal:");
    for animal in &summary.per_animal {
        let excluded = config.data.excluded_ids.contains(&animal.id);
        let span = match (animal.start, animal.end) {
            (Some(s), Some(e)) => format!("{} .. {}", s.format("%Y-%m-%d"), e.format("%Y-%m-%d")),
            _ => "-".to_string(),
        };
        println!(
            "  {:8} {:5} fixes  {}{}",
            animal.id,
            animal.fixes,
            span,
            if excluded { "  (excluded by config)" } else { "" }
        );
    }

    Ok(())
}
