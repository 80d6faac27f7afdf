//! Render report sidecar: a JSON summary written next to each output
//! so a result can be sanity-checked without opening the image.

use std::path::{Path, PathBuf};

use serde::Serialize;

use icetrack_common::error::IcetrackResult;
use icetrack_geo::{ProjectedTrackSet, Region};

/// Summary of one render, serialized next to the output file.
#[derive(Debug, Clone, Serialize)]
pub struct RenderReport {
    /// The image this report describes.
    pub output: PathBuf,

    /// "figure" or "animation".
    pub kind: String,

    /// Region of interest: x_min, y_min, x_max, y_max in meters.
    pub region: [f64; 4],

    /// Canvas dimensions in pixels.
    pub canvas: [u32; 2],

    /// Animal identifiers drawn, in legend order.
    pub animals: Vec<String>,

    /// Total fixes across all drawn tracks.
    pub fixes_drawn: usize,

    /// Fixes falling outside the region (clipped, not an error).
    pub fixes_outside_region: usize,

    /// Frame count for animations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frames: Option<usize>,

    /// "ok", or "warn" when fixes fell outside the region.
    pub status: String,
}

impl RenderReport {
    /// Build a report for a render of `tracks` framed by `region`.
    pub fn new(
        output: &Path,
        kind: &str,
        region: &Region,
        canvas: (u32, u32),
        tracks: &ProjectedTrackSet,
        frames: Option<usize>,
    ) -> Self {
        let outside = tracks
            .tracks
            .iter()
            .flat_map(|t| t.points.iter())
            .filter(|p| !region.contains(p.x, p.y))
            .count();
        Self {
            output: output.to_path_buf(),
            kind: kind.to_string(),
            region: [region.x_min, region.y_min, region.x_max, region.y_max],
            canvas: [canvas.0, canvas.1],
            animals: tracks.ids().iter().map(|s| s.to_string()).collect(),
            fixes_drawn: tracks.total_points(),
            fixes_outside_region: outside,
            frames,
            status: if outside == 0 { "ok" } else { "warn" }.to_string(),
        }
    }

    /// Sidecar path: `<output>.render-report.json`.
    pub fn sidecar_path(output: &Path) -> PathBuf {
        let mut name = output
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".render-report.json");
        output.with_file_name(name)
    }

    /// Write the sidecar next to the output file.
    pub fn write(&self) -> IcetrackResult<PathBuf> {
        let path = Self::sidecar_path(&self.output);
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        tracing::info!(report = %path.display(), "wrote render report");
        Ok(path)
    }
}
