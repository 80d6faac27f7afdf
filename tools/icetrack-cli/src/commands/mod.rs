//! Subcommand implementations and the shared load→reproject→crop
//! pipeline stages behind `plot` and `animate`.

pub mod animate;
pub mod check;
pub mod info;
pub mod plot;

use std::path::PathBuf;

use clap::Args;

use icetrack_common::config::AppConfig;
use icetrack_geo::{reproject_tracks, Crs, ProjectedTrackSet, Region};
use icetrack_raster::GeoRaster;
use icetrack_track_model::{load_tracks, LoadOptions};

/// Map options shared by `plot` and `animate`. Every value falls back
/// to the configuration file.
#[derive(Debug, Args)]
pub struct MapArgs {
    /// Tracks CSV path
    #[arg(long)]
    pub tracks: Option<PathBuf>,

    /// Bathymetry GeoTIFF path
    #[arg(long)]
    pub bathymetry: Option<PathBuf>,

    /// Ice-surface GeoTIFF path
    #[arg(long)]
    pub ice: Option<PathBuf>,

    /// Region of interest in projected meters: x0,y0,x1,y1
    #[arg(long, value_name = "X0,Y0,X1,Y1")]
    pub region: Option<String>,

    /// Canvas width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Animal identifier to drop (repeatable; overrides the configured list)
    #[arg(long = "exclude", value_name = "ID")]
    pub exclude: Vec<String>,

    /// Minimum fixes for an animal to be kept
    #[arg(long)]
    pub min_fixes: Option<usize>,
}

/// The ice layer is drawn translucent so bathymetry reads through it.
const ICE_OPACITY: f32 = 0.75;

/// CLI options merged over configuration defaults.
pub(crate) struct ResolvedMap {
    pub tracks: PathBuf,
    pub bathymetry: PathBuf,
    pub ice: PathBuf,
    pub region: Region,
    pub width: u32,
    pub load_options: LoadOptions,
}

impl ResolvedMap {
    pub fn new(config: &AppConfig, args: &MapArgs) -> anyhow::Result<Self> {
        let region = match &args.region {
            Some(raw) => Region::parse(raw)?,
            None => Region::from_array(config.map.region),
        };
        let excluded_ids = if args.exclude.is_empty() {
            config.data.excluded_ids.clone()
        } else {
            args.exclude.clone()
        };
        Ok(Self {
            tracks: args.tracks.clone().unwrap_or_else(|| config.data.tracks.clone()),
            bathymetry: args
                .bathymetry
                .clone()
                .unwrap_or_else(|| config.data.bathymetry.clone()),
            ice: args.ice.clone().unwrap_or_else(|| config.data.ice.clone()),
            region,
            width: args.width.unwrap_or(config.map.canvas_width),
            load_options: LoadOptions {
                excluded_ids,
                min_fixes: args.min_fixes.unwrap_or(config.data.min_fixes),
            },
        })
    }
}

/// Everything the renderers need, after the sequential pipeline stages:
/// tracks loaded and filtered, coordinates reprojected, rasters cropped.
pub(crate) struct PreparedScene {
    pub projected: ProjectedTrackSet,
    pub bathymetry: GeoRaster,
    pub ice: GeoRaster,
}

impl PreparedScene {
    pub fn load(config: &AppConfig, resolved: &ResolvedMap) -> anyhow::Result<Self> {
        let crs = Crs::from_epsg(config.map.epsg)?;

        let set = load_tracks(&resolved.tracks, &resolved.load_options)?;
        tracing::info!(
            animals = set.len(),
            fixes = set.total_fixes(),
            path = %resolved.tracks.display(),
            "loaded tracks"
        );

        let projected = reproject_tracks(&set, &crs)?;

        let bathymetry = open_basemap(&resolved.bathymetry, config.map.epsg)?;
        let ice = open_basemap(&resolved.ice, config.map.epsg)?;
        let bathymetry = bathymetry.crop(&resolved.region)?;
        let ice = ice.crop(&resolved.region)?;

        Ok(Self {
            projected,
            bathymetry,
            ice,
        })
    }

    /// Basemap layers bottom-up: bathymetry, then translucent ice.
    pub fn layers(&self) -> [icetrack_render::RasterLayer<'_>; 2] {
        [
            icetrack_render::RasterLayer {
                raster: &self.bathymetry,
                opacity: 1.0,
            },
            icetrack_render::RasterLayer {
                raster: &self.ice,
                opacity: ICE_OPACITY,
            },
        ]
    }
}

fn open_basemap(path: &std::path::Path, expected_epsg: u32) -> anyhow::Result<GeoRaster> {
    let raster = GeoRaster::open(path)?;
    if let Some(epsg) = raster.epsg {
        if epsg != expected_epsg {
            tracing::warn!(
                path = %path.display(),
                raster_epsg = epsg,
                configured_epsg = expected_epsg,
                "raster declares a different CRS than configured; extents may not line up"
            );
        }
    }
    Ok(raster)
}
