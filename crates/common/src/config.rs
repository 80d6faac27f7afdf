//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default input data locations and filters.
    pub data: DataDefaults,

    /// Default map framing and figure output.
    pub map: MapDefaults,

    /// Default animation settings.
    pub animation: AnimationDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default input datasets and loader filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataDefaults {
    /// GPS track CSV path.
    pub tracks: PathBuf,

    /// Bathymetry GeoTIFF path.
    pub bathymetry: PathBuf,

    /// Ice-surface GeoTIFF path.
    pub ice: PathBuf,

    /// Animal identifiers dropped before plotting.
    pub excluded_ids: Vec<String>,

    /// Minimum retained fixes for an animal to be kept.
    pub min_fixes: usize,
}

/// Default map framing parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapDefaults {
    /// EPSG code of the projected CRS shared by rasters and map.
    pub epsg: u32,

    /// Region of interest in projected meters: x_min, y_min, x_max, y_max.
    pub region: [f64; 4],

    /// Canvas width in pixels (height follows the region aspect ratio).
    pub canvas_width: u32,

    /// Canvas background color (RGB), visible where no raster covers.
    pub background: [u8; 3],

    /// Default static figure output path.
    pub figure_output: PathBuf,
}

/// Default animation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationDefaults {
    /// Hours of track time per animation frame.
    pub step_hours: f64,

    /// Playback delay per frame in milliseconds.
    pub frame_delay_ms: u32,

    /// Whether the GIF loops forever.
    pub loop_forever: bool,

    /// Default animation output path.
    pub gif_output: PathBuf,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "icetrack=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataDefaults::default(),
            map: MapDefaults::default(),
            animation: AnimationDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for DataDefaults {
    fn default() -> Self {
        Self {
            tracks: PathBuf::from("data/penguin_tracks.csv"),
            bathymetry: PathBuf::from("data/ibcso_bathymetry.tif"),
            ice: PathBuf::from("data/modis_ice_surface.tif"),
            excluded_ids: vec!["PG07".to_string(), "PG12".to_string()],
            min_fixes: 10,
        }
    }
}

impl Default for MapDefaults {
    fn default() -> Self {
        Self {
            epsg: 3031,
            region: [1.40e6, -2.20e6, 1.90e6, -1.70e6],
            canvas_width: 1600,
            background: [255, 255, 255],
            figure_output: PathBuf::from("output/foraging_map.jpg"),
        }
    }
}

impl Default for AnimationDefaults {
    fn default() -> Self {
        Self {
            step_hours: 6.0,
            frame_delay_ms: 120,
            loop_forever: true,
            gif_output: PathBuf::from("output/foraging_tracks.gif"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(config_path: &std::path::Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("icetrack").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.data.excluded_ids, vec!["PG07", "PG12"]);
        assert_eq!(config.data.min_fixes, 10);
        assert_eq!(config.map.epsg, 3031);
        assert_eq!(config.map.canvas_width, 1600);
        assert_eq!(config.animation.step_hours, 6.0);
        assert_eq!(config.animation.frame_delay_ms, 120);
        assert!(config.animation.loop_forever);
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = AppConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.map.region, config.map.region);
        assert_eq!(back.data.tracks, config.data.tracks);
        assert_eq!(back.logging.level, "info");
    }

    #[test]
    fn load_from_missing_path_yields_defaults() {
        let path = std::env::temp_dir().join("icetrack-no-such-config.json");
        let config = AppConfig::load_from(&path);
        assert_eq!(config.map.epsg, AppConfig::default().map.epsg);
    }
}
