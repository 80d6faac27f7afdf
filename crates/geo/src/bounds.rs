//! Geographic and projected bounding boxes.

use icetrack_common::error::{IcetrackError, IcetrackResult};
use serde::{Deserialize, Serialize};

/// Longitude/latitude bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl GeoBounds {
    /// Build from two corners in any order.
    pub fn new(lon_a: f64, lat_a: f64, lon_b: f64, lat_b: f64) -> Self {
        Self {
            min_lon: lon_a.min(lon_b),
            min_lat: lat_a.min(lat_b),
            max_lon: lon_a.max(lon_b),
            max_lat: lat_a.max(lat_b),
        }
    }
}

impl From<(f64, f64, f64, f64)> for GeoBounds {
    /// From a (min_lon, min_lat, max_lon, max_lat) tuple, as produced
    /// by `TrackSet::geo_bounds`.
    fn from(t: (f64, f64, f64, f64)) -> Self {
        GeoBounds::new(t.0, t.1, t.2, t.3)
    }
}

/// Axis-aligned box in projected meters (x east, y north).
///
/// This is the pipeline's region of interest: it crops rasters and
/// frames the rendered map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl Region {
    /// Build from two corners in any order.
    pub fn new(x_a: f64, y_a: f64, x_b: f64, y_b: f64) -> Self {
        Self {
            x_min: x_a.min(x_b),
            y_min: y_a.min(y_b),
            x_max: x_a.max(x_b),
            y_max: y_a.max(y_b),
        }
    }

    /// From a `[x_min, y_min, x_max, y_max]` array (the configuration
    /// encoding).
    pub fn from_array(corners: [f64; 4]) -> Self {
        Self::new(corners[0], corners[1], corners[2], corners[3])
    }

    /// Parse `"x0,y0,x1,y1"` in meters, as given on the command line.
    pub fn parse(raw: &str) -> IcetrackResult<Self> {
        let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(IcetrackError::geo(format!(
                "region {:?} must be x0,y0,x1,y1",
                raw
            )));
        }
        let mut values = [0.0f64; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| {
                IcetrackError::geo(format!("region component {:?} is not a number", part))
            })?;
            if !slot.is_finite() {
                return Err(IcetrackError::geo(format!(
                    "region component {:?} is not finite",
                    part
                )));
            }
        }
        Ok(Self::from_array(values))
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Height over width; canvas sizing follows this.
    pub fn aspect(&self) -> f64 {
        self.height() / self.width()
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x_min && x <= self.x_max && y >= self.y_min && y <= self.y_max
    }

    /// Rectangular intersection; `None` when the boxes share no area.
    pub fn intersect(&self, other: &Region) -> Option<Region> {
        let x_min = self.x_min.max(other.x_min);
        let y_min = self.y_min.max(other.y_min);
        let x_max = self.x_max.min(other.x_max);
        let y_max = self.y_max.min(other.y_max);
        if x_min < x_max && y_min < y_max {
            Some(Region {
                x_min,
                y_min,
                x_max,
                y_max,
            })
        } else {
            None
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{:.0}, {:.0}] x [{:.0}, {:.0}] m",
            self.x_min, self.x_max, self.y_min, self.y_max
        )
    }
}
