//! Coordinate reference systems known to the pipeline.

use icetrack_common::error::{IcetrackError, IcetrackResult};

use crate::stereographic::PolarStereographic;

/// A coordinate reference system the pipeline understands.
///
/// Track data arrives geographic (`Wgs84`); rasters and rendered maps
/// live in a south polar stereographic CRS.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Crs {
    /// Geographic longitude/latitude on the WGS84 ellipsoid (EPSG:4326).
    Wgs84,

    /// South polar stereographic on WGS84.
    PolarStereographicSouth {
        /// Latitude of true scale, degrees (negative).
        standard_parallel_deg: f64,
        /// Longitude running up the +y axis, degrees.
        central_meridian_deg: f64,
    },
}

impl Crs {
    /// Antarctic Polar Stereographic (EPSG:3031), the CRS of the IBCSO
    /// and MODIS basemaps.
    pub const ANTARCTIC_POLAR_STEREOGRAPHIC: Crs = Crs::PolarStereographicSouth {
        standard_parallel_deg: -71.0,
        central_meridian_deg: 0.0,
    };

    /// Look up a supported EPSG code.
    pub fn from_epsg(code: u32) -> IcetrackResult<Self> {
        match code {
            4326 => Ok(Crs::Wgs84),
            3031 => Ok(Crs::PolarStereographicSouth {
                standard_parallel_deg: -71.0,
                central_meridian_deg: 0.0,
            }),
            3976 => Ok(Crs::PolarStereographicSouth {
                standard_parallel_deg: -70.0,
                central_meridian_deg: 0.0,
            }),
            other => Err(IcetrackError::geo(format!(
                "unsupported EPSG code {}",
                other
            ))),
        }
    }

    /// Registered EPSG code, when this CRS has one.
    pub fn epsg(&self) -> Option<u32> {
        match self {
            Crs::Wgs84 => Some(4326),
            Crs::PolarStereographicSouth {
                standard_parallel_deg,
                central_meridian_deg,
            } => match (*standard_parallel_deg, *central_meridian_deg) {
                (-71.0, 0.0) => Some(3031),
                (-70.0, 0.0) => Some(3976),
                _ => None,
            },
        }
    }

    /// Whether coordinates in this CRS are projected meters.
    pub fn is_projected(&self) -> bool {
        matches!(self, Crs::PolarStereographicSouth { .. })
    }

    /// Build the projection backing this CRS; geographic CRSs have
    /// none.
    pub fn projection(&self) -> IcetrackResult<PolarStereographic> {
        match self {
            Crs::Wgs84 => Err(IcetrackError::geo(
                "EPSG:4326 is geographic; there is no projection to apply",
            )),
            Crs::PolarStereographicSouth {
                standard_parallel_deg,
                central_meridian_deg,
            } => PolarStereographic::new(*standard_parallel_deg, *central_meridian_deg),
        }
    }
}

impl std::fmt::Display for Crs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.epsg() {
            Some(code) => write!(f, "EPSG:{}", code),
            None => match self {
                Crs::Wgs84 => write!(f, "WGS84"),
                Crs::PolarStereographicSouth {
                    standard_parallel_deg,
                    central_meridian_deg,
                } => write!(
                    f,
                    "polar stereographic south (lat_ts {}, lon_0 {})",
                    standard_parallel_deg, central_meridian_deg
                ),
            },
        }
    }
}
