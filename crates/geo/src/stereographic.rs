//! South polar stereographic projection on the WGS84 ellipsoid.
//!
//! The ellipsoidal formulas follow Snyder, "Map Projections: A Working
//! Manual" (USGS PP 1395), eqs. 21-33..21-41 with the south-aspect sign
//! convention and the series inverse of eq. 3-5. With the standard
//! parallel at 71°S and central meridian 0° this is EPSG:3031, the CRS
//! of the IBCSO and MODIS Antarctic basemaps.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use icetrack_common::error::{IcetrackError, IcetrackResult};

use crate::bounds::{GeoBounds, Region};

/// WGS84 semi-major axis in meters.
const WGS84_SEMI_MAJOR_M: f64 = 6_378_137.0;

/// WGS84 inverse flattening is 298.257223563.
const WGS84_FLATTENING: f64 = 1.0 / 298.257_223_563;

/// A configured south polar stereographic projection.
///
/// `project` maps geographic degrees to meters; `unproject` inverts it.
/// The south pole maps to (0, 0), the central meridian runs up the +y
/// axis, and 90° east of it runs up +x.
#[derive(Debug, Clone)]
pub struct PolarStereographic {
    /// Central meridian, radians.
    central_meridian_rad: f64,

    /// First eccentricity of the ellipsoid.
    eccentricity: f64,

    /// a * m_c / t_c: multiplying the isometric ratio t by this yields
    /// the radius from the pole.
    rho_scale: f64,

    /// Series coefficients for the conformal-to-geodetic latitude
    /// inverse (sin 2chi, sin 4chi, sin 6chi, sin 8chi).
    chi_coeffs: [f64; 4],
}

impl PolarStereographic {
    /// Build a projection from a south standard parallel and a central
    /// meridian, both in degrees. The parallel must lie strictly
    /// between the pole and the equator.
    pub fn new(standard_parallel_deg: f64, central_meridian_deg: f64) -> IcetrackResult<Self> {
        if !(standard_parallel_deg > -90.0 && standard_parallel_deg < 0.0) {
            return Err(IcetrackError::geo(format!(
                "standard parallel {} must lie in (-90, 0) degrees",
                standard_parallel_deg
            )));
        }

        let e2 = WGS84_FLATTENING * (2.0 - WGS84_FLATTENING);
        let e = e2.sqrt();
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        let e8 = e6 * e2;

        let phi_c = standard_parallel_deg.to_radians();
        let t_c = south_t(phi_c, e);
        let m_c = phi_c.cos() / (1.0 - e2 * phi_c.sin().powi(2)).sqrt();

        Ok(Self {
            central_meridian_rad: central_meridian_deg.to_radians(),
            eccentricity: e,
            rho_scale: WGS84_SEMI_MAJOR_M * m_c / t_c,
            chi_coeffs: [
                e2 / 2.0 + 5.0 * e4 / 24.0 + e6 / 12.0 + 13.0 * e8 / 360.0,
                7.0 * e4 / 48.0 + 29.0 * e6 / 240.0 + 811.0 * e8 / 11520.0,
                7.0 * e6 / 120.0 + 81.0 * e8 / 1120.0,
                4279.0 * e8 / 161280.0,
            ],
        })
    }

    /// Geographic degrees to projected meters.
    ///
    /// Total for every southern-hemisphere input; feeding the north
    /// pole yields non-finite output, which callers must treat as
    /// fatal.
    pub fn project(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        let rho = self.rho_scale * south_t(lat_deg.to_radians(), self.eccentricity);
        let dlam = lon_deg.to_radians() - self.central_meridian_rad;
        (rho * dlam.sin(), rho * dlam.cos())
    }

    /// Projected meters back to geographic degrees (lon, lat).
    pub fn unproject(&self, x: f64, y: f64) -> (f64, f64) {
        let t = x.hypot(y) / self.rho_scale;
        let chi = 2.0 * t.atan() - FRAC_PI_2;
        let [c2, c4, c6, c8] = self.chi_coeffs;
        let phi = chi
            + c2 * (2.0 * chi).sin()
            + c4 * (4.0 * chi).sin()
            + c6 * (6.0 * chi).sin()
            + c8 * (8.0 * chi).sin();
        let lam = self.central_meridian_rad + x.atan2(y);
        (normalize_lon(lam.to_degrees()), phi.to_degrees())
    }

    /// Projected bounding box of a geographic box.
    ///
    /// Samples along all four edges, not just the corners: projected
    /// parallels are circular arcs, so an edge can bulge past the
    /// corner positions.
    pub fn project_bounds(&self, bounds: &GeoBounds) -> Region {
        const EDGE_SAMPLES: usize = 16;

        let mut x_min = f64::INFINITY;
        let mut y_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_max = f64::NEG_INFINITY;

        for i in 0..=EDGE_SAMPLES {
            let f = i as f64 / EDGE_SAMPLES as f64;
            let lon = bounds.min_lon + f * (bounds.max_lon - bounds.min_lon);
            let lat = bounds.min_lat + f * (bounds.max_lat - bounds.min_lat);
            for (px, py) in [
                self.project(lon, bounds.min_lat),
                self.project(lon, bounds.max_lat),
                self.project(bounds.min_lon, lat),
                self.project(bounds.max_lon, lat),
            ] {
                x_min = x_min.min(px);
                y_min = y_min.min(py);
                x_max = x_max.max(px);
                y_max = y_max.max(py);
            }
        }

        Region::new(x_min, y_min, x_max, y_max)
    }
}

/// Isometric latitude ratio t for the south aspect (Snyder 21-39 with
/// phi negated).
fn south_t(phi: f64, e: f64) -> f64 {
    let es = e * phi.sin();
    (FRAC_PI_4 + phi / 2.0).tan() / ((1.0 + es) / (1.0 - es)).powf(e / 2.0)
}

fn normalize_lon(lon_deg: f64) -> f64 {
    let wrapped = (lon_deg + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 {
        180.0
    } else {
        wrapped
    }
}
