//! Icetrack Raster
//!
//! GeoTIFF basemap loading: pixel decoding, georeferencing tags, and
//! region crops.

pub mod geotiff;
pub mod grid;

pub use grid::*;
