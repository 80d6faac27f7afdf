//! Icetrack Geo
//!
//! Coordinate reference systems, the south polar stereographic
//! projection, bounding boxes, and track reprojection.

pub mod bounds;
pub mod crs;
pub mod stereographic;
pub mod track;

pub use bounds::*;
pub use crs::*;
pub use stereographic::*;
pub use track::*;
