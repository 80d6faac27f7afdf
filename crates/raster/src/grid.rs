//! Georeferenced pixel grids: extent math, pixel/world mapping, crops.

use image::RgbaImage;

use icetrack_common::error::{IcetrackError, IcetrackResult};
use icetrack_geo::Region;

/// A raster image tagged with a projected spatial extent.
///
/// The extent covers the outer edges of the pixel grid (GeoTIFF
/// "pixel is area"): row 0 touches `y_max`, column 0 touches `x_min`.
#[derive(Debug, Clone)]
pub struct GeoRaster {
    /// Pixel data, normalized to RGBA8 at load time.
    pub image: RgbaImage,

    /// Projected extent in meters.
    pub extent: Region,

    /// EPSG code read from the file, when it declared one.
    pub epsg: Option<u32>,
}

impl GeoRaster {
    /// Tag an image with an extent. The extent must have positive area
    /// and the image must be non-empty.
    pub fn new(image: RgbaImage, extent: Region, epsg: Option<u32>) -> IcetrackResult<Self> {
        if image.width() == 0 || image.height() == 0 {
            return Err(IcetrackError::raster("raster has no pixels"));
        }
        if !(extent.width() > 0.0 && extent.height() > 0.0) {
            return Err(IcetrackError::raster(format!(
                "raster extent {} has no area",
                extent
            )));
        }
        Ok(Self {
            image,
            extent,
            epsg,
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Meters per pixel along x and y.
    pub fn pixel_size(&self) -> (f64, f64) {
        (
            self.extent.width() / f64::from(self.width()),
            self.extent.height() / f64::from(self.height()),
        )
    }

    /// World meters to fractional pixel coordinates (col, row). Row 0
    /// is the north edge.
    pub fn world_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        let (sx, sy) = self.pixel_size();
        ((x - self.extent.x_min) / sx, (self.extent.y_max - y) / sy)
    }

    /// Outer corner of pixel (col, row) in world meters. The inverse of
    /// `world_to_pixel` on corners.
    pub fn pixel_to_world(&self, col: f64, row: f64) -> (f64, f64) {
        let (sx, sy) = self.pixel_size();
        (
            self.extent.x_min + col * sx,
            self.extent.y_max - row * sy,
        )
    }

    /// Crop to the intersection of this raster's extent and `region`,
    /// snapped outward to whole pixels.
    ///
    /// The result's extent equals the intersection exactly when the
    /// region is pixel-aligned, and covers it within one pixel
    /// otherwise. No overlap at all is a fatal error.
    pub fn crop(&self, region: &Region) -> IcetrackResult<GeoRaster> {
        let overlap = self.extent.intersect(region).ok_or_else(|| {
            IcetrackError::raster(format!(
                "region {} does not intersect raster extent {}",
                region, self.extent
            ))
        })?;

        let (sx, sy) = self.pixel_size();
        let col0 = ((overlap.x_min - self.extent.x_min) / sx).floor().max(0.0) as u32;
        let row0 = ((self.extent.y_max - overlap.y_max) / sy).floor().max(0.0) as u32;
        let col1 = (((overlap.x_max - self.extent.x_min) / sx).ceil() as u32).min(self.width());
        let row1 = (((self.extent.y_max - overlap.y_min) / sy).ceil() as u32).min(self.height());

        // Positive overlap area guarantees at least one pixel each way.
        let width = col1 - col0;
        let height = row1 - row0;

        let cropped =
            image::imageops::crop_imm(&self.image, col0, row0, width, height).to_image();
        let extent = Region::new(
            self.extent.x_min + f64::from(col0) * sx,
            self.extent.y_max - f64::from(row1) * sy,
            self.extent.x_min + f64::from(col1) * sx,
            self.extent.y_max - f64::from(row0) * sy,
        );

        tracing::debug!(
            cols = format!("{}..{}", col0, col1),
            rows = format!("{}..{}", row0, row1),
            extent = %extent,
            "cropped raster"
        );
        GeoRaster::new(cropped, extent, self.epsg)
    }
}
