//! Map scene compositing: a projected region mapped onto a pixel
//! canvas, with raster layers stacked in call order.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use icetrack_common::error::{IcetrackError, IcetrackResult};
use icetrack_geo::Region;
use icetrack_raster::GeoRaster;

/// A canvas framed by a projected region of interest.
///
/// Callers composite pre-cropped rasters bottom-up (bathymetry, then
/// ice), then draw tracks on top through `world_to_canvas`.
#[derive(Debug, Clone)]
pub struct MapScene {
    region: Region,
    canvas: RgbaImage,
}

impl MapScene {
    /// New scene covering `region` at `canvas_width` pixels wide; the
    /// height follows the region aspect ratio so meters stay square.
    pub fn new(region: Region, canvas_width: u32, background: [u8; 3]) -> IcetrackResult<Self> {
        if canvas_width == 0 {
            return Err(IcetrackError::render("canvas width must be positive"));
        }
        if !(region.width() > 0.0 && region.height() > 0.0) {
            return Err(IcetrackError::render(format!(
                "scene region {} has no area",
                region
            )));
        }
        let canvas_height = (f64::from(canvas_width) * region.aspect()).round().max(1.0) as u32;
        let [r, g, b] = background;
        let canvas = RgbaImage::from_pixel(canvas_width, canvas_height, Rgba([r, g, b, 255]));
        Ok(Self { region, canvas })
    }

    pub fn width(&self) -> u32 {
        self.canvas.width()
    }

    pub fn height(&self) -> u32 {
        self.canvas.height()
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    /// Projected meters to canvas pixels. North is up: `y_max` maps to
    /// row 0. Points outside the region map outside the canvas.
    pub fn world_to_canvas(&self, x: f64, y: f64) -> (f32, f32) {
        let px = (x - self.region.x_min) / self.region.width() * f64::from(self.width());
        let py = (self.region.y_max - y) / self.region.height() * f64::from(self.height());
        (px as f32, py as f32)
    }

    /// Composite a raster layer over the canvas at `opacity` in [0, 1].
    ///
    /// The raster's extent is mapped into canvas pixels and the pixels
    /// resampled to fit (nearest when magnifying, triangle when
    /// minifying). Alpha from the source survives, so nodata
    /// transparency shows lower layers through.
    pub fn add_raster(&mut self, raster: &GeoRaster, opacity: f32) -> IcetrackResult<()> {
        if !(0.0..=1.0).contains(&opacity) {
            return Err(IcetrackError::render(format!(
                "raster opacity {} outside [0, 1]",
                opacity
            )));
        }
        if raster.extent.intersect(&self.region).is_none() {
            return Err(IcetrackError::render(format!(
                "raster extent {} does not intersect scene region {}",
                raster.extent, self.region
            )));
        }

        let (x0, y0) = self.world_to_canvas(raster.extent.x_min, raster.extent.y_max);
        let (x1, y1) = self.world_to_canvas(raster.extent.x_max, raster.extent.y_min);
        let dest_w = ((x1 - x0).round().max(1.0)) as u32;
        let dest_h = ((y1 - y0).round().max(1.0)) as u32;

        let filter = if dest_w >= raster.width() || dest_h >= raster.height() {
            FilterType::Nearest
        } else {
            FilterType::Triangle
        };
        let mut resampled = imageops::resize(&raster.image, dest_w, dest_h, filter);

        if opacity < 1.0 {
            for pixel in resampled.pixels_mut() {
                pixel.0[3] = (f32::from(pixel.0[3]) * opacity).round() as u8;
            }
        }

        // overlay clips layers that extend past the canvas.
        imageops::overlay(
            &mut self.canvas,
            &resampled,
            x0.round() as i64,
            y0.round() as i64,
        );

        tracing::debug!(
            dest = format!("{}x{} at ({:.0}, {:.0})", dest_w, dest_h, x0, y0),
            opacity,
            "composited raster layer"
        );
        Ok(())
    }

    /// Mutable canvas access for the drawing layers.
    pub fn canvas_mut(&mut self) -> &mut RgbaImage {
        &mut self.canvas
    }

    pub fn into_image(self) -> RgbaImage {
        self.canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> MapScene {
        // 1000 x 500 m region on a 200 px wide canvas.
        MapScene::new(Region::new(0.0, 0.0, 1000.0, 500.0), 200, [255, 255, 255]).unwrap()
    }

    fn uniform_raster(extent: Region, color: [u8; 4]) -> GeoRaster {
        let image = RgbaImage::from_pixel(10, 10, Rgba(color));
        GeoRaster::new(image, extent, Some(3031)).unwrap()
    }

    #[test]
    fn test_canvas_height_follows_aspect() {
        let scene = scene();
        assert_eq!((scene.width(), scene.height()), (200, 100));
    }

    #[test]
    fn test_world_to_canvas_corners() {
        let scene = scene();
        assert_eq!(scene.world_to_canvas(0.0, 500.0), (0.0, 0.0));
        assert_eq!(scene.world_to_canvas(1000.0, 0.0), (200.0, 100.0));
        assert_eq!(scene.world_to_canvas(500.0, 250.0), (100.0, 50.0));
    }

    #[test]
    fn test_add_raster_covers_its_extent() {
        let mut scene = scene();
        let raster = uniform_raster(Region::new(0.0, 0.0, 500.0, 500.0), [10, 20, 30, 255]);
        scene.add_raster(&raster, 1.0).unwrap();

        let image = scene.into_image();
        // Left half covered, right half background.
        assert_eq!(image.get_pixel(10, 50).0, [10, 20, 30, 255]);
        assert_eq!(image.get_pixel(150, 50).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_layers_stack_in_call_order() {
        let mut scene = scene();
        let bottom = uniform_raster(Region::new(0.0, 0.0, 1000.0, 500.0), [10, 20, 30, 255]);
        let top = uniform_raster(Region::new(0.0, 0.0, 1000.0, 500.0), [200, 100, 0, 255]);
        scene.add_raster(&bottom, 1.0).unwrap();
        scene.add_raster(&top, 1.0).unwrap();
        assert_eq!(scene.into_image().get_pixel(100, 50).0, [200, 100, 0, 255]);
    }

    #[test]
    fn test_opacity_blends_toward_background() {
        let mut scene = scene();
        let raster = uniform_raster(Region::new(0.0, 0.0, 1000.0, 500.0), [0, 0, 0, 255]);
        scene.add_raster(&raster, 0.5).unwrap();

        let pixel = scene.into_image().get_pixel(100, 50).0;
        // Half-opaque black over white lands mid-gray.
        assert!(pixel[0] > 100 && pixel[0] < 160, "got {:?}", pixel);
    }

    #[test]
    fn test_transparent_nodata_shows_lower_layer() {
        let mut scene = scene();
        let bottom = uniform_raster(Region::new(0.0, 0.0, 1000.0, 500.0), [10, 20, 30, 255]);
        let nodata = uniform_raster(Region::new(0.0, 0.0, 1000.0, 500.0), [0, 0, 0, 0]);
        scene.add_raster(&bottom, 1.0).unwrap();
        scene.add_raster(&nodata, 1.0).unwrap();
        assert_eq!(scene.into_image().get_pixel(100, 50).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_disjoint_raster_is_an_error() {
        let mut scene = scene();
        let far = uniform_raster(Region::new(5000.0, 5000.0, 6000.0, 6000.0), [0, 0, 0, 255]);
        assert!(scene.add_raster(&far, 1.0).is_err());
    }

    #[test]
    fn test_bad_opacity_is_an_error() {
        let mut scene = scene();
        let raster = uniform_raster(Region::new(0.0, 0.0, 1000.0, 500.0), [0, 0, 0, 255]);
        assert!(scene.add_raster(&raster, 1.5).is_err());
        assert!(scene.add_raster(&raster, -0.1).is_err());
    }

    #[test]
    fn test_zero_width_and_empty_region_rejected() {
        assert!(MapScene::new(Region::new(0.0, 0.0, 1000.0, 500.0), 0, [0, 0, 0]).is_err());
        assert!(MapScene::new(Region::new(0.0, 0.0, 0.0, 500.0), 100, [0, 0, 0]).is_err());
    }
}
