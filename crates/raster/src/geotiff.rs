//! GeoTIFF decoding.
//!
//! Reads the pixel grid plus the georeferencing tags that make it a
//! map: `ModelPixelScale` (33550), `ModelTiepoint` (33922), and the
//! GeoKey directory (34735) for the EPSG code. Grayscale and color
//! sources are normalized to RGBA8 so the render crate deals with one
//! pixel format only.

use std::io::{BufReader, Read, Seek};
use std::path::Path;

use image::RgbaImage;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::tags::Tag;
use tiff::ColorType;

use icetrack_common::error::{IcetrackError, IcetrackResult};
use icetrack_geo::Region;

use crate::grid::GeoRaster;

/// ProjectedCSTypeGeoKey: the projected CRS code entry in the GeoKey
/// directory.
const PROJECTED_CRS_GEO_KEY: u16 = 3072;

impl GeoRaster {
    /// Open a GeoTIFF basemap.
    ///
    /// Accepts Gray8, Gray16, RGB8, and RGBA8 sources; anything else is
    /// a fatal error, as are missing georeferencing tags.
    pub fn open(path: impl AsRef<Path>) -> IcetrackResult<GeoRaster> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(IcetrackError::file_not_found(path));
        }

        let file = BufReader::new(std::fs::File::open(path)?);
        let mut decoder = Decoder::new(file)
            .map_err(|e| IcetrackError::raster(format!("{}: {}", path.display(), e)))?
            .with_limits(Limits::unlimited());

        let (width, height) = decoder
            .dimensions()
            .map_err(|e| IcetrackError::raster(format!("{}: {}", path.display(), e)))?;
        let color_type = decoder
            .colortype()
            .map_err(|e| IcetrackError::raster(format!("{}: {}", path.display(), e)))?;

        let scale = read_f64_values(&mut decoder, Tag::ModelPixelScaleTag)?.ok_or_else(|| {
            IcetrackError::raster(format!(
                "{}: missing ModelPixelScale tag (not a GeoTIFF?)",
                path.display()
            ))
        })?;
        let tiepoint = read_f64_values(&mut decoder, Tag::ModelTiepointTag)?.ok_or_else(|| {
            IcetrackError::raster(format!(
                "{}: missing ModelTiepoint tag (not a GeoTIFF?)",
                path.display()
            ))
        })?;
        let epsg = read_epsg(&mut decoder)?;

        let extent = extent_from_tags(&scale, &tiepoint, width, height)
            .map_err(|e| IcetrackError::raster(format!("{}: {}", path.display(), e)))?;

        let data = decoder
            .read_image()
            .map_err(|e| IcetrackError::raster(format!("{}: {}", path.display(), e)))?;
        let image = normalize_to_rgba(width, height, color_type, data)
            .map_err(|e| IcetrackError::raster(format!("{}: {}", path.display(), e)))?;

        let raster = GeoRaster::new(image, extent, epsg)?;
        tracing::info!(
            path = %path.display(),
            width,
            height,
            extent = %raster.extent,
            epsg = ?raster.epsg,
            "opened GeoTIFF"
        );
        Ok(raster)
    }
}

fn read_f64_values<R: Read + Seek>(
    decoder: &mut Decoder<R>,
    tag: Tag,
) -> IcetrackResult<Option<Vec<f64>>> {
    match decoder.find_tag(tag) {
        Ok(Some(value)) => value
            .into_f64_vec()
            .map(Some)
            .map_err(|e| IcetrackError::raster(format!("tag {:?}: {}", tag, e))),
        Ok(None) => Ok(None),
        Err(e) => Err(IcetrackError::raster(format!("tag {:?}: {}", tag, e))),
    }
}

/// EPSG code of the projected CRS, when the GeoKey directory declares
/// one.
fn read_epsg<R: Read + Seek>(decoder: &mut Decoder<R>) -> IcetrackResult<Option<u32>> {
    let directory = match decoder.find_tag(Tag::GeoKeyDirectoryTag) {
        Ok(Some(value)) => value
            .into_u16_vec()
            .map_err(|e| IcetrackError::raster(format!("GeoKey directory: {}", e)))?,
        Ok(None) => return Ok(None),
        Err(e) => {
            return Err(IcetrackError::raster(format!("GeoKey directory: {}", e)));
        }
    };

    // Four-short header, then entries of (key, tag location, count,
    // value); location 0 means the value is inline.
    Ok(directory
        .chunks_exact(4)
        .skip(1)
        .find(|entry| entry[0] == PROJECTED_CRS_GEO_KEY && entry[1] == 0)
        .map(|entry| u32::from(entry[3])))
}

fn extent_from_tags(
    scale: &[f64],
    tiepoint: &[f64],
    width: u32,
    height: u32,
) -> Result<Region, String> {
    if scale.len() < 2 {
        return Err(format!("ModelPixelScale has {} values, need 2", scale.len()));
    }
    if tiepoint.len() < 6 {
        return Err(format!("ModelTiepoint has {} values, need 6", tiepoint.len()));
    }
    let (sx, sy) = (scale[0], scale[1]);
    if !(sx > 0.0 && sy > 0.0) || !sx.is_finite() || !sy.is_finite() {
        return Err(format!("pixel scale ({}, {}) is not positive", sx, sy));
    }

    // Tiepoint binds raster position (i, j) to world (x, y); rows run
    // south, so world y decreases with j.
    let (i, j) = (tiepoint[0], tiepoint[1]);
    let (world_x, world_y) = (tiepoint[3], tiepoint[4]);
    let x_min = world_x - i * sx;
    let y_max = world_y + j * sy;

    Ok(Region::new(
        x_min,
        y_max - f64::from(height) * sy,
        x_min + f64::from(width) * sx,
        y_max,
    ))
}

fn normalize_to_rgba(
    width: u32,
    height: u32,
    color_type: ColorType,
    data: DecodingResult,
) -> Result<RgbaImage, String> {
    let pixels = (width as usize) * (height as usize);
    let rgba = match (color_type, data) {
        (ColorType::Gray(8), DecodingResult::U8(buf)) => {
            check_len(buf.len(), pixels, 1)?;
            let mut out = Vec::with_capacity(pixels * 4);
            for v in buf {
                out.extend_from_slice(&[v, v, v, 255]);
            }
            out
        }
        (ColorType::Gray(16), DecodingResult::U16(buf)) => {
            check_len(buf.len(), pixels, 1)?;
            let mut out = Vec::with_capacity(pixels * 4);
            for v in buf {
                let v8 = (v >> 8) as u8;
                out.extend_from_slice(&[v8, v8, v8, 255]);
            }
            out
        }
        (ColorType::RGB(8), DecodingResult::U8(buf)) => {
            check_len(buf.len(), pixels, 3)?;
            let mut out = Vec::with_capacity(pixels * 4);
            for rgb in buf.chunks_exact(3) {
                out.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
            }
            out
        }
        (ColorType::RGBA(8), DecodingResult::U8(buf)) => {
            check_len(buf.len(), pixels, 4)?;
            buf
        }
        (other, _) => {
            return Err(format!(
                "unsupported color type {:?} (want Gray8/Gray16/RGB8/RGBA8)",
                other
            ));
        }
    };

    RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| "pixel buffer does not match dimensions".to_string())
}

fn check_len(got: usize, pixels: usize, channels: usize) -> Result<(), String> {
    let want = pixels * channels;
    if got == want {
        Ok(())
    } else {
        Err(format!("pixel buffer has {} samples, want {}", got, want))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tiff::encoder::{colortype, TiffEncoder};

    fn temp_tiff(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("icetrack-{}-{}.tif", std::process::id(), name))
    }

    /// Write a small RGB GeoTIFF: `scale` meters per pixel, upper-left
    /// world corner at `origin`, optional EPSG code.
    fn write_geotiff(
        path: &Path,
        width: u32,
        height: u32,
        scale: (f64, f64),
        origin: (f64, f64),
        epsg: Option<u16>,
    ) {
        let mut file = std::fs::File::create(path).unwrap();
        let mut encoder = TiffEncoder::new(&mut file).unwrap();
        let mut image = encoder.new_image::<colortype::RGB8>(width, height).unwrap();
        image
            .encoder()
            .write_tag(Tag::ModelPixelScaleTag, &[scale.0, scale.1, 0.0][..])
            .unwrap();
        image
            .encoder()
            .write_tag(
                Tag::ModelTiepointTag,
                &[0.0, 0.0, 0.0, origin.0, origin.1, 0.0][..],
            )
            .unwrap();
        if let Some(code) = epsg {
            let directory: [u16; 8] = [1, 1, 0, 1, PROJECTED_CRS_GEO_KEY, 0, 1, code];
            image
                .encoder()
                .write_tag(Tag::GeoKeyDirectoryTag, &directory[..])
                .unwrap();
        }

        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for row in 0..height {
            for col in 0..width {
                data.extend_from_slice(&[(10 * col) as u8, (10 * row) as u8, 200]);
            }
        }
        image.write_data(&data).unwrap();
    }

    fn write_plain_tiff(path: &Path, width: u32, height: u32) {
        let mut file = std::fs::File::create(path).unwrap();
        let mut encoder = TiffEncoder::new(&mut file).unwrap();
        let image = encoder.new_image::<colortype::Gray8>(width, height).unwrap();
        image
            .write_data(&vec![7u8; (width * height) as usize])
            .unwrap();
    }

    #[test]
    fn test_open_reads_extent_and_epsg() {
        let path = temp_tiff("basic");
        write_geotiff(&path, 8, 6, (500.0, 500.0), (1.40e6, -1.70e6), Some(3031));

        let raster = GeoRaster::open(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!((raster.width(), raster.height()), (8, 6));
        assert_eq!(raster.epsg, Some(3031));
        assert_eq!(
            raster.extent,
            Region::new(1.40e6, -1.703e6, 1.404e6, -1.70e6)
        );
        assert_eq!(raster.pixel_size(), (500.0, 500.0));
    }

    #[test]
    fn test_open_normalizes_rgb_to_rgba() {
        let path = temp_tiff("rgb");
        write_geotiff(&path, 4, 3, (100.0, 100.0), (0.0, 0.0), None);

        let raster = GeoRaster::open(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let px = raster.image.get_pixel(2, 1);
        assert_eq!(px.0, [20, 10, 200, 255]);
        assert_eq!(raster.epsg, None);
    }

    #[test]
    fn test_open_gray8_source() {
        let path = temp_tiff("gray");
        {
            let mut file = std::fs::File::create(&path).unwrap();
            let mut encoder = TiffEncoder::new(&mut file).unwrap();
            let mut image = encoder.new_image::<colortype::Gray8>(3, 3).unwrap();
            image
                .encoder()
                .write_tag(Tag::ModelPixelScaleTag, &[10.0, 10.0, 0.0][..])
                .unwrap();
            image
                .encoder()
                .write_tag(Tag::ModelTiepointTag, &[0.0, 0.0, 0.0, 0.0, 30.0, 0.0][..])
                .unwrap();
            image.write_data(&[0u8, 60, 120, 60, 120, 180, 120, 180, 240]).unwrap();
        }

        let raster = GeoRaster::open(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(raster.image.get_pixel(1, 0).0, [60, 60, 60, 255]);
        assert_eq!(raster.extent, Region::new(0.0, 0.0, 30.0, 30.0));
    }

    #[test]
    fn test_open_without_geo_tags_is_fatal() {
        let path = temp_tiff("plain");
        write_plain_tiff(&path, 4, 4);

        let err = GeoRaster::open(&path).unwrap_err();
        std::fs::remove_file(&path).ok();

        assert!(err.to_string().contains("ModelPixelScale"));
    }

    #[test]
    fn test_open_missing_file_reports_path() {
        let err = GeoRaster::open("/no/such/basemap.tif").unwrap_err();
        assert!(err.to_string().contains("/no/such/basemap.tif"));
    }

    #[test]
    fn test_open_then_crop_round_trip() {
        let path = temp_tiff("crop");
        write_geotiff(&path, 10, 10, (100.0, 100.0), (0.0, 1000.0), Some(3031));

        let raster = GeoRaster::open(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(raster.extent, Region::new(0.0, 0.0, 1000.0, 1000.0));
        let cropped = raster
            .crop(&Region::new(200.0, 300.0, 600.0, 800.0))
            .unwrap();
        assert_eq!(cropped.extent, Region::new(200.0, 300.0, 600.0, 800.0));
        // Pixel (0,0) of the crop is source pixel (2, 2).
        assert_eq!(cropped.image.get_pixel(0, 0).0, [20, 20, 200, 255]);
    }

    #[test]
    fn test_extent_from_tags_rejects_bad_scale() {
        assert!(extent_from_tags(&[0.0, 10.0], &[0.0; 6], 4, 4).is_err());
        assert!(extent_from_tags(&[10.0], &[0.0; 6], 4, 4).is_err());
        assert!(extent_from_tags(&[10.0, 10.0], &[0.0; 3], 4, 4).is_err());
    }

    #[test]
    fn test_extent_honors_nonzero_tiepoint_pixel() {
        // Tiepoint at pixel (2, 1) rather than the corner.
        let extent =
            extent_from_tags(&[10.0, 10.0], &[2.0, 1.0, 0.0, 120.0, 90.0, 0.0], 10, 10).unwrap();
        assert_eq!(extent, Region::new(100.0, 0.0, 200.0, 100.0));
    }

    #[test]
    fn test_geo_key_directory_parsing() {
        // Header + one irrelevant key + the projected CRS key.
        let path = temp_tiff("geokeys");
        {
            let mut file = std::fs::File::create(&path).unwrap();
            let mut encoder = TiffEncoder::new(&mut file).unwrap();
            let mut image = encoder.new_image::<colortype::RGB8>(2, 2).unwrap();
            image
                .encoder()
                .write_tag(Tag::ModelPixelScaleTag, &[1.0, 1.0, 0.0][..])
                .unwrap();
            image
                .encoder()
                .write_tag(Tag::ModelTiepointTag, &[0.0, 0.0, 0.0, 0.0, 2.0, 0.0][..])
                .unwrap();
            let directory: [u16; 12] = [1, 1, 0, 2, 1024, 0, 1, 1, 3072, 0, 1, 3976];
            image
                .encoder()
                .write_tag(Tag::GeoKeyDirectoryTag, &directory[..])
                .unwrap();
            image.write_data(&[0u8; 12]).unwrap();
        }

        let raster = GeoRaster::open(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(raster.epsg, Some(3976));
    }
}
