//! Verify that the configured inputs can feed the pipeline.

use icetrack_common::config::AppConfig;
use icetrack_geo::{Crs, Region};
use icetrack_raster::GeoRaster;
use icetrack_track_model::{load_tracks, LoadOptions};

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("Icetrack Input Check");
    println!("{}", "=".repeat(50));

    let mut failures = 0usize;
    let region = Region::from_array(config.map.region);

    match Crs::from_epsg(config.map.epsg) {
        Ok(crs) => println!("[OK] Map CRS: {}", crs),
        Err(e) => {
            println!("[FAIL] Map CRS: {e}");
            failures += 1;
        }
    }

    let options = LoadOptions {
        excluded_ids: config.data.excluded_ids.clone(),
        min_fixes: config.data.min_fixes,
    };
    match load_tracks(&config.data.tracks, &options) {
        Ok(set) => {
            println!(
                "[OK] Tracks: {} ({} animals, {} fixes after filtering)",
                config.data.tracks.display(),
                set.len(),
                set.total_fixes()
            );
            if set.is_empty() {
                println!("[WARN] Tracks: every animal was filtered out");
            }
        }
        Err(e) => {
            println!("[FAIL] Tracks: {}: {e}", config.data.tracks.display());
            failures += 1;
        }
    }

    for (label, path) in [
        ("Bathymetry", &config.data.bathymetry),
        ("Ice surface", &config.data.ice),
    ] {
        match GeoRaster::open(path) {
            Ok(raster) => {
                println!(
                    "[OK] {}: {} ({}x{} px, extent {})",
                    label,
                    path.display(),
                    raster.width(),
                    raster.height(),
                    raster.extent
                );
                match raster.epsg {
                    Some(epsg) if epsg != config.map.epsg => {
                        println!(
                            "[FAIL] {}: declares EPSG:{}, configuration expects EPSG:{}",
                            label, epsg, config.map.epsg
                        );
                        failures += 1;
                    }
                    Some(epsg) => println!("[OK] {}: CRS is EPSG:{}", label, epsg),
                    None => println!("[WARN] {}: no EPSG code in file, assuming configured CRS", label),
                }
                if raster.extent.intersect(&region).is_some() {
                    println!("[OK] {}: extent covers the region of interest", label);
                } else {
                    println!(
                        "[FAIL] {}: extent {} does not intersect region {}",
                        label, raster.extent, region
                    );
                    failures += 1;
                }
            }
            Err(e) => {
                println!("[FAIL] {}: {}: {e}", label, path.display());
                failures += 1;
            }
        }
    }

    println!();
    if failures == 0 {
        println!("All inputs are usable. Icetrack is ready.");
        Ok(())
    } else {
        println!("{failures} check(s) failed. See above.");
        anyhow::bail!("input check failed")
    }
}
