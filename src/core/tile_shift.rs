//! Re-georeferencing of western-hemisphere tiles for antimeridian mosaics

use crate::io::raster::{open_tile, RasterInfo};
use crate::types::{InsarError, InsarResult};
use gdal::DriverManager;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Copernicus tiles carry their lower-left longitude as `_W180`, `_E179`, ...
fn western_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"_W\d{3}").expect("western tile marker pattern is valid"))
}

/// True when the tile file name places it in the western hemisphere
pub fn is_western_tile(file_path: &str) -> bool {
    let name = Path::new(file_path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file_path);
    western_marker().is_match(name)
}

fn shifted_path(file_path: &str, directory: &Path) -> InsarResult<PathBuf> {
    let stem = Path::new(file_path)
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| InsarError::TileRead {
            path: file_path.to_string(),
            message: "tile path has no file name".to_string(),
        })?;
    Ok(directory.join(format!("{}.vrt", stem)))
}

/// Write a VRT view of one tile moved 360° east. No pixels are copied.
pub fn shift_tile(file_path: &str, directory: &Path) -> InsarResult<PathBuf> {
    let output = shifted_path(file_path, directory)?;
    let tile_error = |e: gdal::errors::GdalError| InsarError::TileRead {
        path: file_path.to_string(),
        message: e.to_string(),
    };

    let dataset = open_tile(file_path)?;
    let info = RasterInfo::from_dataset(&dataset)?;
    let shifted = info.geo_transform.translated_x(360.0);

    let driver = DriverManager::get_driver_by_name("VRT")?;
    let mut vrt = dataset.create_copy(&driver, &output, &[]).map_err(tile_error)?;
    vrt.set_geo_transform(&shifted.to_gdal()).map_err(tile_error)?;
    // closing the VRT writes it to disk
    drop(vrt);

    log::debug!(
        "Shifted {} to {} (upper left {:.7} -> {:.7})",
        file_path,
        output.display(),
        info.geo_transform.top_left_x,
        shifted.top_left_x
    );
    Ok(output)
}

/// Replace every western tile with a shifted view in `directory`.
///
/// Other tiles pass through unchanged; the output order matches the input.
pub fn shift_for_antimeridian(dem_file_paths: &[String], directory: &Path) -> InsarResult<Vec<String>> {
    let mut shifted_file_paths = Vec::with_capacity(dem_file_paths.len());
    for file_path in dem_file_paths {
        if is_western_tile(file_path) {
            let shifted = shift_tile(file_path, directory)?;
            shifted_file_paths.push(shifted.to_string_lossy().into_owned());
        } else {
            shifted_file_paths.push(file_path.clone());
        }
    }
    log::info!(
        "Shifted {} of {} tiles across the antimeridian",
        dem_file_paths.iter().filter(|p| is_western_tile(p)).count(),
        dem_file_paths.len()
    );
    Ok(shifted_file_paths)
}
