#![allow(dead_code)]

use gdal::raster::Buffer;
use gdal::spatial_ref::SpatialRef;
use gdal::DriverManager;
use std::fs;
use std::path::{Path, PathBuf};

/// Pixels per side of a synthetic 1x1 degree tile
pub const TILE_PIXELS: usize = 120;

/// Copernicus-style tile name for the cell whose lower-left corner is (lon, lat)
pub fn tile_name(lat: i32, lon: i32) -> String {
    format!(
        "Copernicus_DSM_COG_10_{}{:02}_00_{}{:03}_00_DEM.tif",
        if lat >= 0 { 'N' } else { 'S' },
        lat.abs(),
        if lon >= 0 { 'E' } else { 'W' },
        lon.abs()
    )
}

/// Write a small 1x1 degree EPSG:4326 elevation tile and return its path
pub fn write_tile(dir: &Path, lat: i32, lon: i32) -> String {
    let path = dir.join(tile_name(lat, lon));
    let driver = DriverManager::get_driver_by_name("GTiff").expect("GTiff driver");
    let mut dataset = driver
        .create_with_band_type::<f32, _>(&path, 120, 120, 1)
        .expect("Failed to create tile");

    let pixel = 1.0 / TILE_PIXELS as f64;
    dataset
        .set_geo_transform(&[lon as f64, pixel, 0.0, (lat + 1) as f64, 0.0, -pixel])
        .expect("Failed to set geotransform");
    dataset
        .set_spatial_ref(&SpatialRef::from_epsg(4326).expect("EPSG:4326"))
        .expect("Failed to set spatial reference");

    // gentle slope so resampled values differ between pixels
    let data: Vec<f32> = (0..TILE_PIXELS * TILE_PIXELS)
        .map(|i| 100.0 + (i / TILE_PIXELS) as f32 * 0.5 + (i % TILE_PIXELS) as f32 * 0.25)
        .collect();
    let buffer = Buffer::new((TILE_PIXELS, TILE_PIXELS), data);
    let mut band = dataset.rasterband(1).expect("band 1");
    band.write((0, 0), (TILE_PIXELS, TILE_PIXELS), &buffer)
        .expect("Failed to write tile data");

    path.to_string_lossy().into_owned()
}

/// GeoJSON feature line for a tile footprint, in GDAL's one-feature-per-line layout
pub fn feature_line(file_path: &str, lat: i32, lon: i32) -> String {
    let (w, s, e, n) = (lon as f64, lat as f64, (lon + 1) as f64, (lat + 1) as f64);
    format!(
        "{{ \"type\": \"Feature\", \"properties\": {{ \"file_path\": \"{}\" }}, \"geometry\": {{ \"type\": \"Polygon\", \"coordinates\": [ [ [ {w}, {s} ], [ {w}, {n} ], [ {e}, {n} ], [ {e}, {s} ], [ {w}, {s} ] ] ] }} }}",
        file_path,
        w = w,
        s = s,
        e = e,
        n = n
    )
}

/// Write an index listing the given (file_path, lat, lon) tiles
pub fn write_index(dir: &Path, tiles: &[(String, i32, i32)]) -> PathBuf {
    let mut text = String::from(
        "{\n\"type\": \"FeatureCollection\",\n\"name\": \"synthetic\",\n\"features\": [\n",
    );
    let lines: Vec<String> = tiles
        .iter()
        .map(|(path, lat, lon)| feature_line(path, *lat, *lon))
        .collect();
    text.push_str(&lines.join(",\n"));
    text.push_str("\n]\n}\n");

    let index = dir.join("index.geojson");
    fs::write(&index, text).expect("Failed to write index");
    index
}

/// Write real tiles for every (lat, lon) cell and an index pointing at them
pub fn synthetic_dem(dir: &Path, cells: &[(i32, i32)]) -> PathBuf {
    let tiles: Vec<(String, i32, i32)> = cells
        .iter()
        .map(|&(lat, lon)| (write_tile(dir, lat, lon), lat, lon))
        .collect();
    write_index(dir, &tiles)
}
