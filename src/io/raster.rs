//! Raster metadata helpers

use crate::types::{GeoTransform, InsarError, InsarResult};
use gdal::Dataset;
use std::path::Path;

/// Corner coordinates and grid of a north-up raster
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterInfo {
    pub width: usize,
    pub height: usize,
    pub geo_transform: GeoTransform,
}

impl RasterInfo {
    pub fn from_dataset(dataset: &Dataset) -> InsarResult<Self> {
        let (width, height) = dataset.raster_size();
        let geo_transform = GeoTransform::from_gdal(dataset.geo_transform()?);
        Ok(Self {
            width,
            height,
            geo_transform,
        })
    }

    /// Open a tile and read its grid; failures name the tile
    pub fn read_tile(path: &str) -> InsarResult<Self> {
        let dataset = open_tile(path)?;
        Self::from_dataset(&dataset).map_err(|e| InsarError::TileRead {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    pub fn upper_left(&self) -> (f64, f64) {
        (self.geo_transform.top_left_x, self.geo_transform.top_left_y)
    }

    pub fn lower_right(&self) -> (f64, f64) {
        let gt = &self.geo_transform;
        (
            gt.top_left_x + self.width as f64 * gt.pixel_width,
            gt.top_left_y + self.height as f64 * gt.pixel_height,
        )
    }
}

/// Open a DEM tile (local path or GDAL virtual path such as `/vsicurl/...`)
pub fn open_tile(path: &str) -> InsarResult<Dataset> {
    Dataset::open(Path::new(path)).map_err(|e| InsarError::TileRead {
        path: path.to_string(),
        message: e.to_string(),
    })
}
