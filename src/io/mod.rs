//! I/O modules for footprints, the DEM tile index, and GDAL state

pub mod gdal_config;
pub mod kml;
pub mod raster;
pub mod tile_index;

pub use gdal_config::GdalConfigGuard;
pub use kml::{get_geometry_from_kml, load_footprint, KmlConversion};
pub use raster::RasterInfo;
pub use tile_index::{TileIndex, TileRecord, DEFAULT_TILE_INDEX};
