//! insar-prep: DEM mosaic preparation for Sentinel-1 InSAR processing
//!
//! Builds UTM-projected elevation mosaics from the Copernicus GLO-30 tiles
//! for any scene footprint, including footprints that cross the
//! antimeridian, and provides the job plumbing around the external InSAR
//! processor.

pub mod types;
pub mod io;
pub mod core;
pub mod insar;

#[cfg(feature = "python")]
mod python;

// Re-export main types and functions for easier access
pub use types::{
    BoundingBox, Coord, Footprint, GeoTransform, Geometry, InsarError, InsarResult, MultiPolygon, Point, Polygon
};

pub use crate::io::{get_geometry_from_kml, TileIndex};
pub use crate::core::{prepare_dem_geotiff, utm_from_lon_lat, DemMosaicker, MosaicConfig};
