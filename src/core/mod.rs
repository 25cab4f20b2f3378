//! Core DEM preparation modules

pub mod geometry;
pub mod antimeridian;
pub mod utm;
pub mod envelope;
pub mod tile_shift;
pub mod mosaic;

// Re-export main types
pub use geometry::{distance, envelope, within_distance};
pub use antimeridian::{
    footprint_centroid, is_crossing, spans_antimeridian, unwrap_geometry, unwrap_longitude, unwrapped_centroid,
};
pub use utm::{utm_for_centroid, utm_from_lon_lat};
pub use envelope::{envelope_geometry, utm_envelope, UtmEnvelope, UtmProjection};
pub use tile_shift::{is_western_tile, shift_for_antimeridian, shift_tile};
pub use mosaic::{prepare_dem_geotiff, DemMosaicker, MosaicConfig, MosaicSummary};
