//! Antimeridian handling for footprints split at ±180°
//!
//! Coordinates are unwrapped into [0, 360) by adding 360 to strictly
//! negative longitudes. Longitude 0 (and -0.0) is left alone.

use crate::core::geometry::envelope;
use crate::types::{Footprint, Geometry, InsarError, InsarResult, Point};
use geo::{coord, Centroid, MapCoords};

/// True when the footprint was split at the date line on load
pub fn is_crossing(footprint: &Footprint) -> bool {
    footprint.is_antimeridian_split()
}

/// True when a lon/lat geometry spans more than half the globe, which for
/// anything scene-sized means it runs across ±180° in the naive view
pub fn spans_antimeridian(geometry: &Geometry) -> bool {
    envelope(geometry).map_or(false, |bbox| bbox.width() > 180.0)
}

/// Shift one longitude into the continuous [0, 360) view
pub fn unwrap_longitude(lon: f64) -> f64 {
    if lon < 0.0 {
        lon + 360.0
    } else {
        lon
    }
}

/// Copy of `geometry` with every negative longitude moved east by 360°
pub fn unwrap_geometry(geometry: &Geometry) -> Geometry {
    geometry.map_coords(|c| coord! { x: unwrap_longitude(c.x), y: c.y })
}

fn centroid_of(geometry: &Geometry) -> InsarResult<Point> {
    geometry
        .centroid()
        .ok_or_else(|| InsarError::Projection("footprint has no centroid".to_string()))
}

/// Centroid computed in the unwrapped view.
///
/// For parts at 177..180 and -180..-179 this lands near 179 instead of the
/// naive ~0. The result may exceed 180; UTM zone selection wraps it.
pub fn unwrapped_centroid(geometry: &Geometry) -> InsarResult<Point> {
    centroid_of(&unwrap_geometry(geometry))
}

/// Centroid appropriate for the footprint: unwrapped when it was split at
/// the date line or runs across it, plain otherwise
pub fn footprint_centroid(footprint: &Footprint) -> InsarResult<Point> {
    let geometry = footprint.to_geometry();
    if footprint.is_antimeridian_split() || spans_antimeridian(&geometry) {
        unwrapped_centroid(&geometry)
    } else {
        centroid_of(&geometry)
    }
}
