//! UTM envelope construction for scene footprints

use crate::core::antimeridian::footprint_centroid;
use crate::core::geometry::envelope;
use crate::core::utm::utm_for_centroid;
use crate::types::{geometry_type_name, BoundingBox, Footprint, Geometry, InsarError, InsarResult, MultiPolygon, Polygon};
use gdal::spatial_ref::{CoordTransform, SpatialRef};
use geo::{coord, MapCoords, Rect};

/// Geographic CRS with longitude-first axis order
const LON_LAT_PROJ4: &str = "+proj=longlat +datum=WGS84 +no_defs";

/// Forward and inverse transforms between lon/lat and one UTM zone
pub struct UtmProjection {
    epsg: u32,
    to_utm: CoordTransform,
    to_geographic: CoordTransform,
}

impl UtmProjection {
    pub fn new(epsg: u32) -> InsarResult<Self> {
        let geographic = SpatialRef::from_proj4(LON_LAT_PROJ4)
            .map_err(|e| InsarError::Projection(format!("geographic CRS: {}", e)))?;
        let utm = SpatialRef::from_epsg(epsg)
            .map_err(|e| InsarError::Projection(format!("EPSG:{}: {}", epsg, e)))?;
        let to_utm = CoordTransform::new(&geographic, &utm)
            .map_err(|e| InsarError::Projection(format!("lon/lat -> EPSG:{}: {}", epsg, e)))?;
        let to_geographic = CoordTransform::new(&utm, &geographic)
            .map_err(|e| InsarError::Projection(format!("EPSG:{} -> lon/lat: {}", epsg, e)))?;
        Ok(Self {
            epsg,
            to_utm,
            to_geographic,
        })
    }

    pub fn epsg(&self) -> u32 {
        self.epsg
    }

    pub fn forward(&self, geometry: &Geometry) -> InsarResult<Geometry> {
        transform_geometry(&self.to_utm, geometry)
    }

    pub fn inverse(&self, geometry: &Geometry) -> InsarResult<Geometry> {
        transform_geometry(&self.to_geographic, geometry)
    }
}

fn transform_geometry(transform: &CoordTransform, geometry: &Geometry) -> InsarResult<Geometry> {
    geometry.try_map_coords(|c| {
        let mut x = [c.x];
        let mut y = [c.y];
        transform
            .transform_coords(&mut x, &mut y, &mut [])
            .map_err(|e| InsarError::Projection(format!("coordinate transform failed: {}", e)))
            .map(|_| coord! { x: x[0], y: y[0] })
    })
}

fn rectangle(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Polygon {
    Rect::new(coord! { x: min_x, y: min_y }, coord! { x: max_x, y: max_y }).to_polygon()
}

/// Footprint bounds in its local UTM zone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UtmEnvelope {
    pub epsg: u32,
    pub bounds: BoundingBox,
}

impl UtmEnvelope {
    /// Envelope rectangles in UTM metres: one for a simple footprint, two
    /// halves split at the horizontal midpoint for an antimeridian footprint
    pub fn rectangles(&self, split: bool) -> Vec<Polygon> {
        let b = self.bounds;
        if split {
            let mid = (b.max_x + b.min_x) / 2.0;
            vec![
                rectangle(b.min_x, b.min_y, mid, b.max_y),
                rectangle(mid, b.min_y, b.max_x, b.max_y),
            ]
        } else {
            vec![rectangle(b.min_x, b.min_y, b.max_x, b.max_y)]
        }
    }
}

/// Project the footprint into the UTM zone of its centroid and take its bounds
pub fn utm_envelope(footprint: &Footprint) -> InsarResult<(UtmProjection, UtmEnvelope)> {
    let centroid = footprint_centroid(footprint)?;
    let epsg = utm_for_centroid(centroid)?;
    let projection = UtmProjection::new(epsg)?;

    let projected = projection.forward(&footprint.to_geometry())?;
    let bounds = envelope(&projected)
        .ok_or_else(|| InsarError::Projection("footprint has no vertices".to_string()))?;
    if [bounds.min_x, bounds.max_x, bounds.min_y, bounds.max_y]
        .iter()
        .any(|v| !v.is_finite())
    {
        return Err(InsarError::Projection(format!(
            "footprint does not project into EPSG:{}",
            epsg
        )));
    }

    log::debug!(
        "UTM envelope in EPSG:{}: x {:.1}..{:.1}, y {:.1}..{:.1}",
        epsg,
        bounds.min_x,
        bounds.max_x,
        bounds.min_y,
        bounds.max_y
    );
    Ok((projection, UtmEnvelope { epsg, bounds }))
}

/// Geographic envelope of a footprint, built in its local UTM zone.
///
/// A simple footprint yields a single quadrilateral. An antimeridian
/// footprint yields two, one per half of the UTM envelope, each projected
/// back on its own so neither wraps around the globe.
pub fn envelope_geometry(footprint: &Footprint) -> InsarResult<Footprint> {
    let split = footprint.is_antimeridian_split();
    let (projection, utm) = utm_envelope(footprint)?;

    let mut parts = Vec::new();
    for rectangle in utm.rectangles(split) {
        match projection.inverse(&Geometry::Polygon(rectangle))? {
            Geometry::Polygon(polygon) => parts.push(polygon),
            other => {
                return Err(InsarError::Projection(format!(
                    "unexpected {} after reprojection",
                    geometry_type_name(&other)
                )))
            }
        }
    }

    if split {
        Ok(Footprint::AntimeridianSplit(MultiPolygon::new(parts)))
    } else {
        parts
            .pop()
            .map(Footprint::Simple)
            .ok_or_else(|| InsarError::Projection("empty envelope".to_string()))
    }
}
