//! Planar predicates over lon/lat geometries
//!
//! Coordinates are treated as a flat plane, the way OGR treats EPSG:4326
//! geometries. Boundaries are inclusive: two tiles sharing an edge intersect.

use crate::types::{BoundingBox, Geometry, Point, Polygon};
use geo::{BoundingRect, EuclideanDistance, Intersects};

/// Points and polygons a geometry decomposes into for distance tests
enum Part<'a> {
    Point(Point),
    Polygon(&'a Polygon),
}

fn parts(geometry: &Geometry) -> Vec<Part<'_>> {
    match geometry {
        Geometry::Point(p) => vec![Part::Point(*p)],
        Geometry::MultiPoint(points) => points.iter().map(|p| Part::Point(*p)).collect(),
        Geometry::Polygon(polygon) => vec![Part::Polygon(polygon)],
        Geometry::MultiPolygon(polygons) => polygons.iter().map(Part::Polygon).collect(),
        // tile footprints and queries are points or polygons; other shapes
        // are measured by their vertices
        other => geo::CoordsIter::coords_iter(other).map(|c| Part::Point(c.into())).collect(),
    }
}

fn parts_distance(a: &Part<'_>, b: &Part<'_>) -> f64 {
    match (a, b) {
        (Part::Point(p), Part::Point(q)) => p.euclidean_distance(q),
        (Part::Point(p), Part::Polygon(poly)) | (Part::Polygon(poly), Part::Point(p)) => {
            p.euclidean_distance(*poly)
        }
        (Part::Polygon(pa), Part::Polygon(pb)) => pa.euclidean_distance(*pb),
    }
}

/// Shortest planar distance between two geometries, zero when they intersect
pub fn distance(a: &Geometry, b: &Geometry) -> f64 {
    if a.intersects(b) {
        return 0.0;
    }
    let ours = parts(a);
    let theirs = parts(b);
    ours.iter()
        .flat_map(|pa| theirs.iter().map(move |pb| parts_distance(pa, pb)))
        .fold(f64::INFINITY, f64::min)
}

/// True when `b` lies within `max_distance` of `a`.
///
/// Same answer as intersecting `b` with `a` buffered by `max_distance`,
/// without building the buffer polygon.
pub fn within_distance(a: &Geometry, b: &Geometry, max_distance: f64) -> bool {
    if a.intersects(b) {
        return true;
    }
    max_distance > 0.0 && distance(a, b) <= max_distance
}

/// Axis-aligned bounds; `None` for an empty geometry
pub fn envelope(geometry: &Geometry) -> Option<BoundingBox> {
    geometry.bounding_rect().map(BoundingBox::from)
}
