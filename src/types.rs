use geo::Rect;
use serde::{Deserialize, Serialize};

pub use geo::{Coord, Geometry, MultiPoint, MultiPolygon, Point, Polygon};

/// Parse a bare GeoJSON geometry object
pub fn geometry_from_geojson(text: &str) -> InsarResult<Geometry> {
    let geometry: geojson::Geometry = serde_json::from_str(text)?;
    Ok(Geometry::try_from(geometry)?)
}

/// Serialise a geometry as a bare GeoJSON geometry object
pub fn geometry_to_geojson(geometry: &Geometry) -> InsarResult<String> {
    let geometry = geojson::Geometry::new(geojson::Value::from(geometry));
    Ok(serde_json::to_string(&geometry)?)
}

/// Footprint of a scene in geographic coordinates.
///
/// The variant is decided once, when the footprint is loaded: the vector
/// conversion only emits a multi-polygon when it had to split the source
/// polygon at the date line.
#[derive(Debug, Clone, PartialEq)]
pub enum Footprint {
    /// Ordinary polygon that does not touch the antimeridian
    Simple(Polygon),
    /// Polygon split at ±180° into parts that each lie in one hemisphere
    AntimeridianSplit(MultiPolygon),
}

impl Footprint {
    /// Classify a geographic geometry by its shape
    pub fn from_geometry(geometry: Geometry) -> InsarResult<Self> {
        match geometry {
            Geometry::Polygon(polygon) => Ok(Footprint::Simple(polygon)),
            Geometry::MultiPolygon(parts) => Ok(Footprint::AntimeridianSplit(parts)),
            other => Err(InsarError::GeometryLoad(format!(
                "expected a Polygon or MultiPolygon footprint, found {}",
                geometry_type_name(&other)
            ))),
        }
    }

    pub fn from_geojson(text: &str) -> InsarResult<Self> {
        let geometry = geometry_from_geojson(text)
            .map_err(|e| InsarError::GeometryLoad(format!("invalid GeoJSON geometry: {}", e)))?;
        Self::from_geometry(geometry)
    }

    pub fn is_antimeridian_split(&self) -> bool {
        matches!(self, Footprint::AntimeridianSplit(_))
    }

    pub fn to_geometry(&self) -> Geometry {
        match self {
            Footprint::Simple(polygon) => Geometry::Polygon(polygon.clone()),
            Footprint::AntimeridianSplit(parts) => Geometry::MultiPolygon(parts.clone()),
        }
    }
}

/// GeoJSON-style type name of a geometry
pub fn geometry_type_name(geometry: &Geometry) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

impl From<Rect> for BoundingBox {
    fn from(rect: Rect) -> Self {
        Self {
            min_x: rect.min().x,
            max_x: rect.max().x,
            min_y: rect.min().y,
            max_y: rect.max().y,
        }
    }
}

/// Geospatial transformation parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub top_left_x: f64,
    pub pixel_width: f64,
    pub rotation_x: f64,
    pub top_left_y: f64,
    pub rotation_y: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    pub fn from_gdal(gt: [f64; 6]) -> Self {
        Self {
            top_left_x: gt[0],
            pixel_width: gt[1],
            rotation_x: gt[2],
            top_left_y: gt[3],
            rotation_y: gt[4],
            pixel_height: gt[5],
        }
    }

    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.top_left_x,
            self.pixel_width,
            self.rotation_x,
            self.top_left_y,
            self.rotation_y,
            self.pixel_height,
        ]
    }

    /// Same grid moved by `dx` along x
    pub fn translated_x(&self, dx: f64) -> Self {
        Self {
            top_left_x: self.top_left_x + dx,
            ..*self
        }
    }
}

/// Error types for DEM preparation and InSAR job plumbing
#[derive(Debug, thiserror::Error)]
pub enum InsarError {
    #[error("Geometry load error: {0}")]
    GeometryLoad(String),

    #[error("No DEM coverage: {0}")]
    NoCoverage(String),

    #[error("Projection error: {0}")]
    Projection(String),

    #[error("Failed to read DEM tile {path}: {message}")]
    TileRead { path: String, message: String },

    #[error("Failed to write DEM mosaic: {0}")]
    MosaicWrite(String),

    #[error("Tile index error: {0}")]
    TileIndex(String),

    #[error("Invalid granule: {0}")]
    InvalidGranule(String),

    #[error("Processing failed: {0}")]
    Processor(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),
}

/// Result type for DEM preparation and InSAR operations
pub type InsarResult<T> = Result<T, InsarError>;

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{coord, point, polygon};

    #[test]
    fn test_geometry_geojson_shape() {
        let geometry = Geometry::Point(point!(x: 169.0, y: -45.0));
        let text = geometry_to_geojson(&geometry).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value, serde_json::json!({"type": "Point", "coordinates": [169.0, -45.0]}));

        let parsed = geometry_from_geojson(
            r#"{"type": "Polygon", "coordinates": [[[0, 0, 12.5], [0, 1, 3], [1, 1, 0], [0, 0, 1]]]}"#,
        )
        .unwrap();
        match parsed {
            Geometry::Polygon(polygon) => {
                assert_eq!(polygon.exterior().0.len(), 4);
                assert_eq!(polygon.exterior().0[1], coord! { x: 0.0, y: 1.0 });
                assert!(polygon.interiors().is_empty());
            }
            other => panic!("unexpected geometry {:?}", other),
        }
    }

    #[test]
    fn test_unknown_geometry_type_is_error() {
        assert!(geometry_from_geojson(r#"{"type": "Blob", "coordinates": [1.0, 2.0]}"#).is_err());
    }

    #[test]
    fn test_footprint_variant_from_geometry() {
        let simple = Footprint::from_geojson(
            r#"{"type": "Polygon", "coordinates": [[[0, 0], [0, 1], [1, 1], [0, 0]]]}"#,
        )
        .unwrap();
        assert!(!simple.is_antimeridian_split());
        assert_eq!(
            simple,
            Footprint::Simple(polygon![(x: 0.0, y: 0.0), (x: 0.0, y: 1.0), (x: 1.0, y: 1.0), (x: 0.0, y: 0.0)])
        );

        let split = Footprint::from_geojson(
            r#"{"type": "MultiPolygon", "coordinates": [[[[179, 0], [179, 1], [180, 1], [179, 0]]],
                [[[-180, 0], [-180, 1], [-179, 1], [-180, 0]]]]}"#,
        )
        .unwrap();
        assert!(split.is_antimeridian_split());

        let err = Footprint::from_geojson(r#"{"type": "Point", "coordinates": [0, 0]}"#);
        assert!(matches!(err, Err(InsarError::GeometryLoad(_))));
    }

    #[test]
    fn test_bounding_box_from_rect() {
        let bbox = BoundingBox::from(Rect::new(coord! { x: 3.0, y: -1.0 }, coord! { x: -2.0, y: 4.0 }));
        assert_eq!((bbox.min_x, bbox.max_x, bbox.min_y, bbox.max_y), (-2.0, 3.0, -1.0, 4.0));
        assert_eq!(bbox.width(), 5.0);
    }

    #[test]
    fn test_geo_transform_translation() {
        let gt = GeoTransform::from_gdal([-180.0, 0.001, 0.0, 52.0, 0.0, -0.001]);
        let shifted = gt.translated_x(360.0);
        assert_eq!(shifted.top_left_x, 180.0);
        assert_eq!(shifted.to_gdal()[1..], gt.to_gdal()[1..]);
    }
}
