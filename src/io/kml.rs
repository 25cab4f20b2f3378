//! Footprint loading from KML (or any OGR-readable vector file)
//!
//! Conversion is delegated to `ogr2ogr`, which wraps polygons crossing the
//! date line into a multi-polygon. Only the first feature is used.

use crate::types::{Footprint, Geometry, InsarError, InsarResult};
use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Command;

/// How to run the vector conversion tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KmlConversion {
    /// Conversion executable
    pub program: String,
    /// Date-line offset passed to `-datelineoffset`, in degrees
    pub dateline_offset: f64,
}

impl Default for KmlConversion {
    fn default() -> Self {
        Self {
            program: "ogr2ogr".to_string(),
            dateline_offset: 20.0,
        }
    }
}

/// First feature geometry of a GeoJSON FeatureCollection
pub fn first_feature_geometry(geojson: &str) -> InsarResult<Geometry> {
    let collection: FeatureCollection = serde_json::from_str(geojson)
        .map_err(|e| InsarError::GeometryLoad(format!("unreadable GeoJSON: {}", e)))?;
    let geometry = collection
        .features
        .into_iter()
        .next()
        .ok_or_else(|| InsarError::GeometryLoad("source contains no features".to_string()))?
        .geometry
        .ok_or_else(|| InsarError::GeometryLoad("first feature has no geometry".to_string()))?;
    Geometry::try_from(geometry).map_err(|e| InsarError::GeometryLoad(format!("unsupported geometry: {}", e)))
}

/// Load the footprint of the first feature with the default conversion settings
pub fn get_geometry_from_kml<P: AsRef<Path>>(kml_file: P) -> InsarResult<Footprint> {
    load_footprint(kml_file, &KmlConversion::default())
}

/// Load the footprint of the first feature of a vector file
pub fn load_footprint<P: AsRef<Path>>(source: P, conversion: &KmlConversion) -> InsarResult<Footprint> {
    let source = source.as_ref();
    log::info!("Loading footprint from: {}", source.display());

    if !source.is_file() {
        return Err(InsarError::GeometryLoad(format!(
            "vector file not found: {}",
            source.display()
        )));
    }

    let output = Command::new(&conversion.program)
        .arg("-wrapdateline")
        .arg("-datelineoffset")
        .arg(conversion.dateline_offset.to_string())
        .args(["-f", "GeoJSON", "-mapfieldtype", "DateTime=String", "/vsistdout"])
        .arg(source)
        .output()
        .map_err(|e| InsarError::GeometryLoad(format!("failed to run {}: {}", conversion.program, e)))?;

    if !output.status.success() {
        return Err(InsarError::GeometryLoad(format!(
            "{} exited with {}: {}",
            conversion.program,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let geojson = String::from_utf8_lossy(&output.stdout);
    let footprint = Footprint::from_geometry(first_feature_geometry(&geojson)?)?;
    log::debug!(
        "Footprint is {}",
        if footprint.is_antimeridian_split() { "split at the antimeridian" } else { "a simple polygon" }
    );
    Ok(footprint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::geometry_type_name;

    #[test]
    fn test_first_feature_is_used() {
        let geojson = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"Name": "a"}, "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [0, 1], [1, 1], [0, 0]]]}},
            {"type": "Feature", "properties": {"Name": "b"}, "geometry": {"type": "Point", "coordinates": [5, 5]}}
        ]}"#;
        let geometry = first_feature_geometry(geojson).unwrap();
        assert_eq!(geometry_type_name(&geometry), "Polygon");
    }

    #[test]
    fn test_empty_collection_is_load_error() {
        let err = first_feature_geometry(r#"{"type": "FeatureCollection", "features": []}"#);
        assert!(matches!(err, Err(InsarError::GeometryLoad(_))));
        let err = first_feature_geometry("not json");
        assert!(matches!(err, Err(InsarError::GeometryLoad(_))));
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let err = get_geometry_from_kml("/nonexistent/footprint.kml");
        assert!(matches!(err, Err(InsarError::GeometryLoad(_))));
    }
}
