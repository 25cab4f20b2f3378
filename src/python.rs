//! Python module definition

use crate::core::{self as dem, MosaicConfig};
use crate::io::kml;
use crate::types::{geometry_to_geojson, Footprint, InsarError};
use pyo3::prelude::*;
use std::path::Path;

fn to_py_err(e: InsarError) -> PyErr {
    PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!("{}", e))
}

#[pymodule]
fn _core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(utm_from_lon_lat, m)?)?;
    m.add_function(wrap_pyfunction!(get_geometry_from_kml, m)?)?;
    m.add_function(wrap_pyfunction!(prepare_dem_geotiff, m)?)?;
    Ok(())
}

/// WGS84 UTM EPSG code for a longitude/latitude pair
#[pyfunction]
fn utm_from_lon_lat(lon: f64, lat: f64) -> u32 {
    dem::utm_from_lon_lat(lon, lat)
}

/// Footprint of the first feature in a KML file, as GeoJSON text
#[pyfunction]
fn get_geometry_from_kml(kml_file: String) -> PyResult<String> {
    let footprint = kml::get_geometry_from_kml(&kml_file).map_err(to_py_err)?;
    geometry_to_geojson(&footprint.to_geometry()).map_err(to_py_err)
}

/// Create a DEM mosaic GeoTIFF covering a GeoJSON geometry
#[pyfunction]
#[pyo3(signature = (output_name, geometry, pixel_size = 30.0))]
fn prepare_dem_geotiff(output_name: String, geometry: String, pixel_size: f64) -> PyResult<u32> {
    let footprint = Footprint::from_geojson(&geometry).map_err(to_py_err)?;
    let config = MosaicConfig {
        pixel_size,
        ..MosaicConfig::default()
    };
    let summary = dem::DemMosaicker::new(config)
        .and_then(|m| m.prepare_dem_geotiff(Path::new(&output_name), &footprint))
        .map_err(to_py_err)?;
    Ok(summary.epsg)
}
