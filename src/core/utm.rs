//! UTM zone selection

use crate::types::{InsarError, InsarResult, Point};

/// EPSG base code for northern-hemisphere WGS84 UTM zones
pub const UTM_NORTH_BASE: u32 = 32600;
/// EPSG base code for southern-hemisphere WGS84 UTM zones
pub const UTM_SOUTH_BASE: u32 = 32700;

/// WGS84 / UTM EPSG code for a longitude/latitude pair.
///
/// Zones are 6° wide starting at 180°W. The zone uses floored division, so
/// longitudes outside [-180, 180) wrap: -182 selects the same zone as 178.
/// Latitude 0 counts as northern.
pub fn utm_from_lon_lat(lon: f64, lat: f64) -> u32 {
    let hemisphere = if lat >= 0.0 { UTM_NORTH_BASE } else { UTM_SOUTH_BASE };
    let zone = ((lon / 6.0).floor() as i64 + 30).rem_euclid(60) + 1;
    hemisphere + zone as u32
}

/// Like [`utm_from_lon_lat`] but rejects non-finite coordinates, which would
/// otherwise silently map to some zone
pub fn utm_for_centroid(centroid: Point) -> InsarResult<u32> {
    let (lon, lat) = centroid.x_y();
    if !lon.is_finite() || !lat.is_finite() {
        return Err(InsarError::Projection(format!(
            "cannot select a UTM zone for centroid ({}, {})",
            lon, lat
        )));
    }
    let epsg = utm_from_lon_lat(lon, lat);
    log::debug!("UTM zone for ({:.6}, {:.6}): EPSG:{}", lon, lat, epsg);
    Ok(epsg)
}
