//! DEM mosaic preparation
//!
//! Builds a GeoTIFF covering a scene footprint from the Copernicus GLO-30
//! tiles: the footprint's UTM envelope is buffered, the intersecting tiles
//! are gathered into a VRT, and the VRT is warped into the UTM zone of the
//! envelope centroid on a pixel-aligned grid.

use crate::core::antimeridian::{footprint_centroid, spans_antimeridian, unwrap_geometry};
use crate::core::envelope::envelope_geometry;
use crate::core::tile_shift::shift_for_antimeridian;
use crate::core::utm::utm_for_centroid;
use crate::io::gdal_config::GdalConfigGuard;
use crate::io::raster::open_tile;
use crate::io::tile_index::{TileIndex, DEFAULT_TILE_INDEX};
use crate::types::{geometry_to_geojson, Footprint, InsarError, InsarResult};
use gdal::programs::raster::build_vrt;
use gdal::Dataset;
use serde::{Deserialize, Serialize};
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::path::{Path, PathBuf};
use std::ptr;

/// Mosaic preparation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MosaicConfig {
    /// Tile index URL or path
    pub tile_index: String,
    /// Distance in degrees the envelope is grown by when selecting tiles
    pub buffer_degrees: f64,
    /// Output pixel size in metres
    pub pixel_size: f64,
    /// GDAL resampling algorithm name
    pub resample_alg: String,
    /// Let GDAL warp with multiple threads
    pub multithread: bool,
    /// GDAL config options held for the duration of one preparation
    pub gdal_options: Vec<(String, String)>,
    /// Parent of the per-run scratch directory; the system temp dir when unset
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            tile_index: DEFAULT_TILE_INDEX.to_string(),
            buffer_degrees: 0.15,
            pixel_size: 30.0,
            resample_alg: "cubic".to_string(),
            multithread: cfg!(feature = "parallel"),
            gdal_options: vec![(
                "GDAL_DISABLE_READDIR_ON_OPEN".to_string(),
                "EMPTY_DIR".to_string(),
            )],
            scratch_dir: None,
        }
    }
}

/// What a preparation produced
#[derive(Debug, Clone, PartialEq)]
pub struct MosaicSummary {
    pub epsg: u32,
    pub tile_count: usize,
    pub antimeridian: bool,
}

/// Prepares DEM mosaics against one tile index
pub struct DemMosaicker {
    index: TileIndex,
    config: MosaicConfig,
}

impl DemMosaicker {
    pub fn new(config: MosaicConfig) -> InsarResult<Self> {
        let index = TileIndex::open(&config.tile_index)?;
        Ok(Self { index, config })
    }

    pub fn with_index(index: TileIndex, config: MosaicConfig) -> Self {
        Self { index, config }
    }

    pub fn config(&self) -> &MosaicConfig {
        &self.config
    }

    /// Create a DEM GeoTIFF at `output` covering `footprint`.
    ///
    /// Fails with `NoCoverage` before touching any tile when the footprint
    /// misses the index entirely. Intermediate VRTs live in a temporary
    /// directory that is removed on every exit path.
    pub fn prepare_dem_geotiff(&self, output: &Path, footprint: &Footprint) -> InsarResult<MosaicSummary> {
        let _gdal_options = GdalConfigGuard::apply(&self.config.gdal_options)?;

        let geometry = footprint.to_geometry();
        if !self.index.intersects(&geometry)? {
            return Err(InsarError::NoCoverage(format!(
                "Copernicus GLO-30 Public DEM does not intersect this geometry: {}",
                geometry_to_geojson(&geometry)?
            )));
        }

        let mut scratch = tempfile::Builder::new();
        scratch.prefix("dem-mosaic-");
        let temp_dir = match &self.config.scratch_dir {
            Some(parent) => scratch.tempdir_in(parent)?,
            None => scratch.tempdir()?,
        };
        log::debug!("DEM scratch directory: {}", temp_dir.path().display());

        let envelope = envelope_geometry(footprint)?;
        let bounds = envelope.to_geometry();
        // a simple footprint close to 180 can still get an envelope corner past it
        let antimeridian = envelope.is_antimeridian_split() || spans_antimeridian(&bounds);
        let centroid = footprint_centroid(&envelope)?;

        let query = if antimeridian { unwrap_geometry(&bounds) } else { bounds };
        let mut dem_file_paths = self
            .index
            .select_tiles_near(&query, self.config.buffer_degrees, antimeridian)?;
        if dem_file_paths.is_empty() {
            return Err(InsarError::NoCoverage(format!(
                "no DEM tiles found within {} degrees of the footprint envelope",
                self.config.buffer_degrees
            )));
        }

        if antimeridian {
            dem_file_paths = shift_for_antimeridian(&dem_file_paths, temp_dir.path())?;
        }

        let dem_vrt = temp_dir.path().join("dem.vrt");
        let mosaic = build_mosaic_vrt(&dem_vrt, &dem_file_paths)?;

        let epsg = utm_for_centroid(centroid)?;
        log::info!(
            "Warping {} DEM tiles to EPSG:{} at {} m",
            dem_file_paths.len(),
            epsg,
            self.config.pixel_size
        );
        warp_to_utm(&mosaic, output, epsg, &self.config)?;
        drop(mosaic);

        temp_dir.close()?;
        Ok(MosaicSummary {
            epsg,
            tile_count: dem_file_paths.len(),
            antimeridian,
        })
    }
}

/// Prepare a DEM GeoTIFF with the default index and settings
pub fn prepare_dem_geotiff(output_name: &Path, footprint: &Footprint, pixel_size: f64) -> InsarResult<MosaicSummary> {
    let config = MosaicConfig {
        pixel_size,
        ..MosaicConfig::default()
    };
    DemMosaicker::new(config)?.prepare_dem_geotiff(output_name, footprint)
}

/// Open every tile and write a VRT referencing them all
fn build_mosaic_vrt(dest: &Path, dem_file_paths: &[String]) -> InsarResult<Dataset> {
    let datasets = dem_file_paths
        .iter()
        .map(|path| open_tile(path))
        .collect::<InsarResult<Vec<Dataset>>>()?;
    build_vrt(Some(dest), &datasets, None)
        .map_err(|e| InsarError::MosaicWrite(format!("virtual mosaic {}: {}", dest.display(), e)))
}

/// `gdalwarp` arguments for the final resample
fn warp_arguments(epsg: u32, config: &MosaicConfig) -> Vec<String> {
    let pixel = config.pixel_size.to_string();
    let mut args = vec![
        "-of".to_string(),
        "GTiff".to_string(),
        "-overwrite".to_string(),
        "-t_srs".to_string(),
        format!("EPSG:{}", epsg),
        "-tr".to_string(),
        pixel.clone(),
        pixel,
        "-tap".to_string(),
        "-r".to_string(),
        config.resample_alg.clone(),
    ];
    if config.multithread {
        args.extend(["-multi", "-wo", "NUM_THREADS=ALL_CPUS"].iter().map(|s| s.to_string()));
    }
    args
}

fn last_gdal_error() -> String {
    unsafe {
        let msg = gdal_sys::CPLGetLastErrorMsg();
        if msg.is_null() {
            String::new()
        } else {
            CStr::from_ptr(msg).to_string_lossy().into_owned()
        }
    }
}

fn warp_to_utm(source: &Dataset, output: &Path, epsg: u32, config: &MosaicConfig) -> InsarResult<()> {
    let args = warp_arguments(epsg, config);
    log::debug!("gdalwarp {}", args.join(" "));

    let c_args = args
        .iter()
        .map(|a| CString::new(a.as_str()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| InsarError::MosaicWrite(format!("invalid warp argument: {}", e)))?;
    let mut argv: Vec<*mut c_char> = c_args.iter().map(|a| a.as_ptr() as *mut c_char).collect();
    argv.push(ptr::null_mut());
    let dest = CString::new(output.to_string_lossy().as_bytes())
        .map_err(|e| InsarError::MosaicWrite(format!("invalid output path: {}", e)))?;

    unsafe {
        let options = gdal_sys::GDALWarpAppOptionsNew(argv.as_mut_ptr(), ptr::null_mut());
        if options.is_null() {
            return Err(InsarError::MosaicWrite(format!("warp options rejected: {}", last_gdal_error())));
        }
        let mut sources = [source.c_dataset()];
        let mut usage_error: c_int = 0;
        let warped = gdal_sys::GDALWarp(
            dest.as_ptr(),
            ptr::null_mut(),
            1,
            sources.as_mut_ptr(),
            options,
            &mut usage_error,
        );
        gdal_sys::GDALWarpAppOptionsFree(options);
        if warped.is_null() {
            return Err(InsarError::MosaicWrite(format!(
                "{}: {}",
                output.display(),
                last_gdal_error()
            )));
        }
        gdal_sys::GDALClose(warped);
    }
    Ok(())
}
