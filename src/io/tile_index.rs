//! Client for the DEM tile-boundary index
//!
//! The index is GeoJSON: a FeatureCollection (GDAL writes one feature per
//! line, but any layout is read), a newline-delimited feature sequence, or an
//! RFC 8142 GeoJSON text sequence with record separators. Each feature carries
//! a tile footprint and a `file_path` attribute naming the tile raster. The
//! index is large, so features are streamed and never held in memory as a
//! whole. Dropping the record iterator stops the download.

use crate::core::geometry::within_distance;
use crate::types::{Geometry, InsarError, InsarResult};
use geo::{coord, Intersects, MapCoords};
use geojson::{Feature, FeatureReader};
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read};
use std::iter;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Copernicus GLO-30 tile index mirror
pub const DEFAULT_TILE_INDEX: &str =
    "https://asf-dem-west.s3.amazonaws.com/v2/cop30-2021-us-west-2-mirror.geojson";

/// Leading byte of every record in a GeoJSON text sequence
const RECORD_SEPARATOR: u8 = 0x1e;

/// One tile footprint from the index
#[derive(Debug, Clone, PartialEq)]
pub struct TileRecord {
    pub file_path: String,
    pub footprint: Geometry,
}

impl TileRecord {
    fn from_feature(mut feature: Feature) -> InsarResult<Self> {
        let file_path = feature
            .property("file_path")
            .and_then(|value| value.as_str())
            .map(str::to_string)
            .ok_or_else(|| InsarError::TileIndex("feature has no file_path attribute".to_string()))?;
        let geometry = feature
            .geometry
            .take()
            .ok_or_else(|| InsarError::TileIndex(format!("tile {} has no footprint", file_path)))?;
        let footprint = Geometry::try_from(geometry)
            .map_err(|e| InsarError::TileIndex(format!("tile {}: {}", file_path, e)))?;
        Ok(TileRecord { file_path, footprint })
    }
}

#[derive(Debug, Clone)]
enum IndexSource {
    Remote { url: String, client: reqwest::blocking::Client },
    File(PathBuf),
}

/// Read-only handle on a tile index
#[derive(Debug, Clone)]
pub struct TileIndex {
    source: IndexSource,
}

impl TileIndex {
    /// Open an index given as a URL (GDAL `/vsicurl/` prefix accepted) or a local path
    pub fn open(location: &str) -> InsarResult<Self> {
        let url = location.strip_prefix("/vsicurl/").unwrap_or(location);
        if url.starts_with("http://") || url.starts_with("https://") {
            Self::remote(url)
        } else {
            Ok(Self::from_path(location))
        }
    }

    /// Remote index with a client built for long streaming reads
    pub fn remote(url: &str) -> InsarResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .timeout(None)
            .user_agent(concat!("insar-prep/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| InsarError::TileIndex(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self::remote_with_client(url, client))
    }

    /// Remote index read through a caller-owned client
    pub fn remote_with_client(url: &str, client: reqwest::blocking::Client) -> Self {
        TileIndex {
            source: IndexSource::Remote {
                url: url.to_string(),
                client,
            },
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        TileIndex {
            source: IndexSource::File(path.as_ref().to_path_buf()),
        }
    }

    pub fn location(&self) -> String {
        match &self.source {
            IndexSource::Remote { url, .. } => url.clone(),
            IndexSource::File(path) => path.display().to_string(),
        }
    }

    /// Start a fresh scan over all records
    pub fn records(&self) -> InsarResult<TileRecords> {
        let reader: Box<dyn BufRead> = match &self.source {
            IndexSource::Remote { url, client } => {
                log::debug!("Streaming tile index from {}", url);
                let response = client
                    .get(url)
                    .send()
                    .map_err(|e| InsarError::TileIndex(format!("HTTP request failed: {}", e)))?;
                if !response.status().is_success() {
                    return Err(InsarError::TileIndex(format!(
                        "HTTP {} {}: {}",
                        response.status().as_u16(),
                        response.status().canonical_reason().unwrap_or(""),
                        url
                    )));
                }
                Box::new(BufReader::new(response))
            }
            IndexSource::File(path) => {
                log::debug!("Reading tile index from {}", path.display());
                let file = File::open(path).map_err(|e| {
                    InsarError::TileIndex(format!("cannot open {}: {}", path.display(), e))
                })?;
                Box::new(BufReader::new(file))
            }
        };
        TileRecords::from_reader(reader)
    }

    /// True if any tile footprint intersects `geometry`; stops at the first match
    pub fn intersects(&self, geometry: &Geometry) -> InsarResult<bool> {
        self.records()?.any_intersects(geometry)
    }

    /// File paths of all tiles intersecting `geometry`, in index order
    pub fn select_tiles(&self, geometry: &Geometry) -> InsarResult<Vec<String>> {
        self.select_tiles_near(geometry, 0.0, false)
    }

    /// File paths of all tiles within `buffer_degrees` of `geometry`, in index order.
    ///
    /// With `wrap`, each footprint is also tried shifted 360° east, which is
    /// how a query unwrapped into [0, 360) reaches western-hemisphere tiles.
    pub fn select_tiles_near(
        &self,
        geometry: &Geometry,
        buffer_degrees: f64,
        wrap: bool,
    ) -> InsarResult<Vec<String>> {
        self.records()?.select_near(geometry, buffer_degrees, wrap)
    }
}

type FeatureStream = Box<dyn Iterator<Item = InsarResult<Feature>>>;

fn read_error(after: usize, e: std::io::Error) -> InsarError {
    InsarError::TileIndex(format!("read failed after {} features: {}", after, e))
}

fn malformed(e: impl std::fmt::Display) -> InsarError {
    InsarError::TileIndex(format!("malformed feature: {}", e))
}

/// First non-whitespace byte, left unconsumed
fn peek_content<R: BufRead>(reader: &mut R) -> InsarResult<Option<u8>> {
    loop {
        let (blank, next) = {
            let buf = reader.fill_buf().map_err(|e| read_error(0, e))?;
            if buf.is_empty() {
                return Ok(None);
            }
            let blank = buf.iter().take_while(|b| b.is_ascii_whitespace()).count();
            (blank, buf.get(blank).copied())
        };
        if next.is_some() {
            return Ok(next);
        }
        reader.consume(blank);
    }
}

fn text_sequence<R: BufRead + 'static>(reader: R) -> FeatureStream {
    Box::new(reader.split(RECORD_SEPARATOR).filter_map(|record| match record {
        Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => None,
        Ok(bytes) => Some(serde_json::from_slice::<Feature>(&bytes).map_err(malformed)),
        Err(e) => Some(Err(InsarError::TileIndex(format!("read failed: {}", e)))),
    }))
}

fn feature_lines<R: BufRead + 'static>(first: Feature, reader: R) -> FeatureStream {
    let rest = reader.lines().filter_map(|line| match line {
        Ok(line) if line.trim().is_empty() => None,
        Ok(line) => Some(serde_json::from_str::<Feature>(line.trim()).map_err(malformed)),
        Err(e) => Some(Err(InsarError::TileIndex(format!("read failed: {}", e)))),
    });
    Box::new(iter::once(Ok(first)).chain(rest))
}

fn collection<R: Read + 'static>(reader: R) -> FeatureStream {
    Box::new(FeatureReader::from_reader(reader).features().map(|f| f.map_err(malformed)))
}

/// Lazy iterator over the records of one index scan
pub struct TileRecords {
    features: FeatureStream,
    count: usize,
    done: bool,
}

impl TileRecords {
    /// Sniff the index layout and start streaming features from `reader`
    pub fn from_reader<R: BufRead + 'static>(mut reader: R) -> InsarResult<Self> {
        let features = match peek_content(&mut reader)? {
            None => return Err(InsarError::TileIndex("tile index is empty".to_string())),
            Some(RECORD_SEPARATOR) => text_sequence(reader),
            Some(b'{') | Some(b'[') => {
                let mut first_line = String::new();
                reader.read_line(&mut first_line).map_err(|e| read_error(0, e))?;
                match serde_json::from_str::<Feature>(first_line.trim()) {
                    Ok(first) => feature_lines(first, reader),
                    Err(_) => collection(Cursor::new(first_line).chain(reader)),
                }
            }
            Some(other) => {
                return Err(InsarError::TileIndex(format!(
                    "not a GeoJSON document (first byte {:#04x})",
                    other
                )))
            }
        };
        Ok(TileRecords {
            features,
            count: 0,
            done: false,
        })
    }

    /// True if any record's footprint intersects `geometry`
    pub fn any_intersects(self, geometry: &Geometry) -> InsarResult<bool> {
        for record in self {
            if record?.footprint.intersects(geometry) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// File paths of the records within `buffer_degrees` of `geometry`, first
    /// occurrence order, optionally also testing footprints shifted 360° east
    pub fn select_near(self, geometry: &Geometry, buffer_degrees: f64, wrap: bool) -> InsarResult<Vec<String>> {
        let mut file_paths = Vec::new();
        let mut scanned = 0usize;
        for record in self {
            let record = record?;
            scanned += 1;
            let hit = within_distance(&record.footprint, geometry, buffer_degrees)
                || (wrap
                    && within_distance(
                        &record.footprint.map_coords(|c| coord! { x: c.x + 360.0, y: c.y }),
                        geometry,
                        buffer_degrees,
                    ));
            if hit && !file_paths.contains(&record.file_path) {
                file_paths.push(record.file_path);
            }
        }
        log::info!("Selected {} of {} DEM tiles", file_paths.len(), scanned);
        Ok(file_paths)
    }
}

impl Iterator for TileRecords {
    type Item = InsarResult<TileRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.features.next() {
            Some(Ok(feature)) => {
                self.count += 1;
                Some(TileRecord::from_feature(feature))
            }
            Some(Err(InsarError::TileIndex(message))) => {
                self.done = true;
                Some(Err(InsarError::TileIndex(format!("feature {}: {}", self.count + 1, message))))
            }
            Some(Err(e)) => {
                self.done = true;
                Some(Err(e))
            }
            None => {
                self.done = true;
                // a document with no feature array reads as zero features
                (self.count == 0).then(|| Err(InsarError::TileIndex("tile index holds no features".to_string())))
            }
        }
    }
}
