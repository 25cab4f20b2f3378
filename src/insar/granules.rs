//! Sentinel-1 granule pairing

use crate::types::{InsarError, InsarResult};
use chrono::NaiveDate;
use std::fs;
use std::path::Path;

/// Acquisition date embedded at characters 17..25 of a granule name,
/// e.g. `S1A_IW_SLC__1SDV_20200103T170815_...` -> 2020-01-03
pub fn acquisition_date(granule: &str) -> InsarResult<NaiveDate> {
    let digits = granule
        .get(17..25)
        .ok_or_else(|| InsarError::InvalidGranule(format!("name too short: {}", granule)))?;
    NaiveDate::parse_from_str(digits, "%Y%m%d")
        .map_err(|e| InsarError::InvalidGranule(format!("{}: bad acquisition date {}: {}", granule, digits, e)))
}

/// Two granules forming an interferometric pair, earliest acquisition first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GranulePair {
    pub reference: String,
    pub secondary: String,
    pub reference_date: NaiveDate,
    pub secondary_date: NaiveDate,
}

impl GranulePair {
    pub fn new(granule1: &str, granule2: &str) -> InsarResult<Self> {
        let (g1, g2) = earlier_granule_first(granule1, granule2)?;
        Ok(Self {
            reference_date: acquisition_date(&g1)?,
            secondary_date: acquisition_date(&g2)?,
            reference: g1,
            secondary: g2,
        })
    }

    /// Days between the two acquisitions
    pub fn temporal_baseline(&self) -> i64 {
        (self.secondary_date - self.reference_date).num_days()
    }

    /// Interferogram directory name, `YYYYMMDD_YYYYMMDD`
    pub fn ifm_dir(&self) -> String {
        format!(
            "{}_{}",
            self.reference_date.format("%Y%m%d"),
            self.secondary_date.format("%Y%m%d")
        )
    }

    /// Product name for this pair with a processing suffix appended
    pub fn output_name(&self, suffix: &str) -> String {
        format!("{}{}", self.ifm_dir(), suffix)
    }

    /// One-line summary for the user notification
    pub fn description(&self) -> String {
        format!(
            "This is a {}-day InSAR pair from {} to {}.",
            self.temporal_baseline(),
            self.reference_date.format("%Y-%m-%d"),
            self.secondary_date.format("%Y-%m-%d")
        )
    }

    /// Write the granule list consumed by the processor, one name per line
    pub fn write_list_file<P: AsRef<Path>>(&self, list_file: P) -> InsarResult<()> {
        fs::write(list_file, format!("{}\n{}\n", self.reference, self.secondary))?;
        Ok(())
    }
}

/// Order two granules by acquisition date; ties keep the given order
pub fn earlier_granule_first(granule1: &str, granule2: &str) -> InsarResult<(String, String)> {
    if acquisition_date(granule2)? < acquisition_date(granule1)? {
        Ok((granule2.to_string(), granule1.to_string()))
    } else {
        Ok((granule1.to_string(), granule2.to_string()))
    }
}
