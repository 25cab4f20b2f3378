//! Plumbing around the external InSAR processor: granule pairing,
//! processor invocation, product discovery, and upload

pub mod granules;
pub mod processor;
pub mod upload;

pub use granules::{acquisition_date, earlier_granule_first, GranulePair};
pub use processor::{find_color_phase_png, find_product, Looks, ProcessorOptions};
pub use upload::{content_type, upload_file, ObjectStore};

use crate::types::InsarResult;
use std::fs;
use std::path::{Path, PathBuf};

/// Granule list file name written into the working directory
pub const GRANULE_LIST_FILE: &str = "list.csv";

/// Outputs of one processed pair
#[derive(Debug, Clone)]
pub struct PairProduct {
    pub pair: GranulePair,
    /// Renamed product directory
    pub product_dir: PathBuf,
    /// Browse image copied next to the product directory, if the processor made one
    pub browse_image: Option<PathBuf>,
}

/// Process one pair in `workdir` and collect its outputs.
///
/// The processor's `PRODUCTS` directory is renamed to
/// `<d1>_<d2>-<looks><suffix>`; any stale output of that name is removed first.
pub fn process_pair(
    workdir: &Path,
    granule1: &str,
    granule2: &str,
    options: &ProcessorOptions,
    suffix: &str,
) -> InsarResult<PairProduct> {
    let pair = GranulePair::new(granule1, granule2)?;
    log::info!("Processing InSAR pair {} / {}", pair.reference, pair.secondary);
    log::debug!("IFM dir is: {}", pair.ifm_dir());

    pair.write_list_file(workdir.join(GRANULE_LIST_FILE))?;
    let products = options.run(workdir, GRANULE_LIST_FILE)?;

    let out_name = pair.output_name(&format!("-{}{}", options.looks, suffix));
    log::info!("Output name: {}", out_name);
    let product_dir = workdir.join(&out_name);
    if product_dir.is_dir() {
        fs::remove_dir_all(&product_dir)?;
    }
    log::debug!("Renaming {} to {}", products.display(), product_dir.display());
    fs::rename(&products, &product_dir)?;

    let browse_image = match find_color_phase_png(&product_dir)? {
        Some(png) => {
            let browse = workdir.join(format!("{}.browse.png", out_name));
            fs::copy(&png, &browse)?;
            Some(browse)
        }
        None => {
            log::warn!("No browse image in {}", product_dir.display());
            None
        }
    };

    Ok(PairProduct {
        pair,
        product_dir,
        browse_image,
    })
}
