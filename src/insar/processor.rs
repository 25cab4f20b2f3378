//! External InSAR processor invocation and product discovery

use crate::types::{InsarError, InsarResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;

/// Range x azimuth multilook factors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Looks {
    /// 20 range x 4 azimuth (~80 m)
    Looks20x4,
    /// 10 range x 2 azimuth (~40 m)
    Looks10x2,
}

impl Looks {
    pub fn range(&self) -> u32 {
        match self {
            Looks::Looks20x4 => 20,
            Looks::Looks10x2 => 10,
        }
    }

    pub fn azimuth(&self) -> u32 {
        match self {
            Looks::Looks20x4 => 4,
            Looks::Looks10x2 => 2,
        }
    }
}

impl Default for Looks {
    fn default() -> Self {
        Looks::Looks20x4
    }
}

impl std::fmt::Display for Looks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.range(), self.azimuth())
    }
}

impl FromStr for Looks {
    type Err = InsarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "20x4" => Ok(Looks::Looks20x4),
            "10x2" => Ok(Looks::Looks10x2),
            other => Err(InsarError::Config(format!(
                "unsupported looks {}, expected 20x4 or 10x2",
                other
            ))),
        }
    }
}

/// Options forwarded to the InSAR processor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorOptions {
    /// Processor executable
    pub program: String,
    pub looks: Looks,
    /// Include look vector maps (`-l`)
    pub include_look_vectors: bool,
    /// Include line-of-sight displacement (`-s`)
    pub include_los_displacement: bool,
    /// Apply a water mask (`-m`)
    pub water_mask: bool,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self {
            program: "procS1StackGAMMA.py".to_string(),
            looks: Looks::default(),
            include_look_vectors: true,
            include_los_displacement: false,
            water_mask: false,
        }
    }
}

impl ProcessorOptions {
    pub fn arguments(&self, list_file: &str) -> Vec<String> {
        let mut args = vec![
            "--rlooks".to_string(),
            self.looks.range().to_string(),
            "--alooks".to_string(),
            self.looks.azimuth().to_string(),
            "-f".to_string(),
            list_file.to_string(),
        ];
        if self.include_look_vectors {
            args.push("-l".to_string());
        }
        if self.include_los_displacement {
            args.push("-s".to_string());
        }
        if self.water_mask {
            args.push("-m".to_string());
        }
        args
    }

    /// Run the processor in `workdir` and return the product directory it left
    pub fn run(&self, workdir: &Path, list_file: &str) -> InsarResult<PathBuf> {
        let args = self.arguments(list_file);
        log::info!("Running {} {}", self.program, args.join(" "));

        let status = Command::new(&self.program)
            .args(&args)
            .current_dir(workdir)
            .status()
            .map_err(|e| InsarError::Processor(format!("failed to start {}: {}", self.program, e)))?;
        if !status.success() {
            log::error!("{} exited with {}", self.program, status);
            return Err(InsarError::Processor(format!("{} exited with {}", self.program, status)));
        }

        find_product(workdir)?.ok_or_else(|| {
            log::error!("PRODUCT directory not found in {}", workdir.display());
            InsarError::Processor("PRODUCT directory not found".to_string())
        })
    }
}

/// Depth-first search below `dir`, directories in name order
fn find_below<F>(dir: &Path, matches: &F) -> InsarResult<Option<PathBuf>>
where
    F: Fn(&Path) -> bool,
{
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    entries.sort();
    for path in &entries {
        if matches(path) {
            return Ok(Some(path.clone()));
        }
    }
    for path in entries.iter().filter(|p| p.is_dir()) {
        if let Some(found) = find_below(path, matches)? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

/// The `PRODUCTS` directory the processor writes its outputs to
pub fn find_product(dir: &Path) -> InsarResult<Option<PathBuf>> {
    find_below(dir, &|path: &Path| path.is_dir() && path.file_name().map_or(false, |n| n == "PRODUCTS"))
}

/// Browse image (`*color_phase.png`) inside a product
pub fn find_color_phase_png(dir: &Path) -> InsarResult<Option<PathBuf>> {
    let found = find_below(dir, &|path: &Path| {
        path.is_file() && path.to_string_lossy().ends_with("color_phase.png")
    })?;
    if let Some(path) = &found {
        log::info!("Browse image: {}", path.display());
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looks_parse() {
        assert_eq!("20x4".parse::<Looks>().unwrap(), Looks::Looks20x4);
        assert_eq!("10x2".parse::<Looks>().unwrap().to_string(), "10x2");
        assert!(matches!("5x1".parse::<Looks>(), Err(InsarError::Config(_))));
    }

    #[test]
    fn test_default_arguments() {
        let args = ProcessorOptions::default().arguments("list.csv");
        assert_eq!(args, vec!["--rlooks", "20", "--alooks", "4", "-f", "list.csv", "-l"]);
    }

    #[test]
    fn test_all_flags() {
        let options = ProcessorOptions {
            looks: Looks::Looks10x2,
            include_look_vectors: false,
            include_los_displacement: true,
            water_mask: true,
            ..ProcessorOptions::default()
        };
        assert_eq!(
            options.arguments("list.csv"),
            vec!["--rlooks", "10", "--alooks", "2", "-f", "list.csv", "-s", "-m"]
        );
    }

    #[test]
    fn test_find_product_and_browse() {
        let dir = tempfile::tempdir().unwrap();
        let products = dir.path().join("20200103_20200115").join("PRODUCTS");
        fs::create_dir_all(&products).unwrap();
        let png = products.join("20200103_20200115_color_phase.png");
        fs::write(&png, b"png").unwrap();
        fs::write(products.join("20200103_20200115_amp.tif"), b"tif").unwrap();

        assert_eq!(find_product(dir.path()).unwrap(), Some(products.clone()));
        assert_eq!(find_color_phase_png(dir.path()).unwrap(), Some(png));
        assert_eq!(find_product(&products).unwrap(), None);
    }

    #[test]
    fn test_failed_processor_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let options = ProcessorOptions {
            program: "/nonexistent/procS1StackGAMMA.py".to_string(),
            ..ProcessorOptions::default()
        };
        assert!(matches!(options.run(dir.path(), "list.csv"), Err(InsarError::Processor(_))));
    }
}
