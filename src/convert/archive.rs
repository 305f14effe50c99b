//! Zip archive extraction for historical CSV dumps
//!
//! Vendor archives hold a single CSV file per zip. The extractor reads the
//! first `.csv` entry into memory; there is no need to unpack to disk.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use zip::ZipArchive;

use super::{ConvertError, ConvertResult};

/// Read the first CSV entry of a zip archive into a string.
pub fn read_zipped_csv(path: &Path) -> ConvertResult<String> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)?;

    let csv_index = (0..archive.len())
        .find(|&i| {
            archive
                .by_index(i)
                .map(|entry| entry.name().to_ascii_lowercase().ends_with(".csv"))
                .unwrap_or(false)
        })
        .ok_or_else(|| ConvertError::EmptyArchive {
            path: path.to_path_buf(),
        })?;

    let mut entry = archive.by_index(csv_index)?;
    let mut contents = String::new();
    entry.read_to_string(&mut contents)?;
    Ok(contents)
}
