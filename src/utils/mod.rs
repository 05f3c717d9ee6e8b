//! Utility functions for locating roster files and reading settings

pub mod logging;

use std::path::{Path, PathBuf};

use itertools::Itertools;
use rayon::prelude::*;

use crate::error::{Result, RosterError};

pub use logging::{
    log_batches_read, log_exported, log_files_found, log_read_start, log_roster_loaded,
};

/// Default number of rows per record batch when reading sources
pub const DEFAULT_BATCH_SIZE: usize = 16384;

/// File extensions recognized as roster files
pub const ROSTER_EXTENSIONS: [&str; 2] = ["csv", "parquet"];

/// Helper function to get batch size from environment
#[must_use]
pub fn get_batch_size() -> Option<usize> {
    std::env::var("ROSTER_BATCH_SIZE")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|n| *n > 0)
}

/// Validates that a directory exists and is a directory
///
/// # Errors
/// Returns an error if the directory does not exist or is not a directory
pub fn validate_directory(dir: &Path) -> Result<()> {
    if !dir.exists() || !dir.is_dir() {
        return Err(RosterError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Directory does not exist: {}", dir.display()),
        )));
    }
    Ok(())
}

/// Whether a path carries one of the roster file extensions
#[must_use]
pub fn is_roster_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ROSTER_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Find all roster files (CSV or Parquet) in a directory
///
/// Files are returned sorted by name so merged rosters keep a stable row order.
///
/// # Errors
/// Returns an error if the directory cannot be read
pub fn find_roster_files(dir: &Path) -> Result<Vec<PathBuf>> {
    log::debug!("Searching for roster files in {}", dir.display());

    validate_directory(dir)?;

    let files = std::fs::read_dir(dir)?
        .par_bridge()
        .filter_map(|entry_result| match entry_result {
            Ok(entry) => {
                let path = entry.path();
                (path.is_file() && is_roster_file(&path)).then_some(Ok(path))
            }
            Err(e) => Some(Err(RosterError::Io(e))),
        })
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .sorted()
        .collect_vec();

    log_files_found(dir, files.len());

    Ok(files)
}
