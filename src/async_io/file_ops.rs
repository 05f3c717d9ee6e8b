//! Async directory discovery for roster files

use std::path::{Path, PathBuf};

use itertools::Itertools;
use tokio::fs;

use crate::error::Result;
use crate::utils::{is_roster_file, log_files_found, validate_directory};

/// Find all CSV and Parquet files in a directory asynchronously
///
/// # Arguments
/// * `dir` - Path to the directory to search
///
/// # Returns
/// Paths of the roster files, sorted by name
///
/// # Errors
/// Returns an error if directory reading fails
pub async fn find_roster_files_async(dir: &Path) -> Result<Vec<PathBuf>> {
    log::debug!("Searching for roster files asynchronously in {}", dir.display());

    validate_directory(dir)?;

    let mut files = Vec::<PathBuf>::new();
    let mut entries = fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let metadata = fs::metadata(&path).await?;

        if metadata.is_file() && is_roster_file(&path) {
            files.push(path);
        }
    }

    log_files_found(dir, files.len());

    Ok(files.into_iter().sorted().collect())
}
