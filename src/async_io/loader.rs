//! Async roster loaders

use std::path::Path;
use std::time::Instant;

use arrow::record_batch::RecordBatch;
use futures::stream::{self, StreamExt};
use itertools::Itertools;

use super::batch_ops::read_file_batches_async;
use super::file_ops::find_roster_files_async;
use crate::config::DashboardConfig;
use crate::error::{Result, RosterError};
use crate::models::Roster;
use crate::utils::log_roster_loaded;

/// Read a single roster file asynchronously
///
/// # Errors
/// Returns `RosterError::SourceUnavailable` for a missing path or unsupported extension,
/// or the underlying read error
pub async fn read_roster_async(path: &Path, config: &DashboardConfig) -> Result<Roster> {
    let start = Instant::now();
    if !tokio::fs::try_exists(path).await? {
        return Err(RosterError::source_unavailable(format!(
            "{} does not exist",
            path.display()
        )));
    }

    let batches = read_file_batches_async(path, config).await?;
    let roster = Roster::from_batches(&batches, &config.normalizer())?;

    log_roster_loaded(path, &roster, start.elapsed());
    Ok(roster)
}

/// Load every roster file of a directory concurrently and merge them
///
/// Up to one file per CPU is read at a time. Batches are merged in file-name order
/// whatever order the reads complete in.
///
/// # Errors
/// Returns an error if the directory or any file cannot be read
pub async fn load_roster_dir_async(dir: &Path, config: &DashboardConfig) -> Result<Roster> {
    let start = Instant::now();
    log::info!(
        "Loading roster files from directory asynchronously: {}",
        dir.display()
    );

    let files = find_roster_files_async(dir).await?;
    if files.is_empty() {
        return Ok(Roster::empty());
    }

    let results = stream::iter(files.iter().enumerate())
        .map(|(index, path)| async move {
            let batches = read_file_batches_async(path, config).await;
            if let Err(e) = &batches {
                log::error!("Error loading roster file {}: {e}", path.display());
            }
            (index, batches)
        })
        .buffer_unordered(num_cpus::get())
        .collect::<Vec<_>>()
        .await;

    let batches: Vec<RecordBatch> = results
        .into_iter()
        .sorted_by_key(|(index, _)| *index)
        .map(|(_, batches)| batches)
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .flatten()
        .collect_vec();

    let roster = Roster::from_batches(&batches, &config.normalizer())?;

    log_roster_loaded(dir, &roster, start.elapsed());
    Ok(roster)
}
