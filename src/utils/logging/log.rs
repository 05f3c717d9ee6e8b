//! Log lines for reading, loading and exporting rosters

use std::path::Path;
use std::time::Duration;

use arrow::record_batch::RecordBatch;

use crate::models::Roster;

/// Announce a roster read, e.g. `log_read_start("CSV", path)`
pub fn log_read_start(format: &str, path: &Path) {
    log::info!("Reading {format} roster {}", path.display());
}

/// Report the raw batches read from one file, before normalization
pub fn log_batches_read(path: &Path, batches: &[RecordBatch], elapsed: Duration) {
    let rows: usize = batches.iter().map(RecordBatch::num_rows).sum();
    log::info!(
        "Read {rows} rows in {} batches from {} in {elapsed:?}",
        batches.len(),
        path.display()
    );
}

/// Report a normalized roster; `origin` is the file or directory it came from
pub fn log_roster_loaded(origin: &Path, roster: &Roster, elapsed: Duration) {
    log::info!(
        "Loaded {} students with {} fields from {} in {elapsed:?}",
        roster.num_rows(),
        roster.field_names().len(),
        origin.display()
    );
}

/// Report a directory scan. Finding no roster files is a warning, not an error
pub fn log_files_found(dir: &Path, count: usize) {
    if count == 0 {
        log::warn!("No roster files found in {}", dir.display());
    } else {
        log::info!("Found {count} roster files in {}", dir.display());
    }
}

pub fn log_exported(path: &Path, roster: &Roster) {
    log::info!("Exported {} students to {}", roster.num_rows(), path.display());
}
