//! Parquet roster files

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::{RosterSource, roster_from_file_batches};
use crate::clean::Normalizer;
use crate::config::DashboardConfig;
use crate::error::Result;
use crate::models::Roster;
use crate::utils::{DEFAULT_BATCH_SIZE, log_batches_read, log_read_start};

/// Read a parquet file into Arrow record batches
///
/// # Arguments
/// * `path` - Path to the Parquet file
/// * `batch_size` - Rows per record batch
///
/// # Returns
/// A vector of `RecordBatch` objects with the file's own column types
///
/// # Errors
/// Returns an error if the file cannot be opened or if the Parquet file is invalid
pub fn read_parquet(path: &Path, batch_size: usize) -> Result<Vec<RecordBatch>> {
    let start = Instant::now();
    log_read_start("Parquet", path);

    let file = File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?
        .with_batch_size(batch_size)
        .build()?;

    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;

    log_batches_read(path, &batches, start.elapsed());
    Ok(batches)
}

/// A roster stored as a Parquet file
#[derive(Debug, Clone)]
pub struct ParquetSource {
    path: PathBuf,
    batch_size: usize,
    normalizer: Normalizer,
}

impl ParquetSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            batch_size: DEFAULT_BATCH_SIZE,
            normalizer: Normalizer::default(),
        }
    }

    /// Source using the batch size and missing markers of a configuration
    #[must_use]
    pub fn from_config(path: impl Into<PathBuf>, config: &DashboardConfig) -> Self {
        Self {
            path: path.into(),
            batch_size: config.batch_size,
            normalizer: config.normalizer(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RosterSource for ParquetSource {
    fn read_roster(&self) -> Result<Roster> {
        let start = Instant::now();
        let batches = read_parquet(&self.path, self.batch_size)?;
        roster_from_file_batches(&self.path, &batches, &self.normalizer, start)
    }

    fn describe(&self) -> String {
        format!("Parquet file {}", self.path.display())
    }
}
