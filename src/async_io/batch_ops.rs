//! Async batch reading of roster files

use std::io;
use std::path::Path;

use arrow::record_batch::RecordBatch;
use futures::TryStreamExt;
use parquet::arrow::async_reader::ParquetRecordBatchStreamBuilder;
use tokio::fs::File;

use crate::config::DashboardConfig;
use crate::error::{Result, RosterError};
use crate::reader::{RosterFormat, read_csv};
use crate::utils::{log_batches_read, log_read_start};

/// Read a Parquet file asynchronously into Arrow record batches
///
/// The file is streamed without loading it into memory at once.
///
/// # Arguments
/// * `path` - Path to the Parquet file
/// * `batch_size` - Rows per record batch
///
/// # Errors
/// Returns an error if file reading fails
pub async fn read_parquet_async(path: &Path, batch_size: usize) -> Result<Vec<RecordBatch>> {
    let start = std::time::Instant::now();
    log_read_start("Parquet", path);

    let file = File::open(path).await?;

    let stream = ParquetRecordBatchStreamBuilder::new(file)
        .await?
        .with_batch_size(batch_size)
        .build()?;

    let batches = stream.try_collect::<Vec<_>>().await?;

    log_batches_read(path, &batches, start.elapsed());
    Ok(batches)
}

/// Read a delimited text file on the blocking pool
///
/// # Errors
/// Returns an error if the file cannot be read or the blocking task fails
pub async fn read_csv_async(
    path: &Path,
    delimiter: u8,
    batch_size: usize,
) -> Result<Vec<RecordBatch>> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || read_csv(&path, delimiter, batch_size))
        .await
        .map_err(io::Error::from)?
}

/// Read the raw record batches of a roster file, choosing the reader by extension
///
/// # Errors
/// Returns an error if the format is not recognized or the file cannot be read
pub async fn read_file_batches_async(
    path: &Path,
    config: &DashboardConfig,
) -> Result<Vec<RecordBatch>> {
    match RosterFormat::from_path(path) {
        Some(RosterFormat::Csv) => {
            read_csv_async(path, config.delimiter_byte(), config.batch_size).await
        }
        Some(RosterFormat::Parquet) => read_parquet_async(path, config.batch_size).await,
        None => Err(RosterError::source_unavailable(format!(
            "unsupported roster file: {}",
            path.display()
        ))),
    }
}
