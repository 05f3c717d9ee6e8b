//! Delimited text roster files

use std::fs::File;
use std::io::Seek;
use std::path::{Path, PathBuf};
use std::time::Instant;

use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::record_batch::RecordBatch;

use super::{RosterSource, roster_from_file_batches};
use crate::clean::Normalizer;
use crate::config::DashboardConfig;
use crate::error::Result;
use crate::models::Roster;
use crate::schema::text_schema;
use crate::utils::{DEFAULT_BATCH_SIZE, log_batches_read, log_read_start};

/// Read a delimited text file with a header row into record batches
///
/// Every column is read as text; only the header is inspected to build the schema.
/// Rows with fewer fields than the header are padded with nulls.
///
/// # Arguments
/// * `path` - Path to the file
/// * `delimiter` - Field delimiter byte
/// * `batch_size` - Rows per record batch
///
/// # Errors
/// Returns an error if the file cannot be opened or is not valid delimited text
pub fn read_csv(path: &Path, delimiter: u8, batch_size: usize) -> Result<Vec<RecordBatch>> {
    let start = Instant::now();
    log_read_start("CSV", path);

    let mut file = File::open(path)?;
    let format = Format::default()
        .with_header(true)
        .with_delimiter(delimiter);
    let (inferred, _) = format.infer_schema(&mut file, Some(0))?;
    file.rewind()?;

    let names: Vec<String> = inferred.fields().iter().map(|f| f.name().clone()).collect();
    if names.is_empty() {
        log::warn!("CSV file {} has no header row", path.display());
        return Ok(Vec::new());
    }

    let reader = ReaderBuilder::new(text_schema(&names))
        .with_format(format)
        .with_batch_size(batch_size)
        .with_truncated_rows(true)
        .build(file)?;

    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;

    log_batches_read(path, &batches, start.elapsed());
    Ok(batches)
}

/// A roster stored as a delimited text file
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    delimiter: u8,
    batch_size: usize,
    normalizer: Normalizer,
}

impl CsvSource {
    /// Comma-delimited source with default settings
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: b',',
            batch_size: DEFAULT_BATCH_SIZE,
            normalizer: Normalizer::default(),
        }
    }

    /// Source using the delimiter, batch size and missing markers of a configuration
    #[must_use]
    pub fn from_config(path: impl Into<PathBuf>, config: &DashboardConfig) -> Self {
        Self {
            path: path.into(),
            delimiter: config.delimiter_byte(),
            batch_size: config.batch_size,
            normalizer: config.normalizer(),
        }
    }

    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RosterSource for CsvSource {
    fn read_roster(&self) -> Result<Roster> {
        let start = Instant::now();
        let batches = read_csv(&self.path, self.delimiter, self.batch_size)?;
        roster_from_file_batches(&self.path, &batches, &self.normalizer, start)
    }

    fn describe(&self) -> String {
        format!("CSV file {}", self.path.display())
    }
}
