//! Roster sources
//!
//! A source produces a normalized [`Roster`] on demand. Files are read through the Arrow
//! CSV and Parquet readers; directories are loaded file by file in parallel and merged
//! under the union of their columns.

pub mod csv;
pub mod parquet;

use std::path::{Path, PathBuf};
use std::time::Instant;

use arrow::record_batch::RecordBatch;
use rayon::prelude::*;

use crate::clean::Normalizer;
use crate::config::DashboardConfig;
use crate::error::{Result, RosterError};
use crate::models::Roster;
use crate::utils::logging::create_file_progress_bar;
use crate::utils::{find_roster_files, log_roster_loaded};

pub use self::csv::{CsvSource, read_csv};
pub use self::parquet::{ParquetSource, read_parquet};

/// Anything that can produce a roster for one fetch cycle
pub trait RosterSource: Send + Sync {
    /// Fetch the current roster
    ///
    /// # Errors
    /// Returns an error if the underlying data cannot be read
    fn read_roster(&self) -> Result<Roster>;

    /// Human-readable description used in log messages
    fn describe(&self) -> String;
}

impl<T: RosterSource + ?Sized> RosterSource for Box<T> {
    fn read_roster(&self) -> Result<Roster> {
        (**self).read_roster()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Kind of roster file, decided by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterFormat {
    Csv,
    Parquet,
}

impl RosterFormat {
    /// Detect the format of a file from its extension
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("csv") {
            Some(Self::Csv)
        } else if ext.eq_ignore_ascii_case("parquet") {
            Some(Self::Parquet)
        } else {
            None
        }
    }
}

/// Read the raw record batches of a single roster file
///
/// # Errors
/// Returns an error if the format is not recognized or the file cannot be read
pub fn read_file_batches(path: &Path, config: &DashboardConfig) -> Result<Vec<RecordBatch>> {
    match RosterFormat::from_path(path) {
        Some(RosterFormat::Csv) => read_csv(path, config.delimiter_byte(), config.batch_size),
        Some(RosterFormat::Parquet) => read_parquet(path, config.batch_size),
        None => Err(RosterError::source_unavailable(format!(
            "unsupported roster file: {}",
            path.display()
        ))),
    }
}

/// A roster held in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    roster: Roster,
}

impl MemorySource {
    #[must_use]
    pub const fn new(roster: Roster) -> Self {
        Self { roster }
    }
}

impl RosterSource for MemorySource {
    fn read_roster(&self) -> Result<Roster> {
        Ok(self.roster.clone())
    }

    fn describe(&self) -> String {
        format!("in-memory roster ({} rows)", self.roster.num_rows())
    }
}

/// Every CSV and Parquet file of a directory, merged into one roster
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
    config: DashboardConfig,
    show_progress: bool,
}

impl DirectorySource {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, config: DashboardConfig) -> Self {
        Self {
            dir: dir.into(),
            config,
            show_progress: false,
        }
    }

    /// Display a progress bar while files are loaded
    #[must_use]
    pub const fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl RosterSource for DirectorySource {
    fn read_roster(&self) -> Result<Roster> {
        let start = Instant::now();
        let files = find_roster_files(&self.dir)?;
        if files.is_empty() {
            return Ok(Roster::empty());
        }

        let progress = self.show_progress.then(|| {
            create_file_progress_bar(files.len() as u64, Some("Loading roster files"))
        });

        let per_file = files
            .par_iter()
            .map(|path| {
                let batches = read_file_batches(path, &self.config);
                if let Some(pb) = &progress {
                    pb.inc(1);
                }
                batches
            })
            .collect::<Result<Vec<_>>>()?;

        if let Some(pb) = progress {
            pb.finish_with_message("Roster files loaded");
        }

        let batches: Vec<RecordBatch> = per_file.into_iter().flatten().collect();
        let roster = Roster::from_batches(&batches, &self.config.normalizer())?;

        log_roster_loaded(&self.dir, &roster, start.elapsed());
        Ok(roster)
    }

    fn describe(&self) -> String {
        format!("directory {}", self.dir.display())
    }
}

/// Normalize raw batches read from one file into a roster
pub(crate) fn roster_from_file_batches(
    path: &Path,
    batches: &[RecordBatch],
    normalizer: &Normalizer,
    start: Instant,
) -> Result<Roster> {
    let roster = Roster::from_batches(batches, normalizer)?;
    log_roster_loaded(path, &roster, start.elapsed());
    Ok(roster)
}

/// Open the source matching a path: a directory, a CSV file or a Parquet file
///
/// # Errors
/// Returns `RosterError::SourceUnavailable` if the path does not exist or has an
/// unsupported extension
pub fn open_source(path: &Path, config: &DashboardConfig) -> Result<Box<dyn RosterSource>> {
    log::debug!("Opening roster source {}", path.display());

    if !path.exists() {
        return Err(RosterError::source_unavailable(format!(
            "{} does not exist",
            path.display()
        )));
    }

    if path.is_dir() {
        return Ok(Box::new(
            DirectorySource::new(path, config.clone()).with_progress(true),
        ));
    }

    match RosterFormat::from_path(path) {
        Some(RosterFormat::Csv) => Ok(Box::new(CsvSource::from_config(path, config))),
        Some(RosterFormat::Parquet) => Ok(Box::new(ParquetSource::from_config(path, config))),
        None => Err(RosterError::source_unavailable(format!(
            "unsupported roster file: {}",
            path.display()
        ))),
    }
}
