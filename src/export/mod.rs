//! Export of roster subsets and derived tables as delimited text

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use arrow::csv::WriterBuilder;
use arrow::record_batch::RecordBatch;

use crate::error::Result;
use crate::models::Roster;
use crate::utils::log_exported;

/// Write a record batch as delimited text with a header row
///
/// Null values are written as empty fields.
///
/// # Errors
/// Returns an error if writing fails
pub fn write_batch_delimited<W: Write>(
    batch: &RecordBatch,
    writer: W,
    delimiter: u8,
) -> Result<()> {
    let mut csv_writer = WriterBuilder::new()
        .with_header(true)
        .with_delimiter(delimiter)
        .build(writer);
    csv_writer.write(batch)?;
    Ok(())
}

/// Write a roster as delimited text
///
/// The header lists the roster's field names in order, followed by one line per record.
/// Values are written as they are held, absent values as empty fields.
///
/// # Arguments
/// * `roster` - Roster, usually the filtered subset on display
/// * `writer` - Destination
/// * `delimiter` - Field delimiter byte
///
/// # Errors
/// Returns an error if writing fails
pub fn export_delimited<W: Write>(roster: &Roster, writer: W, delimiter: u8) -> Result<()> {
    write_batch_delimited(roster.batch(), writer, delimiter)
}

/// Write a roster as delimited text to a file
///
/// # Errors
/// Returns an error if the file cannot be created or written
pub fn export_to_path(roster: &Roster, path: &Path, delimiter: u8) -> Result<()> {
    log::debug!("Exporting roster to {}", path.display());
    let mut writer = BufWriter::new(File::create(path)?);
    export_delimited(roster, &mut writer, delimiter)?;
    writer.flush()?;
    log_exported(path, roster);
    Ok(())
}

/// Write a roster as a JSON array of records, one object per record in field order
///
/// # Errors
/// Returns an error if serialization or writing fails
pub fn export_json<W: Write>(roster: &Roster, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, &roster.records())?;
    Ok(())
}
