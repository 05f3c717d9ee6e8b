//! Row normalization
//!
//! Every text-bearing column of a roster goes through the same cleaning before any
//! other component reads it: values are trimmed, and the empty string plus a set of
//! missing-value markers become null.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, BooleanArray, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};

use crate::error::Result;

/// Tokens treated as missing, compared case-insensitively after trimming
pub const DEFAULT_MISSING_MARKERS: &[&str] = &["nan", "none", "undefined"];

/// Missing-value markers used by the normalizer
#[derive(Debug, Clone)]
pub struct Normalizer {
    markers: Vec<String>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_MISSING_MARKERS.iter().copied())
    }
}

impl Normalizer {
    /// Create a normalizer recognizing the given markers (any letter case)
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            markers: markers
                .into_iter()
                .map(|m| m.as_ref().trim().to_lowercase())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }

    /// Whether a trimmed value denotes a missing value
    fn is_missing(&self, trimmed: &str) -> bool {
        trimmed.is_empty()
            || self
                .markers
                .iter()
                .any(|m| m.eq_ignore_ascii_case(trimmed))
    }

    /// Normalize one raw value to a trimmed string or `None`
    #[must_use]
    pub fn normalize_value(&self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if self.is_missing(trimmed) {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Cast an array of any type to text and normalize every element
    ///
    /// # Errors
    /// Returns an error if the array type cannot be cast to `Utf8`
    pub fn normalize_array(&self, array: &ArrayRef) -> Result<StringArray> {
        let utf8 = if array.data_type() == &DataType::Utf8 {
            Arc::clone(array)
        } else {
            cast(array, &DataType::Utf8)?
        };

        let strings = utf8
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| ArrowError::CastError("column is not a Utf8 array".to_string()))?;

        Ok(strings
            .iter()
            .map(|value| value.and_then(|v| self.normalize_value(v)))
            .collect())
    }

    /// Normalize every column of a record batch into nullable `Utf8` columns
    ///
    /// # Errors
    /// Returns an error if a column cannot be converted to text
    pub fn normalize_batch(&self, batch: &RecordBatch) -> Result<RecordBatch> {
        let fields: Vec<Field> = batch
            .schema()
            .fields()
            .iter()
            .map(|f| Field::new(f.name(), DataType::Utf8, true))
            .collect();

        let columns = batch
            .columns()
            .iter()
            .map(|col| self.normalize_array(col).map(|a| Arc::new(a) as ArrayRef))
            .collect::<Result<Vec<_>>>()?;

        let options = RecordBatchOptions::new().with_row_count(Some(batch.num_rows()));
        Ok(RecordBatch::try_new_with_options(
            Arc::new(Schema::new(fields)),
            columns,
            &options,
        )?)
    }
}

/// Normalize one raw value with the default markers
#[must_use]
pub fn normalize_value(raw: &str) -> Option<String> {
    Normalizer::default().normalize_value(raw)
}

/// Remove rows in which every column is null
///
/// # Errors
/// Returns an error if the batch cannot be filtered
pub fn drop_empty_rows(batch: &RecordBatch) -> Result<RecordBatch> {
    if batch.num_columns() == 0 {
        return Ok(batch.clone());
    }

    let keep: BooleanArray = (0..batch.num_rows())
        .map(|row| Some(batch.columns().iter().any(|col| col.is_valid(row))))
        .collect();

    if keep.true_count() == batch.num_rows() {
        return Ok(batch.clone());
    }

    let dropped = batch.num_rows() - keep.true_count();
    log::debug!("Dropping {dropped} rows with no values");
    crate::filter::filter_record_batch(batch, &keep)
}
