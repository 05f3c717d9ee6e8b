//! Core filtering functionality for roster batches
//!
//! This module defines the `BatchFilter` trait and the mask-based filtering that all
//! roster filters share.

use std::collections::HashSet;
use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray};
use arrow::compute::filter as arrow_filter;
use arrow::record_batch::{RecordBatch, RecordBatchOptions};

use crate::error::{Result, RosterError};

/// Filter a record batch based on a boolean mask
///
/// # Arguments
/// * `batch` - The record batch to filter
/// * `mask` - The boolean mask indicating which rows to keep
///
/// # Returns
/// A new record batch with only rows where mask is true, in their original order
///
/// # Errors
/// Returns an error if the mask length differs from the row count or filtering fails
pub fn filter_record_batch(batch: &RecordBatch, mask: &BooleanArray) -> Result<RecordBatch> {
    if batch.num_rows() != mask.len() {
        return Err(RosterError::Filter(format!(
            "Mask length ({}) doesn't match batch row count ({})",
            mask.len(),
            batch.num_rows()
        )));
    }

    let filtered_columns: Vec<ArrayRef> = batch
        .columns()
        .iter()
        .map(|col| arrow_filter(col, mask))
        .collect::<arrow::error::Result<_>>()?;

    let options = RecordBatchOptions::new().with_row_count(Some(mask.true_count()));
    Ok(RecordBatch::try_new_with_options(
        batch.schema(),
        filtered_columns,
        &options,
    )?)
}

/// Trait for objects that can filter record batches
pub trait BatchFilter: std::fmt::Debug {
    /// Compute the mask of rows this filter keeps
    ///
    /// # Errors
    /// Returns an error if a required column is missing or cannot be compared
    fn mask(&self, batch: &RecordBatch) -> Result<BooleanArray>;

    /// Returns the set of column names required by this filter
    fn required_columns(&self) -> HashSet<String>;

    /// Filter a record batch
    ///
    /// # Errors
    /// Returns an error if the mask cannot be computed or applied
    fn filter(&self, batch: &RecordBatch) -> Result<RecordBatch> {
        let mask = self.mask(batch)?;
        filter_record_batch(batch, &mask)
    }
}

/// A filter that always includes all rows
#[derive(Debug, Clone, Default)]
pub struct IncludeAllFilter;

impl BatchFilter for IncludeAllFilter {
    fn mask(&self, batch: &RecordBatch) -> Result<BooleanArray> {
        Ok(BooleanArray::from(vec![true; batch.num_rows()]))
    }

    fn required_columns(&self) -> HashSet<String> {
        HashSet::new()
    }

    fn filter(&self, batch: &RecordBatch) -> Result<RecordBatch> {
        Ok(batch.clone())
    }
}

/// A filter that combines multiple filters with a logical AND
#[derive(Debug, Clone)]
pub struct AndFilter {
    filters: Vec<Arc<dyn BatchFilter + Send + Sync>>,
}

impl AndFilter {
    /// Create a new AND filter
    #[must_use]
    pub fn new(filters: Vec<Arc<dyn BatchFilter + Send + Sync>>) -> Self {
        Self { filters }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl BatchFilter for AndFilter {
    fn mask(&self, batch: &RecordBatch) -> Result<BooleanArray> {
        let mut combined = IncludeAllFilter.mask(batch)?;

        for filter in &self.filters {
            let mask = filter.mask(batch)?;
            combined = arrow::compute::and(&combined, &mask)?;
        }

        Ok(combined)
    }

    fn required_columns(&self) -> HashSet<String> {
        let mut columns = HashSet::new();
        for filter in &self.filters {
            columns.extend(filter.required_columns());
        }
        columns
    }

    fn filter(&self, batch: &RecordBatch) -> Result<RecordBatch> {
        if self.filters.is_empty() {
            return IncludeAllFilter.filter(batch);
        }

        let mask = self.mask(batch)?;
        filter_record_batch(batch, &mask)
    }
}
