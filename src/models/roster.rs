//! Roster entity

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, StringArray};
use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;
use itertools::Itertools;

use crate::clean::{Normalizer, drop_empty_rows};
use crate::error::Result;
use crate::models::StudentRecord;
use crate::schema::{merge_batches, text_schema};

/// An ordered collection of student records held as nullable text columns
///
/// Every value in a roster has already been through the normalizer: it is either a
/// trimmed, non-empty string or null.
#[derive(Debug, Clone)]
pub struct Roster {
    batch: RecordBatch,
}

impl Default for Roster {
    fn default() -> Self {
        Self::empty()
    }
}

impl Roster {
    /// A roster with no fields and no rows
    #[must_use]
    pub fn empty() -> Self {
        Self {
            batch: RecordBatch::new_empty(Arc::new(Schema::empty())),
        }
    }

    /// Normalize raw batches from a source and merge them into one roster
    ///
    /// Batches with different column sets are merged under the union of their fields.
    /// Rows with no values at all are dropped.
    ///
    /// # Errors
    /// Returns an error if a column cannot be converted to text or the batches cannot be merged
    pub fn from_batches(batches: &[RecordBatch], normalizer: &Normalizer) -> Result<Self> {
        let normalized = batches
            .iter()
            .map(|b| normalizer.normalize_batch(b))
            .collect::<Result<Vec<_>>>()?;

        let (merged, report) = merge_batches(&normalized)?;
        if !report.compatible {
            let fields = report.issues.iter().map(|i| i.field.as_str()).unique().join(", ");
            log::warn!(
                "Merged {} batches with differing columns; missing values filled for: {fields}",
                batches.len()
            );
        }

        Ok(Self {
            batch: drop_empty_rows(&merged)?,
        })
    }

    /// Normalize a single raw batch into a roster
    ///
    /// # Errors
    /// Returns an error if a column cannot be converted to text
    pub fn from_batch(batch: &RecordBatch, normalizer: &Normalizer) -> Result<Self> {
        Self::from_batches(std::slice::from_ref(batch), normalizer)
    }

    /// Build a roster from records, normalizing every value with the default markers
    ///
    /// Field order is the order in which names are first seen across the records.
    ///
    /// # Errors
    /// Returns an error if the record batch cannot be assembled
    pub fn from_records(records: &[StudentRecord]) -> Result<Self> {
        let normalizer = Normalizer::default();
        let names = records
            .iter()
            .flat_map(StudentRecord::field_names)
            .unique()
            .map(str::to_string)
            .collect_vec();

        if names.is_empty() {
            return Ok(Self::empty());
        }

        let columns: Vec<ArrayRef> = names
            .iter()
            .map(|name| {
                let values: StringArray = records
                    .iter()
                    .map(|r| r.get(name).and_then(|v| normalizer.normalize_value(v)))
                    .collect();
                Arc::new(values) as ArrayRef
            })
            .collect();

        let batch = RecordBatch::try_new(text_schema(&names), columns)?;
        Ok(Self {
            batch: drop_empty_rows(&batch)?,
        })
    }

    /// Wrap a batch whose columns are already normalized text
    pub(crate) fn from_normalized(batch: RecordBatch) -> Self {
        Self { batch }
    }

    /// Underlying record batch
    #[must_use]
    pub const fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batch.num_rows() == 0
    }

    /// Field names in column order
    #[must_use]
    pub fn field_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.batch.column_by_name(name).is_some()
    }

    /// Text column by field name
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&StringArray> {
        self.batch
            .column_by_name(name)
            .and_then(|col| col.as_any().downcast_ref::<StringArray>())
    }

    /// Row at `index` as a record, or `None` if out of range
    #[must_use]
    pub fn record(&self, index: usize) -> Option<StudentRecord> {
        if index >= self.num_rows() {
            return None;
        }

        let schema = self.batch.schema();
        let mut record = StudentRecord::new();
        for (field, column) in schema.fields().iter().zip(self.batch.columns()) {
            let value = column
                .as_any()
                .downcast_ref::<StringArray>()
                .filter(|c| c.is_valid(index))
                .map(|c| c.value(index).to_string());
            record.set(field.name().clone(), value);
        }
        Some(record)
    }

    /// All rows as records, in roster order
    #[must_use]
    pub fn records(&self) -> Vec<StudentRecord> {
        (0..self.num_rows()).filter_map(|i| self.record(i)).collect()
    }
}

impl PartialEq for Roster {
    fn eq(&self, other: &Self) -> bool {
        self.batch == other.batch
    }
}
