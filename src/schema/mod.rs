//! Roster schema handling.
//!
//! A roster is always held as nullable `Utf8` columns. Batches read from several
//! sources may carry different column sets; they are merged under the union of
//! their field names, with null columns standing in for fields a batch lacks.

pub mod resolver;

use std::sync::Arc;

use arrow::array::{ArrayRef, new_null_array};
use arrow::compute::concat_batches;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use itertools::Itertools;

use crate::error::Result;

pub use resolver::{
    FieldGroup, FieldGroupSpec, FieldResolver, Resolution, ResolvedFields, SemanticField,
    resolve_field, resolve_field_with,
};

/// Differences found while merging batches with different column sets
#[derive(Debug, Default)]
pub struct SchemaCompatibilityReport {
    /// Whether every batch carried every field
    pub compatible: bool,
    /// Fields missing from some of the merged batches
    pub issues: Vec<SchemaIssue>,
}

/// A field missing from one of the merged batches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIssue {
    /// Position of the batch in the merge input
    pub batch_index: usize,
    /// Name of the absent field
    pub field: String,
}

/// Build a schema of nullable `Utf8` fields with the given names
#[must_use]
pub fn text_schema<S: AsRef<str>>(names: &[S]) -> SchemaRef {
    Arc::new(Schema::new(
        names
            .iter()
            .map(|n| Field::new(n.as_ref(), DataType::Utf8, true))
            .collect_vec(),
    ))
}

/// An empty record batch over the given text schema
#[must_use]
pub fn empty_batch(schema: SchemaRef) -> RecordBatch {
    RecordBatch::new_empty(schema)
}

/// Union of field names across batches, in first-seen order
#[must_use]
pub fn union_field_names(batches: &[RecordBatch]) -> Vec<String> {
    batches
        .iter()
        .flat_map(|b| {
            b.schema()
                .fields()
                .iter()
                .map(|f| f.name().clone())
                .collect_vec()
        })
        .unique()
        .collect_vec()
}

/// Align a text batch to a target schema, filling absent fields with nulls
///
/// # Errors
/// Returns an error if the aligned batch cannot be assembled
pub fn align_batch(batch: &RecordBatch, target: &SchemaRef) -> Result<RecordBatch> {
    let columns: Vec<ArrayRef> = target
        .fields()
        .iter()
        .map(|field| match batch.column_by_name(field.name()) {
            Some(col) => Arc::clone(col),
            None => new_null_array(&DataType::Utf8, batch.num_rows()),
        })
        .collect();

    let options = RecordBatchOptions::new().with_row_count(Some(batch.num_rows()));
    Ok(RecordBatch::try_new_with_options(
        Arc::clone(target),
        columns,
        &options,
    )?)
}

/// Merge normalized text batches into one batch under the union schema
///
/// # Errors
/// Returns an error if a batch cannot be aligned or the batches cannot be concatenated
pub fn merge_batches(batches: &[RecordBatch]) -> Result<(RecordBatch, SchemaCompatibilityReport)> {
    let names = union_field_names(batches);
    let schema = text_schema(&names);

    let mut report = SchemaCompatibilityReport {
        compatible: true,
        issues: Vec::new(),
    };

    for (batch_index, batch) in batches.iter().enumerate() {
        for name in &names {
            if batch.column_by_name(name).is_none() {
                report.compatible = false;
                report.issues.push(SchemaIssue {
                    batch_index,
                    field: name.clone(),
                });
            }
        }
    }

    let aligned = batches
        .iter()
        .map(|b| align_batch(b, &schema))
        .collect::<Result<Vec<_>>>()?;

    let merged = if aligned.is_empty() {
        empty_batch(schema)
    } else {
        concat_batches(&schema, &aligned)?
    };

    Ok((merged, report))
}
