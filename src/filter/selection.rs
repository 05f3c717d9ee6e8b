//! Equality filters driven by dashboard selections
//!
//! A selection is either `All` (no constraint) or one exact value. Values are compared
//! against normalized text, case-sensitively.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use arrow::array::{Array, BooleanArray, StringArray};
use arrow::compute::kernels::cmp::eq;
use arrow::record_batch::RecordBatch;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::core::{AndFilter, BatchFilter};
use crate::error::{Result, RosterError};
use crate::models::Roster;

/// Label of the selection that places no constraint
pub const ALL_LABEL: &str = "All";

/// Value chosen for one filter field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selection {
    All,
    Value(String),
}

impl Selection {
    /// Parse a UI choice: `"All"` means no constraint
    #[must_use]
    pub fn parse(choice: &str) -> Self {
        if choice == ALL_LABEL {
            Self::All
        } else {
            Self::Value(choice.to_string())
        }
    }

    #[must_use]
    pub const fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl From<Option<String>> for Selection {
    fn from(choice: Option<String>) -> Self {
        choice.map_or(Self::All, |c| Self::parse(&c))
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL_LABEL),
            Self::Value(v) => f.write_str(v),
        }
    }
}

/// Keep rows whose `field` equals the selected value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldFilter {
    pub field: String,
    pub selection: Selection,
}

impl FieldFilter {
    /// Filter on an exact value
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            selection: Selection::Value(value.into()),
        }
    }

    /// Filter that keeps every row
    pub fn all(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            selection: Selection::All,
        }
    }
}

impl BatchFilter for FieldFilter {
    fn mask(&self, batch: &RecordBatch) -> Result<BooleanArray> {
        let Selection::Value(value) = &self.selection else {
            return Ok(BooleanArray::from(vec![true; batch.num_rows()]));
        };

        let column = batch
            .column_by_name(&self.field)
            .ok_or_else(|| RosterError::missing_field(&self.field))?;
        let strings = column
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| {
                RosterError::Filter(format!("Column '{}' is not a string array", self.field))
            })?;

        let literal = StringArray::new_scalar(value.as_str());
        let matched = eq(strings, &literal)?;

        // Null cells never match
        Ok(matched.iter().map(|m| Some(m.unwrap_or(false))).collect())
    }

    fn required_columns(&self) -> HashSet<String> {
        match self.selection {
            Selection::All => HashSet::new(),
            Selection::Value(_) => HashSet::from([self.field.clone()]),
        }
    }
}

/// Apply equality filters as a logical AND, keeping row order
///
/// An empty filter list returns the roster unchanged. `All` selections are skipped,
/// even for fields the roster does not have.
///
/// # Errors
/// Returns `RosterError::MissingField` if a constrained field is not in the roster
pub fn apply_filters(roster: &Roster, filters: &[FieldFilter]) -> Result<Roster> {
    let active = filters
        .iter()
        .filter(|f| !f.selection.is_all())
        .map(|f| Arc::new(f.clone()) as Arc<dyn BatchFilter + Send + Sync>)
        .collect_vec();

    if active.is_empty() {
        return Ok(roster.clone());
    }

    let filter = AndFilter::new(active);
    if let Some(missing) = filter
        .required_columns()
        .into_iter()
        .sorted()
        .find(|column| !roster.has_field(column))
    {
        return Err(RosterError::missing_field(missing));
    }

    let filtered = filter.filter(roster.batch())?;

    log::debug!(
        "Filtered roster from {} to {} rows with {} active filters",
        roster.num_rows(),
        filtered.num_rows(),
        filter.len()
    );

    Ok(Roster::from_normalized(filtered))
}

/// Choices for a filter dropdown: `"All"` followed by the sorted distinct values
///
/// Computing options on an already-filtered roster gives cascading choices
/// (e.g. only the schools of the selected district).
///
/// # Errors
/// Returns `RosterError::MissingField` if the field is not in the roster
pub fn filter_options(roster: &Roster, field: &str) -> Result<Vec<String>> {
    let column = roster
        .column(field)
        .ok_or_else(|| RosterError::missing_field(field))?;

    let values = column.iter().flatten().unique().sorted().map(str::to_string);

    Ok(std::iter::once(ALL_LABEL.to_string()).chain(values).collect())
}
