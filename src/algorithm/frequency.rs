//! Frequency counting over single fields and pooled field groups
//!
//! Pooling concatenates every non-absent value of every member column into one
//! multiset before counting; it never counts per member column. Entries are ordered
//! by count (descending), with ties kept in the order the values were first seen in
//! the pooled multiset.

use std::collections::BTreeMap;

use arrow::datatypes::FieldRef;
use arrow::record_batch::RecordBatch;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_arrow::schema::{SchemaLike, TracingOptions};

use crate::error::{Result, RosterError};
use crate::models::Roster;
use crate::schema::FieldGroup;

/// Round half-up to one decimal place
#[must_use]
pub fn round_half_up(x: f64) -> f64 {
    (x.mul_add(10.0, 0.5)).floor() / 10.0
}

/// `count / denominator * 100`, rounded to one decimal; `None` when there is no data
#[must_use]
pub fn percentage(count: u64, denominator: u64) -> Option<f64> {
    if denominator == 0 {
        return None;
    }
    // Tenths of a percent, rounded on integers so exact `.x5` ties go up.
    let (count, denominator) = (u128::from(count), u128::from(denominator));
    let tenths = (count * 2000 + denominator) / (2 * denominator);
    #[allow(clippy::cast_precision_loss)]
    Some(tenths as f64 / 10.0)
}

/// Which total a percentage is taken of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PercentageBasis {
    /// All considered values across the whole table
    #[default]
    GrandTotal,
    /// The subtotal of the outer grouping key
    WithinGroup,
}

/// One distinct value and how often it occurred
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyEntry {
    pub value: String,
    pub count: u64,
    /// Share of the table total; `None` when not computed or when there is no data
    pub percentage: Option<f64>,
}

/// Value → count summary over a field or field group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyTable {
    /// Field or group name the table was computed over
    pub name: String,
    /// Entries ordered by count, ties by first appearance
    pub entries: Vec<FrequencyEntry>,
    /// Number of non-absent values considered, before any top-N restriction
    pub total: u64,
}

impl FrequencyTable {
    /// An empty table
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
            total: 0,
        }
    }

    /// Count values in first-seen order, then order by count
    pub fn from_values<'a, I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut index: FxHashMap<&'a str, usize> = FxHashMap::default();
        let mut counts: Vec<(&'a str, u64)> = Vec::new();
        let mut total = 0_u64;

        for value in values {
            total += 1;
            match index.get(value) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    index.insert(value, counts.len());
                    counts.push((value, 1));
                }
            }
        }

        // Stable sort keeps first-seen order among equal counts
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        Self {
            name: name.into(),
            entries: counts
                .into_iter()
                .map(|(value, count)| FrequencyEntry {
                    value: value.to_string(),
                    count,
                    percentage: None,
                })
                .collect(),
            total,
        }
    }

    /// Keep only the `n` most frequent values
    ///
    /// `total` still counts every considered value, so percentages computed afterwards
    /// are shares of the whole pooled set.
    #[must_use]
    pub fn top_n(mut self, n: usize) -> Self {
        self.entries.truncate(n);
        self
    }

    /// Fill percentages using `total` as the denominator
    #[must_use]
    pub fn with_percentages(self) -> Self {
        let denominator = self.total;
        self.with_denominator(denominator)
    }

    /// Fill percentages against an explicit denominator
    #[must_use]
    pub fn with_denominator(mut self, denominator: u64) -> Self {
        for entry in &mut self.entries {
            entry.percentage = percentage(entry.count, denominator);
        }
        self
    }

    /// Whether no value was counted
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Count for a value, if it occurs
    #[must_use]
    pub fn count_of(&self, value: &str) -> Option<u64> {
        self.entry(value).map(|e| e.count)
    }

    /// Percentage for a value, if computed
    #[must_use]
    pub fn percentage_of(&self, value: &str) -> Option<f64> {
        self.entry(value).and_then(|e| e.percentage)
    }

    fn entry(&self, value: &str) -> Option<&FrequencyEntry> {
        self.entries.iter().find(|e| e.value == value)
    }

    /// Sum of the displayed counts
    #[must_use]
    pub fn displayed_count(&self) -> u64 {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Table as a record batch with `value`, `count` and `percentage` columns
    ///
    /// # Errors
    /// Returns an error if the entries cannot be converted to Arrow arrays
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let fields = Vec::<FieldRef>::from_type::<FrequencyEntry>(TracingOptions::default())?;
        Ok(serde_arrow::to_record_batch(&fields, &self.entries)?)
    }
}

/// Non-absent values of every member column, member by member, in row order
///
/// Member columns the roster does not have contribute nothing.
#[must_use]
pub fn pooled_values<'a>(roster: &'a Roster, group: &FieldGroup) -> Vec<&'a str> {
    group
        .columns()
        .iter()
        .filter_map(|column| roster.column(column))
        .flat_map(|array| array.iter().flatten())
        .collect()
}

/// Count occurrences over a pooled field group
#[must_use]
pub fn count_values(roster: &Roster, group: &FieldGroup) -> FrequencyTable {
    let values = pooled_values(roster, group);
    let table = FrequencyTable::from_values(group.name(), values);
    log::debug!(
        "Counted {} values ({} distinct) for {}",
        table.total,
        table.len(),
        group.name()
    );
    table
}

/// Count occurrences of a single field
#[must_use]
pub fn count_field(roster: &Roster, field: &str) -> FrequencyTable {
    count_values(roster, &FieldGroup::single(field))
}

/// Inner-field table for one outer key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyGroup {
    pub key: String,
    pub table: FrequencyTable,
}

/// Flattened (outer, inner) row for charting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedRow {
    pub group: String,
    pub value: String,
    pub count: u64,
    pub percentage: Option<f64>,
}

/// Inner-field frequencies per outer key (e.g. gender per district)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedFrequency {
    pub outer: String,
    pub inner: String,
    pub basis: PercentageBasis,
    /// Groups ordered by key
    pub groups: Vec<FrequencyGroup>,
    /// Rows with both keys present
    pub total: u64,
}

impl GroupedFrequency {
    /// Table for one outer key
    #[must_use]
    pub fn group(&self, key: &str) -> Option<&FrequencyTable> {
        self.groups.iter().find(|g| g.key == key).map(|g| &g.table)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// One row per (outer, inner) pair, in group order
    #[must_use]
    pub fn rows(&self) -> Vec<GroupedRow> {
        self.groups
            .iter()
            .flat_map(|g| {
                g.table.entries.iter().map(|e| GroupedRow {
                    group: g.key.clone(),
                    value: e.value.clone(),
                    count: e.count,
                    percentage: e.percentage,
                })
            })
            .collect()
    }

    /// Flattened rows as a record batch
    ///
    /// # Errors
    /// Returns an error if the rows cannot be converted to Arrow arrays
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let fields = Vec::<FieldRef>::from_type::<GroupedRow>(TracingOptions::default())?;
        Ok(serde_arrow::to_record_batch(&fields, &self.rows())?)
    }
}

/// Count `inner` values within each `outer` key, with percentages on the chosen basis
///
/// Rows missing either value are left out.
///
/// # Errors
/// Returns `RosterError::MissingField` if either column is not in the roster
pub fn count_by_group(
    roster: &Roster,
    outer: &str,
    inner: &str,
    basis: PercentageBasis,
) -> Result<GroupedFrequency> {
    let outer_col = roster
        .column(outer)
        .ok_or_else(|| RosterError::missing_field(outer))?;
    let inner_col = roster
        .column(inner)
        .ok_or_else(|| RosterError::missing_field(inner))?;

    let mut buckets: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (key, value) in outer_col.iter().zip(inner_col.iter()) {
        if let (Some(key), Some(value)) = (key, value) {
            buckets.entry(key).or_default().push(value);
        }
    }

    let total = buckets.values().map(|v| v.len() as u64).sum();

    let groups = buckets
        .into_iter()
        .map(|(key, values)| {
            let table = FrequencyTable::from_values(inner, values);
            let table = match basis {
                PercentageBasis::WithinGroup => table.with_percentages(),
                PercentageBasis::GrandTotal => table.with_denominator(total),
            };
            FrequencyGroup {
                key: key.to_string(),
                table,
            }
        })
        .collect();

    Ok(GroupedFrequency {
        outer: outer.to_string(),
        inner: inner.to_string(),
        basis,
        groups,
        total,
    })
}
