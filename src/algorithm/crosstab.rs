//! District × class × gender cross-tabulation
//!
//! Every distinct district of the roster gets a row, including districts with no
//! student in the selected classes (their row is all zeros). `total` is the sum of
//! exactly the class/gender cells of the row.

use std::collections::BTreeMap;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use itertools::iproduct;
use serde::Serialize;

use super::frequency::percentage;
use crate::config::CrossTabConfig;
use crate::error::{Result, RosterError};
use crate::models::Roster;
use crate::schema::{ResolvedFields, SemanticField};

/// Label of the column-wise totals row
pub const GRAND_TOTAL_LABEL: &str = "Total";

/// (class, gender) pairs in class-major order
fn combinations(classes: &[String], genders: &[String]) -> Vec<(String, String)> {
    iproduct!(classes.iter(), genders.iter())
        .map(|(c, g)| (c.clone(), g.clone()))
        .collect()
}

/// Count and share of one (class, gender) combination within a row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossTabCell {
    pub class: String,
    pub gender: String,
    pub count: u64,
    /// Share of the row total; 0.0 when the row total is zero
    pub percentage: f64,
}

/// Counts for one district
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossTabRow {
    pub district: String,
    /// Cells in class-major order: (class 1, gender 1), (class 1, gender 2), ...
    pub cells: Vec<CrossTabCell>,
    pub total: u64,
}

impl CrossTabRow {
    fn from_counts(district: String, combos: &[(String, String)], counts: &[u64]) -> Self {
        let total = counts.iter().sum();
        let cells = combos
            .iter()
            .zip(counts)
            .map(|((class, gender), &count)| CrossTabCell {
                class: class.clone(),
                gender: gender.clone(),
                count,
                percentage: percentage(count, total).unwrap_or(0.0),
            })
            .collect();

        Self {
            district,
            cells,
            total,
        }
    }

    /// Count for a (class, gender) combination
    #[must_use]
    pub fn count(&self, class: &str, gender: &str) -> Option<u64> {
        self.cell(class, gender).map(|c| c.count)
    }

    /// Percentage for a (class, gender) combination
    #[must_use]
    pub fn percentage(&self, class: &str, gender: &str) -> Option<f64> {
        self.cell(class, gender).map(|c| c.percentage)
    }

    fn cell(&self, class: &str, gender: &str) -> Option<&CrossTabCell> {
        self.cells
            .iter()
            .find(|c| c.class == class && c.gender == gender)
    }
}

/// Wide district summary table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossTab {
    pub classes: Vec<String>,
    pub genders: Vec<String>,
    /// One row per district, ordered by district name
    pub rows: Vec<CrossTabRow>,
}

impl CrossTab {
    /// Row for a district
    #[must_use]
    pub fn row(&self, district: &str) -> Option<&CrossTabRow> {
        self.rows.iter().find(|r| r.district == district)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn combos(&self) -> Vec<(String, String)> {
        combinations(&self.classes, &self.genders)
    }

    /// Column-wise totals over every district
    #[must_use]
    pub fn grand_total(&self) -> CrossTabRow {
        let combos = self.combos();
        let mut counts = vec![0_u64; combos.len()];
        for row in &self.rows {
            for (slot, cell) in counts.iter_mut().zip(&row.cells) {
                *slot += cell.count;
            }
        }
        CrossTabRow::from_counts(GRAND_TOTAL_LABEL.to_string(), &combos, &counts)
    }

    /// Header label of a (class, gender) cell, e.g. `"Class 10 Male"`
    #[must_use]
    pub fn cell_label(class: &str, gender: &str) -> String {
        format!("Class {class} {gender}")
    }

    /// Wide record batch: District, one count column per cell, Total, one `%` column per cell
    ///
    /// # Errors
    /// Returns an error if the record batch cannot be assembled
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let combos = self.combos();

        let mut fields = vec![Field::new("District", DataType::Utf8, false)];
        let mut columns: Vec<ArrayRef> = vec![Arc::new(StringArray::from_iter_values(
            self.rows.iter().map(|r| r.district.as_str()),
        ))];

        for (i, (class, gender)) in combos.iter().enumerate() {
            fields.push(Field::new(
                Self::cell_label(class, gender),
                DataType::UInt64,
                false,
            ));
            columns.push(Arc::new(UInt64Array::from_iter_values(
                self.rows.iter().map(|r| r.cells[i].count),
            )));
        }

        fields.push(Field::new("Total", DataType::UInt64, false));
        columns.push(Arc::new(UInt64Array::from_iter_values(
            self.rows.iter().map(|r| r.total),
        )));

        for (i, (class, gender)) in combos.iter().enumerate() {
            fields.push(Field::new(
                format!("{} %", Self::cell_label(class, gender)),
                DataType::Float64,
                false,
            ));
            columns.push(Arc::new(Float64Array::from_iter_values(
                self.rows.iter().map(|r| r.cells[i].percentage),
            )));
        }

        Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
    }
}

/// Builds the district cross-tabulation for fixed target classes and genders
#[derive(Debug, Clone)]
pub struct CrossTabBuilder {
    classes: Vec<String>,
    genders: Vec<String>,
}

impl CrossTabBuilder {
    /// Create a builder for the given target values
    pub fn new<C, G>(classes: C, genders: G) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        G: IntoIterator,
        G::Item: Into<String>,
    {
        Self {
            classes: classes.into_iter().map(Into::into).collect(),
            genders: genders.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a builder from configuration
    #[must_use]
    pub fn from_config(config: &CrossTabConfig) -> Self {
        Self::new(config.classes.clone(), config.genders.clone())
    }

    /// Build the table from explicitly named columns
    ///
    /// # Errors
    /// Returns `RosterError::MissingField` if a column is not in the roster
    pub fn build(
        &self,
        roster: &Roster,
        district: &str,
        class: &str,
        gender: &str,
    ) -> Result<CrossTab> {
        let district_col = roster
            .column(district)
            .ok_or_else(|| RosterError::missing_field(district))?;
        let class_col = roster
            .column(class)
            .ok_or_else(|| RosterError::missing_field(class))?;
        let gender_col = roster
            .column(gender)
            .ok_or_else(|| RosterError::missing_field(gender))?;

        let width = self.classes.len() * self.genders.len();
        let mut counts: BTreeMap<&str, Vec<u64>> = BTreeMap::new();

        let rows = district_col
            .iter()
            .zip(class_col.iter())
            .zip(gender_col.iter());

        for ((d, c), g) in rows {
            let Some(d) = d else {
                continue;
            };
            let slots = counts.entry(d).or_insert_with(|| vec![0; width]);

            let class_idx = c.and_then(|c| self.classes.iter().position(|t| t == c));
            let gender_idx = g.and_then(|g| self.genders.iter().position(|t| t == g));

            if let (Some(ci), Some(gi)) = (class_idx, gender_idx) {
                slots[ci * self.genders.len() + gi] += 1;
            }
        }

        let combos = combinations(&self.classes, &self.genders);

        let rows = counts
            .into_iter()
            .map(|(d, slots)| CrossTabRow::from_counts(d.to_string(), &combos, &slots))
            .collect();

        Ok(CrossTab {
            classes: self.classes.clone(),
            genders: self.genders.clone(),
            rows,
        })
    }

    /// Build the table from resolved semantic fields
    ///
    /// # Errors
    /// Returns `RosterError::MissingField` if district, class or gender did not resolve
    pub fn build_resolved(&self, roster: &Roster, resolved: &ResolvedFields) -> Result<CrossTab> {
        self.build(
            roster,
            resolved.require(SemanticField::District)?,
            resolved.require(SemanticField::Class)?,
            resolved.require(SemanticField::Gender)?,
        )
    }
}
