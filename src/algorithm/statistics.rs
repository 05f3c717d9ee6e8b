//! Roster statistics
//!
//! Headline counts for the dashboard and numeric summaries of text columns that are
//! expected to hold numbers.

use rustc_hash::FxHashSet;
use serde::Serialize;

use super::frequency::round_half_up;
use crate::models::Roster;
use crate::schema::{ResolvedFields, SemanticField};

/// Headline counts of a roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KpiSummary {
    /// Number of rows
    pub students: usize,
    /// Distinct districts; `None` when the field is unavailable
    pub districts: Option<usize>,
    /// Distinct schools; `None` when the field is unavailable
    pub schools: Option<usize>,
    /// Distinct classes; `None` when the field is unavailable
    pub classes: Option<usize>,
}

/// Summary of the values of a numeric column
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumericSummary {
    /// Values that parsed as numbers
    pub count: usize,
    /// Present values that did not parse and were treated as absent
    pub coerced_absent: usize,
    /// Mean rounded to one decimal
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Functions for roster statistics and summaries
pub struct RosterStatistics;

impl RosterStatistics {
    /// Number of distinct non-absent values of a field; `None` if the roster lacks it
    #[must_use]
    pub fn distinct_count(roster: &Roster, field: &str) -> Option<usize> {
        let column = roster.column(field)?;
        let distinct: FxHashSet<&str> = column.iter().flatten().collect();
        Some(distinct.len())
    }

    /// Headline counts using resolved semantic fields
    #[must_use]
    pub fn kpis(roster: &Roster, resolved: &ResolvedFields) -> KpiSummary {
        let distinct = |field: SemanticField| {
            resolved
                .column(field)
                .and_then(|column| Self::distinct_count(roster, column))
        };

        KpiSummary {
            students: roster.num_rows(),
            districts: distinct(SemanticField::District),
            schools: distinct(SemanticField::School),
            classes: distinct(SemanticField::Class),
        }
    }

    /// Summarize the numeric values of a text column
    ///
    /// Values that do not parse as finite numbers count as absent. Returns `None` when
    /// the field is missing or no value parses.
    #[must_use]
    pub fn numeric_summary(roster: &Roster, field: &str) -> Option<NumericSummary> {
        let column = roster.column(field)?;

        let mut values = Vec::new();
        let mut coerced_absent = 0;
        for raw in column.iter().flatten() {
            match parse_numeric(raw) {
                Some(v) => values.push(v),
                None => coerced_absent += 1,
            }
        }

        if coerced_absent > 0 {
            log::debug!("{coerced_absent} non-numeric values in '{field}' treated as absent");
        }

        if values.is_empty() {
            return None;
        }

        #[allow(clippy::cast_precision_loss)]
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Some(NumericSummary {
            count: values.len(),
            coerced_absent,
            mean: round_half_up(mean),
            min,
            max,
        })
    }

    /// Generate a plain-text summary of the headline counts
    #[must_use]
    pub fn generate_summary(kpis: &KpiSummary) -> String {
        let show = |v: Option<usize>| v.map_or_else(|| "unavailable".to_string(), |n| n.to_string());

        let mut summary = String::new();
        summary.push_str("Roster Summary:\n");
        summary.push_str(&format!("  Students: {}\n", kpis.students));
        summary.push_str(&format!("  Districts: {}\n", show(kpis.districts)));
        summary.push_str(&format!("  Schools: {}\n", show(kpis.schools)));
        summary.push_str(&format!("  Classes: {}\n", show(kpis.classes)));
        summary
    }
}

/// Mean of the numeric values of a field, coercing non-numeric text to absent
#[must_use]
pub fn mean_numeric(roster: &Roster, field: &str) -> Option<f64> {
    RosterStatistics::numeric_summary(roster, field).map(|s| s.mean)
}

/// Parse trimmed text as a finite number
#[must_use]
pub fn parse_numeric(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
