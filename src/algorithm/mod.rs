//! Aggregation algorithms over rosters
//!
//! This module contains the derived-table computations of the dashboard: frequency
//! counts over fields and pooled field groups, the district cross-tabulation, and
//! headline statistics.

pub mod crosstab;
pub mod frequency;
pub mod statistics;

pub use crosstab::{CrossTab, CrossTabBuilder, CrossTabCell, CrossTabRow};
pub use frequency::{
    FrequencyEntry, FrequencyGroup, FrequencyTable, GroupedFrequency, GroupedRow,
    PercentageBasis, count_by_group, count_field, count_values, percentage, pooled_values,
    round_half_up,
};
pub use statistics::{KpiSummary, NumericSummary, RosterStatistics, mean_numeric, parse_numeric};
