//! Dashboard pipeline
//!
//! A [`Dashboard`] owns one fetched roster and the fields resolved against it. Each report
//! is recomputed from scratch: the roster is filtered by the current selections and every
//! section is derived from the filtered subset. Sections whose fields are missing are
//! skipped and listed in [`DashboardReport::unavailable`].

mod render;

use std::io::Write;
use std::sync::Arc;

use serde::Serialize;

use crate::algorithm::{
    CrossTab, CrossTabBuilder, FrequencyTable, GroupedFrequency, KpiSummary, NumericSummary,
    PercentageBasis, RosterStatistics, count_by_group, count_field, count_values,
};
use crate::config::DashboardConfig;
use crate::error::{Result, RosterError};
use crate::export::export_delimited;
use crate::filter::{FieldFilter, Selection, apply_filters, filter_options};
use crate::models::Roster;
use crate::reader::RosterSource;
use crate::schema::{FieldGroupSpec, ResolvedFields, SemanticField};

/// Every derived table for one set of filter selections
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    /// Filters the report was computed under
    pub filters: Vec<FieldFilter>,
    pub kpis: KpiSummary,
    pub gender: Option<FrequencyTable>,
    /// Gender counts per district, with shares of each district's total
    pub district_gender: Option<GroupedFrequency>,
    pub class_counts: Option<FrequencyTable>,
    pub stream: Option<FrequencyTable>,
    pub subjects: Option<FrequencyTable>,
    pub interests: Option<FrequencyTable>,
    /// Most frequent career paths; percentages are shares of all suggested paths
    pub career_paths: Option<FrequencyTable>,
    pub entrance_exams: Option<FrequencyTable>,
    pub previous_percentage: Option<NumericSummary>,
    pub cross_tab: Option<CrossTab>,
    /// Sections that were skipped, with the reason
    pub unavailable: Vec<String>,
}

/// Roster plus resolved fields, ready to produce reports
#[derive(Debug, Clone)]
pub struct Dashboard {
    roster: Arc<Roster>,
    resolved: ResolvedFields,
    config: DashboardConfig,
}

impl Dashboard {
    /// Resolve the configured fields against a fetched roster
    ///
    /// # Errors
    /// Returns `RosterError::SourceUnavailable` if the roster has no rows
    pub fn new(roster: impl Into<Arc<Roster>>, config: DashboardConfig) -> Result<Self> {
        let roster = roster.into();
        if roster.is_empty() {
            return Err(RosterError::source_unavailable("roster has no rows"));
        }

        let resolved = config.resolver().resolve(&roster.field_names());

        Ok(Self {
            roster,
            resolved,
            config,
        })
    }

    /// Fetch a roster from a source and build a dashboard over it
    ///
    /// # Errors
    /// Returns the source's error, or `RosterError::SourceUnavailable` for an empty roster
    pub fn from_source(source: &dyn RosterSource, config: DashboardConfig) -> Result<Self> {
        let roster = source.read_roster()?;
        log::info!(
            "Fetched {} rows from {}",
            roster.num_rows(),
            source.describe()
        );
        Self::new(roster, config)
    }

    #[must_use]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    #[must_use]
    pub const fn resolved(&self) -> &ResolvedFields {
        &self.resolved
    }

    #[must_use]
    pub const fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Filter on the column resolved for a semantic field
    ///
    /// An `All` selection on an unresolved field yields a filter that keeps every row.
    ///
    /// # Errors
    /// Returns `RosterError::MissingField` if a value is selected for an unresolved field
    pub fn semantic_filter(&self, field: SemanticField, selection: Selection) -> Result<FieldFilter> {
        match (self.resolved.column(field), selection) {
            (Some(column), selection) => Ok(FieldFilter {
                field: column.to_string(),
                selection,
            }),
            (None, Selection::All) => Ok(FieldFilter::all(field.label())),
            (None, Selection::Value(_)) => Err(RosterError::missing_field(field.label())),
        }
    }

    /// The subset of the roster matching every filter
    ///
    /// # Errors
    /// Returns `RosterError::MissingField` if a constrained field is not in the roster
    pub fn filtered(&self, filters: &[FieldFilter]) -> Result<Roster> {
        apply_filters(&self.roster, filters)
    }

    /// Choices for a semantic field under the current filters
    ///
    /// # Errors
    /// Returns `RosterError::MissingField` if the field did not resolve
    pub fn options(&self, field: SemanticField, filters: &[FieldFilter]) -> Result<Vec<String>> {
        let column = self.resolved.require(field)?;
        filter_options(&self.filtered(filters)?, column)
    }

    /// Write the filtered subset as delimited text with the configured export delimiter
    ///
    /// # Errors
    /// Returns an error if filtering or writing fails
    pub fn export<W: Write>(&self, filters: &[FieldFilter], writer: W) -> Result<()> {
        let subset = self.filtered(filters)?;
        export_delimited(&subset, writer, self.config.export_delimiter_byte())
    }

    /// Compute every section of the dashboard under the given filters
    ///
    /// # Errors
    /// Returns `RosterError::MissingField` if a filter constrains a field the roster
    /// lacks, or any error other than a missing field raised while building a section
    pub fn report(&self, filters: &[FieldFilter]) -> Result<DashboardReport> {
        let start = std::time::Instant::now();
        let roster = self.filtered(filters)?;
        let resolved = &self.resolved;
        let groups = &self.config.groups;
        let mut unavailable = Vec::new();

        let single = |field: SemanticField| -> Result<Option<FrequencyTable>> {
            let column = resolved.require(field)?;
            let table = count_field(&roster, column);
            Ok((!table.is_empty()).then(|| table.with_percentages()))
        };

        let gender =
            section(&mut unavailable, "Gender distribution", single(SemanticField::Gender))?.flatten();

        let district_gender = section(
            &mut unavailable,
            "District-wise gender distribution",
            resolved.require(SemanticField::District).and_then(|district| {
                let gender = resolved.require(SemanticField::Gender)?;
                count_by_group(&roster, district, gender, PercentageBasis::WithinGroup)
                    .map(|grouped| (!grouped.is_empty()).then_some(grouped))
            }),
        )?
        .flatten();

        let class_counts =
            section(&mut unavailable, "Class-wise counts", single(SemanticField::Class))?.flatten();
        let stream =
            section(&mut unavailable, "Stream distribution", single(SemanticField::Stream))?.flatten();

        let subjects = section(
            &mut unavailable,
            "Subjects",
            self.pooled(&roster, &groups.subjects, None),
        )?
        .flatten();
        let interests = section(
            &mut unavailable,
            "Career interest distribution",
            self.pooled(&roster, &groups.interests, None),
        )?
        .flatten();
        let career_paths = section(
            &mut unavailable,
            "Suggested career paths",
            self.pooled(&roster, &groups.career_paths, Some(self.config.top_n)),
        )?
        .flatten();
        let entrance_exams = section(
            &mut unavailable,
            "Entrance examination preferences",
            self.pooled(&roster, &groups.entrance_exams, None),
        )?
        .flatten();

        let previous_percentage = section(
            &mut unavailable,
            "Previous class percentage",
            resolved
                .require(SemanticField::PreviousPercentage)
                .map(|column| RosterStatistics::numeric_summary(&roster, column)),
        )?
        .flatten();

        let cross_tab = section(
            &mut unavailable,
            "District summary",
            CrossTabBuilder::from_config(&self.config.cross_tab)
                .build_resolved(&roster, resolved)
                .map(|table| (!table.is_empty()).then_some(table)),
        )?
        .flatten();

        let report = DashboardReport {
            filters: filters.to_vec(),
            kpis: RosterStatistics::kpis(&roster, resolved),
            gender,
            district_gender,
            class_counts,
            stream,
            subjects,
            interests,
            career_paths,
            entrance_exams,
            previous_percentage,
            cross_tab,
            unavailable,
        };

        log::info!(
            "Built dashboard report over {} of {} rows in {:?}",
            roster.num_rows(),
            self.roster.num_rows(),
            start.elapsed()
        );
        Ok(report)
    }

    /// Pooled counts for a declared group; `None` when the group holds no values
    fn pooled(
        &self,
        roster: &Roster,
        spec: &FieldGroupSpec,
        top_n: Option<usize>,
    ) -> Result<Option<FrequencyTable>> {
        let group = self
            .resolved
            .group(&spec.name)
            .filter(|g| !g.is_empty())
            .ok_or_else(|| RosterError::missing_field(&spec.name))?;

        let table = count_values(roster, group);
        if table.is_empty() {
            return Ok(None);
        }

        let table = match top_n {
            Some(n) => table.top_n(n),
            None => table,
        };
        Ok(Some(table.with_percentages()))
    }
}

/// Keep a section's value, or record it as unavailable when a field is missing
fn section<T>(unavailable: &mut Vec<String>, name: &str, result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_missing_field() => {
            log::warn!("Skipping {name}: {e}");
            unavailable.push(format!("{name}: {e}"));
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
