//! Column resolution
//!
//! Spreadsheet headers drift ("Entrance Examination -1" vs "Entrance Exam 1"), so
//! semantic fields are located by case-insensitive keyword. The mapping is built once
//! per roster and kept as explicit, inspectable results: a keyword resolves to one
//! column, to several (the first in column order is used and the others reported),
//! or to nothing.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::config::FieldKeywords;
use crate::error::{Result, RosterError};

/// Semantic fields read by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticField {
    District,
    School,
    Class,
    Gender,
    Stream,
    PreviousPercentage,
}

impl SemanticField {
    /// All semantic fields in resolution order
    pub const ALL: [Self; 6] = [
        Self::District,
        Self::School,
        Self::Class,
        Self::Gender,
        Self::Stream,
        Self::PreviousPercentage,
    ];

    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::District => "District",
            Self::School => "School",
            Self::Class => "Class",
            Self::Gender => "Gender",
            Self::Stream => "Stream",
            Self::PreviousPercentage => "Previous Class Percentage",
        }
    }
}

impl fmt::Display for SemanticField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of resolving one keyword against the available columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    /// Exactly one column contains the keyword
    Found { column: String },
    /// Several columns contain the keyword; `chosen` is the first in column order
    Ambiguous {
        chosen: String,
        candidates: Vec<String>,
    },
    /// No column contains the keyword
    NotFound,
}

impl Resolution {
    /// The column to read, if any
    #[must_use]
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::Found { column } => Some(column),
            Self::Ambiguous { chosen, .. } => Some(chosen),
            Self::NotFound => None,
        }
    }
}

/// Resolve a keyword to the first column whose name contains it, ignoring case
///
/// When several columns match and one of them equals the keyword exactly, that
/// column is chosen instead of the first match.
#[must_use]
pub fn resolve_field<S: AsRef<str>>(field_names: &[S], keyword: &str) -> Resolution {
    resolve_field_with(field_names, keyword, true)
}

/// Resolve a keyword, optionally letting an exact name match override column order
///
/// With `prefer_exact` off, an ambiguous keyword always resolves to the first
/// matching column.
#[must_use]
pub fn resolve_field_with<S: AsRef<str>>(
    field_names: &[S],
    keyword: &str,
    prefer_exact: bool,
) -> Resolution {
    let mut candidates: Vec<String> = matching_columns(field_names, keyword);

    match candidates.len() {
        0 => Resolution::NotFound,
        1 => Resolution::Found {
            column: candidates.remove(0),
        },
        _ => {
            let keyword = keyword.trim();
            let exact = prefer_exact
                .then(|| {
                    candidates
                        .iter()
                        .find(|c| c.trim().eq_ignore_ascii_case(keyword))
                })
                .flatten();
            let chosen = exact.unwrap_or(&candidates[0]).clone();
            Resolution::Ambiguous { chosen, candidates }
        }
    }
}

fn matching_columns<S: AsRef<str>>(field_names: &[S], keyword: &str) -> Vec<String> {
    let keyword = keyword.trim().to_lowercase();
    if keyword.is_empty() {
        return Vec::new();
    }

    field_names
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| name.to_lowercase().contains(&keyword))
        .map(str::to_string)
        .collect()
}

/// Declared field group: every column containing `keyword` belongs to the group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldGroupSpec {
    /// Logical name of the group
    pub name: String,
    /// Case-insensitive substring selecting member columns
    pub keyword: String,
}

impl FieldGroupSpec {
    /// Declare a group
    pub fn new(name: impl Into<String>, keyword: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keyword: keyword.into(),
        }
    }

    /// Resolve the group against the available columns, keeping column order
    #[must_use]
    pub fn resolve<S: AsRef<str>>(&self, field_names: &[S]) -> FieldGroup {
        FieldGroup::new(
            self.name.clone(),
            matching_columns(field_names, &self.keyword),
        )
    }
}

/// Physical columns pooled as one logical multi-valued field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldGroup {
    name: String,
    columns: SmallVec<[String; 3]>,
}

impl FieldGroup {
    /// Create a group from an ordered list of columns
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// A group consisting of one column, named after it
    pub fn single(column: impl Into<String>) -> Self {
        let column = column.into();
        Self {
            name: column.clone(),
            columns: SmallVec::from_elem(column, 1),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Whether no column belongs to the group
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Semantic fields and field groups resolved against one roster
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolvedFields {
    fields: FxHashMap<SemanticField, Resolution>,
    /// Resolved field groups in declaration order
    groups: Vec<FieldGroup>,
}

impl ResolvedFields {
    /// Column resolved for a semantic field
    #[must_use]
    pub fn column(&self, field: SemanticField) -> Option<&str> {
        self.fields.get(&field).and_then(Resolution::column)
    }

    /// Column resolved for a semantic field, or a missing-field error
    ///
    /// # Errors
    /// Returns `RosterError::MissingField` when the field did not resolve
    pub fn require(&self, field: SemanticField) -> Result<&str> {
        self.column(field)
            .ok_or_else(|| RosterError::missing_field(field.label()))
    }

    /// Full resolution outcome for a semantic field
    #[must_use]
    pub fn resolution(&self, field: SemanticField) -> Option<&Resolution> {
        self.fields.get(&field)
    }

    /// Resolved group by logical name
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&FieldGroup> {
        self.groups.iter().find(|g| g.name() == name)
    }

    /// Semantic fields that resolved to no column
    #[must_use]
    pub fn unresolved(&self) -> Vec<SemanticField> {
        SemanticField::ALL
            .into_iter()
            .filter(|f| self.column(*f).is_none())
            .collect()
    }

    /// Semantic fields whose keyword matched more than one column
    #[must_use]
    pub fn ambiguous(&self) -> Vec<(SemanticField, &Resolution)> {
        SemanticField::ALL
            .into_iter()
            .filter_map(|f| match self.fields.get(&f) {
                Some(r @ Resolution::Ambiguous { .. }) => Some((f, r)),
                _ => None,
            })
            .collect()
    }
}

/// Builds `ResolvedFields` from declared keywords and group specs
#[derive(Debug, Clone)]
pub struct FieldResolver {
    keywords: FieldKeywords,
    groups: Vec<FieldGroupSpec>,
    prefer_exact: bool,
}

impl FieldResolver {
    /// Create a resolver; exact keyword matches win over column order
    #[must_use]
    pub fn new(keywords: FieldKeywords, groups: Vec<FieldGroupSpec>) -> Self {
        Self {
            keywords,
            groups,
            prefer_exact: true,
        }
    }

    /// Whether an exact keyword match overrides the first match in column order
    #[must_use]
    pub fn with_exact_preference(mut self, prefer_exact: bool) -> Self {
        self.prefer_exact = prefer_exact;
        self
    }

    /// Resolve every declared field and group against the available columns
    #[must_use]
    pub fn resolve<S: AsRef<str>>(&self, field_names: &[S]) -> ResolvedFields {
        let mut fields = FxHashMap::default();

        for field in SemanticField::ALL {
            let resolution =
                resolve_field_with(field_names, self.keywords.keyword(field), self.prefer_exact);
            match &resolution {
                Resolution::NotFound => {
                    log::warn!("No column found for {field}");
                }
                Resolution::Ambiguous { chosen, candidates } => {
                    log::warn!(
                        "Column for {field} is ambiguous, using '{chosen}' out of {candidates:?}"
                    );
                }
                Resolution::Found { column } => {
                    log::debug!("Resolved {field} to column '{column}'");
                }
            }
            fields.insert(field, resolution);
        }

        let groups = self
            .groups
            .iter()
            .map(|spec| {
                let group = spec.resolve(field_names);
                if group.is_empty() {
                    log::warn!("No columns found for field group '{}'", spec.name);
                }
                group
            })
            .collect();

        ResolvedFields { fields, groups }
    }
}
