//! Configuration for roster loading and dashboard aggregation.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clean::Normalizer;
use crate::error::{Result, RosterError};
use crate::schema::resolver::{FieldGroupSpec, FieldResolver, SemanticField};

/// Default time-to-live of a cached roster, in seconds
pub const DEFAULT_CACHE_TTL_SECS: u64 = 60;

/// Default number of entries kept in ranked tables
pub const DEFAULT_TOP_N: usize = 10;

/// Keyword used to resolve each semantic field to a column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldKeywords {
    pub district: String,
    pub school: String,
    pub class: String,
    pub gender: String,
    pub stream: String,
    pub previous_percentage: String,
}

impl Default for FieldKeywords {
    fn default() -> Self {
        Self {
            district: "district".to_string(),
            school: "school".to_string(),
            class: "class".to_string(),
            gender: "gender".to_string(),
            stream: "stream".to_string(),
            previous_percentage: "percentage".to_string(),
        }
    }
}

impl FieldKeywords {
    /// The keyword declared for a semantic field
    #[must_use]
    pub fn keyword(&self, field: SemanticField) -> &str {
        match field {
            SemanticField::District => &self.district,
            SemanticField::School => &self.school,
            SemanticField::Class => &self.class,
            SemanticField::Gender => &self.gender,
            SemanticField::Stream => &self.stream,
            SemanticField::PreviousPercentage => &self.previous_percentage,
        }
    }
}

/// Field groups pooled when counting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldGroupSpecs {
    pub subjects: FieldGroupSpec,
    pub interests: FieldGroupSpec,
    pub career_paths: FieldGroupSpec,
    pub entrance_exams: FieldGroupSpec,
}

impl Default for FieldGroupSpecs {
    fn default() -> Self {
        Self {
            subjects: FieldGroupSpec::new("Subjects", "subject"),
            interests: FieldGroupSpec::new("Career Interest", "cii"),
            career_paths: FieldGroupSpec::new("Suggested Career Path", "career path"),
            entrance_exams: FieldGroupSpec::new("Entrance Examination", "entrance"),
        }
    }
}

impl FieldGroupSpecs {
    /// Every group in declaration order
    #[must_use]
    pub fn all(&self) -> Vec<FieldGroupSpec> {
        vec![
            self.subjects.clone(),
            self.interests.clone(),
            self.career_paths.clone(),
            self.entrance_exams.clone(),
        ]
    }
}

/// Target classes and genders of the district cross-tabulation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossTabConfig {
    pub classes: Vec<String>,
    pub genders: Vec<String>,
}

impl Default for CrossTabConfig {
    fn default() -> Self {
        Self {
            classes: vec!["10".to_string(), "12".to_string()],
            genders: vec!["Male".to_string(), "Female".to_string()],
        }
    }
}

/// Configuration for the roster dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Keywords resolving semantic fields to columns
    pub fields: FieldKeywords,
    /// Pooled field groups
    pub groups: FieldGroupSpecs,
    /// Cross-tabulation targets
    pub cross_tab: CrossTabConfig,
    /// Number of entries kept in the career path ranking
    pub top_n: usize,
    /// Tokens treated as missing in addition to the empty string
    pub missing_markers: Vec<String>,
    /// Seconds a fetched roster stays valid
    pub cache_ttl_secs: u64,
    /// Delimiter of CSV sources
    pub delimiter: char,
    /// Delimiter of exports; falls back to `delimiter` when unset
    pub export_delimiter: Option<char>,
    /// Let a column named exactly like a keyword win over earlier partial matches
    pub prefer_exact_match: bool,
    /// Rows per record batch when reading sources
    pub batch_size: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            fields: FieldKeywords::default(),
            groups: FieldGroupSpecs::default(),
            cross_tab: CrossTabConfig::default(),
            top_n: DEFAULT_TOP_N,
            missing_markers: crate::clean::DEFAULT_MISSING_MARKERS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            delimiter: ',',
            export_delimiter: None,
            prefer_exact_match: true,
            batch_size: crate::utils::DEFAULT_BATCH_SIZE,
        }
    }
}

impl DashboardConfig {
    /// Load a configuration from a JSON file, then apply environment overrides
    ///
    /// Fields absent from the file keep their defaults.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or is not valid JSON
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.with_env_overrides().validated()
    }

    /// Apply `ROSTER_CACHE_TTL_SECS` and `ROSTER_BATCH_SIZE` when set and parseable
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(ttl) = env_u64("ROSTER_CACHE_TTL_SECS") {
            self.cache_ttl_secs = ttl;
        }
        if let Some(batch_size) = crate::utils::get_batch_size() {
            self.batch_size = batch_size;
        }
        self
    }

    /// Check the configuration for values no loader can work with
    ///
    /// # Errors
    /// Returns `RosterError::Config` describing the first invalid value
    pub fn validated(self) -> Result<Self> {
        if self.batch_size == 0 {
            return Err(RosterError::Config("batch_size must be positive".to_string()));
        }
        for delimiter in std::iter::once(self.delimiter).chain(self.export_delimiter) {
            if !delimiter.is_ascii() {
                return Err(RosterError::Config(format!(
                    "delimiter must be a single ASCII character, got '{delimiter}'"
                )));
            }
        }
        if self.cross_tab.classes.is_empty() || self.cross_tab.genders.is_empty() {
            return Err(RosterError::Config(
                "cross_tab needs at least one class and one gender".to_string(),
            ));
        }
        Ok(self)
    }

    /// Cache time-to-live as a duration
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Resolver for the configured field keywords and groups
    #[must_use]
    pub fn resolver(&self) -> FieldResolver {
        FieldResolver::new(self.fields.clone(), self.groups.all())
            .with_exact_preference(self.prefer_exact_match)
    }

    /// Normalizer recognizing the configured missing markers
    #[must_use]
    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new(&self.missing_markers)
    }

    /// Source delimiter as a byte for the Arrow CSV reader
    #[must_use]
    pub fn delimiter_byte(&self) -> u8 {
        u8::try_from(self.delimiter).unwrap_or(b',')
    }

    /// Export delimiter as a byte for the Arrow CSV writer
    #[must_use]
    pub fn export_delimiter_byte(&self) -> u8 {
        self.export_delimiter
            .and_then(|d| u8::try_from(d).ok())
            .unwrap_or_else(|| self.delimiter_byte())
    }
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|s| s.parse::<u64>().ok())
}
