//! A Rust library for shaping student counselling rosters into dashboard tables:
//! normalizing raw rows, resolving columns by keyword, filtering, frequency counts over
//! fields and pooled field groups, and the district cross-tabulation.

pub mod algorithm;
pub mod async_io;
pub mod cache;
pub mod clean;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod filter;
pub mod models;
pub mod reader;
pub mod schema;
pub mod utils;

// Core types
pub use config::DashboardConfig;
pub use error::{Result, RosterError};
pub use models::{Roster, StudentRecord};
pub use schema::{SchemaCompatibilityReport, SchemaIssue};

// Arrow types
pub use arrow::record_batch::RecordBatch;

// Cleaning and column resolution
pub use clean::{Normalizer, normalize_value};
pub use schema::{FieldGroup, FieldGroupSpec, FieldResolver, Resolution, SemanticField};

// Filtering and aggregation
pub use algorithm::{
    CrossTab, CrossTabBuilder, FrequencyTable, GroupedFrequency, KpiSummary, PercentageBasis,
    RosterStatistics, count_by_group, count_field, count_values,
};
pub use filter::{FieldFilter, Selection, apply_filters, filter_options};

// Sources, caching and export
pub use cache::RosterCache;
pub use dashboard::{Dashboard, DashboardReport};
pub use export::{export_delimited, export_to_path};
pub use reader::{CsvSource, DirectorySource, MemorySource, ParquetSource, RosterSource, open_source};

// Async functionality
pub use async_io::{load_roster_dir_async, read_roster_async};
