//! Error handling for roster loading and aggregation.

use std::io;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

/// Specialized error type for roster operations
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    /// The roster source produced no rows or could not be reached
    #[error("Roster source unavailable: {0}")]
    SourceUnavailable(String),

    /// A semantically required field could not be resolved to a column
    #[error("Field unavailable: {field}")]
    MissingField {
        /// Semantic name or column name of the missing field
        field: String,
    },

    /// Error opening or reading a file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error processing Arrow data (including CSV reading and writing)
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Error processing Parquet data
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// Error converting derived tables to record batches
    #[error("Serde arrow error: {0}")]
    SerdeArrow(#[from] serde_arrow::Error),

    /// Error reading or writing JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error applying a filter
    #[error("Filter error: {0}")]
    Filter(String),
}

impl RosterError {
    /// Create a missing-field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create a source-unavailable error
    pub fn source_unavailable(message: impl Into<String>) -> Self {
        Self::SourceUnavailable(message.into())
    }

    /// Whether the error only affects a single dashboard section
    #[must_use]
    pub const fn is_missing_field(&self) -> bool {
        matches!(self, Self::MissingField { .. })
    }
}

/// Result type for roster operations
pub type Result<T> = std::result::Result<T, RosterError>;
