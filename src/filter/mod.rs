//! Filtering capabilities for rosters
//!
//! Filters compute a boolean mask over the roster batch and keep the matching rows
//! with Arrow's `filter` kernel, so the result is always a subset in original order.

pub mod core;
pub mod selection;

pub use self::core::{AndFilter, BatchFilter, IncludeAllFilter, filter_record_batch};
pub use selection::{ALL_LABEL, FieldFilter, Selection, apply_filters, filter_options};
