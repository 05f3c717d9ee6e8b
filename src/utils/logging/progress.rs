//! Progress reporting utilities for long-running operations
//!
//! Multi-file roster loads report progress through the indicatif crate.

use indicatif::{ProgressBar, ProgressStyle};

/// Default style for a file progress bar
pub const DEFAULT_FILE_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} files {msg}";

/// Create a progress bar counting processed roster files
///
/// # Arguments
/// * `length` - Number of files to process
/// * `description` - Optional description to display as the initial message
///
/// # Returns
/// A configured `ProgressBar`
#[must_use]
pub fn create_file_progress_bar(length: u64, description: Option<&str>) -> ProgressBar {
    let pb = ProgressBar::new(length);
    let style = ProgressStyle::default_bar()
        .template(DEFAULT_FILE_TEMPLATE)
        .map_or_else(|_| ProgressStyle::default_bar(), |s| s.progress_chars("#>-"));
    pb.set_style(style);

    if let Some(desc) = description {
        pb.set_message(desc.to_string());
    }

    pb
}
