//! Logging and progress reporting helpers

pub mod log;
pub mod progress;

pub use self::log::{
    log_batches_read, log_exported, log_files_found, log_read_start, log_roster_loaded,
};
pub use progress::create_file_progress_bar;
