//! Async roster loading
//!
//! Tokio counterparts of the synchronous sources. Parquet files are streamed with the
//! async Arrow reader; CSV files are parsed on the blocking pool.

pub mod batch_ops;
pub mod file_ops;
pub mod loader;

pub use batch_ops::{read_csv_async, read_file_batches_async, read_parquet_async};
pub use file_ops::find_roster_files_async;
pub use loader::{load_roster_dir_async, read_roster_async};
