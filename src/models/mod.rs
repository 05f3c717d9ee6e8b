//! Roster data model
//!
//! A `Roster` owns one record batch of nullable text columns; `StudentRecord` is the
//! row-wise view used when building rosters by hand and when exporting rows.

pub mod record;
pub mod roster;

pub use record::StudentRecord;
pub use roster::Roster;
