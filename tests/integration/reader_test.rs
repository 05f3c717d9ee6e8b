use arrow::array::Array;
use roster_stats::reader::{CsvSource, DirectorySource, ParquetSource, RosterSource, open_source};
use roster_stats::utils::find_roster_files;
use roster_stats::{DashboardConfig, RosterError};

use crate::utils::{print_roster_summary, write_file, write_typed_parquet};

#[test]
fn csv_source_normalizes_values_and_tolerates_short_rows() -> roster_stats::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_file(
        dir.path(),
        "roster.csv",
        "District,School,Class,Gender,Stream\n\
         Kurnool , KGBV Adoni,10,Female,MPC\n\
         Chittoor,GHS Puttur,12,undefined,NaN\n\
         Kurnool,KGBV Adoni,9\n\
         ,,,,\n",
    );

    let roster = CsvSource::new(&path).read_roster()?;
    print_roster_summary(&roster);

    assert_eq!(roster.num_rows(), 3);
    assert_eq!(roster.column("District").unwrap().value(0), "Kurnool");
    assert!(roster.column("Gender").unwrap().is_null(1));
    assert!(roster.column("Stream").unwrap().is_null(1));
    assert!(roster.column("Gender").unwrap().is_null(2));
    Ok(())
}

#[test]
fn parquet_columns_are_read_as_text() -> roster_stats::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("roster.parquet");
    write_typed_parquet(&path, &[("Kurnool", 10, "Male"), ("Chittoor", 12, "Female")])?;

    let roster = ParquetSource::new(&path).read_roster()?;
    assert_eq!(roster.num_rows(), 2);
    assert_eq!(roster.column("Class").unwrap().value(1), "12");
    Ok(())
}

#[test]
fn directory_merges_heterogeneous_files() -> roster_stats::Result<()> {
    let dir = tempfile::tempdir()?;
    write_file(
        dir.path(),
        "a_roster.csv",
        "District,Gender,Stream\nAnantapur,Male,MPC\n",
    );
    write_typed_parquet(
        &dir.path().join("b_roster.parquet"),
        &[("Kurnool", 10, "Female")],
    )?;
    write_file(dir.path(), "notes.txt", "not a roster");

    assert_eq!(find_roster_files(dir.path())?.len(), 2);

    let roster = DirectorySource::new(dir.path(), DashboardConfig::default()).read_roster()?;
    assert_eq!(roster.num_rows(), 2);
    assert_eq!(roster.field_names(), ["District", "Gender", "Stream", "Class"]);

    let first = roster.record(0).unwrap();
    assert_eq!(first.get("Class"), None);
    let second = roster.record(1).unwrap();
    assert_eq!(second.get("Class"), Some("10"));
    assert_eq!(second.get("Stream"), None);
    Ok(())
}

#[test]
fn open_source_dispatches_on_path() -> roster_stats::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = DashboardConfig::default();
    let csv = write_file(dir.path(), "r.csv", "Gender\nMale\n");
    let txt = write_file(dir.path(), "r.txt", "Gender\nMale\n");

    assert!(open_source(&csv, &config)?.describe().starts_with("CSV file"));
    assert!(open_source(dir.path(), &config)?.describe().starts_with("directory"));
    assert!(matches!(
        open_source(&txt, &config).err(),
        Some(RosterError::SourceUnavailable(_))
    ));
    Ok(())
}

#[test]
fn configured_delimiter_is_used() -> roster_stats::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_file(dir.path(), "r.csv", "District;Gender\nKurnool;Male\n");
    let config = DashboardConfig {
        delimiter: ';',
        ..DashboardConfig::default()
    };

    let roster = open_source(&path, &config)?.read_roster()?;
    assert_eq!(roster.field_names(), ["District", "Gender"]);
    Ok(())
}
