use roster_stats::reader::{DirectorySource, RosterSource};
use roster_stats::{DashboardConfig, RosterError, load_roster_dir_async, read_roster_async};

use crate::utils::{write_file, write_typed_parquet};

/// Test async reading of a single CSV file
#[tokio::test]
async fn test_async_csv_read() -> roster_stats::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_file(dir.path(), "roster.csv", "District,Gender\nKurnool,Male\nnan,none\n");

    let roster = read_roster_async(&path, &DashboardConfig::default()).await?;
    assert_eq!(roster.num_rows(), 1);
    Ok(())
}

/// Test async streaming of a Parquet file
#[tokio::test]
async fn test_async_parquet_read() -> roster_stats::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("roster.parquet");
    write_typed_parquet(&path, &[("Kurnool", 10, "Male"), ("Kurnool", 12, "Female")])?;

    let roster = read_roster_async(&path, &DashboardConfig::default()).await?;
    assert_eq!(roster.num_rows(), 2);
    assert_eq!(roster.column("Class").unwrap().value(0), "10");
    Ok(())
}

/// Async directory loading merges files in name order like the blocking loader
#[tokio::test]
async fn test_async_directory_matches_blocking() -> roster_stats::Result<()> {
    let dir = tempfile::tempdir()?;
    for i in 0..6 {
        write_file(
            dir.path(),
            &format!("part_{i}.csv"),
            &format!("District,Class\nDistrict {i},10\nDistrict {i},12\n"),
        );
    }
    write_typed_parquet(&dir.path().join("part_9.parquet"), &[("District 9", 10, "Male")])?;

    let config = DashboardConfig::default();
    let async_roster = load_roster_dir_async(dir.path(), &config).await?;
    let blocking = DirectorySource::new(dir.path(), config).read_roster()?;

    assert_eq!(async_roster.num_rows(), 13);
    assert_eq!(async_roster.records(), blocking.records());
    Ok(())
}

#[tokio::test]
async fn test_async_missing_file_is_unavailable() {
    let err = read_roster_async(
        std::path::Path::new("/definitely/missing.csv"),
        &DashboardConfig::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, RosterError::SourceUnavailable(_)));
}
