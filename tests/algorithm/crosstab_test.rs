use roster_stats::algorithm::CrossTabBuilder;
use roster_stats::config::CrossTabConfig;
use roster_stats::filter::{FieldFilter, apply_filters};
use roster_stats::{Roster, StudentRecord};

use crate::utils::{random_roster, student};

fn builder() -> CrossTabBuilder {
    CrossTabBuilder::from_config(&CrossTabConfig::default())
}

#[test]
fn row_total_is_sum_of_its_cells() {
    let roster = random_roster(400);
    let table = builder().build(&roster, "District", "Class", "Gender").unwrap();

    for row in &table.rows {
        let cells: u64 = row.cells.iter().map(|c| c.count).sum();
        assert_eq!(row.total, cells, "district {}", row.district);
        assert_eq!(row.cells.len(), 4);
    }
}

#[test]
fn totals_match_the_target_students() {
    let roster = random_roster(400);
    let targets = apply_filters(&roster, &[FieldFilter::equals("Class", "10")])
        .unwrap()
        .num_rows()
        + apply_filters(&roster, &[FieldFilter::equals("Class", "12")])
            .unwrap()
            .num_rows();

    let table = builder().build(&roster, "District", "Class", "Gender").unwrap();
    assert_eq!(table.grand_total().total, targets as u64);
}

#[test]
fn every_district_appears_even_without_targets() {
    let roster = Roster::from_records(&[
        student("Anantapur", "S1", "10", "Male"),
        student("Kurnool", "S2", "9", "Female"),
        student("Chittoor", "S3", "12", "Other"),
    ])
    .unwrap();

    let table = builder().build(&roster, "District", "Class", "Gender").unwrap();
    assert_eq!(table.rows.len(), 3);

    let kurnool = table.row("Kurnool").unwrap();
    assert_eq!(kurnool.total, 0);
    assert_eq!(kurnool.percentage("10", "Male"), Some(0.0));

    let chittoor = table.row("Chittoor").unwrap();
    assert_eq!(chittoor.total, 0);

    let anantapur = table.row("Anantapur").unwrap();
    assert_eq!(anantapur.percentage("10", "Male"), Some(100.0));
}

#[test]
fn rows_without_district_are_left_out() {
    let roster = Roster::from_records(&[
        StudentRecord::new().with("Class", "10").with("Gender", "Male"),
        student("Anantapur", "S1", "12", "Female"),
    ])
    .unwrap();

    let table = builder().build(&roster, "District", "Class", "Gender").unwrap();
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.grand_total().total, 1);
}
