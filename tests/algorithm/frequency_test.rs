use rand::Rng;
use roster_stats::algorithm::{
    FrequencyTable, PercentageBasis, count_by_group, count_field, count_values,
};
use roster_stats::filter::{FieldFilter, apply_filters};
use roster_stats::schema::FieldGroup;
use roster_stats::{Roster, StudentRecord};

use crate::utils::{pick, random_roster, sample_roster};

#[test]
fn gender_distribution_example() {
    let roster = Roster::from_records(&[
        StudentRecord::new().with("Gender", "Male"),
        StudentRecord::new().with("Gender", "Male"),
        StudentRecord::new().with("Gender", "Female"),
        StudentRecord::new().with("Gender", "nan").with("Class", "10"),
    ])
    .unwrap();

    let table = count_field(&roster, "Gender").with_percentages();
    assert_eq!(table.total, 3);
    assert_eq!(table.count_of("Male"), Some(2));
    assert_eq!(table.percentage_of("Male"), Some(66.7));
    assert_eq!(table.count_of("Female"), Some(1));
    assert_eq!(table.percentage_of("Female"), Some(33.3));
}

#[test]
fn pooling_counts_across_member_columns() {
    let roster = Roster::from_records(&[StudentRecord::new()
        .with("Subject-1", "Math")
        .with("Subject-2", "Math")])
    .unwrap();
    let roster_two = Roster::from_records(&[
        StudentRecord::new()
            .with("Subject-1", "Math")
            .with("Subject-2", "Math"),
        StudentRecord::new()
            .with("Subject-1", "Science")
            .with("Subject-2", "Arts"),
    ])
    .unwrap();
    let group = FieldGroup::new("Subjects", ["Subject-1", "Subject-2"]);

    assert_eq!(count_values(&roster, &group).count_of("Math"), Some(2));

    let table = count_values(&roster_two, &group);
    assert_eq!(table.total, 4);
    assert_eq!(table.count_of("Math"), Some(2));
    assert_eq!(table.count_of("Science"), Some(1));
    assert_eq!(table.count_of("Arts"), Some(1));
    // Science is seen before Arts: column by column, row by row
    let order: Vec<_> = table.entries.iter().map(|e| e.value.as_str()).collect();
    assert_eq!(order, ["Math", "Science", "Arts"]);
}

#[test]
fn pooled_group_with_missing_members_counts_what_exists() {
    let roster = sample_roster();
    let group = FieldGroup::new(
        "Subjects",
        ["Subject-1", "Subject-2", "Subject-3"],
    );
    let table = count_values(&roster, &group);
    assert_eq!(table.count_of("Math"), Some(4));
    assert_eq!(table.count_of("Science"), Some(2));
}

#[test]
fn top_ten_of_fifteen_breaks_ties_by_first_seen() {
    let first_seen = [
        "k", "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "l", "m", "n", "o",
    ];
    let extra = [
        ("a", 4), ("b", 3), ("c", 3), ("d", 2), ("e", 2), ("f", 2),
        ("g", 1), ("h", 1), ("i", 1), ("j", 1), ("k", 1),
    ];

    let mut values: Vec<&str> = first_seen.to_vec();
    for (value, times) in extra {
        values.extend(std::iter::repeat_n(value, times));
    }

    let table = FrequencyTable::from_values("Career", values.iter().copied())
        .top_n(10)
        .with_percentages();

    let kept: Vec<_> = table.entries.iter().map(|e| e.value.as_str()).collect();
    assert_eq!(kept, ["a", "b", "c", "d", "e", "f", "k", "g", "h", "i"]);
    assert_eq!(table.total, 36);
    assert_eq!(table.displayed_count(), 30);
    assert_eq!(table.percentage_of("a"), Some(13.9));
}

#[test]
fn two_way_percentages_sum_to_hundred() {
    let mut rng = rand::rng();
    for _ in 0..200 {
        let n = rng.random_range(1..300);
        let values: Vec<&str> = (0..n).map(|_| pick(&mut rng, &["Male", "Female"])).collect();
        let table = FrequencyTable::from_values("Gender", values).with_percentages();

        let sum: f64 = table.entries.iter().filter_map(|e| e.percentage).sum();
        assert!((sum - 100.0).abs() <= 0.1 + 1e-9, "sum was {sum}");
    }
}

#[test]
fn rounding_error_is_bounded_per_entry() {
    let mut rng = rand::rng();
    let alphabet = ["a", "b", "c", "d", "e", "f", "g"];
    for _ in 0..200 {
        let n = rng.random_range(1..500);
        let values: Vec<&str> = (0..n).map(|_| pick(&mut rng, &alphabet)).collect();
        let table = FrequencyTable::from_values("Letters", values).with_percentages();

        let sum: f64 = table.entries.iter().filter_map(|e| e.percentage).sum();
        #[allow(clippy::cast_precision_loss)]
        let bound = 0.05 * table.len() as f64 + 1e-9;
        assert!((sum - 100.0).abs() <= bound, "sum was {sum}");
    }
}

#[test]
fn filtered_out_roster_gives_empty_tables() {
    let roster = sample_roster();
    let none = apply_filters(&roster, &[FieldFilter::equals("District", "Nellore")]).unwrap();
    assert!(none.is_empty());

    let table = count_field(&none, "Gender").with_percentages();
    assert!(table.is_empty());
    assert_eq!(table.total, 0);

    let grouped = count_by_group(&none, "District", "Gender", PercentageBasis::WithinGroup).unwrap();
    assert!(grouped.is_empty());
    assert_eq!(grouped.total, 0);
}

#[test]
fn within_group_shares_sum_per_district() {
    let roster = random_roster(300);
    let grouped =
        count_by_group(&roster, "District", "Gender", PercentageBasis::WithinGroup).unwrap();

    assert_eq!(grouped.total, 300);
    for group in &grouped.groups {
        let sum: f64 = group.table.entries.iter().filter_map(|e| e.percentage).sum();
        assert!((sum - 100.0).abs() <= 0.1 + 1e-9, "{} summed to {sum}", group.key);
    }

    let batch = grouped.to_record_batch().unwrap();
    assert_eq!(batch.num_rows(), grouped.rows().len());
}

#[test]
fn grand_total_basis_shares_the_whole_table() {
    let roster = Roster::from_records(&[
        StudentRecord::new().with("District", "A").with("Gender", "Male"),
        StudentRecord::new().with("District", "A").with("Gender", "Female"),
        StudentRecord::new().with("District", "B").with("Gender", "Male"),
        StudentRecord::new().with("District", "B").with("Gender", "Male"),
    ])
    .unwrap();

    let grand = count_by_group(&roster, "District", "Gender", PercentageBasis::GrandTotal).unwrap();
    assert_eq!(grand.group("B").unwrap().percentage_of("Male"), Some(50.0));

    let within = count_by_group(&roster, "District", "Gender", PercentageBasis::WithinGroup).unwrap();
    assert_eq!(within.group("B").unwrap().percentage_of("Male"), Some(100.0));
}

#[test]
fn percentages_round_exact_ties_up() {
    let values = std::iter::repeat_n("A", 23).chain(std::iter::repeat_n("B", 57));
    let table = FrequencyTable::from_values("Stream", values).with_percentages();
    assert_eq!(table.total, 80);
    assert_eq!(table.percentage_of("A"), Some(28.8));
    assert_eq!(table.percentage_of("B"), Some(71.3));
}
