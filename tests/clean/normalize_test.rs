use rand::Rng;
use roster_stats::clean::{Normalizer, drop_empty_rows, normalize_value};
use roster_stats::{Roster, StudentRecord};

use crate::utils::{pick, sample_roster};

const FRAGMENTS: [&str; 10] = [
    "", " ", "nan", "NaN", "None", "UNDEFINED", "Math", " Science ", "nancy", "\t12\n",
];

#[test]
fn missing_markers_in_any_case_become_absent() {
    for raw in ["", "   ", "nan", "NAN", " None ", "undefined", "Undefined"] {
        assert_eq!(normalize_value(raw), None, "{raw:?} should be absent");
    }
    assert_eq!(normalize_value("  Chittoor "), Some("Chittoor".to_string()));
    assert_eq!(normalize_value("nancy"), Some("nancy".to_string()));
}

#[test]
fn normalizing_twice_changes_nothing() {
    let mut rng = rand::rng();
    let normalizer = Normalizer::default();

    for _ in 0..500 {
        let raw: String = (0..rng.random_range(1..4))
            .map(|_| pick(&mut rng, &FRAGMENTS))
            .collect();

        let once = normalizer.normalize_value(&raw);
        let twice = once.as_deref().and_then(|v| normalizer.normalize_value(v));
        assert_eq!(once, twice, "normalizing {raw:?} is not idempotent");
    }
}

#[test]
fn normalizing_a_roster_batch_again_is_identity() {
    let roster = sample_roster();
    let again = Normalizer::default().normalize_batch(roster.batch()).unwrap();
    assert_eq!(&again, roster.batch());
}

#[test]
fn custom_markers_extend_the_defaults() {
    let normalizer = Normalizer::new(["nan", "none", "undefined", "n/a"]);
    assert_eq!(normalizer.normalize_value("N/A"), None);
    assert_eq!(normalizer.normalize_value("NA"), Some("NA".to_string()));
}

#[test]
fn rows_without_values_are_dropped() {
    let roster = Roster::from_records(&[
        StudentRecord::new().with("District", "nan").with("Gender", " "),
        StudentRecord::new().with("District", "Kurnool").with("Gender", "none"),
    ])
    .unwrap();

    assert_eq!(roster.num_rows(), 1);
    let cleaned = drop_empty_rows(roster.batch()).unwrap();
    assert_eq!(cleaned.num_rows(), 1);
}
