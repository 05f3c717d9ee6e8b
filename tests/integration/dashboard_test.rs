use roster_stats::config::{DashboardConfig, FieldKeywords};
use roster_stats::filter::{FieldFilter, Selection};
use roster_stats::reader::MemorySource;
use roster_stats::schema::Resolution;
use roster_stats::{Dashboard, Roster, RosterError, SemanticField, StudentRecord};

use crate::utils::sample_roster;

fn dashboard() -> Dashboard {
    Dashboard::new(sample_roster(), DashboardConfig::default()).expect("sample dashboard")
}

#[test]
fn headline_counts() {
    let report = dashboard().report(&[]).unwrap();
    assert_eq!(report.kpis.students, 6);
    assert_eq!(report.kpis.districts, Some(3));
    assert_eq!(report.kpis.schools, Some(4));
    assert_eq!(report.kpis.classes, Some(4));
}

#[test]
fn class_keyword_prefers_the_exact_column() {
    let dashboard = dashboard();
    let resolution = dashboard.resolved().resolution(SemanticField::Class).unwrap();
    assert_eq!(resolution.column(), Some("Class"));
    assert!(matches!(resolution, Resolution::Ambiguous { .. }));
    assert_eq!(
        dashboard.resolved().column(SemanticField::PreviousPercentage),
        Some("Previous Class Percentage")
    );
}

#[test]
fn every_section_is_computed_for_a_full_roster() {
    let report = dashboard().report(&[]).unwrap();

    let gender = report.gender.as_ref().unwrap();
    assert_eq!(gender.count_of("Female"), Some(3));
    assert_eq!(gender.count_of("Male"), Some(3));

    let by_district = report.district_gender.as_ref().unwrap();
    let anantapur = by_district.group("Anantapur").unwrap();
    assert_eq!(anantapur.percentage_of("Female"), Some(66.7));

    let subjects = report.subjects.as_ref().unwrap();
    assert_eq!(subjects.entries[0].value, "Math");
    assert_eq!(subjects.count_of("Math"), Some(4));

    let careers = report.career_paths.as_ref().unwrap();
    assert_eq!(careers.entries[0].value, "Engineer");
    assert_eq!(careers.count_of("Engineer"), Some(3));
    assert_eq!(careers.total, 7);

    assert!(report.interests.is_some());
    assert_eq!(report.entrance_exams.as_ref().unwrap().total, 4);
    assert_eq!(report.stream.as_ref().unwrap().count_of("MPC"), Some(3));

    let pct = report.previous_percentage.unwrap();
    assert_eq!(pct.count, 3);
    assert_eq!(pct.coerced_absent, 1);
    assert_eq!(pct.mean, 82.5);

    let cross_tab = report.cross_tab.as_ref().unwrap();
    assert_eq!(cross_tab.rows.len(), 3);
    assert_eq!(cross_tab.row("Kurnool").unwrap().total, 0);
    assert!(report.unavailable.is_empty());
}

#[test]
fn filters_recompute_every_section() {
    let dashboard = dashboard();
    let filter = dashboard
        .semantic_filter(SemanticField::District, Selection::parse("Chittoor"))
        .unwrap();
    let report = dashboard.report(&[filter]).unwrap();

    assert_eq!(report.kpis.students, 2);
    assert_eq!(report.kpis.districts, Some(1));
    assert_eq!(report.gender.as_ref().unwrap().percentage_of("Male"), Some(100.0));
    assert_eq!(report.cross_tab.as_ref().unwrap().rows.len(), 1);
    assert!(report.career_paths.is_some());
}

#[test]
fn filter_matching_nothing_omits_every_section() {
    let report = dashboard()
        .report(&[FieldFilter::equals("District", "Nellore")])
        .unwrap();

    assert_eq!(report.kpis.students, 0);
    assert!(report.gender.is_none());
    assert!(report.district_gender.is_none());
    assert!(report.class_counts.is_none());
    assert!(report.stream.is_none());
    assert!(report.subjects.is_none());
    assert!(report.previous_percentage.is_none());
    assert!(report.cross_tab.is_none());
    assert!(report.unavailable.is_empty());
}

#[test]
fn section_without_values_in_subset_is_omitted() {
    let roster = Roster::from_records(&[
        StudentRecord::new()
            .with("District", "Chittoor")
            .with("Gender", "Male")
            .with("Stream", "MPC"),
        StudentRecord::new().with("District", "Kurnool").with("Gender", "Female"),
    ])
    .unwrap();
    let dashboard = Dashboard::new(roster, DashboardConfig::default()).unwrap();
    let report = dashboard
        .report(&[FieldFilter::equals("District", "Kurnool")])
        .unwrap();

    assert_eq!(report.gender.as_ref().unwrap().count_of("Female"), Some(1));
    assert!(report.stream.is_none());
    assert!(!report.unavailable.iter().any(|s| s.starts_with("Stream")));
}

#[test]
fn unresolved_fields_are_listed() {
    let config = DashboardConfig {
        fields: FieldKeywords {
            stream: "faculty".to_string(),
            ..FieldKeywords::default()
        },
        ..DashboardConfig::default()
    };
    let dashboard = Dashboard::new(sample_roster(), config).unwrap();
    let report = dashboard.report(&[]).unwrap();

    assert!(report.stream.is_none());
    assert_eq!(report.unavailable.len(), 1);
    assert!(report.unavailable[0].starts_with("Stream distribution"));
}

#[test]
fn value_filter_on_unknown_column_fails() {
    let err = dashboard()
        .report(&[FieldFilter::equals("Mandal", "Adoni")])
        .unwrap_err();
    assert!(matches!(err, RosterError::MissingField { .. }));
}

#[test]
fn report_serializes_to_json() {
    let report = dashboard().report(&[]).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["kpis"]["students"], 6);
    assert_eq!(json["district_gender"]["basis"], "within_group");
    assert!(json["career_paths"]["entries"].is_array());
}

#[test]
fn dashboard_from_source_and_options() {
    let source = MemorySource::new(sample_roster());
    let dashboard = Dashboard::from_source(&source, DashboardConfig::default()).unwrap();

    let district = dashboard
        .semantic_filter(SemanticField::District, Selection::parse("Anantapur"))
        .unwrap();
    let schools = dashboard
        .options(SemanticField::School, &[district])
        .unwrap();
    assert_eq!(schools, ["All", "ZPHS Hindupur", "ZPHS Penukonda"]);

    let mut out = Vec::new();
    dashboard.export(&[], &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap().lines().count(), 7);
}
