use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rand::Rng;
use roster_stats::{Result, Roster, StudentRecord};

pub const DISTRICTS: [&str; 3] = ["Anantapur", "Chittoor", "Kurnool"];
pub const CLASSES: [&str; 4] = ["9", "10", "11", "12"];
pub const GENDERS: [&str; 2] = ["Male", "Female"];

/// A student with the four filterable fields set
#[must_use]
pub fn student(district: &str, school: &str, class: &str, gender: &str) -> StudentRecord {
    StudentRecord::new()
        .with("District", district)
        .with("School", school)
        .with("Class", class)
        .with("Gender", gender)
}

/// A small roster shaped like a counselling export, with pooled group columns
#[must_use]
pub fn sample_roster() -> Roster {
    let rows = [
        ("Anantapur", "ZPHS Hindupur", "10", "Male", "MPC", "Math", "Science", "Realistic", "Engineer", "Doctor", "JEE", "82"),
        ("Anantapur", "ZPHS Hindupur", "12", "Female", "BiPC", "Biology", "Math", "Investigative", "Doctor", "", "NEET", "91.5"),
        ("Anantapur", "ZPHS Penukonda", "10", "Female", "MPC", "Math", "Arts", "Artistic", "Designer", "Engineer", "nan", "n.a."),
        ("Chittoor", "GHS Puttur", "12", "Male", "CEC", "Commerce", "undefined", "Enterprising", "Accountant", "", "CA Foundation", "74"),
        ("Chittoor", "GHS Puttur", "11", "Male", "MPC", "Math", "Science", "Realistic", "Engineer", "", "JEE", ""),
        ("Kurnool", "KGBV Adoni", "9", "Female", "None", "", "", "", "", "", "", ""),
    ];

    let records: Vec<StudentRecord> = rows
        .iter()
        .map(|r| {
            student(r.0, r.1, r.2, r.3)
                .with("Stream", r.4)
                .with("Subject-1", r.5)
                .with("Subject-2", r.6)
                .with("CII-1", r.7)
                .with("Suggest Career Path-1", r.8)
                .with("Suggest Career Path-2", r.9)
                .with("Entrance Examination -1", r.10)
                .with("Previous Class Percentage", r.11)
        })
        .collect();

    Roster::from_records(&records).expect("sample roster should build")
}

/// A random roster over the fixed district, class and gender values
#[must_use]
pub fn random_roster(rows: usize) -> Roster {
    let mut rng = rand::rng();
    let records: Vec<StudentRecord> = (0..rows)
        .map(|i| {
            let district = pick(&mut rng, &DISTRICTS);
            let class = pick(&mut rng, &CLASSES);
            let gender = pick(&mut rng, &GENDERS);
            student(district, &format!("School {}", i % 5), class, gender)
        })
        .collect();
    Roster::from_records(&records).expect("random roster should build")
}

/// Write a text file into a directory and return its path
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write test file");
    path
}

/// Write a Parquet file with a numeric `Class` column and text `District` and `Gender`
pub fn write_typed_parquet(path: &Path, rows: &[(&str, i64, &str)]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("District", DataType::Utf8, true),
        Field::new("Class", DataType::Int64, true),
        Field::new("Gender", DataType::Utf8, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.0))),
        Arc::new(Int64Array::from_iter_values(rows.iter().map(|r| r.1))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.2))),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns)?;

    let mut writer = ArrowWriter::try_new(File::create(path)?, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

/// Print summary information about a roster
pub fn print_roster_summary(roster: &Roster) {
    println!(
        "Roster with {} rows and fields {:?}",
        roster.num_rows(),
        roster.field_names()
    );
}

/// Pick a random element of a slice
pub fn pick<'a>(rng: &mut impl Rng, values: &[&'a str]) -> &'a str {
    values[rng.random_range(0..values.len())]
}
