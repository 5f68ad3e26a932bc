//! Shared test utilities and fixture generators

#![allow(dead_code)]

use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use hirefunnel::pipeline::{GroupKey, Stage};

/// Activity table with known characteristics
///
/// - candidates 1 and 7 have accepted offers recorded at an earlier stage
/// - candidate 3 uses the "In-house Interview" spelling variant
/// - candidate 5 lists an unrecognised degree ("MBA") next to a Bachelors
/// - candidate 6 has no degree at all
/// - years 2016, 2017 and 2018 are all present
pub fn create_activity_dataframe() -> DataFrame {
    df! {
        "Candidate ID Number" => [1i64, 2, 3, 4, 5, 6, 7, 8],
        "Education 1_Degree" => [Some("PhD"), Some("Bachelors"), Some("Masters"), Some("JD"), Some("Bachelors"), None, Some("PhD"), Some("Bachelors")],
        "Education 2_Degree" => [Some("Masters"), None, Some("Bachelors"), None, Some("MBA"), None, None, None],
        "Education 3_Degree" => [None::<&str>, None, None, None, None, None, None, None],
        "Department" => ["Eng", "Eng", "Eng", "Sales", "Sales", "Sales", "Eng", "Eng"],
        "Application Source" => ["Career Fair", "Campus Event", "Career Fair", "Website", "Campus Event", "Career Fair", "Referral", "Career Fair"],
        "Date of Application" => ["2016-03-01", "2016-05-10", "2017-01-15", "2017-02-20", "2017-06-30", "2018-04-04", "2018-07-07", "2018-09-09"],
        "Furthest Recruiting Stage Reached" => ["Offer Sent", "Phone Screen", "In-house Interview", "New Application", "Offer Sent", "In-House Interview", "Offer Sent", "New Application"],
    }
    .unwrap()
}

/// Offer responses; candidate 99 has no activity row
pub fn create_responses_dataframe() -> DataFrame {
    df! {
        "Candidate ID Number" => [1i64, 5, 7, 99],
        "Offer Decision" => ["Offer Accepted", "Offer Declined", "Offer Accepted", "Offer Declined"],
    }
    .unwrap()
}

/// Write a DataFrame as CSV into `dir`
pub fn write_csv(dir: &Path, name: &str, df: &mut DataFrame) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();
    path
}

/// Temporary directory holding `activity.csv` and `responses.csv`
pub fn create_temp_inputs() -> (TempDir, PathBuf, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let activity = write_csv(temp_dir.path(), "activity.csv", &mut create_activity_dataframe());
    let responses = write_csv(temp_dir.path(), "responses.csv", &mut create_responses_dataframe());
    (temp_dir, activity, responses)
}

/// Random (key, stage) observations over a handful of groups
pub fn random_observations(n: usize, seed: u64) -> Vec<(Option<GroupKey>, Stage)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let departments = ["Eng", "Sales", "Ops"];
    let degrees = ["PhD", "Masters/JD", "Bachelors"];

    (0..n)
        .map(|_| {
            let key = vec![
                departments[rng.gen_range(0..departments.len())].to_string(),
                degrees[rng.gen_range(0..degrees.len())].to_string(),
            ];
            let stage = Stage::ALL[rng.gen_range(0..Stage::ALL.len())];
            (Some(key), stage)
        })
        .collect()
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}
