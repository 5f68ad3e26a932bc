//! End-to-end tests of the hirefunnel binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

#[path = "common/mod.rs"]
mod common;

fn hirefunnel() -> Command {
    Command::cargo_bin("hirefunnel").unwrap()
}

#[test]
fn test_full_run_writes_all_outputs() {
    let (_inputs, activity, responses) = common::create_temp_inputs();
    let out_dir = TempDir::new().unwrap();

    hirefunnel()
        .arg("-a")
        .arg(&activity)
        .arg("-r")
        .arg(&responses)
        .arg("-o")
        .arg(out_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Funnel analysis complete"));

    for name in [
        "activity_enriched.csv",
        "activity_department_funnel.txt",
        "activity_source_funnel.csv",
        "activity_year_comparison.json",
    ] {
        assert!(out_dir.path().join(name).exists(), "missing {}", name);
    }

    let page = std::fs::read_to_string(out_dir.path().join("activity_department_funnel.txt")).unwrap();
    assert!(page.contains("Recruiting Funnel by Department and Highest Degree"));
    assert!(page.contains("Offer Accepted"));

    let json = std::fs::read_to_string(out_dir.path().join("activity_year_comparison.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["comparisons"].as_array().unwrap().len(), 2);
}

#[test]
fn test_full_run_parquet_format() {
    let (_inputs, activity, responses) = common::create_temp_inputs();
    let out_dir = TempDir::new().unwrap();

    hirefunnel()
        .arg("-a")
        .arg(&activity)
        .arg("-r")
        .arg(&responses)
        .arg("-o")
        .arg(out_dir.path())
        .args(["--format", "parquet", "--measure", "percent"])
        .assert()
        .success();

    assert!(out_dir.path().join("activity_enriched.parquet").exists());
    assert!(out_dir.path().join("activity_source_funnel.parquet").exists());
}

#[test]
fn test_invalid_stage_fails_run() {
    let temp_dir = TempDir::new().unwrap();
    let mut activity = common::create_activity_dataframe();
    activity
        .with_column(polars::prelude::Column::new(
            "Furthest Recruiting Stage Reached".into(),
            [
                "Offer Sent",
                "Phone Screen",
                "Background Check",
                "New Application",
                "Offer Sent",
                "In-House Interview",
                "Offer Sent",
                "New Application",
            ],
        ))
        .unwrap();
    let activity = common::write_csv(temp_dir.path(), "activity.csv", &mut activity);
    let responses = common::write_csv(
        temp_dir.path(),
        "responses.csv",
        &mut common::create_responses_dataframe(),
    );

    hirefunnel()
        .arg("-a")
        .arg(&activity)
        .arg("-r")
        .arg(&responses)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid funnel stage"));
}

#[test]
fn test_missing_responses_argument() {
    let (_inputs, activity, _responses) = common::create_temp_inputs();

    hirefunnel()
        .arg("-a")
        .arg(&activity)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Offer response file is required"));
}

#[test]
fn test_funnel_and_compare_subcommands_on_enriched_output() {
    let (inputs, activity, responses) = common::create_temp_inputs();

    hirefunnel()
        .arg("-a")
        .arg(&activity)
        .arg("-r")
        .arg(&responses)
        .assert()
        .success();

    let enriched = inputs.path().join("activity_enriched.csv");
    assert!(enriched.exists());

    hirefunnel()
        .arg("funnel")
        .arg(&enriched)
        .args(["--group-by", "Department", "--conversion"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Funnel written"));
    assert!(inputs.path().join("activity_enriched_funnel.csv").exists());

    let json = inputs.path().join("compare.json");
    hirefunnel()
        .arg("compare")
        .arg(&enriched)
        .args(["--min-stage", "Phone Screen", "--json"])
        .arg(&json)
        .assert()
        .success()
        .stdout(predicate::str::contains("2016"));
    assert!(json.exists());
}

#[test]
fn test_funnel_subcommand_rejects_unknown_group_column() {
    let (inputs, activity, _responses) = common::create_temp_inputs();

    hirefunnel()
        .arg("funnel")
        .arg(&activity)
        .args(["--group-by", "Region"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("column 'Region' not found"));
    assert!(!inputs.path().join("activity_funnel.csv").exists());
}

#[test]
fn test_funnel_subcommand_default_grouping_follows_column_map() {
    let temp_dir = TempDir::new().unwrap();
    let mut activity = common::create_activity_dataframe();
    activity.rename("Application Source", "Channel".into()).unwrap();
    let activity = common::write_csv(temp_dir.path(), "activity.csv", &mut activity);

    let map = temp_dir.path().join("columns.json");
    std::fs::write(&map, r#"{"application_source": "Channel"}"#).unwrap();

    hirefunnel()
        .arg("funnel")
        .arg(&activity)
        .arg("--column-map")
        .arg(&map)
        .assert()
        .success();

    let out = std::fs::read_to_string(temp_dir.path().join("activity_funnel.csv")).unwrap();
    assert!(out.starts_with("Channel,Stage,Applicants"));
    assert!(out.contains("Career Fair"));
}
