//! Tests for CLI argument parsing

use clap::Parser;
use hirefunnel::cli::{funnel_output_path, Cli, Commands};
use hirefunnel::pipeline::{ContingencyMeasure, Stage};
use std::path::{Path, PathBuf};

#[test]
fn test_cli_default_values() {
    let cli = Cli::parse_from(["hirefunnel", "-a", "activity.csv", "-r", "responses.csv"]);

    assert_eq!(cli.comparison.min_stage, Stage::InHouseInterview);
    assert_eq!(cli.comparison.sources, vec!["Career Fair", "Campus Event"]);
    assert_eq!(cli.comparison.measure, ContingencyMeasure::Counts);
    assert_eq!(cli.format, "csv");
    assert_eq!(cli.common.infer_schema_length, 10000);
    assert_eq!(cli.common.log_level, "warn");
    assert!(cli.common.column_map.is_none());
}

#[test]
fn test_cli_custom_comparison() {
    let cli = Cli::parse_from([
        "hirefunnel",
        "-a",
        "activity.csv",
        "-r",
        "responses.csv",
        "--min-stage",
        "offer sent",
        "--sources",
        "Referral,Website",
        "--measure",
        "percent",
    ]);

    assert_eq!(cli.comparison.min_stage, Stage::OfferSent);
    assert_eq!(cli.comparison.sources, vec!["Referral", "Website"]);
    assert_eq!(cli.comparison.measure, ContingencyMeasure::Percent);
}

#[test]
fn test_cli_rejects_unknown_stage() {
    let result = Cli::try_parse_from([
        "hirefunnel",
        "-a",
        "activity.csv",
        "--min-stage",
        "Background Check",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_cli_rejects_unknown_format() {
    let result = Cli::try_parse_from(["hirefunnel", "-a", "activity.csv", "--format", "xlsx"]);
    assert!(result.is_err());
}

#[test]
fn test_cli_output_paths_derived_from_activity() {
    let cli = Cli::parse_from(["hirefunnel", "-a", "/data/activity.csv", "-r", "/data/resp.csv"]);

    assert_eq!(cli.output_dir().unwrap(), PathBuf::from("/data"));
    assert_eq!(
        cli.enriched_path().unwrap(),
        PathBuf::from("/data/activity_enriched.csv")
    );
    assert_eq!(
        cli.department_page_path().unwrap(),
        PathBuf::from("/data/activity_department_funnel.txt")
    );
    assert_eq!(
        cli.source_funnel_path().unwrap(),
        PathBuf::from("/data/activity_source_funnel.csv")
    );
    assert_eq!(
        cli.comparison_path().unwrap(),
        PathBuf::from("/data/activity_year_comparison.json")
    );
}

#[test]
fn test_cli_output_dir_and_parquet_format() {
    let cli = Cli::parse_from([
        "hirefunnel",
        "-a",
        "activity.csv",
        "-r",
        "responses.csv",
        "-o",
        "out",
        "--format",
        "parquet",
    ]);

    assert_eq!(
        cli.source_funnel_path().unwrap(),
        PathBuf::from("out/activity_source_funnel.parquet")
    );
}

#[test]
fn test_cli_relative_activity_uses_current_dir() {
    let cli = Cli::parse_from(["hirefunnel", "-a", "activity.csv"]);
    assert_eq!(cli.output_dir().unwrap(), PathBuf::from("."));
}

#[test]
fn test_funnel_subcommand() {
    let cli = Cli::parse_from([
        "hirefunnel",
        "funnel",
        "enriched.csv",
        "--group-by",
        "Department,Highest Degree",
        "--conversion",
    ]);

    match cli.command {
        Some(Commands::Funnel {
            input,
            group_by,
            output,
            conversion,
        }) => {
            assert_eq!(input, PathBuf::from("enriched.csv"));
            assert_eq!(
                group_by,
                Some(vec!["Department".to_string(), "Highest Degree".to_string()])
            );
            assert!(output.is_none());
            assert!(conversion);
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_funnel_subcommand_group_by_defaults_to_none() {
    let cli = Cli::parse_from(["hirefunnel", "funnel", "enriched.csv"]);
    match cli.command {
        Some(Commands::Funnel { group_by, .. }) => assert!(group_by.is_none()),
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_compare_subcommand_with_global_options() {
    let cli = Cli::parse_from([
        "hirefunnel",
        "compare",
        "enriched.parquet",
        "--json",
        "out.json",
        "--min-stage",
        "Offer Accepted",
        "--infer-schema-length",
        "0",
    ]);

    assert_eq!(cli.common.infer_schema_length, 0);
    match cli.command {
        Some(Commands::Compare {
            comparison, json, ..
        }) => {
            assert_eq!(comparison.min_stage, Stage::OfferAccepted);
            assert_eq!(json, Some(PathBuf::from("out.json")));
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_funnel_output_path_derivation() {
    assert_eq!(
        funnel_output_path(Path::new("/x/enriched.parquet"), None),
        PathBuf::from("/x/enriched_funnel.parquet")
    );
    assert_eq!(
        funnel_output_path(Path::new("/x/enriched.csv"), Some(Path::new("mine.csv"))),
        PathBuf::from("mine.csv")
    );
}
