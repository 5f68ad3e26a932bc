//! Command-line argument definitions using clap

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::pipeline::{ContingencyMeasure, Stage};

/// hirefunnel - Recruiting funnel analytics from activity and offer response data
#[derive(Parser, Debug)]
#[command(name = "hirefunnel")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Recruiting activity file (CSV or Parquet), one row per candidate
    #[arg(short, long)]
    pub activity: Option<PathBuf>,

    /// Offer response file (CSV or Parquet), joined on the candidate ID
    #[arg(short, long)]
    pub responses: Option<PathBuf>,

    /// Directory for output files.
    /// Defaults to the directory of the activity file.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Format of tabular outputs: "csv" or "parquet"
    #[arg(long, default_value = "csv", value_parser = validate_format)]
    pub format: String,

    #[command(flatten)]
    pub comparison: ComparisonArgs,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Options shared by every command
#[derive(clap::Args, Debug, Clone)]
pub struct CommonArgs {
    /// JSON file overriding input column names (any subset of the defaults)
    #[arg(long, global = true)]
    pub column_map: Option<PathBuf>,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan.
    #[arg(long, default_value = "10000", global = true)]
    pub infer_schema_length: usize,

    /// Diagnostic log level written to stderr (overridden by RUST_LOG)
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,
}

/// Options of the year-over-year source comparison
#[derive(clap::Args, Debug, Clone)]
pub struct ComparisonArgs {
    /// Stage a candidate must have reached to count in the comparison
    #[arg(long, default_value = "In-House Interview", value_parser = parse_stage)]
    pub min_stage: Stage,

    /// Application sources to compare (comma-separated)
    #[arg(long, value_delimiter = ',', default_values = ["Career Fair", "Campus Event"])]
    pub sources: Vec<String>,

    /// Contingency table values: "counts" (reached candidates) or "percent"
    /// (reached share of all applicants that year)
    #[arg(long, default_value = "counts", value_parser = parse_measure)]
    pub measure: ContingencyMeasure,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a funnel from an enriched candidate file, grouped by any columns
    Funnel {
        /// Enriched candidate file (CSV or Parquet)
        input: PathBuf,

        /// Grouping columns (comma-separated).
        /// Defaults to the application source column of the column map.
        #[arg(short, long, value_delimiter = ',')]
        group_by: Option<Vec<String>>,

        /// Output file (CSV or Parquet, by extension).
        /// Defaults to the input directory with a '_funnel' suffix.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Include the stage-over-stage conversion column
        #[arg(long, default_value = "false")]
        conversion: bool,
    },

    /// Compare stage reach rates across adjacent application years
    Compare {
        /// Enriched candidate file (CSV or Parquet)
        input: PathBuf,

        #[command(flatten)]
        comparison: ComparisonArgs,

        /// Also write the results to this JSON file
        #[arg(long)]
        json: Option<PathBuf>,
    },
}

impl Cli {
    /// Output directory, defaulting to the directory of the activity file
    pub fn output_dir(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.output_dir {
            return Some(dir.clone());
        }
        let activity = self.activity.as_ref()?;
        Some(
            activity
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."))
                .to_path_buf(),
        )
    }

    /// Enriched candidate table, e.g. `activity_enriched.csv`
    pub fn enriched_path(&self) -> Option<PathBuf> {
        self.derived_path("enriched", &self.format)
    }

    /// Printable department x degree funnel page
    pub fn department_page_path(&self) -> Option<PathBuf> {
        self.derived_path("department_funnel", "txt")
    }

    /// Application-source funnel table
    pub fn source_funnel_path(&self) -> Option<PathBuf> {
        self.derived_path("source_funnel", &self.format)
    }

    /// Year-over-year comparison JSON export
    pub fn comparison_path(&self) -> Option<PathBuf> {
        self.derived_path("year_comparison", "json")
    }

    fn derived_path(&self, suffix: &str, extension: &str) -> Option<PathBuf> {
        let stem = self.activity.as_ref()?.file_stem()?.to_str()?;
        Some(
            self.output_dir()?
                .join(format!("{}_{}.{}", stem, suffix, extension)),
        )
    }
}

/// Default output path of the `funnel` subcommand
pub fn funnel_output_path(input: &Path, output: Option<&Path>) -> PathBuf {
    match output {
        Some(path) => path.to_path_buf(),
        None => {
            let parent = input.parent().unwrap_or_else(|| Path::new("."));
            let stem = input
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("output");
            let extension = input
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("csv");
            parent.join(format!("{}_funnel.{}", stem, extension))
        }
    }
}

/// Validator for the output format
fn validate_format(s: &str) -> Result<String, String> {
    let value = s.to_lowercase();
    match value.as_str() {
        "csv" | "parquet" => Ok(value),
        _ => Err(format!("format must be 'csv' or 'parquet', got '{}'", s)),
    }
}

/// Parser for stage arguments
fn parse_stage(s: &str) -> Result<Stage, String> {
    s.parse::<Stage>().map_err(|e| e.to_string())
}

/// Parser for the contingency measure
fn parse_measure(s: &str) -> Result<ContingencyMeasure, String> {
    s.parse()
}
