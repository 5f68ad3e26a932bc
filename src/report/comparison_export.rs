//! Year-over-year comparison output: console listing and JSON export

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Table};
use console::style;
use serde::Serialize;

use crate::pipeline::{ContingencyMeasure, ReachTable, YearComparison};

/// Metadata about the comparison run
#[derive(Serialize)]
pub struct ComparisonMetadata {
    /// Timestamp of the analysis (ISO 8601 format)
    pub timestamp: String,
    pub hirefunnel_version: String,
    pub input_file: String,
    /// Threshold stage a candidate must have reached
    pub min_stage: String,
    pub sources: Vec<String>,
    pub measure: ContingencyMeasure,
}

/// Complete comparison export
#[derive(Serialize)]
pub struct ComparisonExport<'a> {
    pub metadata: ComparisonMetadata,
    pub reach_table: &'a ReachTable,
    pub comparisons: &'a [YearComparison],
}

/// Export the reach table and adjacent-year tests to a JSON file
pub fn export_comparisons(
    table: &ReachTable,
    comparisons: &[YearComparison],
    measure: ContingencyMeasure,
    input_file: &str,
    output_path: &Path,
) -> Result<()> {
    let export = ComparisonExport {
        metadata: ComparisonMetadata {
            timestamp: Utc::now().to_rfc3339(),
            hirefunnel_version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: input_file.to_string(),
            min_stage: table.min_stage.to_string(),
            sources: table.sources.clone(),
            measure,
        },
        reach_table: table,
        comparisons,
    };

    let json = serde_json::to_string_pretty(&export)
        .context("Failed to serialize year comparison to JSON")?;

    std::fs::write(output_path, json).with_context(|| {
        format!("Failed to write year comparison to {}", output_path.display())
    })?;

    Ok(())
}

/// Table of reach counts and rates per year and source
pub fn render_reach_table(table: &ReachTable) -> Table {
    let mut out = Table::new();
    out.load_preset(UTF8_FULL_CONDENSED);

    let mut header = vec![
        Cell::new("Year").add_attribute(Attribute::Bold),
        Cell::new("Applicants").add_attribute(Attribute::Bold),
    ];
    for source in &table.sources {
        header.push(Cell::new(source).add_attribute(Attribute::Bold));
    }
    out.set_header(header);

    for row in &table.rows {
        let mut cells = vec![
            Cell::new(row.year),
            Cell::new(row.total).set_alignment(CellAlignment::Right),
        ];
        for (i, count) in row.reached.iter().enumerate() {
            cells.push(
                Cell::new(format!("{} ({:.1}%)", count, row.rate(i)))
                    .set_alignment(CellAlignment::Right),
            );
        }
        out.add_row(cells);
    }

    out
}

/// Print each adjacent-year test: statistic, p-value, dof and expected frequencies
pub fn print_comparisons(table: &ReachTable, comparisons: &[YearComparison]) {
    println!(
        "\n    {} Reached {} or beyond",
        style("✧").cyan(),
        style(table.min_stage).bold()
    );
    for line in render_reach_table(table).to_string().lines() {
        println!("    {}", line);
    }

    if comparisons.is_empty() {
        println!(
            "\n    {}",
            style("Fewer than two application years - nothing to compare").dim()
        );
        return;
    }

    for comparison in comparisons {
        let test = &comparison.test;
        println!();
        println!(
            "    {} {} vs {}",
            style("Chi-squared test").white().bold(),
            style(comparison.from_year).yellow(),
            style(comparison.to_year).yellow()
        );
        println!("      Chi2 statistic:     {:.6}", test.statistic);
        println!("      P-value:            {:.6}", test.p_value);
        println!("      Degrees of freedom: {}", test.degrees_of_freedom);
        println!("      Expected frequencies:");
        for row in &test.expected {
            let values: Vec<String> = row.iter().map(|v| format!("{:>10.4}", v)).collect();
            println!("        [{}]", values.join(" "));
        }
    }
}
