//! `compare` subcommand: year-over-year reach comparison of an enriched file

use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use tracing::info;

use crate::cli::ComparisonArgs;
use crate::pipeline::{
    compare_adjacent_years, ensure_columns, extract_candidates, load_dataset, reached_rate_table,
    ColumnMap,
};
use crate::report::{export_comparisons, print_comparisons};
use crate::utils::{create_spinner, finish_with_success};

/// Run the adjacent-year comparison and print (and optionally export) it
pub fn run_compare(
    input: &Path,
    args: &ComparisonArgs,
    json: Option<&Path>,
    columns: &ColumnMap,
    infer_schema_length: usize,
) -> Result<()> {
    println!(
        "\n {} Comparing {} across application years",
        style("◆").cyan().bold(),
        style(args.sources.join(", ")).bold()
    );
    println!("   Input:  {}", style(input.display()).dim());

    ensure_columns(
        input,
        &[columns.candidate_id.as_str(), columns.furthest_stage.as_str()],
        infer_schema_length,
    )?;

    let spinner = create_spinner("Loading candidates...");
    let df = load_dataset(input, infer_schema_length)?
        .collect()
        .with_context(|| format!("Failed to read dataset: {}", input.display()))?;
    let (records, _) = extract_candidates(&df, columns)?;
    finish_with_success(&spinner, &format!("Loaded {} candidates", records.len()));

    let table = reached_rate_table(&records, args.min_stage, &args.sources);
    if table.skipped > 0 {
        info!(skipped = table.skipped, "candidates without application year");
    }
    let comparisons = compare_adjacent_years(&table, args.measure)?;

    print_comparisons(&table, &comparisons);

    if let Some(path) = json {
        export_comparisons(
            &table,
            &comparisons,
            args.measure,
            &input.display().to_string(),
            path,
        )?;
        println!("\n {} Results written to {}", style("✓").green().bold(), path.display());
    }

    Ok(())
}
