//! `funnel` subcommand: funnel of an enriched file grouped by any columns

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use crate::pipeline::{
    ensure_columns, extract_candidates, funnel_by_columns, load_dataset, save_dataset, ColumnMap,
    FunnelLayout,
};
use crate::report::render_funnel_table;
use crate::utils::{create_spinner, finish_with_success};

/// Build and save a funnel grouped by `group_by`.
///
/// Stages are re-normalized on load, so raw joined files work as well as
/// enriched ones.
pub fn run_funnel(
    input: &Path,
    group_by: &[String],
    output: &Path,
    conversion: bool,
    columns: &ColumnMap,
    infer_schema_length: usize,
) -> Result<()> {
    println!(
        "\n {} Building funnel by {}",
        style("◆").cyan().bold(),
        style(group_by.join(" / ")).bold()
    );
    println!("   Input:  {}", style(input.display()).dim());
    println!("   Output: {}", style(output.display()).dim());
    println!();

    let by: Vec<&str> = group_by.iter().map(String::as_str).collect();
    let mut required = vec![columns.candidate_id.as_str(), columns.furthest_stage.as_str()];
    required.extend(&by);
    ensure_columns(input, &required, infer_schema_length)?;

    let spinner = create_spinner("Loading candidates...");
    let df = load_dataset(input, infer_schema_length)?
        .collect()
        .with_context(|| format!("Failed to read dataset: {}", input.display()))?;
    let (records, _) = extract_candidates(&df, columns)?;
    finish_with_success(&spinner, &format!("Loaded {} candidates", records.len()));

    let stages: Vec<_> = records.iter().map(|r| r.stage).collect();
    let funnel = funnel_by_columns(&df, &stages, &by)?;

    let mut layout = FunnelLayout::compact();
    if conversion {
        layout.conversion_column = FunnelLayout::detailed().conversion_column;
    }

    println!();
    for line in render_funnel_table(&funnel, &layout).to_string().lines() {
        println!("   {}", line);
    }
    if funnel.skipped > 0 {
        println!(
            "   {}",
            style(format!(
                "{} candidate(s) skipped: missing grouping value",
                funnel.skipped
            ))
            .yellow()
        );
    }

    let mut out = funnel.to_dataframe(&layout)?;
    save_dataset(&mut out, output)?;

    println!();
    println!(" {} Funnel written", style("✓").green().bold());

    Ok(())
}
