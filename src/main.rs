//! hirefunnel: Recruiting Funnel Analytics CLI
//!
//! Joins candidate activity with offer responses, then builds the department
//! x degree funnel page, the application-source funnel table and the
//! year-over-year reach comparison.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use tracing::info;

use hirefunnel::cli::compare::run_compare;
use hirefunnel::cli::funnel::run_funnel;
use hirefunnel::cli::{funnel_output_path, Cli, Commands};
use hirefunnel::pipeline::{
    compare_adjacent_years, enrich_dataframe, extract_candidates, funnel_by_columns,
    join_offer_responses, load_dataset_with_progress, reached_rate_table, save_dataset,
    ColumnMap, FunnelLayout, Stage,
};
use hirefunnel::report::{
    export_comparisons, print_comparisons, render_funnel_table, write_funnel_page, RunSummary,
};
use hirefunnel::utils::{
    create_spinner, finish_with_success, finish_with_warning, init_logging, print_banner,
    print_completion, print_config, print_count, print_info, print_step_header,
    print_step_time, print_success, print_warning, ConfigCard,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.common.log_level);

    let columns = match &cli.common.column_map {
        Some(path) => ColumnMap::from_json_file(path)?,
        None => ColumnMap::default(),
    };
    let infer_schema_length = cli.common.infer_schema_length;

    // Handle subcommands
    if let Some(command) = &cli.command {
        return match command {
            Commands::Funnel {
                input,
                group_by,
                output,
                conversion,
            } => run_funnel(
                input,
                &group_by.clone().unwrap_or_else(|| {
                    columns
                        .source_grouping()
                        .iter()
                        .map(|c| c.to_string())
                        .collect()
                }),
                &funnel_output_path(input, output.as_deref()),
                *conversion,
                &columns,
                infer_schema_length,
            ),
            Commands::Compare {
                input,
                comparison,
                json,
            } => run_compare(
                input,
                comparison,
                json.as_deref(),
                &columns,
                infer_schema_length,
            ),
        };
    }

    // Main pipeline - both input tables are required
    let activity_path = cli.activity.as_ref().ok_or_else(|| {
        anyhow::anyhow!("Activity file is required. Use -a/--activity to specify a file.")
    })?;
    let responses_path = cli.responses.as_ref().ok_or_else(|| {
        anyhow::anyhow!("Offer response file is required. Use -r/--responses to specify a file.")
    })?;
    let output_dir = cli
        .output_dir()
        .ok_or_else(|| anyhow::anyhow!("Cannot derive an output directory"))?;
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    let comparison = &cli.comparison;
    let measure = comparison.measure.to_string();

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&ConfigCard {
        activity: activity_path,
        responses: responses_path,
        output_dir: &output_dir,
        min_stage: comparison.min_stage.label(),
        sources: &comparison.sources,
        measure: &measure,
    });

    // Step 1: Load both tables
    print_step_header(1, "Load Data");

    let step_start = Instant::now();
    let spinner = create_spinner("Loading activity and offer response tables...");
    let (activity, rows, cols, memory_mb) =
        load_dataset_with_progress(activity_path, infer_schema_length)?;
    let (responses, response_rows, _, _) =
        load_dataset_with_progress(responses_path, infer_schema_length)?;
    finish_with_success(&spinner, "Tables loaded");

    println!("\n    {} Activity:", style("✧").cyan());
    println!("      Rows: {}", rows);
    println!("      Columns: {}", cols);
    println!("      Estimated memory: {:.2} MB", memory_mb);
    println!("    {} Offer responses: {} rows", style("✧").cyan(), response_rows);

    let load_elapsed = step_start.elapsed();
    print_step_time(load_elapsed);

    // Step 2: Join and enrich
    print_step_header(2, "Enrich Candidates");

    let step_start = Instant::now();
    let spinner = create_spinner("Joining offer responses...");
    let joined = join_offer_responses(activity, responses, &columns)?;
    let mut df = joined.frame;
    let (records, stats) = extract_candidates(&df, &columns)?;
    enrich_dataframe(&mut df, &records, &columns)?;

    let mut summary = RunSummary::new(records.len(), joined.unmatched);
    summary.add_timing("load", load_elapsed);
    summary.add_enrichment(&stats);

    if joined.unmatched > 0 || !stats.unknown_degree_labels.is_empty() {
        finish_with_warning(&spinner, "Candidates enriched with data-quality notes");
    } else {
        finish_with_success(&spinner, "Candidates enriched");
    }
    if joined.unmatched > 0 {
        print_count("candidate(s) without an offer response", joined.unmatched, None);
    }
    for (label, count) in &stats.unknown_degree_labels {
        print_warning(&format!("Unrecognised degree '{}' ({}x) ranked as unknown", label, count));
    }
    let accepted = records.iter().filter(|r| r.stage == Stage::OfferAccepted).count();
    print_count("accepted offer(s)", accepted, None);
    info!(candidates = records.len(), accepted, "candidates enriched");

    let enriched_path = output_dir_path(cli.enriched_path())?;
    save_dataset(&mut df, &enriched_path)?;
    print_success(&format!("Saved enriched candidates to {}", enriched_path.display()));
    summary.add_output(enriched_path);

    let enrich_elapsed = step_start.elapsed();
    summary.add_timing("enrich", enrich_elapsed);
    print_step_time(enrich_elapsed);

    let stages: Vec<Stage> = records.iter().map(|r| r.stage).collect();

    // Step 3: Department x degree funnel
    print_step_header(3, "Department Funnel");

    let step_start = Instant::now();
    let department_funnel = funnel_by_columns(&df, &stages, &columns.department_grouping())?;
    let layout = FunnelLayout::detailed();
    summary.department_groups = department_funnel.groups().len();
    summary.department_skipped = department_funnel.skipped;

    for line in render_funnel_table(&department_funnel, &layout).to_string().lines() {
        println!("    {}", line);
    }
    if department_funnel.skipped > 0 {
        print_info(&format!(
            "{} candidate(s) without department or degree left out",
            department_funnel.skipped
        ));
    }

    let page_path = output_dir_path(cli.department_page_path())?;
    write_funnel_page(
        &department_funnel,
        &layout,
        "Recruiting Funnel by Department and Highest Degree",
        &page_path,
    )?;
    print_success(&format!("Funnel page written to {}", page_path.display()));
    summary.add_output(page_path);

    let department_elapsed = step_start.elapsed();
    summary.add_timing("department", department_elapsed);
    print_step_time(department_elapsed);

    // Step 4: Application source funnel
    print_step_header(4, "Application Source Funnel");

    let step_start = Instant::now();
    let source_funnel = funnel_by_columns(&df, &stages, &columns.source_grouping())?;
    summary.source_groups = source_funnel.groups().len();
    summary.source_skipped = source_funnel.skipped;
    print_count("application source(s)", summary.source_groups, None);

    let source_path = output_dir_path(cli.source_funnel_path())?;
    let mut source_df = source_funnel.to_dataframe(&FunnelLayout::compact())?;
    save_dataset(&mut source_df, &source_path)?;
    print_success(&format!("Source funnel saved to {}", source_path.display()));
    summary.add_output(source_path);

    let source_elapsed = step_start.elapsed();
    summary.add_timing("source", source_elapsed);
    print_step_time(source_elapsed);

    // Step 5: Year-over-year comparison
    print_step_header(5, "Year-over-Year Comparison");

    let step_start = Instant::now();
    let table = reached_rate_table(&records, comparison.min_stage, &comparison.sources);
    let comparisons = compare_adjacent_years(&table, comparison.measure)?;
    summary.years_compared = comparisons.len();

    print_comparisons(&table, &comparisons);

    let comparison_path = output_dir_path(cli.comparison_path())?;
    export_comparisons(
        &table,
        &comparisons,
        comparison.measure,
        &activity_path.display().to_string(),
        &comparison_path,
    )?;
    println!();
    print_success(&format!("Comparison exported to {}", comparison_path.display()));
    summary.add_output(comparison_path);

    let comparison_elapsed = step_start.elapsed();
    summary.add_timing("comparison", comparison_elapsed);
    print_step_time(comparison_elapsed);

    // Display summary
    summary.display();

    print_completion();

    Ok(())
}

fn output_dir_path(path: Option<std::path::PathBuf>) -> Result<std::path::PathBuf> {
    path.ok_or_else(|| anyhow::anyhow!("Cannot derive output file name from the activity file"))
}
