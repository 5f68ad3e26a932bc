//! Run summary report

use std::path::PathBuf;
use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::EnrichmentStats;

/// Summary of a funnel analysis run
#[derive(Debug, Default)]
pub struct RunSummary {
    pub candidates: usize,
    pub unmatched_responses: usize,
    pub unknown_degree_labels: usize,
    pub without_degree: usize,
    pub without_year: usize,
    pub department_groups: usize,
    pub department_skipped: usize,
    pub source_groups: usize,
    pub source_skipped: usize,
    pub years_compared: usize,
    pub outputs: Vec<PathBuf>,
    pub timings: Vec<(&'static str, Duration)>,
}

impl RunSummary {
    pub fn new(candidates: usize, unmatched_responses: usize) -> Self {
        Self {
            candidates,
            unmatched_responses,
            ..Default::default()
        }
    }

    pub fn add_enrichment(&mut self, stats: &EnrichmentStats) {
        self.unknown_degree_labels = stats.unknown_degree_labels.values().sum();
        self.without_degree = stats.without_degree;
        self.without_year = stats.without_year;
    }

    pub fn add_output(&mut self, path: PathBuf) {
        self.outputs.push(path);
    }

    pub fn add_timing(&mut self, step: &'static str, elapsed: Duration) {
        self.timings.push((step, elapsed));
    }

    pub fn total_time(&self) -> Duration {
        self.timings.iter().map(|(_, d)| *d).sum()
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("FUNNEL SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![Cell::new("👥 Candidates"), Cell::new(self.candidates)]);
        table.add_row(vec![
            Cell::new("✉️  Without offer response"),
            warn_cell(self.unmatched_responses),
        ]);
        table.add_row(vec![
            Cell::new("🎓 Unknown degree labels"),
            warn_cell(self.unknown_degree_labels),
        ]);
        table.add_row(vec![
            Cell::new("🎓 Without any degree"),
            warn_cell(self.without_degree),
        ]);
        table.add_row(vec![
            Cell::new("📅 Without application year"),
            warn_cell(self.without_year),
        ]);
        table.add_row(vec![
            Cell::new("🏢 Department x degree groups"),
            Cell::new(format!(
                "{} ({} skipped)",
                self.department_groups, self.department_skipped
            )),
        ]);
        table.add_row(vec![
            Cell::new("🔗 Application source groups"),
            Cell::new(format!(
                "{} ({} skipped)",
                self.source_groups, self.source_skipped
            )),
        ]);
        table.add_row(vec![
            Cell::new("📈 Year pairs compared"),
            Cell::new(self.years_compared)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![
            Cell::new("⏱  Total time"),
            Cell::new(format!("{:.2}s", self.total_time().as_secs_f64())),
        ]);

        // Indent the table
        for line in table.to_string().lines() {
            println!("    {}", line);
        }

        if !self.outputs.is_empty() {
            println!();
            println!(
                "    {} {}",
                style("📝").cyan(),
                style("OUTPUT FILES").white().bold()
            );
            println!("    {}", style("─".repeat(50)).dim());
            for path in &self.outputs {
                println!("      {} {}", style("•").dim(), path.display());
            }
        }
    }
}

fn warn_cell(count: usize) -> Cell {
    Cell::new(count).fg(if count == 0 { Color::White } else { Color::Yellow })
}
