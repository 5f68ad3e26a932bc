//! Year-over-year comparison of stage reach rates by application source

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::FunnelError;
use crate::pipeline::enrich::CandidateRecord;
use crate::pipeline::stage::Stage;
use crate::pipeline::stats::{chi2_contingency, ChiSquareTest};

/// Values placed in the contingency table for each (year, source) cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContingencyMeasure {
    /// Number of candidates who reached the stage
    Counts,
    /// Reached candidates as a percentage of all candidates that year
    Percent,
}

impl fmt::Display for ContingencyMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContingencyMeasure::Counts => write!(f, "counts"),
            ContingencyMeasure::Percent => write!(f, "percent"),
        }
    }
}

impl FromStr for ContingencyMeasure {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "counts" | "count" => Ok(ContingencyMeasure::Counts),
            "percent" | "percentage" | "rate" => Ok(ContingencyMeasure::Percent),
            other => Err(format!(
                "Unknown contingency measure '{}'. Options: counts, percent",
                other
            )),
        }
    }
}

/// Reach counts for one application year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReachRow {
    pub year: i32,
    /// All candidates who applied that year, any source
    pub total: u64,
    /// Candidates at or past the threshold stage, one entry per source
    pub reached: Vec<u64>,
}

impl ReachRow {
    /// Reach rate (%) for the source at `index`; 0 when the year has no candidates
    pub fn rate(&self, index: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.reached[index] as f64 / self.total as f64 * 100.0
        }
    }

    fn values(&self, measure: ContingencyMeasure) -> Vec<f64> {
        match measure {
            ContingencyMeasure::Counts => self.reached.iter().map(|&c| c as f64).collect(),
            ContingencyMeasure::Percent => (0..self.reached.len()).map(|i| self.rate(i)).collect(),
        }
    }
}

/// Year x source table of candidates reaching a stage
#[derive(Debug, Clone, Serialize)]
pub struct ReachTable {
    pub min_stage: Stage,
    pub sources: Vec<String>,
    /// One row per application year, ascending
    pub rows: Vec<ReachRow>,
    /// Candidates skipped because their application year is unknown
    pub skipped: usize,
}

/// Test result for one pair of adjacent years
#[derive(Debug, Clone, Serialize)]
pub struct YearComparison {
    pub from_year: i32,
    pub to_year: i32,
    pub measure: ContingencyMeasure,
    /// The 2 x n table that was tested, rows in year order
    pub observed: Vec<Vec<f64>>,
    pub test: ChiSquareTest,
}

/// Build the year x source table of candidates who reached `min_stage`.
///
/// Every year with at least one candidate gets a row, and every requested
/// source gets a column, so missing combinations show up as zero.
pub fn reached_rate_table(
    records: &[CandidateRecord],
    min_stage: Stage,
    sources: &[String],
) -> ReachTable {
    let mut unique_sources: Vec<String> = Vec::with_capacity(sources.len());
    for source in sources {
        if !unique_sources.contains(source) {
            unique_sources.push(source.clone());
        }
    }

    let mut by_year: BTreeMap<i32, ReachRow> = BTreeMap::new();
    let mut skipped = 0;

    for record in records {
        let Some(year) = record.application_year else {
            skipped += 1;
            continue;
        };

        let row = by_year.entry(year).or_insert_with(|| ReachRow {
            year,
            total: 0,
            reached: vec![0; unique_sources.len()],
        });
        row.total += 1;

        if record.stage < min_stage {
            continue;
        }
        if let Some(index) = record
            .application_source
            .as_ref()
            .and_then(|source| unique_sources.iter().position(|s| s == source))
        {
            row.reached[index] += 1;
        }
    }

    ReachTable {
        min_stage,
        sources: unique_sources,
        rows: by_year.into_values().collect(),
        skipped,
    }
}

/// Run an independence test on every pair of chronologically adjacent years.
pub fn compare_adjacent_years(
    table: &ReachTable,
    measure: ContingencyMeasure,
) -> Result<Vec<YearComparison>, FunnelError> {
    table
        .rows
        .windows(2)
        .map(|pair| {
            let observed = vec![pair[0].values(measure), pair[1].values(measure)];
            let test = chi2_contingency(&observed, true)?;
            Ok(YearComparison {
                from_year: pair[0].year,
                to_year: pair[1].year,
                measure,
                observed,
                test,
            })
        })
        .collect()
}
