//! Funnel backfill aggregation
//!
//! Each candidate contributes one observation: the furthest stage they
//! reached, tagged with a grouping key. Reaching a stage implies having passed
//! every earlier one, so the funnel count for a stage is the number of
//! candidates whose furthest stage is that stage or later.
//!
//! The aggregation runs in two passes:
//! 1. raw counts per (key, stage)
//! 2. suffix sums over the fixed stage order for each key
//!
//! Only stages up to the furthest one observed for a key are emitted.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use polars::prelude::*;

use crate::error::FunnelError;
use crate::pipeline::columns::string_column;
use crate::pipeline::stage::Stage;

/// Values of the grouping columns for one candidate, in column order
pub type GroupKey = Vec<String>;

/// One (group, stage) row of a funnel
#[derive(Debug, Clone, PartialEq)]
pub struct FunnelCell {
    pub key: GroupKey,
    pub stage: Stage,
    /// Candidates whose furthest stage is exactly this stage
    pub exited: u64,
    /// Candidates who reached at least this stage
    pub reached: u64,
    /// Percentage of the previous emitted stage that reached this one
    pub conversion: Option<f64>,
}

impl FunnelCell {
    /// Conversion rendered with no decimals and a percent sign; empty when undefined
    pub fn conversion_label(&self) -> String {
        format_conversion(self.conversion)
    }
}

/// Aggregated funnel for one grouping
#[derive(Debug, Clone)]
pub struct FunnelTable {
    /// Names of the grouping columns, one per key component
    pub key_columns: Vec<String>,
    /// Cells sorted by key, then by stage
    pub cells: Vec<FunnelCell>,
    /// Observations dropped because a key component was missing
    pub skipped: usize,
}

/// Column naming for a funnel exported as a DataFrame
#[derive(Debug, Clone)]
pub struct FunnelLayout {
    pub stage_column: String,
    pub count_column: String,
    /// Name of the conversion column, or `None` to leave it out
    pub conversion_column: Option<String>,
}

impl FunnelLayout {
    /// Layout of the department x degree summary page
    pub fn detailed() -> Self {
        Self {
            stage_column: "Furthest Recruiting Stage Reached".to_string(),
            count_column: "Count".to_string(),
            conversion_column: Some("Conversion Rate (%)".to_string()),
        }
    }

    /// Layout of the exported application-source funnel
    pub fn compact() -> Self {
        Self {
            stage_column: "Stage".to_string(),
            count_column: "Applicants".to_string(),
            conversion_column: None,
        }
    }
}

impl FunnelTable {
    /// Build a funnel from (key, furthest stage) observations.
    ///
    /// Observations without a complete key are skipped and counted.
    pub fn aggregate<I>(key_columns: Vec<String>, observations: I) -> Self
    where
        I: IntoIterator<Item = (Option<GroupKey>, Stage)>,
    {
        let mut raw: BTreeMap<GroupKey, [u64; 5]> = BTreeMap::new();
        let mut skipped = 0;

        for (key, stage) in observations {
            match key {
                Some(key) => raw.entry(key).or_insert([0; 5])[stage.index()] += 1,
                None => skipped += 1,
            }
        }

        let mut cells = Vec::new();
        for (key, counts) in raw {
            cells.extend(backfill_group(&key, &counts));
        }

        Self {
            key_columns,
            cells,
            skipped,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Distinct grouping keys, in output order
    pub fn groups(&self) -> Vec<&GroupKey> {
        let mut groups: Vec<&GroupKey> = Vec::new();
        for cell in &self.cells {
            if groups.last() != Some(&&cell.key) {
                groups.push(&cell.key);
            }
        }
        groups
    }

    /// Cells belonging to one grouping key
    pub fn group(&self, key: &[&str]) -> Vec<&FunnelCell> {
        self.cells
            .iter()
            .filter(|cell| cell.key.iter().map(String::as_str).eq(key.iter().copied()))
            .collect()
    }

    /// Total candidates counted in the funnel (skipped observations excluded)
    pub fn total_candidates(&self) -> u64 {
        self.cells.iter().map(|cell| cell.exited).sum()
    }

    /// Convert to a DataFrame: key columns, stage label, count, optional conversion.
    pub fn to_dataframe(&self, layout: &FunnelLayout) -> Result<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(self.key_columns.len() + 3);

        for (i, name) in self.key_columns.iter().enumerate() {
            let values: Vec<&str> = self.cells.iter().map(|cell| cell.key[i].as_str()).collect();
            columns.push(Column::new(name.as_str().into(), values));
        }

        let stages: Vec<&str> = self.cells.iter().map(|cell| cell.stage.label()).collect();
        columns.push(Column::new(layout.stage_column.as_str().into(), stages));

        let counts: Vec<u64> = self.cells.iter().map(|cell| cell.reached).collect();
        columns.push(Column::new(layout.count_column.as_str().into(), counts));

        if let Some(name) = &layout.conversion_column {
            let rates: Vec<String> = self.cells.iter().map(FunnelCell::conversion_label).collect();
            columns.push(Column::new(name.as_str().into(), rates));
        }

        DataFrame::new(columns).context("Failed to build funnel DataFrame")
    }
}

/// Build a funnel keyed by columns of a candidate table.
///
/// `stages` holds the normalized furthest stage for each row of `df`.
pub fn funnel_by_columns(df: &DataFrame, stages: &[Stage], by: &[&str]) -> Result<FunnelTable> {
    if stages.len() != df.height() {
        anyhow::bail!(
            "Stage count ({}) does not match row count ({})",
            stages.len(),
            df.height()
        );
    }

    let mut key_values: Vec<Vec<Option<String>>> = Vec::with_capacity(by.len());
    for name in by {
        let values = string_column(df, name)?
            .ok_or_else(|| FunnelError::missing_column("candidate", name))?;
        key_values.push(values);
    }

    let observations = stages.iter().enumerate().map(|(row, stage)| {
        let key: Option<GroupKey> = key_values
            .iter()
            .map(|values| values[row].clone())
            .collect();
        (key, *stage)
    });

    Ok(FunnelTable::aggregate(
        by.iter().map(|s| s.to_string()).collect(),
        observations,
    ))
}

/// Percentage of `previous` represented by `current`; `None` when `previous` is zero.
pub fn conversion_rate(current: u64, previous: u64) -> Option<f64> {
    if previous == 0 {
        None
    } else {
        Some(current as f64 / previous as f64 * 100.0)
    }
}

/// Render a conversion rate as e.g. `67%`, or an empty string when undefined.
pub fn format_conversion(rate: Option<f64>) -> String {
    match rate {
        Some(rate) if rate.is_finite() => format!("{:.0}%", rate),
        _ => String::new(),
    }
}

fn backfill_group(key: &GroupKey, raw: &[u64; 5]) -> Vec<FunnelCell> {
    let Some(furthest) = raw.iter().rposition(|&count| count > 0) else {
        return Vec::new();
    };

    let mut reached = [0u64; 5];
    let mut running = 0;
    for i in (0..=furthest).rev() {
        running += raw[i];
        reached[i] = running;
    }

    let mut previous: Option<u64> = None;
    Stage::ALL[..=furthest]
        .iter()
        .map(|&stage| {
            let count = reached[stage.index()];
            let conversion = previous.and_then(|prev| conversion_rate(count, prev));
            previous = Some(count);
            FunnelCell {
                key: key.clone(),
                stage,
                exited: raw[stage.index()],
                reached: count,
                conversion,
            }
        })
        .collect()
}
