//! Candidate enrichment: offer-response join and per-candidate derived fields

use std::collections::{BTreeMap, HashSet};

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use tracing::{debug, warn};

use crate::error::FunnelError;
use crate::pipeline::columns::{string_column, ColumnMap};
use crate::pipeline::degree::{highest_degree, rank_of};
use crate::pipeline::stage::{normalize_stage, Stage};

/// Activity rows left-joined with their offer responses
#[derive(Debug)]
pub struct JoinedData {
    pub frame: DataFrame,
    /// Activity rows whose candidate has no offer response
    pub unmatched: usize,
}

/// One candidate after normalization
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRecord {
    pub candidate_id: String,
    pub application_source: Option<String>,
    pub application_year: Option<i32>,
    pub highest_degree: Option<String>,
    pub offer_decision: Option<String>,
    pub stage: Stage,
}

/// Data-quality anomalies absorbed during extraction
#[derive(Debug, Clone, Default)]
pub struct EnrichmentStats {
    /// Unrecognised degree labels and how often each appeared
    pub unknown_degree_labels: BTreeMap<String, usize>,
    /// Candidates without any degree observation
    pub without_degree: usize,
    /// Candidates whose application date could not be read
    pub without_year: usize,
}

/// Left-join activity rows with offer responses on the candidate ID.
///
/// The ID is compared as text on both sides. Candidates without a response
/// keep null response fields and are counted, never rejected.
pub fn join_offer_responses(
    activity: DataFrame,
    responses: DataFrame,
    columns: &ColumnMap,
) -> Result<JoinedData> {
    let id = columns.candidate_id.as_str();
    require_column(&activity, "activity", id)?;
    require_column(&responses, "response", id)?;
    require_column(&responses, "response", &columns.offer_decision)?;

    let responded: HashSet<String> = string_column(&responses, id)?
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .collect();

    let mut unmatched = 0;
    for candidate in string_column(&activity, id)?.unwrap_or_default() {
        match candidate {
            Some(candidate) if responded.contains(&candidate) => {}
            candidate => {
                debug!(candidate = ?candidate, "no offer response for candidate");
                unmatched += 1;
            }
        }
    }

    let frame = activity
        .lazy()
        .with_column(col(id).cast(DataType::String))
        .join(
            responses.lazy().with_column(col(id).cast(DataType::String)),
            [col(id)],
            [col(id)],
            JoinArgs::new(JoinType::Left),
        )
        .collect()
        .context("Failed to join activity and offer response tables")?;

    Ok(JoinedData { frame, unmatched })
}

/// Derive per-candidate fields from a joined (or previously enriched) table.
///
/// Highest degree comes from the education columns when any are present,
/// otherwise from an existing highest-degree column. The year comes from the
/// application date, falling back row by row to an existing year column. An invalid
/// stage aborts extraction with the offending candidate named.
pub fn extract_candidates(
    df: &DataFrame,
    columns: &ColumnMap,
) -> Result<(Vec<CandidateRecord>, EnrichmentStats)> {
    let height = df.height();
    let ids = required_strings(df, &columns.candidate_id)?;
    let recorded = required_strings(df, &columns.furthest_stage)?;
    let decisions = optional_strings(df, &columns.offer_decision, height)?;
    let sources = optional_strings(df, &columns.application_source, height)?;

    let mut education: Vec<Vec<Option<String>>> = Vec::new();
    for name in &columns.education {
        if let Some(values) = string_column(df, name)? {
            education.push(values);
        }
    }
    let existing_degree = if education.is_empty() {
        optional_strings(df, &columns.highest_degree, height)?
    } else {
        vec![None; height]
    };

    let dates = optional_strings(df, &columns.application_date, height)?;
    let existing_years = optional_strings(df, &columns.application_year, height)?;

    let mut stats = EnrichmentStats::default();
    let mut records = Vec::with_capacity(height);

    for row in 0..height {
        let candidate_id = ids[row].clone().unwrap_or_default();

        let stage = normalize_stage(recorded[row].as_deref(), decisions[row].as_deref())
            .with_context(|| format!("Candidate '{}' has an invalid furthest stage", candidate_id))?;

        let degree = if education.is_empty() {
            existing_degree[row].clone()
        } else {
            let labels: Vec<Option<&str>> =
                education.iter().map(|values| values[row].as_deref()).collect();
            for label in labels.iter().flatten() {
                let unranked = rank_of(Some(label)).is_some_and(|rank| rank.ordinal().is_none());
                if unranked {
                    *stats.unknown_degree_labels.entry(label.to_string()).or_insert(0) += 1;
                }
            }
            highest_degree(&labels).map(str::to_string)
        };
        if degree.is_none() {
            stats.without_degree += 1;
        }

        let year = dates[row]
            .as_deref()
            .and_then(parse_year)
            .or_else(|| existing_years[row].as_deref().and_then(parse_year));
        if year.is_none() {
            stats.without_year += 1;
        }

        records.push(CandidateRecord {
            candidate_id,
            application_source: sources[row].clone(),
            application_year: year,
            highest_degree: degree,
            offer_decision: decisions[row].clone(),
            stage,
        });
    }

    for (label, count) in &stats.unknown_degree_labels {
        warn!(label = %label, count, "unrecognised degree label ranked as unknown");
    }

    Ok((records, stats))
}

/// Write the derived fields back into the candidate table.
///
/// The furthest-stage column is replaced by its normalized labels; the
/// highest-degree and application-year columns are added or replaced.
pub fn enrich_dataframe(
    df: &mut DataFrame,
    records: &[CandidateRecord],
    columns: &ColumnMap,
) -> Result<()> {
    if records.len() != df.height() {
        anyhow::bail!(
            "Record count ({}) does not match row count ({})",
            records.len(),
            df.height()
        );
    }

    let stages: Vec<&str> = records.iter().map(|r| r.stage.label()).collect();
    let degrees: Vec<Option<String>> = records.iter().map(|r| r.highest_degree.clone()).collect();
    let years: Vec<Option<i32>> = records.iter().map(|r| r.application_year).collect();

    df.with_column(Column::new(columns.furthest_stage.as_str().into(), stages))?;
    df.with_column(Column::new(columns.highest_degree.as_str().into(), degrees))?;
    df.with_column(Column::new(columns.application_year.as_str().into(), years))?;

    Ok(())
}

/// Year of an application date.
///
/// Accepts ISO dates and datetimes, US-style `month/day/year`, and bare years.
pub fn parse_year(value: &str) -> Option<i32> {
    let value = value.trim();

    if value.len() == 4 && value.chars().all(|c| c.is_ascii_digit()) {
        return value.parse().ok();
    }

    if let Some(date) = value
        .get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
    {
        return Some(date.year());
    }

    NaiveDate::parse_from_str(value, "%m/%d/%Y")
        .ok()
        .map(|date| date.year())
}

fn require_column(df: &DataFrame, table: &str, name: &str) -> Result<(), FunnelError> {
    if df.column(name).is_err() {
        return Err(FunnelError::missing_column(table, name));
    }
    Ok(())
}

fn required_strings(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    Ok(string_column(df, name)?.ok_or_else(|| FunnelError::missing_column("candidate", name))?)
}

fn optional_strings(df: &DataFrame, name: &str, height: usize) -> Result<Vec<Option<String>>> {
    Ok(string_column(df, name)?.unwrap_or_else(|| vec![None; height]))
}
