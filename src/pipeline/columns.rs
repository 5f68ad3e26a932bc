//! Column naming for activity, response and enriched tables

use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Names of the columns the pipeline reads and writes.
///
/// Defaults match the recruiting workbook export. Any subset can be
/// overridden from a JSON file; missing keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    /// Join key shared by the activity and response tables
    pub candidate_id: String,
    /// Up to three degree observations per candidate
    pub education: Vec<String>,
    pub department: String,
    pub application_source: String,
    pub application_date: String,
    pub furthest_stage: String,
    pub offer_decision: String,
    /// Derived column written to the enriched table
    pub highest_degree: String,
    /// Derived column written to the enriched table
    pub application_year: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            candidate_id: "Candidate ID Number".to_string(),
            education: vec![
                "Education 1_Degree".to_string(),
                "Education 2_Degree".to_string(),
                "Education 3_Degree".to_string(),
            ],
            department: "Department".to_string(),
            application_source: "Application Source".to_string(),
            application_date: "Date of Application".to_string(),
            furthest_stage: "Furthest Recruiting Stage Reached".to_string(),
            offer_decision: "Offer Decision".to_string(),
            highest_degree: "Highest Degree".to_string(),
            application_year: "Application Year".to_string(),
        }
    }
}

impl ColumnMap {
    /// Load a column map from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read column map: {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse column map: {}", path.display()))
    }

    /// Grouping columns of the department x degree funnel
    pub fn department_grouping(&self) -> [&str; 2] {
        [self.department.as_str(), self.highest_degree.as_str()]
    }

    /// Grouping columns of the application-source funnel
    pub fn source_grouping(&self) -> [&str; 1] {
        [self.application_source.as_str()]
    }
}

/// Read a column as optional strings, whatever its dtype.
///
/// Returns `Ok(None)` when the column does not exist. Blank strings are
/// treated as missing.
pub fn string_column(df: &DataFrame, name: &str) -> Result<Option<Vec<Option<String>>>> {
    let Ok(column) = df.column(name) else {
        return Ok(None);
    };

    let cast = column
        .cast(&DataType::String)
        .with_context(|| format!("Column '{}' cannot be read as text", name))?;
    let values = cast
        .str()?
        .into_iter()
        .map(|v| v.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string))
        .collect();

    Ok(Some(values))
}
