//! Error types for funnel analysis.
//!
//! Data-quality anomalies (unknown degree labels, candidates without an offer
//! response) are absorbed by the pipeline and never reach this enum. Everything
//! here is structural and aborts the run.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised by the funnel analysis core.
#[derive(Debug, Error)]
pub enum FunnelError {
    /// A furthest-stage label that is not one of the five funnel stages,
    /// after offer override and spelling fixups.
    #[error("invalid funnel stage '{0}'")]
    InvalidStage(String),

    /// A required column is absent from an input table.
    #[error("column '{column}' not found in {table} table")]
    MissingColumn { table: String, column: String },

    /// Contingency table that cannot be tested (negative cells, ragged rows).
    #[error("invalid contingency table: {0}")]
    InvalidContingency(String),

    /// Failure constructing a statistical distribution.
    #[error("statistics error: {0}")]
    Statistics(String),

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

impl FunnelError {
    pub fn missing_column(table: &str, column: &str) -> Self {
        FunnelError::MissingColumn {
            table: table.to_string(),
            column: column.to_string(),
        }
    }
}
