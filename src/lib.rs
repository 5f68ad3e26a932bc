//! hirefunnel: Recruiting Funnel Analytics Library
//!
//! Joins candidate activity with offer responses, resolves each candidate's
//! highest degree and furthest stage, builds backfilled stage funnels and
//! tests year-over-year differences in stage reach rates.

pub mod cli;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod utils;

pub use error::FunnelError;
