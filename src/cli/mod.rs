//! CLI module - argument parsing and subcommands

mod args;
pub mod compare;
pub mod funnel;

pub use args::*;
