//! Report module - funnel pages, comparison output and run summaries

pub mod comparison_export;
pub mod funnel_page;
pub mod summary;

pub use comparison_export::*;
pub use funnel_page::*;
pub use summary::*;
