//! Pipeline module - enrichment, funnel aggregation and year-over-year tests

pub mod columns;
pub mod comparison;
pub mod degree;
pub mod enrich;
pub mod funnel;
pub mod loader;
pub mod stage;
pub mod stats;

pub use columns::*;
pub use comparison::*;
pub use degree::*;
pub use enrich::*;
pub use funnel::*;
pub use loader::*;
pub use stage::*;
pub use stats::*;
