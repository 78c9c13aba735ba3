//! Pipeline orchestration
//!
//! Stages execute in fixed order over one `AnalysisState`:
//! extract, price, similarity, stylometry, relationships, summarize.
//! Each stage produces a patch (one result slot plus appended signals) or a
//! failure that halts the run with the completed slots intact.

pub mod aggregate;
pub mod orchestrator;
pub(crate) mod stage;

pub use aggregate::SeverityCounts;
pub use orchestrator::{CancellationToken, Pipeline};
