//! Configuration Management
//!
//! Thresholds and guards recognized by the analysis pipeline. Loading these
//! from a file or environment is left to the caller; the structs are
//! serde-compatible so any source works.

pub mod analysis;

// Re-export
pub use analysis::{AnalysisConfig, PriceConfig, SemanticConfig, StylometryConfig};
