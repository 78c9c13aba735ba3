//! tenderwatch: collusion and fraud risk indicators for procurement tenders
//!
//! Cross-analyzes bid prices, document similarity, writing style and
//! declared contact fields across the bidders of one tender, and returns
//! typed, scored, evidence-bearing risk signals with an aggregate score.
//! Nothing here accuses anyone; the output is material for human review.

pub mod config;
pub mod engines;
pub mod error;
pub mod graph;
pub mod model;
pub mod pipeline;
pub mod providers;
pub mod report;

pub use config::AnalysisConfig;
pub use error::{AnalysisError, ProviderError, Result};
pub use model::{AnalysisRequest, AnalysisState, Bidder, RiskSignal, Severity, SignalType};
pub use pipeline::{CancellationToken, Pipeline};
pub use providers::Providers;

/// Run a complete analysis with the given providers and configuration.
///
/// Thin convenience over [`Pipeline`]; callers running many tenders should
/// construct one pipeline and reuse it, sharing the provider bundle.
pub fn run_analysis(
    request: AnalysisRequest,
    providers: Providers,
    config: AnalysisConfig,
) -> Result<AnalysisState> {
    Pipeline::new(providers, config)?.run(request)
}
