//! Narrative summarization provider interface
//!
//! Best-effort by contract: a failing or absent summarizer leaves the run
//! complete with no narrative.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Context handed to the summarizer: the tender, the accumulated findings
/// and the aggregate score, pre-rendered as prompt-friendly lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SummaryContext {
    pub tender_id: String,
    pub tender_description: String,
    pub bidder_count: usize,
    pub overall_risk_score: f64,

    /// One line per risk signal, `- <type> (<severity>): <description> [Score: x.xx]`
    pub signal_lines: Vec<String>,
}

/// Narrative report provider
pub trait Summarizer: Send + Sync {
    fn summarize(&self, context: &SummaryContext) -> Result<String, ProviderError>;
}
