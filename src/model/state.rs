//! Shared analysis state
//!
//! One `AnalysisState` flows through the pipeline. Each stage writes its own
//! result slot exactly once and appends risk signals; the orchestrator is the
//! only writer of `current_step` and `error`.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::engines::types::{
    NetworkAnalysis, PriceAnalysis, SimilarityAnalysis, StylometryAnalysis,
};
use crate::model::bidder::Bidder;
use crate::model::signal::RiskSignal;

/// Input to one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisRequest {
    /// Unique tender identifier
    pub tender_id: String,

    /// Free-text description of the procurement
    pub tender_description: String,

    /// All bidders participating in the tender
    pub bidders: Vec<Bidder>,

    /// Every document handle to extract, across all bidders
    #[serde(default)]
    pub documents: Vec<String>,
}

/// The evolving (and final) state of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisState {
    // Input
    pub tender_id: String,
    pub tender_description: String,
    pub bidders: Vec<Bidder>,
    pub documents: Vec<String>,

    /// Document handle to extracted text
    pub extracted_text: BTreeMap<String, String>,

    // Per-engine result slots, written once each
    pub price_analysis: Option<PriceAnalysis>,
    pub similarity_analysis: Option<SimilarityAnalysis>,
    pub stylometry_analysis: Option<StylometryAnalysis>,
    pub relationship_graph: Option<NetworkAnalysis>,

    /// Narrative summary from the summarizer provider, when one is
    /// configured and succeeds
    pub summary: Option<String>,

    /// Append-only findings accumulated across stages
    pub risk_signals: Vec<RiskSignal>,

    /// Maximum signal score seen so far; 0 when no signals
    pub overall_risk_score: f64,

    /// Stage name, `initialized`, `complete`, `cancelled`, or
    /// `<stage>_failed`
    pub current_step: String,

    pub analysis_complete: bool,

    /// Message of the first failing stage, if any
    pub error: Option<String>,
}

impl AnalysisState {
    /// Fresh state for a request, before any stage has run
    pub fn initialized(request: AnalysisRequest) -> Self {
        Self {
            tender_id: request.tender_id,
            tender_description: request.tender_description,
            bidders: request.bidders,
            documents: request.documents,
            extracted_text: BTreeMap::new(),
            price_analysis: None,
            similarity_analysis: None,
            stylometry_analysis: None,
            relationship_graph: None,
            summary: None,
            risk_signals: Vec::new(),
            overall_risk_score: 0.0,
            current_step: "initialized".to_string(),
            analysis_complete: false,
            error: None,
        }
    }

    /// Texts per bidder per document handle, for the document engines.
    /// Handles without extracted text are skipped.
    pub fn bidder_texts(&self) -> BTreeMap<String, BTreeMap<String, String>> {
        let mut texts = BTreeMap::new();
        for bidder in &self.bidders {
            let docs: BTreeMap<String, String> = bidder
                .documents
                .iter()
                .filter_map(|handle| {
                    self.extracted_text
                        .get(handle)
                        .map(|text| (handle.clone(), text.clone()))
                })
                .collect();
            texts.insert(bidder.bidder_id.clone(), docs);
        }
        texts
    }
}
