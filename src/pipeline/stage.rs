//! Stage enumeration and patch merging
//!
//! Stages are a fixed sum type with exhaustive dispatch; no runtime graph
//! framework. A patch carries exactly one slot write plus signals to append.
//! Merge policy: result slots are write-once, signals are append-only.

use std::collections::BTreeMap;

use crate::engines::types::{
    NetworkAnalysis, PriceAnalysis, SimilarityAnalysis, StylometryAnalysis,
};
use crate::model::{AnalysisState, RiskSignal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stage {
    Extract,
    Price,
    Similarity,
    Stylometry,
    Relationships,
    Summarize,
}

impl Stage {
    /// Contractual execution order
    pub const ORDER: [Stage; 6] = [
        Stage::Extract,
        Stage::Price,
        Stage::Similarity,
        Stage::Stylometry,
        Stage::Relationships,
        Stage::Summarize,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Extract => "document_extraction",
            Stage::Price => "price_analysis",
            Stage::Similarity => "similarity_analysis",
            Stage::Stylometry => "stylometry_analysis",
            Stage::Relationships => "relationship_graph",
            Stage::Summarize => "report_generation",
        }
    }

    pub fn failed_step(&self) -> String {
        format!("{}_failed", self.name())
    }
}

/// The one slot a stage is allowed to write
pub(crate) enum SlotWrite {
    Extracted(BTreeMap<String, String>),
    Price(PriceAnalysis),
    Similarity(SimilarityAnalysis),
    Stylometry(StylometryAnalysis),
    Relationships(NetworkAnalysis),
    Summary(Option<String>),
}

pub(crate) struct StagePatch {
    pub slot: SlotWrite,
    pub signals: Vec<RiskSignal>,
}

impl StagePatch {
    pub fn new(slot: SlotWrite, signals: Vec<RiskSignal>) -> Self {
        Self { slot, signals }
    }
}

/// Merge a stage patch into the state. A slot that is already populated is
/// left untouched; signals concatenate.
pub(crate) fn apply_patch(state: &mut AnalysisState, patch: StagePatch) {
    match patch.slot {
        SlotWrite::Extracted(map) => {
            if state.extracted_text.is_empty() {
                state.extracted_text = map;
            }
        }
        SlotWrite::Price(analysis) => {
            if state.price_analysis.is_none() {
                state.price_analysis = Some(analysis);
            }
        }
        SlotWrite::Similarity(analysis) => {
            if state.similarity_analysis.is_none() {
                state.similarity_analysis = Some(analysis);
            }
        }
        SlotWrite::Stylometry(analysis) => {
            if state.stylometry_analysis.is_none() {
                state.stylometry_analysis = Some(analysis);
            }
        }
        SlotWrite::Relationships(analysis) => {
            if state.relationship_graph.is_none() {
                state.relationship_graph = Some(analysis);
            }
        }
        SlotWrite::Summary(summary) => {
            if state.summary.is_none() {
                state.summary = summary;
            }
        }
    }
    state.risk_signals.extend(patch.signals);
}
