//! Pipeline orchestrator
//!
//! Drives the stages in order over one `AnalysisState`, isolating stage
//! failures. The orchestrator is the sole writer of `current_step` and
//! `error`; engines return typed outcomes and never panic into it.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::AnalysisConfig;
use crate::engines::{PriceEngine, RelationshipEngine, SemanticEngine, StylometryEngine};
use crate::error::{AnalysisError, Result};
use crate::model::{AnalysisRequest, AnalysisState};
use crate::pipeline::aggregate;
use crate::pipeline::stage::{apply_patch, SlotWrite, Stage, StagePatch};
use crate::providers::{extract, Providers};
use crate::report;

/// Cooperative cancellation flag consulted between stages.
///
/// Cancelling mid-stage lets the running stage finish; the state is then
/// returned with `current_step = "cancelled"`.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// The staged analysis pipeline.
///
/// Construction validates the configuration and wires the engines to the
/// injected providers. One pipeline can serve many runs; each run owns its
/// own state, graph and signal list.
pub struct Pipeline {
    providers: Providers,
    price: PriceEngine,
    semantic: SemanticEngine,
    stylometry: StylometryEngine,
    relationship: RelationshipEngine,
}

impl Pipeline {
    pub fn new(providers: Providers, config: AnalysisConfig) -> Result<Self> {
        config.validate().map_err(AnalysisError::Config)?;

        let price = PriceEngine::new(config.price.clone(), config.min_bidders_for_collusion);
        let semantic = SemanticEngine::new(providers.embedder.clone(), config.semantic.clone());
        let stylometry =
            StylometryEngine::new(providers.tagger.clone(), config.stylometry.clone());
        let relationship = RelationshipEngine::new(config.min_clique_size);

        Ok(Self {
            providers,
            price,
            semantic,
            stylometry,
            relationship,
        })
    }

    /// Run the full analysis for one tender
    pub fn run(&self, request: AnalysisRequest) -> Result<AnalysisState> {
        self.run_with_cancellation(request, &CancellationToken::new())
    }

    /// Run with a cancellation token consulted between stages
    pub fn run_with_cancellation(
        &self,
        request: AnalysisRequest,
        token: &CancellationToken,
    ) -> Result<AnalysisState> {
        validate_request(&request)?;

        let mut state = AnalysisState::initialized(request);
        tracing::info!(
            tender_id = %state.tender_id,
            bidders = state.bidders.len(),
            documents = state.documents.len(),
            "starting tender analysis"
        );

        for stage in Stage::ORDER {
            if token.is_cancelled() {
                tracing::warn!(tender_id = %state.tender_id, "analysis cancelled");
                state.current_step = "cancelled".to_string();
                return Ok(state);
            }

            tracing::info!(tender_id = %state.tender_id, stage = stage.name(), "running stage");
            match self.run_stage(stage, &state) {
                Ok(patch) => {
                    apply_patch(&mut state, patch);
                    state.overall_risk_score = aggregate::overall_risk_score(&state.risk_signals);
                    state.current_step = stage.name().to_string();
                }
                Err(err) => {
                    tracing::error!(
                        tender_id = %state.tender_id,
                        stage = stage.name(),
                        error = %err,
                        "stage failed, halting pipeline"
                    );
                    state.error = Some(err.to_string());
                    state.current_step = stage.failed_step();
                    return Ok(state);
                }
            }
        }

        state.current_step = "complete".to_string();
        state.analysis_complete = true;
        tracing::info!(
            tender_id = %state.tender_id,
            signals = state.risk_signals.len(),
            overall_risk = state.overall_risk_score,
            "analysis complete"
        );
        Ok(state)
    }

    fn run_stage(&self, stage: Stage, state: &AnalysisState) -> Result<StagePatch> {
        match stage {
            Stage::Extract => {
                let extracted =
                    extract::process_documents(self.providers.extractor.as_ref(), &state.documents)
                        .map_err(|source| AnalysisError::Provider {
                            stage: stage.name(),
                            source,
                        })?;
                Ok(StagePatch::new(SlotWrite::Extracted(extracted), Vec::new()))
            }

            Stage::Price => {
                let bids: BTreeMap<String, f64> = state
                    .bidders
                    .iter()
                    .map(|b| (b.bidder_id.clone(), b.bid_amount))
                    .collect();
                let analysis = self.price.analyze(&bids);
                let signals = self.price.signals(&analysis, &bids);
                Ok(StagePatch::new(SlotWrite::Price(analysis), signals))
            }

            Stage::Similarity => {
                let texts = state.bidder_texts();
                let analysis =
                    self.semantic
                        .analyze(&texts)
                        .map_err(|source| AnalysisError::Provider {
                            stage: stage.name(),
                            source,
                        })?;
                let signals = self.semantic.signals(&analysis);
                Ok(StagePatch::new(SlotWrite::Similarity(analysis), signals))
            }

            Stage::Stylometry => {
                let texts = state.bidder_texts();
                let order: BTreeMap<String, Vec<String>> = state
                    .bidders
                    .iter()
                    .map(|b| (b.bidder_id.clone(), b.documents.clone()))
                    .collect();
                let analysis = self
                    .stylometry
                    .analyze(&texts, &order)
                    .map_err(|source| AnalysisError::Provider {
                        stage: stage.name(),
                        source,
                    })?;
                let signals = self.stylometry.signals(&analysis);
                Ok(StagePatch::new(SlotWrite::Stylometry(analysis), signals))
            }

            Stage::Relationships => {
                let analysis = self
                    .relationship
                    .analyze(&state.bidders, state.similarity_analysis.as_ref());
                let signals = self.relationship.signals(&analysis);
                Ok(StagePatch::new(SlotWrite::Relationships(analysis), signals))
            }

            Stage::Summarize => {
                let summary = match &self.providers.summarizer {
                    None => None,
                    Some(summarizer) => {
                        let context = report::build_summary_context(state);
                        match summarizer.summarize(&context) {
                            Ok(text) => Some(text),
                            Err(err) => {
                                tracing::warn!(
                                    tender_id = %state.tender_id,
                                    error = %err,
                                    "summarizer failed, continuing without narrative"
                                );
                                None
                            }
                        }
                    }
                };
                Ok(StagePatch::new(SlotWrite::Summary(summary), Vec::new()))
            }
        }
    }
}

/// Reject bad input before any stage runs
fn validate_request(request: &AnalysisRequest) -> Result<()> {
    if request.bidders.is_empty() {
        return Err(AnalysisError::Validation(
            "at least one bidder is required".to_string(),
        ));
    }

    let mut seen = BTreeSet::new();
    for bidder in &request.bidders {
        if !seen.insert(bidder.bidder_id.as_str()) {
            return Err(AnalysisError::Validation(format!(
                "duplicate bidder_id: {}",
                bidder.bidder_id
            )));
        }
        if !bidder.bid_amount.is_finite() || bidder.bid_amount <= 0.0 {
            return Err(AnalysisError::Validation(format!(
                "bidder {} has a non-positive bid amount: {}",
                bidder.bidder_id, bidder.bid_amount
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Bidder;
    use crate::providers::NullTextExtractor;

    fn bidder(id: &str, amount: f64) -> Bidder {
        Bidder {
            bidder_id: id.to_string(),
            name: format!("Bidder {id}"),
            bid_amount: amount,
            documents: vec![],
            contact: None,
        }
    }

    fn request(bidders: Vec<Bidder>) -> AnalysisRequest {
        AnalysisRequest {
            tender_id: "T-1".to_string(),
            tender_description: "test tender".to_string(),
            bidders,
            documents: vec![],
        }
    }

    fn pipeline() -> Pipeline {
        Pipeline::new(
            Providers::with_extractor(Arc::new(NullTextExtractor)),
            AnalysisConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_bidder_list_is_a_validation_error() {
        let result = pipeline().run(request(vec![]));
        assert!(matches!(result, Err(AnalysisError::Validation(_))));
    }

    #[test]
    fn test_duplicate_bidder_id_is_a_validation_error() {
        let result = pipeline().run(request(vec![bidder("b1", 100.0), bidder("b1", 200.0)]));
        assert!(matches!(result, Err(AnalysisError::Validation(_))));
    }

    #[test]
    fn test_non_positive_bid_is_a_validation_error() {
        for amount in [0.0, -5.0, f64::NAN] {
            let result = pipeline().run(request(vec![bidder("b1", amount)]));
            assert!(matches!(result, Err(AnalysisError::Validation(_))));
        }
    }

    #[test]
    fn test_clean_run_completes() {
        let state = pipeline()
            .run(request(vec![bidder("b1", 100.0), bidder("b2", 250.0)]))
            .unwrap();
        assert_eq!(state.current_step, "complete");
        assert!(state.analysis_complete);
        assert!(state.error.is_none());
        assert!(state.risk_signals.is_empty());
        assert_eq!(state.overall_risk_score, 0.0);
        assert!(state.price_analysis.is_some());
        assert!(state.similarity_analysis.is_some());
        assert!(state.stylometry_analysis.is_some());
        assert!(state.relationship_graph.is_some());
        assert!(state.summary.is_none());
    }

    #[test]
    fn test_pre_cancelled_token_returns_cancelled_state() {
        let token = CancellationToken::new();
        token.cancel();
        let state = pipeline()
            .run_with_cancellation(request(vec![bidder("b1", 100.0)]), &token)
            .unwrap();
        assert_eq!(state.current_step, "cancelled");
        assert!(!state.analysis_complete);
        assert!(state.price_analysis.is_none());
    }

    #[test]
    fn test_invalid_config_is_rejected_at_construction() {
        let mut config = AnalysisConfig::default();
        config.stylometry.threshold = 7.0;
        let result = Pipeline::new(
            Providers::with_extractor(Arc::new(NullTextExtractor)),
            config,
        );
        assert!(matches!(result, Err(AnalysisError::Config(_))));
    }
}
