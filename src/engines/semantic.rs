//! Cross-bidder document similarity
//!
//! Embeds every submitted document, computes the upper-triangular cosine
//! matrix and keeps pairs spanning two different bidders. Same-bidder pairs
//! are filtered out; a bidder resembling itself is not evidence.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::SemanticConfig;
use crate::engines::cosine_similarity;
use crate::engines::types::{CrossBidderPair, SimilarityAnalysis};
use crate::error::ProviderError;
use crate::model::{RiskSignal, Severity, SignalType};
use crate::providers::Embedder;

/// Severity cutoff for a single similarity signal
const SEVERITY_HIGH_CUTOFF: f64 = 0.90;

pub struct SemanticEngine {
    embedder: Option<Arc<dyn Embedder>>,
    config: SemanticConfig,
}

impl SemanticEngine {
    pub fn new(embedder: Option<Arc<dyn Embedder>>, config: SemanticConfig) -> Self {
        Self { embedder, config }
    }

    /// Compare all documents across bidders.
    ///
    /// An absent or unavailable embedder, or fewer than two texts, yields an
    /// insufficient-data result. Any other embedder failure propagates and
    /// fails the stage.
    pub fn analyze(
        &self,
        bidder_texts: &BTreeMap<String, BTreeMap<String, String>>,
    ) -> Result<SimilarityAnalysis, ProviderError> {
        // Flatten into pseudo-IDs "bidder:handle"; BTreeMap order keeps the
        // matrix layout deterministic
        let mut doc_ids = Vec::new();
        let mut doc_texts = Vec::new();
        for (bidder_id, docs) in bidder_texts {
            for (handle, text) in docs {
                doc_ids.push(format!("{bidder_id}:{handle}"));
                doc_texts.push(text.clone());
            }
        }

        if doc_texts.len() < 2 {
            tracing::debug!(texts = doc_texts.len(), "not enough texts for similarity");
            return Ok(SimilarityAnalysis::insufficient());
        }

        let embedder = match &self.embedder {
            Some(embedder) => embedder,
            None => {
                tracing::warn!("no embedding provider configured, skipping similarity analysis");
                return Ok(SimilarityAnalysis::insufficient());
            }
        };

        let embeddings = match embedder.embed(&doc_texts) {
            Ok(embeddings) => embeddings,
            Err(err) if err.is_unavailable() => {
                tracing::warn!(error = %err, "embedding provider unavailable");
                return Ok(SimilarityAnalysis::insufficient());
            }
            Err(err) => return Err(err),
        };

        if embeddings.len() != doc_texts.len() {
            return Err(ProviderError::Model(format!(
                "embedder returned {} rows for {} texts",
                embeddings.len(),
                doc_texts.len()
            )));
        }

        let vectors: Vec<Vec<f64>> = embeddings
            .iter()
            .map(|row| row.iter().map(|v| *v as f64).collect())
            .collect();

        // Upper-triangular pairs at or above the threshold
        let mut pairs: Vec<(String, String, f64)> = Vec::new();
        for i in 0..doc_ids.len() {
            for j in (i + 1)..doc_ids.len() {
                let similarity = cosine_similarity(&vectors[i], &vectors[j]);
                if similarity >= self.config.threshold {
                    pairs.push((doc_ids[i].clone(), doc_ids[j].clone(), similarity));
                }
            }
        }

        pairs.sort_by(|a, b| {
            b.2.partial_cmp(&a.2)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
                .then_with(|| a.1.cmp(&b.1))
        });

        let total_comparisons = pairs.len();
        let cross_bidder_similarities: Vec<CrossBidderPair> = pairs
            .into_iter()
            .filter_map(|(doc1, doc2, similarity)| {
                let bidder1 = doc1.split(':').next().unwrap_or_default().to_string();
                let bidder2 = doc2.split(':').next().unwrap_or_default().to_string();
                if bidder1 == bidder2 {
                    return None;
                }
                Some(CrossBidderPair {
                    bidder1,
                    bidder2,
                    document1: doc1,
                    document2: doc2,
                    similarity,
                })
            })
            .collect();

        let high_risk_pairs: Vec<CrossBidderPair> = cross_bidder_similarities
            .iter()
            .filter(|p| p.similarity > self.config.high_risk_threshold)
            .cloned()
            .collect();

        tracing::info!(
            pairs = total_comparisons,
            cross_bidder = cross_bidder_similarities.len(),
            high_risk = high_risk_pairs.len(),
            "similarity analysis complete"
        );

        Ok(SimilarityAnalysis {
            insufficient_data: false,
            total_comparisons,
            cross_bidder_similarities,
            high_risk_pairs,
        })
    }

    /// One `document_similarity` signal per cross-bidder pair
    pub fn signals(&self, analysis: &SimilarityAnalysis) -> Vec<RiskSignal> {
        analysis
            .cross_bidder_similarities
            .iter()
            .map(|pair| {
                let severity = if pair.similarity > SEVERITY_HIGH_CUTOFF {
                    Severity::High
                } else {
                    Severity::Medium
                };
                RiskSignal::new(
                    SignalType::DocumentSimilarity,
                    severity,
                    pair.similarity,
                    format!(
                        "High similarity detected between {} and {}",
                        pair.bidder1, pair.bidder2
                    ),
                    serde_json::to_value(pair).unwrap_or(serde_json::Value::Null),
                    vec![pair.bidder1.clone(), pair.bidder2.clone()],
                )
            })
            .collect()
    }
}
