//! Result records produced by the analytic engines
//!
//! These land in the per-engine slots of `AnalysisState` and double as
//! signal evidence payloads, so they all serialize.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::Severity;

// ============================================================================
// Price analysis
// ============================================================================

/// Bid price spread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
    pub range: f64,
}

/// Statistical outlier analysis over the bid distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OutlierAnalysis {
    pub mean: f64,
    pub median: f64,

    /// Population standard deviation
    pub std_dev: f64,

    /// `std_dev / mean`, 0 when the mean is 0
    pub coefficient_variation: f64,

    /// Bidders whose z-score magnitude exceeds the configured cutoff
    pub z_score_outliers: Vec<String>,

    /// Bidders outside the 1.5 IQR fences
    pub iqr_outliers: Vec<String>,

    pub price_range: PriceRange,
}

/// Two high bids sitting suspiciously close to each other
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CoverBidPattern {
    pub bidder1: String,
    pub bidder2: String,
    pub price1: f64,
    pub price2: f64,

    /// Relative difference between the two bids, in percent
    pub difference_pct: f64,
}

/// Cover-bidding screen over the ordered bid list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CoverBidAnalysis {
    pub lowest_bid: f64,
    pub highest_bid: f64,

    /// `clustered_high_bids` patterns, in scan order
    pub patterns: Vec<CoverBidPattern>,
}

/// Full price engine result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PriceAnalysis {
    /// True when fewer bidders than the collusion guard allows
    pub insufficient_data: bool,

    /// None when fewer than 3 bids are available
    pub outlier_analysis: Option<OutlierAnalysis>,

    pub cover_bidding: Option<CoverBidAnalysis>,

    /// Fraction of bids divisible by 500 or 1000
    pub round_number_ratio: f64,

    /// Human-readable indicator strings, one per triggered heuristic
    pub risk_indicators: Vec<String>,

    /// Additive risk score, capped at 1.0
    pub risk_score: f64,

    pub severity: Severity,
}

// ============================================================================
// Semantic similarity
// ============================================================================

/// A similar document pair spanning two different bidders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CrossBidderPair {
    pub bidder1: String,
    pub bidder2: String,

    /// Pseudo-ID `bidder:handle` of the first document
    pub document1: String,

    /// Pseudo-ID `bidder:handle` of the second document
    pub document2: String,

    pub similarity: f64,
}

/// Semantic engine result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SimilarityAnalysis {
    /// True when no embedder is available or fewer than 2 texts exist
    pub insufficient_data: bool,

    /// Document pairs at or above the similarity threshold, before the
    /// cross-bidder filter
    pub total_comparisons: usize,

    /// Cross-bidder pairs ordered by descending similarity, then
    /// lexicographic pseudo-ID pair
    pub cross_bidder_similarities: Vec<CrossBidderPair>,

    /// The slice above the high-risk cutoff
    pub high_risk_pairs: Vec<CrossBidderPair>,
}

impl SimilarityAnalysis {
    pub fn insufficient() -> Self {
        Self {
            insufficient_data: true,
            total_comparisons: 0,
            cross_bidder_similarities: Vec::new(),
            high_risk_pairs: Vec::new(),
        }
    }
}

// ============================================================================
// Stylometry
// ============================================================================

/// The eight-component style feature vector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StyleFeatures {
    pub avg_word_length: f64,
    pub avg_sentence_length: f64,
    pub lexical_diversity: f64,
    pub punct_frequency: f64,
    pub stopword_frequency: f64,
    pub noun_frequency: f64,
    pub verb_frequency: f64,
    pub adj_frequency: f64,
}

impl StyleFeatures {
    pub fn to_vector(&self) -> [f64; 8] {
        [
            self.avg_word_length,
            self.avg_sentence_length,
            self.lexical_diversity,
            self.punct_frequency,
            self.stopword_frequency,
            self.noun_frequency,
            self.verb_frequency,
            self.adj_frequency,
        ]
    }
}

/// Two bidders writing in a suspiciously similar style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StyleMatch {
    pub bidder1: String,
    pub bidder2: String,
    pub similarity: f64,
}

/// Stylometry engine result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StylometryAnalysis {
    /// True when features came from the simple tokenizer instead of the
    /// linguistic tagger
    pub fallback_mode: bool,

    pub bidder_features: BTreeMap<String, StyleFeatures>,

    /// Pairs above the style threshold, ordered by descending similarity
    /// then lexicographic bidder pair
    pub suspicious_matches: Vec<StyleMatch>,
}

// ============================================================================
// Relationship network
// ============================================================================

/// How a high-risk group was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    Clique,
    Community,
}

impl GroupKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupKind::Clique => "clique",
            GroupKind::Community => "community",
        }
    }
}

/// A group of connected bidders worth human review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HighRiskGroup {
    pub bidders: Vec<String>,
    pub size: usize,
    pub kind: GroupKind,
}

/// One edge of the relationship graph, for explainability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GraphEdgeRecord {
    pub source: String,
    pub target: String,
    pub weight: f64,

    /// Relationship type labels in insertion order
    pub relations: Vec<String>,
}

/// Relationship engine result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NetworkAnalysis {
    pub num_bidders: usize,
    pub num_relationships: usize,

    /// `2|E| / (|V| (|V|-1))`, 0 when one node or fewer
    pub network_density: f64,

    /// Communities of size 2 or more from greedy modularity
    pub communities: Vec<Vec<String>>,

    /// Maximal cliques at or above the configured minimum size
    pub cliques: Vec<Vec<String>>,

    /// Degree centrality per bidder
    pub centrality: BTreeMap<String, f64>,

    pub high_risk_groups: Vec<HighRiskGroup>,

    /// Full edge list with merged weights and relation labels
    pub edges: Vec<GraphEdgeRecord>,
}
