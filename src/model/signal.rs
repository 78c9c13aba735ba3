//! Risk signals
//!
//! A risk signal is a typed, scored, evidence-bearing finding emitted by one
//! engine. Signals are append-only within a run and never accuse; they flag
//! patterns for human review.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Which engine family produced a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    PriceAnomaly,
    DocumentSimilarity,
    Stylometry,
    RelationshipNetwork,
}

impl SignalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::PriceAnomaly => "price_anomaly",
            SignalType::DocumentSimilarity => "document_similarity",
            SignalType::Stylometry => "stylometry",
            SignalType::RelationshipNetwork => "relationship_network",
        }
    }
}

/// Signal severity
///
/// Each engine maps its own score ladder onto these three levels; the
/// per-engine cutoffs live with the engines.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Ladder used by the price engine: high above 0.7, medium above 0.4
    pub fn from_risk_score(score: f64) -> Self {
        if score > 0.7 {
            Severity::High
        } else if score > 0.4 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

/// One evidence-bearing finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RiskSignal {
    /// Engine family that produced the signal
    pub signal_type: SignalType,

    /// Severity level on the emitting engine's ladder
    pub severity: Severity,

    /// Normalized score in [0, 1]
    pub score: f64,

    /// Human-readable description of the finding
    pub description: String,

    /// Structured payload the engine chose to attach
    pub evidence: serde_json::Value,

    /// Bidders implicated by the finding, sorted and deduplicated
    pub affected_bidders: Vec<String>,
}

impl RiskSignal {
    pub fn new(
        signal_type: SignalType,
        severity: Severity,
        score: f64,
        description: impl Into<String>,
        evidence: serde_json::Value,
        affected_bidders: Vec<String>,
    ) -> Self {
        let mut affected = affected_bidders;
        affected.sort();
        affected.dedup();
        Self {
            signal_type,
            severity,
            score: score.clamp(0.0, 1.0),
            description: description.into(),
            evidence,
            affected_bidders: affected,
        }
    }
}
