//! Signal aggregation
//!
//! Pure functions over the accumulated signals. The aggregator never
//! invents signals; it derives the overall scalar and per-severity views.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::{RiskSignal, Severity};

/// Maximum signal score, or 0 when no signals exist
pub fn overall_risk_score(signals: &[RiskSignal]) -> f64 {
    signals
        .iter()
        .map(|s| s.score)
        .fold(0.0, f64::max)
}

/// Signal counts per severity bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SeverityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

pub fn severity_counts(signals: &[RiskSignal]) -> SeverityCounts {
    let mut counts = SeverityCounts::default();
    for signal in signals {
        match signal.severity {
            Severity::High => counts.high += 1,
            Severity::Medium => counts.medium += 1,
            Severity::Low => counts.low += 1,
        }
    }
    counts
}

/// The signals in one severity bucket, in emission order
pub fn signals_with_severity(signals: &[RiskSignal], severity: Severity) -> Vec<&RiskSignal> {
    signals.iter().filter(|s| s.severity == severity).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SignalType;

    fn signal(severity: Severity, score: f64) -> RiskSignal {
        RiskSignal::new(
            SignalType::PriceAnomaly,
            severity,
            score,
            "test",
            serde_json::Value::Null,
            vec![],
        )
    }

    #[test]
    fn test_overall_is_max_score() {
        let signals = vec![
            signal(Severity::Low, 0.3),
            signal(Severity::High, 0.95),
            signal(Severity::Medium, 0.6),
        ];
        assert_eq!(overall_risk_score(&signals), 0.95);
    }

    #[test]
    fn test_overall_is_zero_without_signals() {
        assert_eq!(overall_risk_score(&[]), 0.0);
    }

    #[test]
    fn test_severity_counts_and_filtering() {
        let signals = vec![
            signal(Severity::Low, 0.3),
            signal(Severity::High, 0.95),
            signal(Severity::High, 0.91),
        ];
        let counts = severity_counts(&signals);
        assert_eq!(counts.high, 2);
        assert_eq!(counts.medium, 0);
        assert_eq!(counts.low, 1);
        assert_eq!(signals_with_severity(&signals, Severity::High).len(), 2);
    }
}
