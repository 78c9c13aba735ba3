//! Price anomaly and cover-bid detection
//!
//! Screens the bid distribution for coordination patterns:
//! - Z-score and IQR outliers (needs at least 3 bids)
//! - Clustered high bids far above the lowest offer (cover bidding)
//! - Round-number pricing
//!
//! The additive risk score caps at 1.0; a `price_anomaly` signal is emitted
//! only when the score is positive.

use std::collections::BTreeMap;

use statrs::statistics::Statistics;

use crate::config::PriceConfig;
use crate::engines::types::{
    CoverBidAnalysis, CoverBidPattern, OutlierAnalysis, PriceAnalysis, PriceRange,
};
use crate::model::{RiskSignal, Severity, SignalType};

pub struct PriceEngine {
    config: PriceConfig,
    min_bidders: usize,
}

impl PriceEngine {
    pub fn new(config: PriceConfig, min_bidders: usize) -> Self {
        Self {
            config,
            min_bidders,
        }
    }

    /// Run the full price screen over `bidder_id -> bid_amount`.
    ///
    /// Bids are assumed validated (positive, finite) before this point.
    pub fn analyze(&self, bids: &BTreeMap<String, f64>) -> PriceAnalysis {
        if bids.len() < self.min_bidders {
            tracing::debug!(
                bids = bids.len(),
                required = self.min_bidders,
                "too few bidders for price collusion analysis"
            );
            return PriceAnalysis {
                insufficient_data: true,
                outlier_analysis: None,
                cover_bidding: None,
                round_number_ratio: 0.0,
                risk_indicators: Vec::new(),
                risk_score: 0.0,
                severity: Severity::Low,
            };
        }

        let outlier_analysis = self.detect_outliers(bids);
        let cover_bidding = self.detect_cover_bidding(bids);

        let round_count = bids.values().filter(|p| is_round_number(**p)).count();
        let round_number_ratio = round_count as f64 / bids.len() as f64;

        let mut risk_indicators = Vec::new();
        let mut risk_score = 0.0;

        if let Some(outliers) = &outlier_analysis {
            if outliers.coefficient_variation < 0.1 {
                risk_indicators.push("Low price variation (potential coordination)".to_string());
                risk_score += 0.3;
            }
        }

        let has_cover_patterns = cover_bidding
            .as_ref()
            .map(|c| !c.patterns.is_empty())
            .unwrap_or(false);
        if has_cover_patterns {
            risk_indicators.push("Clustered high bids detected".to_string());
            risk_score += 0.4;
        }

        if round_number_ratio > 0.5 {
            risk_indicators.push("High proportion of round number bids".to_string());
            risk_score += 0.2;
        }

        let risk_score = f64::min(risk_score, 1.0);

        PriceAnalysis {
            insufficient_data: false,
            outlier_analysis,
            cover_bidding,
            round_number_ratio,
            risk_indicators,
            risk_score,
            severity: Severity::from_risk_score(risk_score),
        }
    }

    /// Zero or one `price_anomaly` signal for an analysis result
    pub fn signals(&self, analysis: &PriceAnalysis, bids: &BTreeMap<String, f64>) -> Vec<RiskSignal> {
        if analysis.risk_score <= 0.0 {
            return Vec::new();
        }
        vec![RiskSignal::new(
            SignalType::PriceAnomaly,
            analysis.severity,
            analysis.risk_score,
            format!(
                "Price analysis detected {} risk indicators",
                analysis.risk_indicators.len()
            ),
            serde_json::to_value(analysis).unwrap_or(serde_json::Value::Null),
            bids.keys().cloned().collect(),
        )]
    }

    /// Statistical outlier screen; None below 3 bids
    fn detect_outliers(&self, bids: &BTreeMap<String, f64>) -> Option<OutlierAnalysis> {
        if bids.len() < 3 {
            return None;
        }

        let prices: Vec<f64> = bids.values().copied().collect();
        let mean = prices.iter().mean();
        let std_dev = prices.iter().population_std_dev();
        let coefficient_variation = if mean > 0.0 { std_dev / mean } else { 0.0 };

        let mut sorted = prices.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let median = percentile(&sorted, 50.0);
        let q1 = percentile(&sorted, 25.0);
        let q3 = percentile(&sorted, 75.0);
        let iqr = q3 - q1;
        let lower_bound = q1 - 1.5 * iqr;
        let upper_bound = q3 + 1.5 * iqr;

        let mut z_score_outliers = Vec::new();
        let mut iqr_outliers = Vec::new();
        for (bidder_id, price) in bids {
            if std_dev > 0.0 && ((price - mean) / std_dev).abs() > self.config.outlier_threshold {
                z_score_outliers.push(bidder_id.clone());
            }
            if *price < lower_bound || *price > upper_bound {
                iqr_outliers.push(bidder_id.clone());
            }
        }

        let min = sorted[0];
        let max = sorted[sorted.len() - 1];

        Some(OutlierAnalysis {
            mean,
            median,
            std_dev,
            coefficient_variation,
            z_score_outliers,
            iqr_outliers,
            price_range: PriceRange {
                min,
                max,
                range: max - min,
            },
        })
    }

    /// Clustered-high-bid screen; None below 2 bids.
    ///
    /// The gap gate applies to the first member of a pair only; the partner
    /// just has to sit within the relative margin.
    fn detect_cover_bidding(&self, bids: &BTreeMap<String, f64>) -> Option<CoverBidAnalysis> {
        if bids.len() < 2 {
            return None;
        }

        let mut sorted: Vec<(&String, f64)> = bids.iter().map(|(id, p)| (id, *p)).collect();
        sorted.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });

        let lowest_bid = sorted[0].1;
        let highest_bid = sorted[sorted.len() - 1].1;

        let mut patterns = Vec::new();
        for i in 1..sorted.len() {
            let price_gap = (sorted[i].1 - lowest_bid) / lowest_bid;
            if price_gap <= self.config.cover_gap {
                continue;
            }
            for j in (i + 1)..sorted.len() {
                let relative_diff = (sorted[j].1 - sorted[i].1).abs() / sorted[i].1;
                if relative_diff < self.config.cover_margin {
                    patterns.push(CoverBidPattern {
                        bidder1: sorted[i].0.clone(),
                        bidder2: sorted[j].0.clone(),
                        price1: sorted[i].1,
                        price2: sorted[j].1,
                        difference_pct: relative_diff * 100.0,
                    });
                }
            }
        }

        Some(CoverBidAnalysis {
            lowest_bid,
            highest_bid,
            patterns,
        })
    }
}

/// Linear interpolation between order statistics over pre-sorted values
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = (p / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let fraction = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// Divisibility by 500 covers both the 500 and 1000 round-number cases
fn is_round_number(price: f64) -> bool {
    let nearest = (price / 500.0).round() * 500.0;
    (price - nearest).abs() < 1e-6
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> PriceEngine {
        PriceEngine::new(PriceConfig::default(), 2)
    }

    fn bids(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
        entries
            .iter()
            .map(|(id, p)| (id.to_string(), *p))
            .collect()
    }

    #[test]
    fn test_percentile_linear_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&sorted, 0.0), 1.0);
        assert_eq!(percentile(&sorted, 100.0), 4.0);
        assert_eq!(percentile(&sorted, 50.0), 2.5);
        assert_eq!(percentile(&sorted, 25.0), 1.75);
        assert_eq!(percentile(&sorted, 75.0), 3.25);
    }

    #[test]
    fn test_identical_bids_trigger_low_variation() {
        let analysis = engine().analyze(&bids(&[
            ("b1", 100_000.0),
            ("b2", 100_000.0),
            ("b3", 100_000.0),
        ]));

        let outliers = analysis.outlier_analysis.as_ref().unwrap();
        assert_eq!(outliers.coefficient_variation, 0.0);
        assert_eq!(outliers.std_dev, 0.0);
        assert!(analysis
            .risk_indicators
            .iter()
            .any(|i| i.contains("Low price variation")));
        // 100 000 is also a round number, so both indicators fire
        assert!((analysis.risk_score - 0.5).abs() < 1e-12);
        assert_eq!(analysis.severity, Severity::Medium);
    }

    #[test]
    fn test_z_score_outlier_flagged() {
        let analysis = engine().analyze(&bids(&[
            ("b1", 101.0),
            ("b2", 99.0),
            ("b3", 100.0),
            ("b4", 101.0),
            ("b5", 99.0),
            ("b6", 100.0),
            ("b7", 100.0),
            ("b8", 250.0),
        ]));
        let outliers = analysis.outlier_analysis.unwrap();
        assert_eq!(outliers.z_score_outliers, vec!["b8"]);
        assert_eq!(outliers.iqr_outliers, vec!["b8"]);
    }

    #[test]
    fn test_outliers_need_three_bids() {
        let analysis = engine().analyze(&bids(&[("b1", 100.0), ("b2", 200.0)]));
        assert!(analysis.outlier_analysis.is_none());
        assert!(!analysis.insufficient_data);
    }

    #[test]
    fn test_cover_bid_pair_detected() {
        let analysis = engine().analyze(&bids(&[
            ("b1", 80_000.0),
            ("b2", 100_000.0),
            ("b3", 101_000.0),
        ]));

        let cover = analysis.cover_bidding.as_ref().unwrap();
        assert_eq!(cover.lowest_bid, 80_000.0);
        assert_eq!(cover.patterns.len(), 1);
        let pattern = &cover.patterns[0];
        assert_eq!(pattern.bidder1, "b2");
        assert_eq!(pattern.bidder2, "b3");
        assert!((pattern.difference_pct - 1.0).abs() < 1e-9);
        assert!(analysis.risk_score >= 0.4);
    }

    #[test]
    fn test_gap_gate_applies_to_first_member_only() {
        // b2 sits 16% above lowest, b3 within 5% of b2 but b3's own gap is
        // 19%; the pair must still be emitted once, anchored at b2
        let analysis = engine().analyze(&bids(&[
            ("b1", 100_000.0),
            ("b2", 116_000.0),
            ("b3", 119_000.0),
        ]));
        let cover = analysis.cover_bidding.unwrap();
        let anchors: Vec<&str> = cover.patterns.iter().map(|p| p.bidder1.as_str()).collect();
        assert!(anchors.contains(&"b2"));
    }

    #[test]
    fn test_bids_below_gap_produce_no_patterns() {
        let analysis = engine().analyze(&bids(&[
            ("b1", 100_000.0),
            ("b2", 104_000.0),
            ("b3", 106_000.0),
        ]));
        assert!(analysis.cover_bidding.unwrap().patterns.is_empty());
    }

    #[test]
    fn test_round_number_ratio() {
        let analysis = engine().analyze(&bids(&[
            ("b1", 100_000.0),
            ("b2", 105_000.0),
            ("b3", 110_000.0),
            ("b4", 115_000.0),
        ]));
        assert_eq!(analysis.round_number_ratio, 1.0);
        assert!(analysis.risk_score >= 0.2);

        assert!(is_round_number(100_500.0));
        assert!(!is_round_number(100_250.0));
        assert!(!is_round_number(99_999.0));
    }

    #[test]
    fn test_insufficient_data_below_min_bidders() {
        let analysis = engine().analyze(&bids(&[("b1", 100.0)]));
        assert!(analysis.insufficient_data);
        assert_eq!(analysis.risk_score, 0.0);
        assert!(engine().signals(&analysis, &bids(&[("b1", 100.0)])).is_empty());
    }

    #[test]
    fn test_signal_emitted_only_for_positive_score() {
        let quiet = bids(&[("b1", 99_123.0), ("b2", 123_459.0), ("b3", 150_987.0)]);
        let analysis = engine().analyze(&quiet);
        assert_eq!(analysis.risk_score, 0.0);
        assert!(engine().signals(&analysis, &quiet).is_empty());

        let noisy = bids(&[("b1", 80_000.0), ("b2", 100_000.0), ("b3", 101_000.0)]);
        let analysis = engine().analyze(&noisy);
        let signals = engine().signals(&analysis, &noisy);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].signal_type, SignalType::PriceAnomaly);
        assert_eq!(signals[0].affected_bidders, vec!["b1", "b2", "b3"]);
        assert!(signals[0].score > 0.0 && signals[0].score <= 1.0);
    }

    #[test]
    fn test_severity_ladder() {
        // cv < 0.1 and cover pattern and round numbers: 0.3 + 0.4 + 0.2
        let analysis = engine().analyze(&bids(&[
            ("b1", 100_000.0),
            ("b2", 118_000.0),
            ("b3", 118_500.0),
            ("b4", 119_000.0),
        ]));
        assert!(analysis.risk_score > 0.7);
        assert_eq!(analysis.severity, Severity::High);
    }
}
