//! Analysis thresholds and guards

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Price engine thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PriceConfig {
    /// Z-score cutoff for outlier detection
    pub outlier_threshold: f64,

    /// Relative margin under which two high bids count as clustered
    pub cover_margin: f64,

    /// Minimum gap above the lowest bid before a bid is considered
    /// suspiciously high
    pub cover_gap: f64,
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            outlier_threshold: 2.0,
            cover_margin: 0.05,
            cover_gap: 0.15,
        }
    }
}

/// Semantic similarity thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SemanticConfig {
    /// Minimum cosine similarity for a document pair to be recorded
    pub threshold: f64,

    /// Cutoff above which a cross-bidder pair enters the high-risk slice
    pub high_risk_threshold: f64,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            threshold: 0.70,
            high_risk_threshold: 0.85,
        }
    }
}

/// Stylometry thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct StylometryConfig {
    /// Style-vector cosine cutoff above which a bidder pair is surfaced
    pub threshold: f64,
}

impl Default for StylometryConfig {
    fn default() -> Self {
        Self { threshold: 0.80 }
    }
}

/// Complete pipeline configuration with the recognized options and defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AnalysisConfig {
    pub price: PriceConfig,
    pub semantic: SemanticConfig,
    pub stylometry: StylometryConfig,

    /// Minimum number of bidders before price collusion analysis runs
    pub min_bidders_for_collusion: usize,

    /// Minimum clique size surfaced as a high-risk group
    pub min_clique_size: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            price: PriceConfig::default(),
            semantic: SemanticConfig::default(),
            stylometry: StylometryConfig::default(),
            min_bidders_for_collusion: 2,
            min_clique_size: 3,
        }
    }
}

impl AnalysisConfig {
    /// Validate options and return an error message if any value is out of
    /// range
    pub fn validate(&self) -> Result<(), String> {
        if self.price.outlier_threshold <= 0.0 {
            return Err(format!(
                "price.outlier_threshold must be positive, got {}",
                self.price.outlier_threshold
            ));
        }
        for (name, value) in [
            ("price.cover_margin", self.price.cover_margin),
            ("price.cover_gap", self.price.cover_gap),
            ("semantic.threshold", self.semantic.threshold),
            (
                "semantic.high_risk_threshold",
                self.semantic.high_risk_threshold,
            ),
            ("stylometry.threshold", self.stylometry.threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} must be between 0 and 1, got {}", name, value));
            }
        }
        if self.min_bidders_for_collusion < 1 {
            return Err("min_bidders_for_collusion must be at least 1".to_string());
        }
        if self.min_clique_size < 2 {
            return Err(format!(
                "min_clique_size must be at least 2, got {}",
                self.min_clique_size
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.price.outlier_threshold, 2.0);
        assert_eq!(config.semantic.threshold, 0.70);
        assert_eq!(config.stylometry.threshold, 0.80);
        assert_eq!(config.min_bidders_for_collusion, 2);
        assert_eq!(config.min_clique_size, 3);
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let mut config = AnalysisConfig::default();
        config.semantic.threshold = 1.2;
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default();
        config.price.outlier_threshold = 0.0;
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default();
        config.min_clique_size = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_deserialization_fills_defaults() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{"semantic": {"threshold": 0.6}}"#).unwrap();
        assert_eq!(config.semantic.threshold, 0.6);
        assert_eq!(config.semantic.high_risk_threshold, 0.85);
        assert_eq!(config.price.cover_gap, 0.15);
    }
}
