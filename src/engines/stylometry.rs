//! Stylometric authorship similarity
//!
//! Builds one eight-component style vector per bidder over the concatenation
//! of its documents and compares bidders pairwise by cosine. Two modes
//! produce the vector:
//! - Tagged mode, when a linguistic tagger is configured: token lengths,
//!   sentence statistics, lexical diversity, punctuation, stopword and
//!   noun/verb/adjective frequencies.
//! - Fallback mode, without a tagger: a simple tokenizer (whitespace split,
//!   sentences on `.`, punctuation set `.,!?;:`) fills the first four
//!   components and the tagger-dependent four stay 0.
//!
//! Both modes are part of the contract and share the same feature formulas.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::config::StylometryConfig;
use crate::engines::cosine_similarity;
use crate::engines::types::{StyleFeatures, StyleMatch, StylometryAnalysis};
use crate::error::ProviderError;
use crate::model::{RiskSignal, Severity, SignalType};
use crate::providers::{LinguisticTagger, PosTag, TaggedText};

/// Severity cutoff for a single stylometry signal
const SEVERITY_HIGH_CUTOFF: f64 = 0.85;

/// Punctuation set recognized by the fallback tokenizer
const PUNCT_CHARS: &str = ".,!?;:";

pub struct StylometryEngine {
    tagger: Option<Arc<dyn LinguisticTagger>>,
    config: StylometryConfig,
}

impl StylometryEngine {
    pub fn new(tagger: Option<Arc<dyn LinguisticTagger>>, config: StylometryConfig) -> Self {
        Self { tagger, config }
    }

    /// Compare writing styles across bidders.
    ///
    /// Documents are concatenated per bidder, space-joined in submission
    /// order. An absent or unavailable tagger switches every bidder to
    /// fallback mode; any other tagger failure propagates.
    pub fn analyze(
        &self,
        bidder_texts: &BTreeMap<String, BTreeMap<String, String>>,
        document_order: &BTreeMap<String, Vec<String>>,
    ) -> Result<StylometryAnalysis, ProviderError> {
        let mut fallback_mode = self.tagger.is_none();
        let mut bidder_features = BTreeMap::new();

        for (bidder_id, docs) in bidder_texts {
            let combined = combine_documents(docs, document_order.get(bidder_id));
            let features = match (&self.tagger, fallback_mode) {
                (Some(tagger), false) => match tagger.tag(&combined) {
                    Ok(tagged) => tagged_features(&tagged),
                    Err(err) if err.is_unavailable() => {
                        tracing::warn!(error = %err, "linguistic tagger unavailable, using fallback features");
                        fallback_mode = true;
                        fallback_features(&combined)
                    }
                    Err(err) => return Err(err),
                },
                _ => fallback_features(&combined),
            };
            bidder_features.insert(bidder_id.clone(), features);
        }

        // Once any bidder fell back, recompute the rest the same way so all
        // vectors are comparable
        if fallback_mode {
            for (bidder_id, docs) in bidder_texts {
                let combined = combine_documents(docs, document_order.get(bidder_id));
                bidder_features.insert(bidder_id.clone(), fallback_features(&combined));
            }
        }

        let ids: Vec<&String> = bidder_features.keys().collect();
        let mut suspicious_matches = Vec::new();
        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                let similarity = cosine_similarity(
                    &bidder_features[ids[i]].to_vector(),
                    &bidder_features[ids[j]].to_vector(),
                );
                if similarity > self.config.threshold {
                    suspicious_matches.push(StyleMatch {
                        bidder1: ids[i].clone(),
                        bidder2: ids[j].clone(),
                        similarity,
                    });
                }
            }
        }

        suspicious_matches.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.bidder1.cmp(&b.bidder1))
                .then_with(|| a.bidder2.cmp(&b.bidder2))
        });

        tracing::info!(
            bidders = bidder_features.len(),
            matches = suspicious_matches.len(),
            fallback = fallback_mode,
            "stylometry analysis complete"
        );

        Ok(StylometryAnalysis {
            fallback_mode,
            bidder_features,
            suspicious_matches,
        })
    }

    /// One `stylometry` signal per suspicious match
    pub fn signals(&self, analysis: &StylometryAnalysis) -> Vec<RiskSignal> {
        analysis
            .suspicious_matches
            .iter()
            .map(|m| {
                let severity = if m.similarity > SEVERITY_HIGH_CUTOFF {
                    Severity::High
                } else {
                    Severity::Medium
                };
                RiskSignal::new(
                    SignalType::Stylometry,
                    severity,
                    m.similarity,
                    format!(
                        "Similar writing style detected between {} and {}",
                        m.bidder1, m.bidder2
                    ),
                    serde_json::json!({
                        "bidder1": m.bidder1,
                        "bidder2": m.bidder2,
                        "similarity": m.similarity,
                        "fallback_mode": analysis.fallback_mode,
                    }),
                    vec![m.bidder1.clone(), m.bidder2.clone()],
                )
            })
            .collect()
    }
}

/// Space-join a bidder's documents in submission order; handles not present
/// in the order list append in map order
fn combine_documents(
    docs: &BTreeMap<String, String>,
    order: Option<&Vec<String>>,
) -> String {
    match order {
        Some(handles) => {
            let mut parts: Vec<&str> = Vec::new();
            let mut seen = BTreeSet::new();
            for handle in handles {
                if let Some(text) = docs.get(handle) {
                    parts.push(text);
                    seen.insert(handle.clone());
                }
            }
            for (handle, text) in docs {
                if !seen.contains(handle) {
                    parts.push(text);
                }
            }
            parts.join(" ")
        }
        None => docs.values().map(String::as_str).collect::<Vec<_>>().join(" "),
    }
}

/// Feature vector from tagger output
fn tagged_features(tagged: &TaggedText) -> StyleFeatures {
    let total_tokens = tagged.tokens.len();
    if total_tokens == 0 {
        return StyleFeatures::default();
    }
    let total = total_tokens as f64;

    let word_tokens: Vec<&str> = tagged
        .tokens
        .iter()
        .filter(|t| !t.is_punct)
        .map(|t| t.text.as_str())
        .collect();
    let avg_word_length = if word_tokens.is_empty() {
        0.0
    } else {
        word_tokens.iter().map(|t| t.chars().count() as f64).sum::<f64>() / word_tokens.len() as f64
    };

    let unique: BTreeSet<String> = tagged
        .tokens
        .iter()
        .map(|t| t.text.to_lowercase())
        .collect();

    let punct = tagged.tokens.iter().filter(|t| t.is_punct).count() as f64;
    let stopwords = tagged.tokens.iter().filter(|t| t.is_stop).count() as f64;
    let nouns = tagged.tokens.iter().filter(|t| t.pos == PosTag::Noun).count() as f64;
    let verbs = tagged.tokens.iter().filter(|t| t.pos == PosTag::Verb).count() as f64;
    let adjectives = tagged
        .tokens
        .iter()
        .filter(|t| t.pos == PosTag::Adjective)
        .count() as f64;

    StyleFeatures {
        avg_word_length,
        avg_sentence_length: total / tagged.sentence_count.max(1) as f64,
        lexical_diversity: unique.len() as f64 / total,
        punct_frequency: punct / total,
        stopword_frequency: stopwords / total,
        noun_frequency: nouns / total,
        verb_frequency: verbs / total,
        adj_frequency: adjectives / total,
    }
}

/// Feature vector from the simple tokenizer; tagger-dependent components
/// stay 0
fn fallback_features(text: &str) -> StyleFeatures {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() {
        return StyleFeatures::default();
    }
    let total = tokens.len() as f64;

    let is_punct_token = |t: &str| !t.is_empty() && t.chars().all(|c| PUNCT_CHARS.contains(c));

    let word_tokens: Vec<&&str> = tokens.iter().filter(|t| !is_punct_token(t)).collect();
    let avg_word_length = if word_tokens.is_empty() {
        0.0
    } else {
        word_tokens.iter().map(|t| t.chars().count() as f64).sum::<f64>() / word_tokens.len() as f64
    };

    let sentence_count = text
        .split('.')
        .filter(|s| s.chars().any(|c| !c.is_whitespace()))
        .count();

    let unique: BTreeSet<String> = tokens.iter().map(|t| t.to_lowercase()).collect();
    let punct_count = tokens.iter().filter(|t| is_punct_token(t)).count() as f64;

    StyleFeatures {
        avg_word_length,
        avg_sentence_length: total / sentence_count.max(1) as f64,
        lexical_diversity: unique.len() as f64 / total,
        punct_frequency: punct_count / total,
        stopword_frequency: 0.0,
        noun_frequency: 0.0,
        verb_frequency: 0.0,
        adj_frequency: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::TaggedToken;

    fn engine() -> StylometryEngine {
        StylometryEngine::new(None, StylometryConfig::default())
    }

    fn nested(entries: &[(&str, &str, &str)]) -> BTreeMap<String, BTreeMap<String, String>> {
        let mut map: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        for (bidder, handle, text) in entries {
            map.entry(bidder.to_string())
                .or_default()
                .insert(handle.to_string(), text.to_string());
        }
        map
    }

    #[test]
    fn test_fallback_features_basic_text() {
        let features = fallback_features("We deliver quality works. We deliver on time.");
        // 8 whitespace tokens, none punctuation-only, 2 sentences
        assert_eq!(features.punct_frequency, 0.0);
        assert!((features.avg_sentence_length - 4.0).abs() < 1e-9);
        // unique lowercase: we, deliver, quality, works., on, time. -> 6/8
        assert!((features.lexical_diversity - 6.0 / 8.0).abs() < 1e-9);
        assert_eq!(features.stopword_frequency, 0.0);
        assert_eq!(features.noun_frequency, 0.0);
    }

    #[test]
    fn test_fallback_punctuation_only_tokens() {
        let features = fallback_features("fast , reliable ; done .");
        // 6 tokens, 3 punctuation-only
        assert!((features.punct_frequency - 0.5).abs() < 1e-9);
        // word lengths: fast, reliable, done -> (4 + 8 + 4) / 3
        assert!((features.avg_word_length - 16.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_text_yields_zero_vector() {
        let features = fallback_features("");
        assert_eq!(features.to_vector(), [0.0; 8]);
    }

    #[test]
    fn test_tagged_features_counts() {
        let tagged = TaggedText {
            tokens: vec![
                TaggedToken::stopword("the"),
                TaggedToken::new("contractor", PosTag::Noun),
                TaggedToken::new("delivers", PosTag::Verb),
                TaggedToken::new("excellent", PosTag::Adjective),
                TaggedToken::new("results", PosTag::Noun),
                TaggedToken::punctuation("."),
            ],
            sentence_count: 1,
        };
        let features = tagged_features(&tagged);
        assert!((features.noun_frequency - 2.0 / 6.0).abs() < 1e-9);
        assert!((features.verb_frequency - 1.0 / 6.0).abs() < 1e-9);
        assert!((features.adj_frequency - 1.0 / 6.0).abs() < 1e-9);
        assert!((features.stopword_frequency - 1.0 / 6.0).abs() < 1e-9);
        assert!((features.punct_frequency - 1.0 / 6.0).abs() < 1e-9);
        assert_eq!(features.avg_sentence_length, 6.0);
        // word lengths exclude the period: the, contractor, delivers, excellent, results
        assert!((features.avg_word_length - 37.0 / 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_identical_texts_match_with_high_severity() {
        let text = "We will complete the project on schedule. Our team has many years of experience.";
        let texts = nested(&[("b1", "a.pdf", text), ("b2", "a.pdf", text)]);
        let analysis = engine().analyze(&texts, &BTreeMap::new()).unwrap();

        assert!(analysis.fallback_mode);
        assert_eq!(analysis.suspicious_matches.len(), 1);
        assert!((analysis.suspicious_matches[0].similarity - 1.0).abs() < 1e-9);

        let signals = engine().signals(&analysis);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].severity, Severity::High);
        assert_eq!(signals[0].signal_type, SignalType::Stylometry);
    }

    #[test]
    fn test_empty_documents_produce_no_matches() {
        let texts = nested(&[("b1", "a.pdf", ""), ("b2", "a.pdf", "")]);
        let analysis = engine().analyze(&texts, &BTreeMap::new()).unwrap();
        assert!(analysis.suspicious_matches.is_empty());
    }

    #[test]
    fn test_documents_concatenated_in_submission_order() {
        let mut docs = BTreeMap::new();
        docs.insert("z_second.pdf".to_string(), "second part".to_string());
        docs.insert("a_first.pdf".to_string(), "first part".to_string());
        let order = vec!["z_second.pdf".to_string(), "a_first.pdf".to_string()];
        assert_eq!(
            combine_documents(&docs, Some(&order)),
            "second part first part"
        );
        // without an order list, map order applies
        assert_eq!(combine_documents(&docs, None), "first part second part");
    }

    #[test]
    fn test_unavailable_tagger_falls_back() {
        struct AbsentTagger;
        impl LinguisticTagger for AbsentTagger {
            fn tag(&self, _text: &str) -> Result<TaggedText, ProviderError> {
                Err(ProviderError::Unavailable("model missing".into()))
            }
        }

        let engine = StylometryEngine::new(Some(Arc::new(AbsentTagger)), StylometryConfig::default());
        let texts = nested(&[("b1", "a.pdf", "some text here"), ("b2", "a.pdf", "other words now")]);
        let analysis = engine.analyze(&texts, &BTreeMap::new()).unwrap();
        assert!(analysis.fallback_mode);
        assert_eq!(analysis.bidder_features.len(), 2);
    }

    #[test]
    fn test_failing_tagger_propagates() {
        struct BrokenTagger;
        impl LinguisticTagger for BrokenTagger {
            fn tag(&self, _text: &str) -> Result<TaggedText, ProviderError> {
                Err(ProviderError::Model("tagging crashed".into()))
            }
        }

        let engine = StylometryEngine::new(Some(Arc::new(BrokenTagger)), StylometryConfig::default());
        let texts = nested(&[("b1", "a.pdf", "some text")]);
        assert!(engine.analyze(&texts, &BTreeMap::new()).is_err());
    }
}
