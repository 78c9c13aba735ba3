//! Linguistic tagging provider interface
//!
//! An optional part-of-speech tagger backing the stylometry engine. When no
//! tagger is configured the engine falls back to a simple tokenizer and
//! zeroes the tagger-dependent features; see the stylometry module.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Coarse part-of-speech classes consumed by the stylometry features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PosTag {
    Noun,
    Verb,
    Adjective,
    Other,
}

/// One token with its linguistic annotations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TaggedToken {
    pub text: String,
    pub pos: PosTag,
    pub is_stop: bool,
    pub is_punct: bool,
}

impl TaggedToken {
    pub fn new(text: impl Into<String>, pos: PosTag) -> Self {
        Self {
            text: text.into(),
            pos,
            is_stop: false,
            is_punct: false,
        }
    }

    pub fn stopword(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            pos: PosTag::Other,
            is_stop: true,
            is_punct: false,
        }
    }

    pub fn punctuation(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            pos: PosTag::Other,
            is_stop: false,
            is_punct: true,
        }
    }
}

/// Tagger output for one text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TaggedText {
    pub tokens: Vec<TaggedToken>,
    pub sentence_count: usize,
}

/// Part-of-speech tagging provider
pub trait LinguisticTagger: Send + Sync {
    fn tag(&self, text: &str) -> Result<TaggedText, ProviderError>;
}
