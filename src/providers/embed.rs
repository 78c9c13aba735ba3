//! Embedding provider interface
//!
//! Embeddings back the semantic similarity engine. Rows are ordered as the
//! input texts; vectors must be usable with cosine similarity.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::error::ProviderError;

/// Embedding model provider
pub trait Embedder: Send + Sync {
    /// Embed `texts` into one vector per row, in input order
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError>;
}

/// Deterministic offline embedder: hashed bag-of-words term frequencies,
/// L2-normalized.
///
/// Not a semantic model. It maps byte-identical texts to identical vectors
/// (cosine 1.0) and shares buckets only through common tokens, which is
/// enough for the bundled binary and for deterministic tests.
#[derive(Debug, Clone)]
pub struct HashingTfEmbedder {
    dimensions: usize,
}

impl HashingTfEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            token.to_lowercase().hash(&mut hasher);
            let bucket = (hasher.finish() % self.dimensions as u64) as usize;
            vector[bucket] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

impl Default for HashingTfEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

impl Embedder for HashingTfEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }
}
