//! Analytic engines
//!
//! The four detectors behind the pipeline stages:
//! - Price anomaly and cover-bid detection over numeric bids
//! - Cross-bidder document similarity via embeddings
//! - Stylometric authorship similarity
//! - Relationship-graph construction and community/clique analysis

pub mod price;
pub mod relationship;
pub mod semantic;
pub mod stylometry;
pub mod types;

pub use price::PriceEngine;
pub use relationship::RelationshipEngine;
pub use semantic::SemanticEngine;
pub use stylometry::StylometryEngine;

/// Cosine similarity with zero-vector guard; zero norm compares as 0
pub(crate) fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_of_identical_vectors_is_one() {
        let v = [1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_of_orthogonal_vectors_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn test_cosine_with_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }
}
