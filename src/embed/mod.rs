//! Embedding generation and similarity ranking
//!
//! This module provides an abstraction over embedding providers with:
//! - A trait for different embedding backends
//! - A Gemini HTTP backend
//! - Cosine similarity ranking used by chat retrieval
//!
//! The same service instance must be used for chunks and queries within a
//! session so similarity scores stay comparable.

mod http;

pub use http::*;

use crate::error::{Error, Result};
use async_trait::async_trait;

/// Trait for embedding providers
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Embed a batch of texts, one fixed-length vector per input
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding dimension
    fn dimension(&self) -> usize;
}

/// Cosine similarity between two vectors (0.0 for mismatched or zero-norm input)
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Rank candidate vectors by similarity to a query vector.
///
/// Returns up to `k` `(candidate_index, score)` pairs in non-increasing
/// score order.
pub fn rank_by_similarity(query: &[f32], candidates: &[Vec<f32>], k: usize) -> Vec<(usize, f32)> {
    let mut scored: Vec<(usize, f32)> = candidates
        .iter()
        .enumerate()
        .map(|(i, vector)| (i, cosine_similarity(query, vector)))
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(k);
    scored
}

/// Validate that every returned vector matches the expected dimension
pub fn validate_dimensions(embeddings: &[Vec<f32>], expected: usize) -> Result<()> {
    if let Some(mismatch) = embeddings.iter().find(|vector| vector.len() != expected) {
        return Err(Error::Embedding(format!(
            "embedding dimension mismatch: expected {}, got {}",
            expected,
            mismatch.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity_basic() {
        let a = vec![1.0, 0.0];
        let b = vec![1.0, 0.0];
        let c = vec![0.0, 1.0];

        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&a, &c).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_rank_non_increasing() {
        let query = vec![1.0, 0.0];
        let candidates = vec![
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![-1.0, 0.0],
        ];

        let ranked = rank_by_similarity(&query, &candidates, 4);

        assert_eq!(ranked[0].0, 1);
        for pair in ranked.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
    }

    #[test]
    fn test_rank_truncates_to_k() {
        let query = vec![1.0];
        let candidates = vec![vec![1.0]; 10];

        assert_eq!(rank_by_similarity(&query, &candidates, 3).len(), 3);
    }

    #[test]
    fn test_validate_dimensions() {
        assert!(validate_dimensions(&[vec![0.0; 4], vec![1.0; 4]], 4).is_ok());
        assert!(validate_dimensions(&[vec![0.0; 4], vec![1.0; 3]], 4).is_err());
    }
}
