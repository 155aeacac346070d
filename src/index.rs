//! # Vector Index Module
//!
//! ## Purpose
//! Exact nearest-neighbor index over one corpus's embedding vectors. One
//! index is built per corpus at startup and queried per request; indexes
//! are read-only after build since corpora are static per process lifetime.
//!
//! ## Input/Output Specification
//! - **Input**: Corpus embedding vectors (build), a query vector + k (search)
//! - **Output**: `(record_index, score)` pairs sorted by descending
//!   similarity, ties broken by corpus insertion order
//! - **Scores**: Cosine similarity clamped to [0, 1]

use crate::embedding::EmbeddingVector;

/// Brute-force cosine similarity index over a fixed vector set
pub struct VectorIndex {
    vectors: Vec<EmbeddingVector>,
}

impl VectorIndex {
    /// Build the index from corpus embeddings. Read-only afterwards.
    pub fn build(vectors: Vec<EmbeddingVector>) -> Self {
        Self { vectors }
    }

    /// Number of vectors held by the index
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the index holds no vectors
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Search for the `k` most similar vectors.
    ///
    /// Results are sorted by strictly non-increasing similarity; equal
    /// scores keep corpus insertion order so results stay reproducible.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<(usize, f32)> {
        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, cosine_score(query, v)))
            .collect();

        // Stable sort preserves insertion order among ties
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        scored
    }
}

/// Cosine similarity of two vectors, clamped to [0, 1].
///
/// Corpus and query vectors are L2-normalized by the encoder, so the dot
/// product already is the cosine; the clamp guards against floating-point
/// drift and zero vectors.
fn cosine_score(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    dot.clamp(0.0, 1.0)
}
