//! # Embedding Encoder Module
//!
//! ## Purpose
//! Deterministic text-to-vector encoding used both to build the corpus
//! indexes at startup and to encode incoming queries at request time.
//!
//! ## Input/Output Specification
//! - **Input**: Arbitrary UTF-8 text
//! - **Output**: Fixed-dimension, L2-normalized dense vector
//! - **Determinism**: Identical input yields bit-identical output
//!
//! ## Key Features
//! - Feature hashing over NFKC-normalized, lowercased word tokens
//!   (Unicode letter/digit classes, so non-Latin scripts tokenize too)
//! - FNV-1a bucket assignment with fixed constants, so vectors are stable
//!   across processes and platforms
//! - Empty or whitespace-only input yields the zero vector, which scores
//!   zero similarity everywhere and lets retrieval degrade gracefully

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Fixed-length, L2-normalized embedding vector
pub type EmbeddingVector = Vec<f32>;

/// Deterministic feature-hashing encoder
pub struct Embedder {
    dimension: usize,
    token_regex: Regex,
}

impl Embedder {
    /// Create an encoder producing vectors of the given dimension
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            token_regex: Regex::new(r"[\p{L}\p{N}]+").expect("static token pattern"),
        }
    }

    /// Vector dimension produced by this encoder
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Encode text into a fixed-dimension, L2-normalized vector
    pub fn encode(&self, text: &str) -> EmbeddingVector {
        let mut vector = vec![0.0f32; self.dimension];

        let normalized: String = text.nfkc().collect::<String>().to_lowercase();
        for token in self.token_regex.find_iter(&normalized) {
            let bucket = (fnv1a(token.as_str().as_bytes()) % self.dimension as u64) as usize;
            vector[bucket] += 1.0;
        }

        l2_normalize(&mut vector);
        vector
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for &byte in bytes {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}
