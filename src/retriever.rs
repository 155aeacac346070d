//! # Retriever Module
//!
//! ## Purpose
//! Orchestrates query embedding and top-k search against both corpus
//! indexes, applies relevance thresholding, and returns a bounded evidence
//! set for the prompt assembler.
//!
//! ## Input/Output Specification
//! - **Input**: Scenario text (free text, possibly empty or noisy)
//! - **Output**: `EvidenceSet` with at most `top_k_articles` articles and
//!   `top_k_cases` cases, each above the similarity threshold
//! - **Degradation**: Empty retrieval is a normal outcome, never an error
//!
//! ## Key Features
//! - One encoding per request shared by both index queries
//! - A single threshold/ranking path parameterized over corpus kind, so
//!   article and case retrieval cannot drift apart

use crate::config::RetrievalConfig;
use crate::corpus::{ArticleRecord, CaseRecord, CorpusStore};
use crate::embedding::Embedder;
use crate::index::VectorIndex;
use serde::Serialize;
use std::sync::Arc;

/// A retrieved record with its similarity score and rank
#[derive(Debug, Clone, Serialize)]
pub struct RetrievedEvidence<T> {
    /// The source record
    pub record: T,
    /// Cosine similarity in [0, 1]
    pub score: f32,
    /// Zero-based rank within its corpus for this request
    pub rank: usize,
}

/// Bounded evidence retrieved for one request, discarded afterwards
#[derive(Debug, Clone, Serialize, Default)]
pub struct EvidenceSet {
    pub articles: Vec<RetrievedEvidence<ArticleRecord>>,
    pub cases: Vec<RetrievedEvidence<CaseRecord>>,
}

impl EvidenceSet {
    /// Total number of evidence entries across both corpora
    pub fn len(&self) -> usize {
        self.articles.len() + self.cases.len()
    }

    /// Whether no evidence cleared the threshold
    pub fn is_empty(&self) -> bool {
        self.articles.is_empty() && self.cases.is_empty()
    }
}

/// Dual-index retriever over the immutable corpus store
pub struct Retriever {
    store: Arc<CorpusStore>,
    embedder: Embedder,
    article_index: VectorIndex,
    case_index: VectorIndex,
    config: RetrievalConfig,
}

impl Retriever {
    /// Build both indexes from the corpus store embeddings
    pub fn new(store: Arc<CorpusStore>, embedder: Embedder, config: RetrievalConfig) -> Self {
        let article_vectors = store
            .articles()
            .iter()
            .map(|a| embedder.encode(&CorpusStore::article_embed_text(a)))
            .collect();
        let case_vectors = store
            .cases()
            .iter()
            .map(|c| embedder.encode(&CorpusStore::case_embed_text(c)))
            .collect();

        Self {
            store,
            embedder,
            article_index: VectorIndex::build(article_vectors),
            case_index: VectorIndex::build(case_vectors),
            config,
        }
    }

    /// Retrieve thresholded, rank-ordered evidence for a scenario.
    ///
    /// The scenario is encoded once and the same query vector is run
    /// against both indexes. Zero hits above threshold is a normal result:
    /// the reasoning stage then has no grounding evidence and is expected
    /// to report no-violation or inconclusive findings.
    pub fn retrieve(&self, scenario: &str) -> EvidenceSet {
        let query = self.embedder.encode(scenario);

        let articles = ranked_hits(
            &self.article_index,
            &query,
            self.config.top_k_articles,
            self.config.min_similarity,
        )
        .into_iter()
        .enumerate()
        .map(|(rank, (i, score))| RetrievedEvidence {
            record: self.store.articles()[i].clone(),
            score,
            rank,
        })
        .collect();

        let cases = ranked_hits(
            &self.case_index,
            &query,
            self.config.top_k_cases,
            self.config.min_similarity,
        )
        .into_iter()
        .enumerate()
        .map(|(rank, (i, score))| RetrievedEvidence {
            record: self.store.cases()[i].clone(),
            score,
            rank,
        })
        .collect();

        let evidence = EvidenceSet { articles, cases };
        tracing::debug!(
            articles = evidence.articles.len(),
            cases = evidence.cases.len(),
            "Retrieved evidence"
        );
        evidence
    }

    /// Number of indexed article vectors
    pub fn article_count(&self) -> usize {
        self.article_index.len()
    }

    /// Number of indexed case vectors
    pub fn case_count(&self) -> usize {
        self.case_index.len()
    }
}

/// Shared ranking path for both corpora: top-k search then threshold filter
fn ranked_hits(
    index: &VectorIndex,
    query: &[f32],
    top_k: usize,
    min_similarity: f32,
) -> Vec<(usize, f32)> {
    index
        .search(query, top_k)
        .into_iter()
        .filter(|(_, score)| *score >= min_similarity)
        .collect()
}
