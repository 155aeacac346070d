//! # Fundamental Rights Violation Screener
//!
//! ## Overview
//! This library screens natural-language descriptions of real-world
//! incidents for violations of a fixed set of constitutional articles,
//! returning structured findings backed by retrieved statutory text and
//! case precedent.
//!
//! ## Architecture
//! The system is composed of several key modules:
//! - `corpus`: Loads and holds the article and case reference corpora
//! - `embedding`: Deterministic text-to-vector encoding
//! - `index`: Nearest-neighbor search over corpus embeddings (one per corpus)
//! - `retriever`: Dual-index retrieval with thresholding and evidence caps
//! - `prompt`: Deterministic prompt context assembly
//! - `gateway`: Reasoning backend invocation with timeout/retry policy
//! - `parser`: Parse-then-validate boundary over untrusted backend output
//! - `screener`: Pipeline orchestration
//! - `api`: REST API endpoints
//! - `config`: Configuration management and settings
//! - `errors`: Centralized error handling and types
//!
//! ## Input/Output Specification
//! - **Input**: Incident descriptions (free text), reference corpora (JSON)
//! - **Output**: Structured violation findings with confidence and an
//!   aggregate risk summary
//! - **Guarantees**: Deterministic retrieval and prompt assembly; validated,
//!   evidence-grounded findings
//!
//! ## Usage
//! ```rust,no_run
//! use rights_screener::{config::Config, corpus::CorpusStore};
//! use rights_screener::gateway::GeminiBackend;
//! use rights_screener::screener::ScreeningEngine;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config.toml")?;
//!     let store = Arc::new(CorpusStore::load(
//!         &config.corpus.articles_path,
//!         &config.corpus.cases_path,
//!     )?);
//!     let backend = Box::new(GeminiBackend::new(&config.reasoning)?);
//!     let engine = ScreeningEngine::new(&config, store, backend);
//!     let result = engine.screen("I was arrested without a warrant").await?;
//!     println!("Risk: {:?}", result.summary.risk_level);
//!     Ok(())
//! }
//! ```

// Core modules
pub mod config;
pub mod errors;
pub mod corpus;
pub mod embedding;
pub mod index;
pub mod retriever;
pub mod prompt;
pub mod gateway;
pub mod parser;
pub mod screener;
pub mod api;

// Utilities
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use errors::{Result, ScreenerError};
pub use parser::{FindingStatus, RiskLevel, ScreeningResult, ViolationFinding};
pub use screener::ScreeningEngine;

use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Application state shared across API handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Config>,
    pub engine: Arc<screener::ScreeningEngine>,
    pub started_at: DateTime<Utc>,
}
