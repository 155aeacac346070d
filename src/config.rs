//! # Configuration Management Module
//!
//! ## Purpose
//! Centralized configuration management for the rights screener, supporting
//! TOML files and environment variable overrides with validation and
//! type-safe access to all system settings.
//!
//! ## Input/Output Specification
//! - **Input**: Configuration files (TOML), environment variables
//! - **Output**: Validated configuration structs with defaults and overrides
//! - **Validation**: Type checking, range validation, dependency verification
//!
//! ## Configuration Sources (in order of precedence)
//! 1. Environment variables (highest priority)
//! 2. Configuration files
//! 3. Default values (lowest priority)
//!
//! ## Usage
//! ```rust,no_run
//! use rights_screener::config::Config;
//!
//! let config = Config::from_file("config.toml").unwrap();
//! println!("Server port: {}", config.server.port);
//! ```

use crate::errors::{Result, ScreenerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure containing all system settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server and API configuration
    pub server: ServerConfig,
    /// Reference corpus locations
    pub corpus: CorpusConfig,
    /// Embedding encoder settings
    pub embedding: EmbeddingConfig,
    /// Retrieval thresholds and ceilings
    pub retrieval: RetrievalConfig,
    /// Reasoning backend settings
    pub reasoning: ReasoningConfig,
    /// Logging and monitoring
    pub logging: LoggingConfig,
}

/// Server and API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Maximum scenario length accepted by the API (characters)
    pub max_scenario_chars: usize,
    /// Enable CORS
    pub enable_cors: bool,
    /// Origins allowed by the CORS policy
    pub allowed_origins: Vec<String>,
}

/// Reference corpus configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Constitutional articles corpus (JSON array of article records)
    pub articles_path: PathBuf,
    /// Supreme Court case summaries corpus (JSON array of case records)
    pub cases_path: PathBuf,
}

/// Embedding encoder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Vector dimension produced by the feature-hashing encoder
    pub dimension: usize,
}

/// Retrieval configuration consumed by the Retriever
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Minimum cosine similarity for a hit to count as evidence
    pub min_similarity: f32,
    /// Maximum articles retrieved per request
    pub top_k_articles: usize,
    /// Maximum cases retrieved per request
    pub top_k_cases: usize,
}

/// Reasoning backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningConfig {
    /// Backend API base URL
    pub api_url: String,
    /// Generative model identifier
    pub model: String,
    /// API key for authentication (usually supplied via environment)
    pub api_key: Option<String>,
    /// Per-attempt timeout in seconds
    pub timeout_seconds: u64,
    /// Retries after the initial attempt fails
    pub max_retries: u32,
}

/// Logging and monitoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Enable structured JSON logging
    pub json_format: bool,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::from_file("config.toml")
    }

    /// Load configuration from a specific file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!("Configuration file not found: {:?}, using defaults", path);
            let mut config = Self::default();
            config.apply_env_overrides()?;
            config.validate()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path).map_err(|e| ScreenerError::Config {
            message: format!("Failed to read config file {:?}: {}", path, e),
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|e| ScreenerError::Config {
            message: format!("Failed to parse config file {:?}: {}", path, e),
        })?;

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Per-attempt timeout for the reasoning backend
    pub fn reasoning_timeout(&self) -> Duration {
        Duration::from_secs(self.reasoning.timeout_seconds)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("SCREENER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("SCREENER_PORT") {
            self.server.port = port.parse().map_err(|_| ScreenerError::Config {
                message: "Invalid port number in SCREENER_PORT".to_string(),
            })?;
        }
        if let Ok(articles) = std::env::var("SCREENER_ARTICLES_PATH") {
            self.corpus.articles_path = PathBuf::from(articles);
        }
        if let Ok(cases) = std::env::var("SCREENER_CASES_PATH") {
            self.corpus.cases_path = PathBuf::from(cases);
        }
        if let Ok(api_url) = std::env::var("SCREENER_REASONING_URL") {
            self.reasoning.api_url = api_url;
        }
        if let Ok(api_key) = std::env::var("SCREENER_API_KEY") {
            self.reasoning.api_key = Some(api_key);
        }

        Ok(())
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(ScreenerError::ValidationFailed {
                field: "server.port".to_string(),
                reason: "Port cannot be zero".to_string(),
            });
        }

        if self.embedding.dimension == 0 {
            return Err(ScreenerError::ValidationFailed {
                field: "embedding.dimension".to_string(),
                reason: "Vector dimension must be greater than zero".to_string(),
            });
        }

        if !(0.0..=1.0).contains(&self.retrieval.min_similarity) {
            return Err(ScreenerError::ValidationFailed {
                field: "retrieval.min_similarity".to_string(),
                reason: "Similarity threshold must be within [0, 1]".to_string(),
            });
        }

        if self.retrieval.top_k_articles == 0 && self.retrieval.top_k_cases == 0 {
            return Err(ScreenerError::ValidationFailed {
                field: "retrieval.top_k_articles".to_string(),
                reason: "At least one corpus must contribute evidence".to_string(),
            });
        }

        if self.reasoning.timeout_seconds == 0 {
            return Err(ScreenerError::ValidationFailed {
                field: "reasoning.timeout_seconds".to_string(),
                reason: "Backend timeout must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                max_scenario_chars: 20_000,
                enable_cors: true,
                allowed_origins: vec![
                    "http://localhost:5173".to_string(),
                    "http://localhost:3000".to_string(),
                    "http://127.0.0.1:5173".to_string(),
                ],
            },
            corpus: CorpusConfig {
                articles_path: PathBuf::from("./data/articles.json"),
                cases_path: PathBuf::from("./data/cases.json"),
            },
            embedding: EmbeddingConfig { dimension: 256 },
            retrieval: RetrievalConfig {
                min_similarity: 0.15,
                top_k_articles: 5,
                top_k_cases: 5,
            },
            reasoning: ReasoningConfig {
                api_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                model: "gemini-1.5-flash".to_string(),
                api_key: None,
                timeout_seconds: 30,
                max_retries: 1,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                json_format: false,
            },
        }
    }
}
