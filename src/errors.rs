//! # Error Handling Module
//!
//! ## Purpose
//! Centralized error handling for the rights screener, providing the error
//! taxonomy shared by every pipeline stage and the API surface.
//!
//! ## Input/Output Specification
//! - **Input**: Error conditions from corpus loading, retrieval, the
//!   reasoning backend, and response validation
//! - **Output**: Structured error types with context and error chains
//! - **Error Categories**: Corpus, Reasoning, Parsing, Config, API
//!
//! ## Key Features
//! - Fatal startup errors (corpus) kept distinct from recoverable
//!   request-time errors (backend unavailable)
//! - Automatic error conversion and chaining
//! - User-friendly error messages for API responses
//! - Structured logging integration

use thiserror::Error;

/// Result type used throughout the application
pub type Result<T> = std::result::Result<T, ScreenerError>;

/// Error types for the rights screening pipeline
#[derive(Debug, Error)]
pub enum ScreenerError {
    /// Reference corpus missing or malformed; fatal at startup
    #[error("Corpus load failed for '{source_name}': {details}")]
    CorpusLoad {
        source_name: String,
        details: String,
    },

    /// Backend timed out or failed transport on the initial call and the retry
    #[error("Reasoning backend unavailable after retry: {details}")]
    ReasoningUnavailable { details: String },

    /// Backend responded but its output carried no parseable structure
    #[error("Reasoning output could not be parsed: {details}")]
    MalformedReasoningOutput { details: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("Validation failed for field '{field}': {reason}")]
    ValidationFailed { field: String, reason: String },

    /// Invalid API request
    #[error("Invalid API request: {details}")]
    InvalidApiRequest { details: String },

    /// Internal system errors
    #[error("Internal error: {message}")]
    Internal { message: String },

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ScreenerError {
    /// Check if the error is recoverable (the client may retry the request)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ScreenerError::ReasoningUnavailable { .. }
                | ScreenerError::MalformedReasoningOutput { .. }
                | ScreenerError::Http(_)
        )
    }

    /// Get error category for metrics and logging
    pub fn category(&self) -> &'static str {
        match self {
            ScreenerError::CorpusLoad { .. } => "corpus",
            ScreenerError::ReasoningUnavailable { .. } | ScreenerError::Http(_) => "reasoning",
            ScreenerError::MalformedReasoningOutput { .. } | ScreenerError::Json(_) => "parsing",
            ScreenerError::Config { .. } | ScreenerError::Toml(_) => "configuration",
            ScreenerError::InvalidApiRequest { .. } => "api",
            ScreenerError::ValidationFailed { .. } | ScreenerError::Internal { .. } => "generic",
        }
    }
}

impl From<std::io::Error> for ScreenerError {
    fn from(err: std::io::Error) -> Self {
        ScreenerError::Internal {
            message: format!("IO error: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverability() {
        let unavailable = ScreenerError::ReasoningUnavailable {
            details: "timeout".to_string(),
        };
        assert!(unavailable.is_recoverable());

        let corpus = ScreenerError::CorpusLoad {
            source_name: "articles".to_string(),
            details: "missing field".to_string(),
        };
        assert!(!corpus.is_recoverable());
    }

    #[test]
    fn test_categories() {
        let malformed = ScreenerError::MalformedReasoningOutput {
            details: "no JSON object".to_string(),
        };
        assert_eq!(malformed.category(), "parsing");

        let config = ScreenerError::Config {
            message: "bad port".to_string(),
        };
        assert_eq!(config.category(), "configuration");
    }
}
