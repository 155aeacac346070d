//! # Reasoning Gateway Module
//!
//! ## Purpose
//! Invokes the external generative backend with an assembled prompt context
//! and enforces the timeout/retry policy. The backend is an external
//! dependency with its own availability, so failures here are surfaced as
//! recoverable conditions rather than crashes.
//!
//! ## Input/Output Specification
//! - **Input**: `PromptContext` from the Context Assembler
//! - **Output**: Raw generative output text, or `ReasoningUnavailable`
//! - **Policy**: One timeout-bounded attempt plus one retry with unchanged
//!   input; the retry failing is terminal for the request
//!
//! ## Key Features
//! - `ReasoningBackend` trait seam so tests substitute stub backends
//! - Google generative-language wire format for the production backend
//! - Dropping the in-flight future (client disconnect) aborts the wait
//!   instead of consuming backend quota

use crate::config::ReasoningConfig;
use crate::errors::{Result, ScreenerError};
use crate::prompt::PromptContext;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// External generative backend contract
#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    /// Produce raw completion text for a prompt
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// HTTP client for the Google generative-language API
pub struct GeminiBackend {
    client: reqwest::Client,
    api_url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GeminiBackend {
    /// Create a backend client from reasoning configuration
    pub fn new(config: &ReasoningConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl ReasoningBackend for GeminiBackend {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.api_url, self.model);
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key.as_str())]);
        }

        let response = request.send().await?.error_for_status()?;
        let parsed: GenerateResponse = response.json().await?;

        let text: String = parsed
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(ScreenerError::Internal {
                message: "Backend response contained no candidate text".to_string(),
            });
        }

        Ok(text)
    }
}

/// Timeout/retry wrapper around a reasoning backend
pub struct ReasoningGateway {
    backend: Box<dyn ReasoningBackend>,
    timeout: Duration,
    max_retries: u32,
}

impl ReasoningGateway {
    /// Wrap a backend with the configured timeout and retry budget
    pub fn new(backend: Box<dyn ReasoningBackend>, timeout: Duration, max_retries: u32) -> Self {
        Self {
            backend,
            timeout,
            max_retries,
        }
    }

    /// Invoke the backend with the assembled context.
    ///
    /// Each attempt is bounded by the configured timeout. Timeouts and
    /// transport errors are retried with unchanged input up to the retry
    /// budget; exhausting it yields `ReasoningUnavailable`.
    pub async fn invoke(&self, context: &PromptContext) -> Result<String> {
        let attempts = self.max_retries + 1;
        let mut last_failure = String::new();

        for attempt in 1..=attempts {
            match tokio::time::timeout(self.timeout, self.backend.complete(context.text())).await {
                Ok(Ok(text)) => {
                    tracing::debug!(attempt, "Reasoning backend responded");
                    return Ok(text);
                }
                Ok(Err(e)) => {
                    last_failure = e.to_string();
                    tracing::warn!(attempt, error = %last_failure, "Reasoning backend call failed");
                }
                Err(_) => {
                    last_failure = format!("timed out after {:?}", self.timeout);
                    tracing::warn!(attempt, "Reasoning backend call timed out");
                }
            }
        }

        Err(ScreenerError::ReasoningUnavailable {
            details: last_failure,
        })
    }
}
