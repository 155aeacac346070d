//! # Screening Engine Module
//!
//! ## Purpose
//! Main pipeline orchestrator wiring the retriever, context assembler,
//! reasoning gateway, and response parser into one stateless screening
//! operation.
//!
//! ## Input/Output Specification
//! - **Input**: Scenario text (from the API layer or extracted documents)
//! - **Output**: `ScreeningResult`, or a typed error when the backend is
//!   unavailable or its output is unusable
//! - **Data Flow**: encode → retrieve (both indexes) → assemble → invoke →
//!   parse/validate → aggregate
//!
//! ## Key Features
//! - All process-wide state (corpora, built indexes) constructed once at
//!   startup into an immutable engine shared freely across requests
//! - The backend call is the only blocking point on the request path
//! - Empty retrieval degrades gracefully instead of failing

use crate::config::Config;
use crate::corpus::CorpusStore;
use crate::embedding::Embedder;
use crate::errors::Result;
use crate::gateway::{ReasoningBackend, ReasoningGateway};
use crate::parser::{ResponseParser, ScreeningResult};
use crate::prompt;
use crate::retriever::Retriever;
use crate::utils::Timer;
use std::sync::Arc;

/// Immutable, process-lifetime screening pipeline
pub struct ScreeningEngine {
    retriever: Retriever,
    gateway: ReasoningGateway,
    parser: ResponseParser,
}

impl ScreeningEngine {
    /// Build the engine: embed both corpora and construct both indexes.
    /// Runs once at startup; the engine is read-only afterwards.
    pub fn new(config: &Config, store: Arc<CorpusStore>, backend: Box<dyn ReasoningBackend>) -> Self {
        let timer = Timer::new("index_build");
        let embedder = Embedder::new(config.embedding.dimension);
        let retriever = Retriever::new(store.clone(), embedder, config.retrieval.clone());
        let elapsed = timer.stop();

        tracing::info!(
            articles = retriever.article_count(),
            cases = retriever.case_count(),
            build_ms = elapsed,
            "Corpus indexes built"
        );

        let gateway = ReasoningGateway::new(
            backend,
            config.reasoning_timeout(),
            config.reasoning.max_retries,
        );
        let parser = ResponseParser::new(store);

        Self {
            retriever,
            gateway,
            parser,
        }
    }

    /// Screen one scenario end to end.
    ///
    /// Stateless and independently reproducible given the same corpora and
    /// the same backend output; concurrent calls share the engine without
    /// locking.
    pub async fn screen(&self, scenario: &str) -> Result<ScreeningResult> {
        let evidence = self.retriever.retrieve(scenario);
        let context = prompt::assemble(scenario, &evidence);
        let raw = self.gateway.invoke(&context).await?;
        let result = self.parser.parse(&raw, &evidence)?;

        tracing::info!(
            findings = result.findings.len(),
            total_violations = result.summary.total_violations,
            risk = ?result.summary.risk_level,
            "Screening completed"
        );
        Ok(result)
    }

    /// Number of indexed articles (for the stats surface)
    pub fn article_count(&self) -> usize {
        self.retriever.article_count()
    }

    /// Number of indexed cases (for the stats surface)
    pub fn case_count(&self) -> usize {
        self.retriever.case_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{ArticleRecord, CaseRecord};
    use crate::errors::ScreenerError;
    use crate::parser::{FindingStatus, RiskLevel};
    use async_trait::async_trait;

    /// Backend stub returning a canned response regardless of prompt
    struct CannedBackend {
        response: String,
    }

    #[async_trait]
    impl ReasoningBackend for CannedBackend {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            Ok(self.response.clone())
        }
    }

    fn test_store() -> Arc<CorpusStore> {
        Arc::new(
            CorpusStore::from_records(
                vec![ArticleRecord {
                    id: "Article 13(1)".to_string(),
                    title: "Freedom from arbitrary arrest".to_string(),
                    text: "No person shall be arrested except according to procedure \
                           established by law. Any person arrested shall be allowed to \
                           contact a lawyer."
                        .to_string(),
                    category: "liberty".to_string(),
                }],
                vec![CaseRecord {
                    name: "Perera v. Attorney General".to_string(),
                    year: 1992,
                    summary: "Arrest without a warrant held unlawful.".to_string(),
                    article_ids: vec!["Article 13(1)".to_string()],
                }],
            )
            .unwrap(),
        )
    }

    fn test_engine(response: &str) -> ScreeningEngine {
        let mut config = Config::default();
        config.retrieval.min_similarity = 0.1;
        ScreeningEngine::new(
            &config,
            test_store(),
            Box::new(CannedBackend {
                response: response.to_string(),
            }),
        )
    }

    #[tokio::test]
    async fn test_end_to_end_violation_detected() {
        let engine = test_engine(
            r#"{"findings": [{
                "article": "Article 13(1)",
                "title": "Freedom from arbitrary arrest",
                "status": "Violation Detected",
                "explanation": "The arrest lacked a warrant and counsel was denied.",
                "guidance": "File a fundamental rights petition within one month.",
                "confidence": 0.9,
                "related_cases": ["Perera v. Attorney General"]
            }]}"#,
        );

        let result = engine
            .screen("I was arrested without a warrant and not allowed to contact a lawyer")
            .await
            .unwrap();

        assert_eq!(result.findings.len(), 1);
        assert_eq!(result.findings[0].article, "Article 13(1)");
        assert_eq!(result.findings[0].status, FindingStatus::ViolationDetected);
        assert_eq!(result.findings[0].related_cases.len(), 1);
        assert_eq!(result.summary.total_violations, 1);
        assert_eq!(result.summary.risk_level, RiskLevel::High);
    }

    #[tokio::test]
    async fn test_empty_scenario_returns_low_risk_result() {
        let engine = test_engine(r#"{"findings": []}"#);
        let result = engine.screen("").await.unwrap();
        assert!(result.findings.is_empty());
        assert_eq!(result.summary.total_violations, 0);
        assert_eq!(result.summary.risk_level, RiskLevel::Low);
    }

    #[tokio::test]
    async fn test_hallucinated_citation_does_not_survive() {
        // The stub cites a case that retrieval never returned for this
        // scenario; validation must drop the citation
        let engine = test_engine(
            r#"{"findings": [{
                "article": "Article 13(1)",
                "status": "Violation Detected",
                "confidence": 0.6,
                "related_cases": ["Fabricated v. Court"]
            }]}"#,
        );

        let result = engine
            .screen("arrested by police without warrant")
            .await
            .unwrap();
        assert_eq!(result.findings.len(), 1);
        assert!(result.findings[0].related_cases.is_empty());
    }

    #[tokio::test]
    async fn test_garbage_backend_output_is_surfaced() {
        let engine = test_engine("Sorry, I cannot help with that.");
        let err = engine.screen("some scenario").await.unwrap_err();
        assert!(matches!(err, ScreenerError::MalformedReasoningOutput { .. }));
    }
}
