//! # Response Parser & Validator Module
//!
//! ## Purpose
//! Parses the raw generative output into the violation schema, validates
//! every field against the corpus and the request's evidence, repairs or
//! drops malformed entries, and computes the aggregate risk summary.
//!
//! ## Input/Output Specification
//! - **Input**: Raw backend text plus the `EvidenceSet` for this request
//! - **Output**: `ScreeningResult`, or `MalformedReasoningOutput` when no
//!   structured object can be recovered at all
//! - **Policy**: Per-finding problems are repaired or dropped with a
//!   warning; only total framing failure is escalated to the request level
//!
//! ## Key Features
//! - Tolerant JSON extraction (markdown fences and surrounding prose are
//!   stripped before parsing)
//! - No hallucinated article identifiers survive validation
//! - Case citations restricted to evidence retrieved for this request
//! - Deterministic risk aggregation over the validated finding list

use crate::corpus::CorpusStore;
use crate::errors::{Result, ScreenerError};
use crate::retriever::EvidenceSet;
use crate::utils::TextUtils;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

const DEFAULT_CONFIDENCE: f32 = 0.5;
const HIGH_CONFIDENCE_THRESHOLD: f32 = 0.9;

/// Screening verdict for a single article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FindingStatus {
    #[serde(rename = "Violation Detected")]
    ViolationDetected,
    #[serde(rename = "No Violation")]
    NoViolation,
    #[serde(rename = "Inconclusive")]
    Inconclusive,
}

/// One validated finding for a considered article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolationFinding {
    /// Canonical article identifier known to the Corpus Store
    pub article: String,
    /// Article title
    pub title: String,
    /// Screening verdict
    pub status: FindingStatus,
    /// Plain-language explanation
    pub explanation: String,
    /// Practical next steps
    pub guidance: String,
    /// Confidence in [0, 1]
    pub confidence: f32,
    /// Summaries of cited cases, restricted to retrieved evidence
    pub related_cases: Vec<String>,
}

/// Coarse severity classification derived from the finding set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Aggregate summary over the validated findings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningSummary {
    pub total_violations: usize,
    pub risk_level: RiskLevel,
    pub recommendations: Vec<String>,
}

/// Terminal output of one screening request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningResult {
    pub findings: Vec<ViolationFinding>,
    pub summary: ScreeningSummary,
}

/// Strict parse-then-validate boundary over untrusted backend output
pub struct ResponseParser {
    store: Arc<CorpusStore>,
}

impl ResponseParser {
    pub fn new(store: Arc<CorpusStore>) -> Self {
        Self { store }
    }

    /// Parse and validate raw backend output into a `ScreeningResult`.
    ///
    /// Framing failure (no JSON object, no findings array) is terminal for
    /// the request; individual bad findings are repaired or dropped with a
    /// warning and the remaining valid findings still return.
    pub fn parse(&self, raw: &str, evidence: &EvidenceSet) -> Result<ScreeningResult> {
        let object = extract_json_object(raw)?;

        let raw_findings = object
            .get("findings")
            .and_then(Value::as_array)
            .ok_or_else(|| ScreenerError::MalformedReasoningOutput {
                details: "Output object has no 'findings' array".to_string(),
            })?;

        let mut findings = Vec::new();
        for entry in raw_findings {
            match self.validate_finding(entry, evidence) {
                Some(finding) => findings.push(finding),
                None => {
                    tracing::warn!(
                        entry = %TextUtils::truncate(&entry.to_string(), 120),
                        "Dropped unvalidatable finding"
                    );
                }
            }
        }

        let summary = summarize(&findings);
        Ok(ScreeningResult { findings, summary })
    }

    /// Validate a single raw finding, repairing what can be repaired.
    /// Returns `None` when the finding must be dropped entirely.
    fn validate_finding(&self, entry: &Value, evidence: &EvidenceSet) -> Option<ViolationFinding> {
        let object = entry.as_object()?;

        let article_raw = object.get("article").and_then(Value::as_str)?.trim();
        let article = match self.store.canonical_article_id(article_raw) {
            Some(id) => id.to_string(),
            None => {
                tracing::warn!(
                    article = %TextUtils::truncate(article_raw, 60),
                    "Finding cites an article unknown to the corpus"
                );
                return None;
            }
        };

        // Missing title falls back to the corpus record's own title
        let title = object
            .get("title")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| {
                self.store
                    .articles()
                    .iter()
                    .find(|a| a.id == article)
                    .map(|a| a.title.clone())
            })
            .unwrap_or_default();

        let status = parse_status(object.get("status"));
        let confidence = parse_confidence(object.get("confidence"));

        let explanation = object
            .get("explanation")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let guidance = object
            .get("guidance")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let related_cases = resolve_related_cases(object.get("related_cases"), evidence);

        Some(ViolationFinding {
            article,
            title,
            status,
            explanation,
            guidance,
            confidence,
            related_cases,
        })
    }
}

/// Extract the outermost JSON object from raw text, tolerating markdown
/// fences and surrounding prose
fn extract_json_object(raw: &str) -> Result<Value> {
    let start = raw.find('{');
    let end = raw.rfind('}');

    let (start, end) = match (start, end) {
        (Some(s), Some(e)) if s < e => (s, e),
        _ => {
            return Err(ScreenerError::MalformedReasoningOutput {
                details: "No JSON object found in backend output".to_string(),
            })
        }
    };

    serde_json::from_str(&raw[start..=end]).map_err(|e| ScreenerError::MalformedReasoningOutput {
        details: format!("Backend output is not valid JSON: {}", e),
    })
}

fn parse_status(value: Option<&Value>) -> FindingStatus {
    let text = value.and_then(Value::as_str).unwrap_or_default().trim();
    match text.to_lowercase().as_str() {
        "violation detected" => FindingStatus::ViolationDetected,
        "no violation" => FindingStatus::NoViolation,
        "inconclusive" => FindingStatus::Inconclusive,
        other => {
            if !other.is_empty() {
                tracing::warn!(status = other, "Unknown finding status mapped to Inconclusive");
            }
            FindingStatus::Inconclusive
        }
    }
}

fn parse_confidence(value: Option<&Value>) -> f32 {
    match value {
        Some(Value::Number(n)) => n
            .as_f64()
            .map(|v| (v as f32).clamp(0.0, 1.0))
            .unwrap_or(DEFAULT_CONFIDENCE),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f32>()
            .map(|v| v.clamp(0.0, 1.0))
            .unwrap_or_else(|_| {
                tracing::warn!(value = %s, "Non-numeric confidence defaulted");
                DEFAULT_CONFIDENCE
            }),
        _ => DEFAULT_CONFIDENCE,
    }
}

/// Keep only citations matching cases retrieved for this request; matched
/// citations carry the case summary forward
fn resolve_related_cases(value: Option<&Value>, evidence: &EvidenceSet) -> Vec<String> {
    let citations = match value.and_then(Value::as_array) {
        Some(entries) => entries,
        None => return Vec::new(),
    };

    let mut resolved = Vec::new();
    let mut seen = HashSet::new();
    for citation in citations {
        let name = match citation.as_str() {
            Some(s) => s.trim(),
            None => continue,
        };
        let matched = evidence
            .cases
            .iter()
            .find(|c| c.record.name.eq_ignore_ascii_case(name));
        match matched {
            Some(item) if seen.insert(item.record.name.clone()) => {
                resolved.push(format!(
                    "{} ({}): {}",
                    item.record.name, item.record.year, item.record.summary
                ));
            }
            Some(_) => {}
            None => {
                tracing::warn!(
                    case = %TextUtils::truncate(name, 60),
                    "Cited case was not retrieved for this request; dropped"
                );
            }
        }
    }
    resolved
}

/// Deterministic risk aggregation over the validated finding list.
///
/// High risk requires either two or more detected violations or one
/// detected violation held with very high confidence; a confident
/// no-violation finding never raises risk.
pub fn summarize(findings: &[ViolationFinding]) -> ScreeningSummary {
    let violations: Vec<&ViolationFinding> = findings
        .iter()
        .filter(|f| f.status == FindingStatus::ViolationDetected)
        .collect();
    let total_violations = violations.len();

    let confident_violation = violations
        .iter()
        .any(|f| f.confidence >= HIGH_CONFIDENCE_THRESHOLD);

    let risk_level = if total_violations >= 2 || confident_violation {
        RiskLevel::High
    } else if total_violations == 1 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    let mut recommendations = Vec::new();
    let mut seen = HashSet::new();
    for finding in &violations {
        let guidance = finding.guidance.trim();
        if !guidance.is_empty() && seen.insert(guidance.to_string()) {
            recommendations.push(guidance.to_string());
        }
    }

    ScreeningSummary {
        total_violations,
        risk_level,
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{ArticleRecord, CaseRecord};
    use crate::retriever::RetrievedEvidence;

    fn test_store() -> Arc<CorpusStore> {
        Arc::new(
            CorpusStore::from_records(
                vec![ArticleRecord {
                    id: "Article 13(1)".to_string(),
                    title: "Freedom from arbitrary arrest".to_string(),
                    text: "No person shall be arrested except according to procedure.".to_string(),
                    category: "liberty".to_string(),
                }],
                vec![CaseRecord {
                    name: "Perera v. Attorney General".to_string(),
                    year: 1992,
                    summary: "Warrantless arrest held unlawful.".to_string(),
                    article_ids: vec!["Article 13(1)".to_string()],
                }],
            )
            .unwrap(),
        )
    }

    fn test_evidence() -> EvidenceSet {
        let store = test_store();
        EvidenceSet {
            articles: vec![RetrievedEvidence {
                record: store.articles()[0].clone(),
                score: 0.8,
                rank: 0,
            }],
            cases: vec![RetrievedEvidence {
                record: store.cases()[0].clone(),
                score: 0.7,
                rank: 0,
            }],
        }
    }

    fn make_finding(status: FindingStatus, confidence: f32) -> ViolationFinding {
        ViolationFinding {
            article: "Article 13(1)".to_string(),
            title: "Freedom from arbitrary arrest".to_string(),
            status,
            explanation: "explanation".to_string(),
            guidance: "Consult a lawyer".to_string(),
            confidence,
            related_cases: Vec::new(),
        }
    }

    #[test]
    fn test_parse_valid_output() {
        let parser = ResponseParser::new(test_store());
        let raw = r#"{
            "findings": [{
                "article": "Article 13(1)",
                "title": "Freedom from arbitrary arrest",
                "status": "Violation Detected",
                "explanation": "The arrest lacked a warrant.",
                "guidance": "File a fundamental rights petition.",
                "confidence": 0.95,
                "related_cases": ["Perera v. Attorney General"]
            }]
        }"#;

        let result = parser.parse(raw, &test_evidence()).unwrap();
        assert_eq!(result.findings.len(), 1);
        let finding = &result.findings[0];
        assert_eq!(finding.article, "Article 13(1)");
        assert_eq!(finding.status, FindingStatus::ViolationDetected);
        assert_eq!(finding.related_cases.len(), 1);
        assert!(finding.related_cases[0].contains("Perera"));
        assert_eq!(result.summary.total_violations, 1);
        assert_eq!(result.summary.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_markdown_fences_tolerated() {
        let parser = ResponseParser::new(test_store());
        let raw = "```json\n{\"findings\": []}\n```";
        let result = parser.parse(raw, &test_evidence()).unwrap();
        assert!(result.findings.is_empty());
        assert_eq!(result.summary.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_unknown_article_dropped() {
        let parser = ResponseParser::new(test_store());
        let raw = r#"{"findings": [{
            "article": "Article 99",
            "status": "Violation Detected",
            "confidence": 0.9
        }]}"#;

        let result = parser.parse(raw, &test_evidence()).unwrap();
        assert!(result.findings.is_empty());
        assert_eq!(result.summary.total_violations, 0);
        assert_eq!(result.summary.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_confidence_repair() {
        let parser = ResponseParser::new(test_store());
        let raw = r#"{"findings": [
            {"article": "Article 13(1)", "status": "No Violation", "confidence": 7.3},
            {"article": "Article 13(1)", "status": "No Violation", "confidence": "not a number"},
            {"article": "Article 13(1)", "status": "No Violation"}
        ]}"#;

        let result = parser.parse(raw, &test_evidence()).unwrap();
        assert_eq!(result.findings[0].confidence, 1.0);
        assert_eq!(result.findings[1].confidence, 0.5);
        assert_eq!(result.findings[2].confidence, 0.5);
    }

    #[test]
    fn test_unknown_status_maps_to_inconclusive() {
        let parser = ResponseParser::new(test_store());
        let raw = r#"{"findings": [{
            "article": "Article 13(1)",
            "status": "Maybe?",
            "confidence": 0.4
        }]}"#;

        let result = parser.parse(raw, &test_evidence()).unwrap();
        assert_eq!(result.findings[0].status, FindingStatus::Inconclusive);
    }

    #[test]
    fn test_unretrieved_case_citation_dropped() {
        let parser = ResponseParser::new(test_store());
        let raw = r#"{"findings": [{
            "article": "Article 13(1)",
            "status": "Violation Detected",
            "confidence": 0.6,
            "related_cases": ["Invented v. Nobody", "Perera v. Attorney General"]
        }]}"#;

        let result = parser.parse(raw, &test_evidence()).unwrap();
        let finding = &result.findings[0];
        assert_eq!(finding.related_cases.len(), 1);
        assert!(finding.related_cases[0].contains("Perera"));
    }

    #[test]
    fn test_malformed_output_is_terminal() {
        let parser = ResponseParser::new(test_store());
        for raw in [
            "I could not assess this scenario.",
            "{\"findings\": ",
            "{\"verdict\": \"unclear\"}",
        ] {
            let err = parser.parse(raw, &test_evidence()).unwrap_err();
            assert!(matches!(err, ScreenerError::MalformedReasoningOutput { .. }));
        }
    }

    #[test]
    fn test_risk_single_confident_violation_is_high() {
        let summary = summarize(&[make_finding(FindingStatus::ViolationDetected, 0.95)]);
        assert_eq!(summary.total_violations, 1);
        assert_eq!(summary.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_risk_single_violation_is_medium() {
        let summary = summarize(&[make_finding(FindingStatus::ViolationDetected, 0.6)]);
        assert_eq!(summary.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_risk_two_violations_is_high() {
        let summary = summarize(&[
            make_finding(FindingStatus::ViolationDetected, 0.5),
            make_finding(FindingStatus::ViolationDetected, 0.5),
        ]);
        assert_eq!(summary.total_violations, 2);
        assert_eq!(summary.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_risk_empty_findings_is_low() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_violations, 0);
        assert_eq!(summary.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_confident_no_violation_does_not_raise_risk() {
        let summary = summarize(&[make_finding(FindingStatus::NoViolation, 0.95)]);
        assert_eq!(summary.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_recommendations_deduplicated_in_order() {
        let mut first = make_finding(FindingStatus::ViolationDetected, 0.6);
        first.guidance = "File a petition".to_string();
        let mut second = make_finding(FindingStatus::ViolationDetected, 0.6);
        second.guidance = "Collect evidence".to_string();
        let mut third = make_finding(FindingStatus::ViolationDetected, 0.6);
        third.guidance = "File a petition".to_string();

        let summary = summarize(&[first, second, third]);
        assert_eq!(
            summary.recommendations,
            vec!["File a petition".to_string(), "Collect evidence".to_string()]
        );
    }

    #[test]
    fn test_status_wire_format() {
        let json = serde_json::to_string(&FindingStatus::ViolationDetected).unwrap();
        assert_eq!(json, "\"Violation Detected\"");
        let json = serde_json::to_string(&RiskLevel::High).unwrap();
        assert_eq!(json, "\"High\"");
    }
}
