//! # Context Assembler Module
//!
//! ## Purpose
//! Deterministically renders retrieved evidence plus the user scenario into
//! a structured prompt payload with explicit output-schema instructions for
//! the reasoning backend.
//!
//! ## Input/Output Specification
//! - **Input**: Scenario text and the request's `EvidenceSet`
//! - **Output**: Immutable `PromptContext`, consumed exactly once by the
//!   Reasoning Gateway
//! - **Determinism**: Identical scenario + evidence yields byte-identical
//!   prompt text
//!
//! ## Key Features
//! - Fixed instruction preamble declaring field names, types, and the
//!   enumerated status values
//! - Scenario text treated as opaque and placed inside explicit delimiters,
//!   never interpolated into template structure; delimiter-like character
//!   runs in user text are broken so they cannot terminate the slot early
//! - Evidence rendered grouped by kind (articles, then cases) in retriever
//!   rank order; no dropping or reordering at this stage

use crate::retriever::EvidenceSet;
use std::fmt::Write;

const SCENARIO_OPEN: &str = "<<<SCENARIO>>>";
const SCENARIO_CLOSE: &str = "<<<END SCENARIO>>>";

/// Immutable prompt payload for one reasoning invocation
#[derive(Debug, Clone)]
pub struct PromptContext {
    text: String,
}

impl PromptContext {
    /// The rendered prompt text
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Render the instruction template, scenario, and evidence into a prompt
pub fn assemble(scenario: &str, evidence: &EvidenceSet) -> PromptContext {
    let mut out = String::new();

    out.push_str(
        "You are a legal screening assistant specialized in fundamental rights.\n\
         Assess whether the scenario below describes violations of the listed\n\
         constitutional articles. Ground every claim in the provided articles\n\
         and cases only.\n\n\
         Respond with ONLY a JSON object, no markdown fences and no commentary,\n\
         matching exactly this schema:\n\
         {\n\
           \"findings\": [\n\
             {\n\
               \"article\": \"<article identifier from the list below>\",\n\
               \"title\": \"<article title>\",\n\
               \"status\": \"Violation Detected\" | \"No Violation\" | \"Inconclusive\",\n\
               \"explanation\": \"<1-3 short paragraphs in plain language>\",\n\
               \"guidance\": \"<practical next steps for the person>\",\n\
               \"confidence\": <number between 0.0 and 1.0>,\n\
               \"related_cases\": [\"<case name from the list below>\"]\n\
             }\n\
           ]\n\
         }\n\
         Cite only the articles and cases listed below. If no evidence is\n\
         listed, report no-violation or inconclusive findings only.\n\n",
    );

    out.push_str("USER SCENARIO:\n");
    out.push_str(SCENARIO_OPEN);
    out.push('\n');
    out.push_str(&neutralize_delimiters(scenario));
    out.push('\n');
    out.push_str(SCENARIO_CLOSE);
    out.push_str("\n\n");

    out.push_str("RELEVANT CONSTITUTION ARTICLES:\n");
    if evidence.articles.is_empty() {
        out.push_str("(none retrieved)\n");
    }
    for item in &evidence.articles {
        // Scores are rendered with fixed precision to keep output stable
        let _ = write!(
            out,
            "Article: {}\nTitle: {}\nText: {}\nRelevance: {:.4}\n---\n",
            item.record.id, item.record.title, item.record.text, item.score
        );
    }

    out.push_str("\nRELEVANT CASE PRECEDENTS:\n");
    if evidence.cases.is_empty() {
        out.push_str("(none retrieved)\n");
    }
    for item in &evidence.cases {
        let _ = write!(
            out,
            "Case: {} ({})\nSummary: {}\nRelevance: {:.4}\n---\n",
            item.record.name, item.record.year, item.record.summary, item.score
        );
    }

    PromptContext { text: out }
}

/// Break any run of three or more `<` characters so user text can never
/// reproduce the slot delimiters. A space is inserted before every third
/// consecutive `<`; the scenario content otherwise passes through verbatim.
fn neutralize_delimiters(scenario: &str) -> String {
    let mut out = String::with_capacity(scenario.len());
    let mut run = 0usize;
    for ch in scenario.chars() {
        if ch == '<' {
            run += 1;
            if run == 3 {
                out.push(' ');
                run = 1;
            }
        } else {
            run = 0;
        }
        out.push(ch);
    }
    out
}
