//! # Corpus Store Module
//!
//! ## Purpose
//! Loads and holds the two fixed reference collections (constitutional
//! articles and Supreme Court case summaries) as immutable, structured
//! records with embeddable text fields.
//!
//! ## Input/Output Specification
//! - **Input**: Two JSON arrays of article and case records, loaded at startup
//! - **Output**: Read-only record slices and identifier lookups
//! - **Lifecycle**: Loaded once at process start, never mutated afterwards
//!
//! ## Key Features
//! - Fail-fast startup validation (the system cannot operate without
//!   reference law, so a malformed corpus is fatal)
//! - Canonical embed-text composition shared by index build and tests
//! - Identifier lookup tolerant of case and whitespace differences

use crate::errors::{Result, ScreenerError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single constitutional article from the reference corpus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// Article identifier, e.g. "Article 13(1)"
    pub id: String,
    /// Short title or summary line
    pub title: String,
    /// Full statutory text
    pub text: String,
    /// Category tag, e.g. "liberty", "equality"
    #[serde(default)]
    pub category: String,
}

/// A Supreme Court case summary from the reference corpus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseRecord {
    /// Case name, e.g. "Perera v. Attorney General"
    pub name: String,
    /// Decision year
    pub year: i32,
    /// Case summary text
    pub summary: String,
    /// Article identifiers this case interpreted
    #[serde(default)]
    pub article_ids: Vec<String>,
}

/// Immutable store for both reference corpora
#[derive(Debug)]
pub struct CorpusStore {
    articles: Vec<ArticleRecord>,
    cases: Vec<CaseRecord>,
}

impl CorpusStore {
    /// Load both corpora from JSON files, failing fast on any schema error
    pub fn load<P: AsRef<Path>>(articles_path: P, cases_path: P) -> Result<Self> {
        let articles: Vec<ArticleRecord> = load_corpus_file(articles_path.as_ref(), "articles")?;
        let cases: Vec<CaseRecord> = load_corpus_file(cases_path.as_ref(), "cases")?;
        Self::from_records(articles, cases)
    }

    /// Build a store from in-memory records (used by tests and tooling)
    pub fn from_records(articles: Vec<ArticleRecord>, cases: Vec<CaseRecord>) -> Result<Self> {
        for (i, article) in articles.iter().enumerate() {
            if article.id.trim().is_empty() || article.text.trim().is_empty() {
                return Err(ScreenerError::CorpusLoad {
                    source_name: "articles".to_string(),
                    details: format!("Record {} is missing a required field", i),
                });
            }
        }
        for (i, case) in cases.iter().enumerate() {
            if case.name.trim().is_empty() || case.summary.trim().is_empty() {
                return Err(ScreenerError::CorpusLoad {
                    source_name: "cases".to_string(),
                    details: format!("Record {} is missing a required field", i),
                });
            }
        }

        Ok(Self { articles, cases })
    }

    /// All article records in corpus insertion order
    pub fn articles(&self) -> &[ArticleRecord] {
        &self.articles
    }

    /// All case records in corpus insertion order
    pub fn cases(&self) -> &[CaseRecord] {
        &self.cases
    }

    /// Canonical identifier form for a known article, if present.
    /// Matching ignores case and surrounding whitespace so that
    /// "article 13(1)" from a generative backend still resolves.
    pub fn canonical_article_id(&self, id: &str) -> Option<&str> {
        let wanted = normalize_article_id(id);
        self.articles
            .iter()
            .find(|a| normalize_article_id(&a.id) == wanted)
            .map(|a| a.id.as_str())
    }

    /// Text fed to the embedding encoder for an article record
    pub fn article_embed_text(article: &ArticleRecord) -> String {
        format!("{} - {} - {}", article.id, article.title, article.text)
    }

    /// Text fed to the embedding encoder for a case record
    pub fn case_embed_text(case: &CaseRecord) -> String {
        format!("{} ({}) - {}", case.name, case.year, case.summary)
    }
}

fn load_corpus_file<T: for<'de> Deserialize<'de>>(path: &Path, name: &str) -> Result<Vec<T>> {
    let content = std::fs::read_to_string(path).map_err(|e| ScreenerError::CorpusLoad {
        source_name: name.to_string(),
        details: format!("Failed to read {:?}: {}", path, e),
    })?;

    serde_json::from_str(&content).map_err(|e| ScreenerError::CorpusLoad {
        source_name: name.to_string(),
        details: format!("Failed to parse {:?}: {}", path, e),
    })
}

fn normalize_article_id(id: &str) -> String {
    id.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_article() -> ArticleRecord {
        ArticleRecord {
            id: "Article 13(1)".to_string(),
            title: "Freedom from arbitrary arrest".to_string(),
            text: "No person shall be arrested except according to procedure established by law."
                .to_string(),
            category: "liberty".to_string(),
        }
    }

    fn sample_case() -> CaseRecord {
        CaseRecord {
            name: "Perera v. Attorney General".to_string(),
            year: 1992,
            summary: "Arrest without a warrant held unlawful.".to_string(),
            article_ids: vec!["Article 13(1)".to_string()],
        }
    }

    #[test]
    fn test_from_records_and_lookup() {
        let store = CorpusStore::from_records(vec![sample_article()], vec![sample_case()]).unwrap();
        assert_eq!(store.articles().len(), 1);
        assert_eq!(store.cases().len(), 1);
        assert_eq!(
            store.canonical_article_id("article 13(1)"),
            Some("Article 13(1)")
        );
        assert_eq!(
            store.canonical_article_id("  Article 13(1) "),
            Some("Article 13(1)")
        );
        assert_eq!(store.canonical_article_id("Article 99"), None);
    }

    #[test]
    fn test_missing_field_is_fatal() {
        let mut bad = sample_article();
        bad.text = String::new();
        let err = CorpusStore::from_records(vec![bad], vec![]).unwrap_err();
        assert_eq!(err.category(), "corpus");
    }

    #[test]
    fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let articles_path = dir.path().join("articles.json");
        let cases_path = dir.path().join("cases.json");

        let mut f = std::fs::File::create(&articles_path).unwrap();
        write!(
            f,
            "{}",
            serde_json::to_string(&vec![sample_article()]).unwrap()
        )
        .unwrap();
        let mut f = std::fs::File::create(&cases_path).unwrap();
        write!(f, "{}", serde_json::to_string(&vec![sample_case()]).unwrap()).unwrap();

        let store = CorpusStore::load(&articles_path, &cases_path).unwrap();
        assert_eq!(store.articles().len(), 1);
    }

    #[test]
    fn test_load_malformed_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let articles_path = dir.path().join("articles.json");
        let cases_path = dir.path().join("cases.json");
        std::fs::write(&articles_path, "{ not json").unwrap();
        std::fs::write(&cases_path, "[]").unwrap();

        let err = CorpusStore::load(&articles_path, &cases_path).unwrap_err();
        assert_eq!(err.category(), "corpus");
    }

    #[test]
    fn test_embed_text_composition() {
        let text = CorpusStore::article_embed_text(&sample_article());
        assert!(text.contains("Article 13(1)"));
        assert!(text.contains("arbitrary arrest"));
    }
}
