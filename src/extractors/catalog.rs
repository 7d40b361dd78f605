// src/extractors/catalog.rs
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::utils::AppError;

/// Qualifiers a catalog phrase carries. Only `Basic`, `Gaap` and `Unadjusted`
/// take part in ranking; the rest document the phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    Basic,
    Diluted,
    Gaap,
    Unadjusted,
    Adjusted,
    NonGaap,
    Loss,
}

/// One entry of an ordered term catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermDescriptor {
    pub phrase: String,
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
}

impl TermDescriptor {
    pub fn new(phrase: &str, modifiers: &[Modifier]) -> Self {
        Self {
            phrase: phrase.to_lowercase(),
            modifiers: modifiers.to_vec(),
        }
    }

    pub fn is_basic(&self) -> bool {
        self.modifiers.contains(&Modifier::Basic)
    }

    pub fn is_gaap(&self) -> bool {
        self.modifiers
            .iter()
            .any(|m| matches!(m, Modifier::Gaap | Modifier::Unadjusted))
    }
}

/// Everything the search strategies need, injected at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// EPS synonyms, highest priority first.
    pub terms: Vec<TermDescriptor>,
    /// Looser "per share" phrases for the last-resort text pass.
    pub generic_terms: Vec<TermDescriptor>,
    /// Statement titles that mark an income statement table.
    pub statement_headers: Vec<String>,
    /// Characters after a term occurrence inspected for a value.
    pub term_window: usize,
    pub generic_window: usize,
    /// Rows below a value-less label row searched for its value.
    pub lookahead_rows: usize,
    /// Longer element texts are never treated as statement headers.
    pub max_header_len: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            terms: default_terms(),
            generic_terms: default_generic_terms(),
            statement_headers: DEFAULT_STATEMENT_HEADERS
                .iter()
                .map(|h| h.to_string())
                .collect(),
            term_window: 100,
            generic_window: 50,
            lookahead_rows: 4,
            max_header_len: 200,
        }
    }
}

impl ExtractorConfig {
    /// Loads overrides from a JSON file. Absent fields keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            AppError::Config(format!("Invalid extractor config {}: {}", path.display(), e))
        })?;
        config.validate()?;
        tracing::info!(
            "Loaded extractor config from {} ({} terms, {} generic terms, {} statement headers)",
            path.display(),
            config.terms.len(),
            config.generic_terms.len(),
            config.statement_headers.len()
        );
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.terms.is_empty() && self.generic_terms.is_empty() {
            return Err(AppError::Config("Extractor config has no terms to search for".to_string()));
        }
        if self.term_window == 0 || self.generic_window == 0 {
            return Err(AppError::Config("Search windows must be at least one character".to_string()));
        }
        Ok(())
    }
}

const DEFAULT_STATEMENT_HEADERS: &[&str] = &[
    "consolidated statements of operations",
    "condensed consolidated statements of operations",
    "consolidated statements of income",
    "condensed consolidated statements of income",
    "consolidated statements of earnings",
    "consolidated statements of comprehensive income",
    "consolidated statements of comprehensive loss",
    "consolidated statements of operations and comprehensive loss",
    "consolidated statements of income and comprehensive income",
    "statements of operations",
    "statements of income",
];

fn default_terms() -> Vec<TermDescriptor> {
    use Modifier::*;
    vec![
        TermDescriptor::new("basic earnings per share", &[Basic]),
        TermDescriptor::new("basic eps", &[Basic]),
        TermDescriptor::new("basic earnings (loss) per share", &[Basic, Loss]),
        TermDescriptor::new("gaap earnings per share", &[Gaap]),
        TermDescriptor::new("gaap eps", &[Gaap]),
        TermDescriptor::new("unadjusted earnings per share", &[Unadjusted]),
        TermDescriptor::new("unadjusted eps", &[Unadjusted]),
        TermDescriptor::new("earnings per share", &[]),
        TermDescriptor::new("earnings (loss) per share", &[Loss]),
        TermDescriptor::new("eps", &[]),
        TermDescriptor::new("loss per share", &[Loss]),
        TermDescriptor::new("net loss per share", &[Loss]),
        TermDescriptor::new("net income per share", &[]),
        TermDescriptor::new("net income (loss) per share", &[Loss]),
        TermDescriptor::new("income per share", &[]),
        TermDescriptor::new("diluted earnings per share", &[Diluted]),
        TermDescriptor::new("diluted eps", &[Diluted]),
        TermDescriptor::new("adjusted earnings per share", &[Adjusted]),
        TermDescriptor::new("adjusted eps", &[Adjusted]),
        TermDescriptor::new("non-gaap earnings per share", &[NonGaap]),
        TermDescriptor::new("non-gaap eps", &[NonGaap]),
    ]
}

fn default_generic_terms() -> Vec<TermDescriptor> {
    use Modifier::*;
    vec![
        TermDescriptor::new("per basic share", &[Basic]),
        TermDescriptor::new("per diluted share", &[Diluted]),
        TermDescriptor::new("per common share", &[]),
        TermDescriptor::new("per share", &[]),
    ]
}
