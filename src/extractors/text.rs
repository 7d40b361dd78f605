// src/extractors/text.rs

use crate::extractors::catalog::{ExtractorConfig, TermDescriptor};
use crate::extractors::document::Filing;
use crate::extractors::eps::ExtractionStrategy;
use crate::extractors::matcher::TermMatcher;
use crate::extractors::ranker::Candidate;
use crate::extractors::value::{extract_eps_value, EpsValue};
use once_cell::sync::Lazy;
use regex::Regex;

// A parenthesized amount, or a plain signed amount, optionally with currency.
// Never starts on whitespace, so the glue check sees the real neighbour.
static NUMERIC_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:[$€£¥]\s*)?\(\s*[$€£¥]?\s*\d[\d,]*(?:\.\d+)?\s*\)|[-−]?(?:[$€£¥]\s*)?[-−]?\d[\d,]*(?:\.\d+)?")
        .expect("Failed to compile NUMERIC_TOKEN_RE")
});

static PER_SHARE_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*per\s+share").expect("Failed to compile PER_SHARE_SUFFIX_RE")
});

/// Whole-document search: each catalog term in order, each occurrence in
/// position order, first acceptable value in the trailing window wins.
pub struct TextStrategy {
    name: &'static str,
    matcher: TermMatcher,
    window: usize,
}

impl TextStrategy {
    pub fn new(name: &'static str, catalog: &[TermDescriptor], window: usize) -> Self {
        Self {
            name,
            matcher: TermMatcher::new(catalog),
            window,
        }
    }

    /// The EPS-term fallback.
    pub fn terms(config: &ExtractorConfig) -> Self {
        Self::new("terms", &config.terms, config.term_window)
    }

    /// The last-resort "per share" fallback.
    pub fn generic(config: &ExtractorConfig) -> Self {
        Self::new("generic", &config.generic_terms, config.generic_window)
    }
}

impl ExtractionStrategy for TextStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    fn search(&self, filing: &Filing) -> Vec<Candidate> {
        if self.matcher.is_empty() {
            return Vec::new();
        }
        let text = filing.text();

        for hit in self.matcher.hits(&text) {
            let window = trailing_window(&text, hit.end, self.window);
            if let Some(value) = first_value(window) {
                tracing::debug!(
                    "Text search '{}' matched '{}' (rank {}) at {} -> {}",
                    self.name,
                    hit.term.phrase,
                    hit.rank,
                    hit.start,
                    value
                );
                return vec![Candidate::from_term(value, hit.term)];
            }
        }

        Vec::new()
    }
}

/// Up to `chars` characters of `text` starting at byte offset `from`.
fn trailing_window(text: &str, from: usize, chars: usize) -> &str {
    let tail = &text[from..];
    let cut = tail.char_indices().nth(chars).map_or(tail.len(), |(i, _)| i);
    &tail[..cut]
}

/// First numeric token in `window` that is a standalone number, is not a
/// "per share" amount of something else, and normalizes to an EPS value.
fn first_value(window: &str) -> Option<EpsValue> {
    NUMERIC_TOKEN_RE.find_iter(window).find_map(|m| {
        let glued_before = window[..m.start()]
            .chars()
            .next_back()
            .map_or(false, |c| c.is_alphanumeric());
        let glued_after = window[m.end()..]
            .chars()
            .next()
            .map_or(false, |c| c.is_alphanumeric());
        if glued_before || glued_after || PER_SHARE_SUFFIX_RE.is_match(&window[m.end()..]) {
            return None;
        }
        extract_eps_value(m.as_str())
    })
}
