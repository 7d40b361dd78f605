// src/extractors/matcher.rs

use crate::extractors::catalog::TermDescriptor;
use regex::{Regex, RegexBuilder};

// Catalogs can come from user config; keep a lid on compiled size
const TERM_REGEX_SIZE_LIMIT: usize = 1 << 20;

/// Builds a case-insensitive, whole-word pattern for a catalog phrase.
/// Inner whitespace matches any whitespace run.
pub fn term_pattern(phrase: &str) -> Result<Regex, regex::Error> {
    let words: Vec<String> = phrase.split_whitespace().map(regex::escape).collect();
    if words.is_empty() {
        return Err(regex::Error::Syntax("empty term phrase".to_string()));
    }
    let is_word_char = |c: char| c.is_alphanumeric() || c == '_';
    let lead = if phrase.trim_start().starts_with(is_word_char) { r"\b" } else { "" };
    let trail = if phrase.trim_end().ends_with(is_word_char) { r"\b" } else { "" };

    RegexBuilder::new(&format!("{}{}{}", lead, words.join(r"\s+"), trail))
        .case_insensitive(true)
        .size_limit(TERM_REGEX_SIZE_LIMIT)
        .build()
}

/// One occurrence of a catalog term.
#[derive(Debug, Clone, Copy)]
pub struct TermHit<'m> {
    pub term: &'m TermDescriptor,
    /// Position of the term in the catalog.
    pub rank: usize,
    pub start: usize,
    pub end: usize,
}

impl TermHit<'_> {
    fn len(&self) -> usize {
        self.end - self.start
    }

    /// True when `other` strictly covers this hit with a longer phrase.
    fn is_shadowed_by(&self, other: &TermHit<'_>) -> bool {
        other.len() > self.len() && other.start <= self.start && self.end <= other.end
    }
}

struct CompiledTerm {
    descriptor: TermDescriptor,
    pattern: Regex,
}

/// An ordered term catalog compiled for searching.
pub struct TermMatcher {
    terms: Vec<CompiledTerm>,
}

impl TermMatcher {
    /// Compiles a catalog. Terms that fail to compile are logged and dropped.
    pub fn new(catalog: &[TermDescriptor]) -> Self {
        let terms = catalog
            .iter()
            .filter_map(|descriptor| match term_pattern(&descriptor.phrase) {
                Ok(pattern) => Some(CompiledTerm {
                    descriptor: descriptor.clone(),
                    pattern,
                }),
                Err(e) => {
                    tracing::warn!("Skipping catalog term '{}': {}", descriptor.phrase, e);
                    None
                }
            })
            .collect();
        Self { terms }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// All hits in `text` that are not shadowed by a longer catalog term,
    /// ordered by catalog rank then position.
    pub fn hits(&self, text: &str) -> Vec<TermHit<'_>> {
        let all: Vec<TermHit<'_>> = self
            .terms
            .iter()
            .enumerate()
            .flat_map(|(rank, term)| {
                term.pattern.find_iter(text).map(move |m| TermHit {
                    term: &term.descriptor,
                    rank,
                    start: m.start(),
                    end: m.end(),
                })
            })
            .collect();

        all.iter()
            .filter(|hit| !all.iter().any(|other| hit.is_shadowed_by(other)))
            .copied()
            .collect()
    }

    /// The highest-priority term present in `text`, if any.
    pub fn first_term(&self, text: &str) -> Option<&TermDescriptor> {
        self.hits(text).into_iter().next().map(|hit| hit.term)
    }

    /// Compiled patterns with their phrases, in catalog order.
    pub fn patterns(&self) -> impl Iterator<Item = (&Regex, &str)> {
        self.terms
            .iter()
            .map(|t| (&t.pattern, t.descriptor.phrase.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::catalog::{ExtractorConfig, Modifier};

    fn default_matcher() -> TermMatcher {
        TermMatcher::new(&ExtractorConfig::default().terms)
    }

    #[test]
    fn test_whole_word_matching() {
        let matcher = default_matcher();
        assert!(matcher.first_term("new steps were taken").is_none());
        assert_eq!(matcher.first_term("EPS rose").map(|t| t.phrase.as_str()), Some("eps"));
        assert_eq!(
            matcher.first_term("Earnings\n per   share").map(|t| t.phrase.as_str()),
            Some("earnings per share")
        );
    }

    #[test]
    fn test_longer_terms_shadow_contained_ones() {
        let matcher = default_matcher();
        let term = |text: &str| matcher.first_term(text).map(|t| t.phrase.clone());
        assert_eq!(term("diluted eps was $0.45").as_deref(), Some("diluted eps"));
        assert_eq!(term("non-gaap eps of $1.10").as_deref(), Some("non-gaap eps"));
        assert_eq!(term("net loss per share").as_deref(), Some("net loss per share"));
        assert_eq!(
            term("diluted earnings per share").as_deref(),
            Some("diluted earnings per share")
        );
    }

    #[test]
    fn test_catalog_order_beats_position() {
        let matcher = default_matcher();
        let hits = matcher.hits("diluted eps 0.40 and basic eps 0.42");
        let phrases: Vec<&str> = hits.iter().map(|h| h.term.phrase.as_str()).collect();
        assert_eq!(phrases, vec!["basic eps", "diluted eps"]);
        assert!(hits[0].start > hits[1].start);
    }

    #[test]
    fn test_hits_of_one_term_are_in_position_order() {
        let matcher = default_matcher();
        let hits = matcher.hits("EPS one, EPS two, EPS three");
        assert_eq!(hits.len(), 3);
        assert!(hits.windows(2).all(|w| w[0].start < w[1].start));
    }

    #[test]
    fn test_punctuated_terms_compile() {
        let catalog = vec![
            TermDescriptor::new("earnings (loss) per share", &[Modifier::Loss]),
            TermDescriptor::new("   ", &[]),
        ];
        let matcher = TermMatcher::new(&catalog);
        assert_eq!(matcher.len(), 1);
        assert!(matcher.first_term("net earnings (loss) per share: (0.12)").is_some());
    }

    #[test]
    fn test_empty_catalog() {
        let matcher = TermMatcher::new(&[]);
        assert!(matcher.is_empty());
        assert!(matcher.hits("eps").is_empty());
    }
}
