// src/extractors/eps.rs

use crate::extractors::catalog::ExtractorConfig;
use crate::extractors::document::Filing;
use crate::extractors::ranker::{rank, Candidate};
use crate::extractors::tables::TableStrategy;
use crate::extractors::text::TextStrategy;
use crate::extractors::value::EpsValue;

/// Marker written for a missing value or term.
pub const NONE_MARKER: &str = "NONE";

/// One way of searching a filing for EPS candidates.
pub trait ExtractionStrategy: Send + Sync {
    /// Short label used in logs and run statistics.
    fn name(&self) -> &'static str;

    /// Every candidate this strategy finds, in discovery order.
    fn search(&self, filing: &Filing) -> Vec<Candidate>;
}

/// The single result for one document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Extraction {
    pub value: Option<EpsValue>,
    pub term: Option<String>,
    /// Strategy that produced the value.
    pub strategy: Option<&'static str>,
}

impl Extraction {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn is_found(&self) -> bool {
        self.value.is_some()
    }

    /// Two-decimal value, or `NONE`.
    pub fn value_label(&self) -> String {
        self.value
            .map(|v| v.to_string())
            .unwrap_or_else(|| NONE_MARKER.to_string())
    }

    /// Matched term, or `NONE`.
    pub fn term_label(&self) -> &str {
        self.term.as_deref().unwrap_or(NONE_MARKER)
    }
}

/// Runs strategies in priority order; the first with any candidates decides.
pub struct EpsExtractor {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl EpsExtractor {
    /// Table scan, then EPS-term text search, then generic "per share" search.
    pub fn new(config: &ExtractorConfig) -> Self {
        Self::with_strategies(vec![
            Box::new(TableStrategy::new(config)),
            Box::new(TextStrategy::terms(config)),
            Box::new(TextStrategy::generic(config)),
        ])
    }

    pub fn with_strategies(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Resolves a filing to at most one `(value, term)` pair.
    pub fn extract(&self, filing: &Filing) -> Extraction {
        for strategy in &self.strategies {
            let candidates = strategy.search(filing);
            if candidates.is_empty() {
                tracing::debug!("Strategy '{}' found nothing", strategy.name());
                continue;
            }

            tracing::debug!("Strategy '{}' found {} candidates", strategy.name(), candidates.len());
            if let Some(best) = rank(&candidates) {
                return Extraction {
                    value: Some(best.value),
                    term: Some(best.term.clone()),
                    strategy: Some(strategy.name()),
                };
            }
        }

        Extraction::absent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::value::extract_eps_value;

    struct Fixed(&'static str, Vec<Candidate>);

    impl ExtractionStrategy for Fixed {
        fn name(&self) -> &'static str {
            self.0
        }

        fn search(&self, _filing: &Filing) -> Vec<Candidate> {
            self.1.clone()
        }
    }

    fn candidate(value: &str, term: &str, is_basic: bool) -> Candidate {
        Candidate {
            value: extract_eps_value(value).unwrap(),
            term: term.to_string(),
            is_basic,
            is_gaap: false,
        }
    }

    fn extract(html: &str) -> (String, String) {
        let result = EpsExtractor::new(&ExtractorConfig::default()).extract(&Filing::parse(html));
        (result.value_label(), result.term_label().to_string())
    }

    #[test]
    fn test_first_non_empty_strategy_wins() {
        let extractor = EpsExtractor::with_strategies(vec![
            Box::new(Fixed("empty", vec![])),
            Box::new(Fixed("second", vec![candidate("1.00", "eps", false), candidate("2.00", "basic eps", true)])),
            Box::new(Fixed("third", vec![candidate("3.00", "per share", true)])),
        ]);
        let result = extractor.extract(&Filing::parse("<p></p>"));
        assert_eq!(result.value_label(), "2.00");
        assert_eq!(result.term_label(), "basic eps");
        assert_eq!(result.strategy, Some("second"));
    }

    #[test]
    fn test_tables_preempt_text() {
        let html = r#"
            <p>Diluted EPS was $0.45 for the quarter.</p>
            <h3>Condensed Consolidated Statements of Operations</h3>
            <table>
              <tr><td>Diluted earnings per share</td><td>0.44</td></tr>
              <tr><td>Basic earnings per share</td><td>0.46</td></tr>
            </table>"#;
        assert_eq!(extract(html), ("0.46".to_string(), "basic earnings per share".to_string()));
    }

    #[test]
    fn test_falls_back_to_text_without_statement_tables() {
        let html = "<html><body><p>Diluted EPS was $0.45 for the quarter.</p></body></html>";
        assert_eq!(extract(html), ("0.45".to_string(), "diluted eps".to_string()));
    }

    #[test]
    fn test_text_fallback_reads_plain_numbers() {
        assert_eq!(
            extract("<p>Earnings per share were 1.25 this quarter.</p>"),
            ("1.25".to_string(), "earnings per share".to_string())
        );
        assert_eq!(
            extract("<p>Diluted EPS was 0.45 for the quarter.</p>"),
            ("0.45".to_string(), "diluted eps".to_string())
        );
    }

    #[test]
    fn test_falls_back_to_text_when_tables_have_no_value() {
        let html = r#"
            <p>Consolidated Statements of Income</p>
            <table><tr><td>Revenue</td><td>1,200</td></tr></table>
            <p>Basic EPS reached $1.02.</p>"#;
        assert_eq!(extract(html), ("1.02".to_string(), "basic eps".to_string()));
    }

    #[test]
    fn test_generic_fallback_is_last() {
        let html = "<p>Net income per diluted share was $0.37 for the period.</p>";
        let result = EpsExtractor::new(&ExtractorConfig::default()).extract(&Filing::parse(html));
        assert_eq!(result.strategy, Some("generic"));
        assert_eq!(result.term_label(), "per diluted share");
        assert_eq!(result.value_label(), "0.37");
    }

    #[test]
    fn test_no_eps_text_is_absent() {
        let html = "<p>Revenue increased 4% year over year.</p>";
        assert_eq!(extract(html), ("NONE".to_string(), "NONE".to_string()));
        assert_eq!(Extraction::absent().term_label(), NONE_MARKER);
        assert!(!Extraction::absent().is_found());
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let html = r#"
            <p>Consolidated Statements of Operations</p>
            <table><tr><td>Net loss per share, basic and diluted</td><td>0.31</td></tr></table>"#;
        let extractor = EpsExtractor::new(&ExtractorConfig::default());
        let first = extractor.extract(&Filing::parse(html));
        let second = extractor.extract(&Filing::parse(html));
        assert_eq!(first, second);
        assert_eq!(first.value_label(), "-0.31");
        assert_eq!(first.term_label(), "net loss per share");
    }
}
