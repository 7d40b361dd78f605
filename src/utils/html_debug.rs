// src/utils/html_debug.rs
use std::fs::File;
use std::io::Write;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::extractors::catalog::ExtractorConfig;
use crate::extractors::matcher::{term_pattern, TermMatcher};
use crate::utils::error::AppError;

static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<!--.*?-->|<[^>]*>").expect("Failed to compile TAG_RE")
});

/// Highlight kinds, one CSS class each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightKind {
    Header,
    Term,
    Generic,
}

impl HighlightKind {
    fn css_class(self) -> &'static str {
        match self {
            HighlightKind::Header => "highlight-header",
            HighlightKind::Term => "highlight-term",
            HighlightKind::Generic => "highlight-generic",
        }
    }
}

/// Every pattern the extractor searches for, tagged by kind.
pub struct DebugPatterns {
    patterns: Vec<(Regex, String, HighlightKind)>,
}

impl DebugPatterns {
    pub fn from_config(config: &ExtractorConfig) -> Self {
        let mut patterns = Vec::new();
        for header in &config.statement_headers {
            match term_pattern(header) {
                Ok(re) => patterns.push((re, header.clone(), HighlightKind::Header)),
                Err(e) => tracing::warn!("Skipping debug pattern for header '{}': {}", header, e),
            }
        }
        for (catalog, kind) in [
            (&config.terms, HighlightKind::Term),
            (&config.generic_terms, HighlightKind::Generic),
        ] {
            let matcher = TermMatcher::new(catalog);
            for (re, phrase) in matcher.patterns() {
                patterns.push((re.clone(), phrase.to_string(), kind));
            }
        }
        Self { patterns }
    }
}

/// Saves a HTML document to a file with debug highlights
pub fn save_debug_html(html: &str, filename: &Path, highlights: &[(usize, usize, HighlightKind, &str)]) -> Result<(), AppError> {
    let mut file = File::create(filename)?;

    // Add debug styling in head
    let mut debug_html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<style>\n");
    debug_html.push_str(".highlight-header { background-color: #ADD8E6; }\n");
    debug_html.push_str(".highlight-term { background-color: #90EE90; }\n");
    debug_html.push_str(".highlight-generic { background-color: #FFC0CB; }\n");
    debug_html.push_str("</style>\n</head>\n<body>\n");

    let mut last_pos = 0;
    let mut sorted_highlights = highlights.to_vec();
    sorted_highlights.sort_by_key(|h| (h.0, std::cmp::Reverse(h.1)));

    for (start, end, kind, label) in sorted_highlights {
        // Overlaps keep the earliest, longest highlight
        if start < last_pos {
            continue;
        }
        debug_html.push_str(&html[last_pos..start]);
        debug_html.push_str(&format!("<span class=\"{}\" title=\"{} @ {}-{}\">", kind.css_class(), label, start, end));
        debug_html.push_str(&html[start..end]);
        debug_html.push_str("</span>");
        last_pos = end;
    }

    if last_pos < html.len() {
        debug_html.push_str(&html[last_pos..]);
    }
    debug_html.push_str("\n</body>\n</html>");

    file.write_all(debug_html.as_bytes())?;

    tracing::debug!("Saved debug HTML to {}", filename.display());
    Ok(())
}

/// Creates a debug copy of a filing with every header and term occurrence
/// highlighted. Only text between tags is annotated.
pub fn create_debug_html(html: &str, filename: &Path, patterns: &DebugPatterns) -> Result<usize, AppError> {
    let mut highlights = Vec::new();

    let mut segment_start = 0;
    let mut segments = Vec::new();
    for tag in TAG_RE.find_iter(html) {
        segments.push(segment_start..tag.start());
        segment_start = tag.end();
    }
    segments.push(segment_start..html.len());

    for segment in segments.into_iter().filter(|s| !s.is_empty()) {
        let text = &html[segment.clone()];
        for (re, label, kind) in &patterns.patterns {
            for mat in re.find_iter(text) {
                highlights.push((segment.start + mat.start(), segment.start + mat.end(), *kind, label.as_str()));
            }
        }
    }

    save_debug_html(html, filename, &highlights)?;
    Ok(highlights.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlights_text_but_not_markup() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("annotated.html");
        let html = r#"<div class="eps"><p>Consolidated Statements of Operations</p><td>Diluted EPS</td><td>0.45 per share</td></div>"#;

        let patterns = DebugPatterns::from_config(&ExtractorConfig::default());
        let count = create_debug_html(html, &out, &patterns).unwrap();
        assert!(count >= 3);

        let annotated = std::fs::read_to_string(&out).unwrap();
        assert!(annotated.contains(r#"<div class="eps">"#), "attributes must stay untouched");
        assert!(annotated.contains(r#"<span class="highlight-term" title="diluted eps @"#));
        assert!(annotated.contains(r#"<span class="highlight-generic" title="per share @"#));
        assert!(annotated.contains("highlight-header"));
        // "eps" inside "Diluted EPS" overlaps the longer hit and is dropped
        assert!(!annotated.contains(r#"title="eps @"#));
    }
}
