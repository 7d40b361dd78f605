// src/extractors/document.rs

use crate::utils::error::ExtractError;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::path::Path;

// Elements whose text is never content
static NON_CONTENT_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("script, style").expect("Failed to compile NON_CONTENT_SELECTOR")
});

/// A parsed filing with scripts and styles removed.
pub struct Filing {
    html: Html,
}

impl Filing {
    /// Reads and parses a filing from disk.
    pub fn load(path: &Path) -> Result<Self, ExtractError> {
        let raw = Self::read_raw(path)?;
        Ok(Self::parse(&raw))
    }

    /// Reads the raw markup of a filing. Filings must be UTF-8.
    pub fn read_raw(path: &Path) -> Result<String, ExtractError> {
        let bytes = std::fs::read(path).map_err(|source| ExtractError::Read {
            path: path.display().to_string(),
            source,
        })?;
        String::from_utf8(bytes).map_err(|_| ExtractError::Decode {
            path: path.display().to_string(),
        })
    }

    /// Parses markup and detaches every `script`/`style` subtree.
    pub fn parse(raw: &str) -> Self {
        let mut html = Html::parse_document(raw);
        if !html.errors.is_empty() {
            // html5ever recovers from everything; these are only worth a trace
            tracing::trace!("Parser recovered from {} markup errors", html.errors.len());
        }

        let doomed: Vec<_> = html.select(&NON_CONTENT_SELECTOR).map(|el| el.id()).collect();
        for id in &doomed {
            if let Some(mut node) = html.tree.get_mut(*id) {
                node.detach();
            }
        }
        tracing::trace!("Removed {} script/style elements", doomed.len());

        Self { html }
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Whole-document text with whitespace collapsed.
    pub fn text(&self) -> String {
        normalize_text(self.html.root_element().text())
    }
}

/// Joins text fragments with single spaces, folding non-breaking spaces and
/// whitespace runs. Fragments are separated so adjacent cells never fuse.
pub fn normalize_text<'a, I>(fragments: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = String::new();
    for fragment in fragments {
        for word in fragment.split(|c: char| c.is_whitespace() || c == '\u{a0}') {
            if word.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(word);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripts_and_styles_are_removed() {
        let filing = Filing::parse(
            r#"<html><head><style>.eps { color: red }</style></head>
               <body><p>Net income</p><script>var eps = 1.23;</script><p>per share</p></body></html>"#,
        );
        let text = filing.text();
        assert_eq!(text, "Net income per share");
        assert!(!text.contains("1.23"));
        assert!(filing.html().select(&NON_CONTENT_SELECTOR).next().is_none());
    }

    #[test]
    fn test_normalize_text_folds_whitespace() {
        let text = normalize_text(["  Basic\u{a0}\u{a0}EPS\n", "", "\t$0.45 "]);
        assert_eq!(text, "Basic EPS $0.45");
        assert_eq!(normalize_text(Vec::<&str>::new()), "");
    }

    #[test]
    fn test_adjacent_cells_do_not_fuse() {
        let filing = Filing::parse("<table><tr><td>EPS</td><td>0.45</td></tr></table>");
        assert_eq!(filing.text(), "EPS 0.45");
    }

    #[test]
    fn test_load_reports_missing_and_non_utf8_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.html");
        assert!(matches!(Filing::load(&missing), Err(ExtractError::Read { .. })));

        let binary = dir.path().join("binary.html");
        std::fs::write(&binary, [0xff, 0xfe, 0x00, 0x80]).unwrap();
        assert!(matches!(Filing::load(&binary), Err(ExtractError::Decode { .. })));

        let good = dir.path().join("good.html");
        std::fs::write(&good, "<p>Diluted EPS</p>").unwrap();
        assert_eq!(Filing::load(&good).unwrap().text(), "Diluted EPS");
    }
}
