// src/extractors/tables.rs

// --- Imports ---
use crate::extractors::catalog::ExtractorConfig;
use crate::extractors::document::{normalize_text, Filing};
use crate::extractors::eps::ExtractionStrategy;
use crate::extractors::matcher::TermMatcher;
use crate::extractors::ranker::Candidate;
use crate::extractors::value::{extract_eps_value, EpsValue};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};
use std::collections::{HashMap, HashSet};

// --- CSS Selectors (Lazy Static) ---
// Elements that can carry a statement title
static POTENTIAL_HEADER_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("h1, h2, h3, h4, h5, h6, p, div, span, b, strong, font, center")
        .expect("Failed to compile POTENTIAL_HEADER_SELECTOR")
});

static TABLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table").expect("Failed to compile TABLE_SELECTOR"));

static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr").expect("Failed to compile ROW_SELECTOR"));

static CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td, th").expect("Failed to compile CELL_SELECTOR"));

/// Finds income-statement tables by the statement titles that precede them.
pub struct TableLocator {
    headers: Vec<String>,
    max_header_len: usize,
}

impl TableLocator {
    pub fn new(headers: &[String], max_header_len: usize) -> Self {
        Self {
            headers: headers.iter().map(|h| normalize_text([h.as_str()]).to_lowercase()).collect(),
            max_header_len,
        }
    }

    /// Candidate tables in document order, without duplicates. Empty means
    /// no statement header was found and the caller should search the text.
    pub fn locate<'a>(&self, filing: &'a Filing) -> Vec<ElementRef<'a>> {
        let html = filing.html();

        // Document pre-order, so "following" is a slice of this vector
        let order: Vec<_> = html.tree.root().descendants().collect();
        let position: HashMap<_, usize> = order.iter().enumerate().map(|(i, n)| (n.id(), i)).collect();

        let mut seen = HashSet::new();
        let mut tables = Vec::new();

        for element in html.select(&POTENTIAL_HEADER_SELECTOR) {
            // A wrapper holding a table is a container, not a title
            if element.select(&TABLE_SELECTOR).next().is_some() {
                continue;
            }
            let text = normalize_text(element.text()).to_lowercase();
            if text.is_empty() || text.chars().count() > self.max_header_len {
                continue;
            }
            let label = match self.headers.iter().find(|h| text.contains(h.as_str())) {
                Some(label) => label,
                None => continue,
            };
            let start = match position.get(&element.id()) {
                Some(start) => *start,
                None => continue,
            };

            // Skip the header's own subtree
            let after = start + element.descendants().count();
            let next_table = order
                .get(after..)
                .unwrap_or_default()
                .iter()
                .filter_map(|node| ElementRef::wrap(*node))
                .find(|el| el.value().name() == "table");

            match next_table {
                Some(table) if seen.insert(table.id()) => {
                    tracing::debug!("Statement header '{}' ({}) targets a table", label, element.value().name());
                    tables.push(table);
                }
                Some(_) => {} // Nested header elements point at the same table
                None => tracing::trace!("Statement header '{}' has no following table", label),
            }
        }

        tables
    }
}

/// Scans rows of located statement tables for EPS terms.
pub struct TableStrategy {
    locator: TableLocator,
    matcher: TermMatcher,
    lookahead_rows: usize,
}

impl TableStrategy {
    pub fn new(config: &ExtractorConfig) -> Self {
        let matcher = TermMatcher::new(&config.terms);
        tracing::debug!("Table strategy compiled {} of {} terms", matcher.len(), config.terms.len());
        Self {
            locator: TableLocator::new(&config.statement_headers, config.max_header_len),
            matcher,
            lookahead_rows: config.lookahead_rows,
        }
    }
}

impl ExtractionStrategy for TableStrategy {
    fn name(&self) -> &'static str {
        "table"
    }

    fn search(&self, filing: &Filing) -> Vec<Candidate> {
        let tables = self.locator.locate(filing);
        if tables.is_empty() {
            tracing::debug!("No targeted tables in document");
            return Vec::new();
        }
        tracing::debug!("Scanning {} targeted tables", tables.len());

        let mut candidates = Vec::new();
        for table in tables {
            let rows: Vec<ElementRef> = table.select(&ROW_SELECTOR).collect();

            for (i, row) in rows.iter().enumerate() {
                let context = row_text(*row);
                let term = match self.matcher.first_term(&context) {
                    Some(term) => term,
                    None => continue,
                };

                // A label row may hold no number; its value sits a few rows below
                let found = row_value(*row).map(|value| (value, context.clone())).or_else(|| {
                    rows.iter()
                        .skip(i + 1)
                        .take(self.lookahead_rows)
                        .find_map(|next| row_value(*next).map(|value| (value, row_text(*next))))
                });

                match found {
                    Some((value, value_context)) => {
                        let candidate = Candidate::from_row(value, term, &value_context);
                        tracing::trace!("Row '{}' -> {:?}", context, candidate);
                        candidates.push(candidate);
                    }
                    None => tracing::trace!("Row '{}' matched '{}' but has no value", context, term.phrase),
                }
            }
        }

        candidates
    }
}

/// Lower-cased, whitespace-normalized text of a row.
fn row_text(row: ElementRef) -> String {
    normalize_text(row.text()).to_lowercase()
}

/// First cell of the row that normalizes to an EPS value.
fn row_value(row: ElementRef) -> Option<EpsValue> {
    let cells: Vec<String> = row.select(&CELL_SELECTOR).map(|cell| normalize_text(cell.text())).collect();
    rejoin_split_parens(cells)
        .iter()
        .find_map(|token| extract_eps_value(token))
}

/// Filings often put the closing paren of a negative amount in its own cell:
/// `(0.12` | `)`. Glue such pairs back together.
fn rejoin_split_parens(cells: Vec<String>) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::with_capacity(cells.len());
    for cell in cells {
        let dangling = tokens
            .last()
            .map_or(false, |prev| prev.contains('(') && !prev.contains(')'));
        if dangling && cell.starts_with(')') {
            if let Some(prev) = tokens.last_mut() {
                prev.push_str(&cell);
            }
            continue;
        }
        tokens.push(cell);
    }
    tokens
}
