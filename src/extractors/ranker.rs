// src/extractors/ranker.rs

use crate::extractors::catalog::TermDescriptor;
use crate::extractors::value::EpsValue;

/// A value found next to an EPS term, plus the flags used to rank it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub value: EpsValue,
    pub term: String,
    pub is_basic: bool,
    pub is_gaap: bool,
}

impl Candidate {
    /// Builds a candidate from a table row. `context` is the lower-cased text
    /// of the row the value came from; it decides sign and flags.
    pub fn from_row(value: EpsValue, term: &TermDescriptor, context: &str) -> Self {
        // "net loss" is covered by "loss"
        let value = if context.contains("loss") && !value.is_negative() {
            value.negated()
        } else {
            value
        };
        Self {
            value,
            term: term.phrase.clone(),
            is_basic: context.contains("basic"),
            is_gaap: mentions_gaap(context),
        }
    }

    /// Builds a candidate from a free-text hit; flags come from the term itself.
    pub fn from_term(value: EpsValue, term: &TermDescriptor) -> Self {
        Self {
            value,
            term: term.phrase.clone(),
            is_basic: term.is_basic(),
            is_gaap: term.is_gaap(),
        }
    }
}

fn mentions_gaap(context: &str) -> bool {
    if context.contains("unadjusted") {
        return true;
    }
    let stripped = context.replace("non-gaap", "").replace("non gaap", "");
    stripped.contains("gaap")
}

/// Picks one candidate: basic beats non-basic, then GAAP beats non-GAAP,
/// then discovery order decides.
pub fn rank(candidates: &[Candidate]) -> Option<&Candidate> {
    let mut pool: Vec<&Candidate> = candidates.iter().collect();

    if pool.iter().any(|c| c.is_basic) {
        pool.retain(|c| c.is_basic);
    }
    if pool.iter().any(|c| c.is_gaap) {
        pool.retain(|c| c.is_gaap);
    }

    pool.first().copied()
}
