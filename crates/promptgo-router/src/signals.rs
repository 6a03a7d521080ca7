// SPDX-FileCopyrightText: 2026 PromptGo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-vocabulary prompt signals.
//!
//! Each signal is an ordered table of regex fragments compiled once into a
//! single case-insensitive alternation. The tables are part of the scoring
//! contract: changing a term changes which channel wins.

use std::sync::LazyLock;

use regex::Regex;

/// Temporal or volatile terms that suggest the answer needs a web lookup.
/// Substring semantics: `deprecat` matches `deprecated` and `deprecation`.
pub const FRESH_TERMS: &[&str] = &[
    "today",
    "latest",
    "price",
    "pricing",
    "schedule",
    "release",
    "news",
    "update",
    r"who\s+is",
    r"20\d{2}",
    "policy",
    "changelog",
    "version",
    "deprecat",
    "breaking",
];

/// Action verbs implying multi-step execution.
pub const COMPLEX_TERMS: &[&str] = &[
    "implement",
    "scaffold",
    "integrate",
    "deploy",
    "refactor",
    "migrate",
    "benchmark",
    "write tests",
    "generate project",
    "create pr",
    "scrape",
    "automate",
    "pipeline",
    "dataset",
];

/// Preference or superlative terms that need clarification. Whole words only.
pub const AMBIGUOUS_TERMS: &[&str] = &[
    "best",
    "cheapest",
    "fastest",
    "quickest",
    "near me",
    "for my use case",
    "recommend",
];

/// A named signal set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Fresh,
    Complex,
    Ambiguous,
}

static FRESH: LazyLock<Regex> = LazyLock::new(|| compile(FRESH_TERMS, false));
static COMPLEX: LazyLock<Regex> = LazyLock::new(|| compile(COMPLEX_TERMS, false));
static AMBIGUOUS: LazyLock<Regex> = LazyLock::new(|| compile(AMBIGUOUS_TERMS, true));

fn compile(terms: &[&str], whole_words: bool) -> Regex {
    let alternation = terms.join("|");
    let pattern = if whole_words {
        format!(r"(?i)\b(?:{alternation})\b")
    } else {
        format!(r"(?i)(?:{alternation})")
    };
    // The tables are compile-time constants; a failure here is a programming error.
    Regex::new(&pattern).expect("signal table must be a valid regex")
}

impl Signal {
    fn regex(self) -> &'static Regex {
        match self {
            Signal::Fresh => &FRESH,
            Signal::Complex => &COMPLEX,
            Signal::Ambiguous => &AMBIGUOUS,
        }
    }
}

/// Whether `text` contains any term of `signal`. Case-insensitive.
pub fn matches(signal: Signal, text: &str) -> bool {
    signal.regex().is_match(text)
}
