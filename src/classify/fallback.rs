//! The ordered fallback chain that turns an AI response into a category
//!
//! Everything here is pure: given the same taxonomy, response and URL hint
//! the same category comes out, and the default strategy guarantees that
//! some vocabulary member always does.

use crate::classify::taxonomy::{Category, Taxonomy};
use std::fmt;

/// One step of the fallback chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// The cleaned response is exactly a vocabulary label
    ExactLabel,
    /// The cleaned response and a label contain one another, ignoring case
    /// and whitespace
    FuzzyContainment,
    /// A keyword regex matches the raw response
    KeywordPattern,
    /// Category guessed from the URL host or path
    UrlHint,
    /// The taxonomy default
    Default,
}

/// Strategies in evaluation order
pub const CHAIN: [Strategy; 5] = [
    Strategy::ExactLabel,
    Strategy::FuzzyContainment,
    Strategy::KeywordPattern,
    Strategy::UrlHint,
    Strategy::Default,
];

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ExactLabel => "exact-label",
            Self::FuzzyContainment => "fuzzy-containment",
            Self::KeywordPattern => "keyword-pattern",
            Self::UrlHint => "url-hint",
            Self::Default => "default",
        }
    }

    fn apply(&self, taxonomy: &Taxonomy, evidence: &Evidence<'_>) -> Option<Category> {
        match self {
            Self::ExactLabel => evidence
                .cleaned
                .as_deref()
                .and_then(|cleaned| taxonomy.topic(cleaned)),
            Self::FuzzyContainment => evidence
                .cleaned
                .as_deref()
                .and_then(|cleaned| fuzzy_match(taxonomy, cleaned)),
            Self::KeywordPattern => evidence.response.and_then(|response| {
                taxonomy
                    .keyword_rules()
                    .iter()
                    .find(|rule| rule.pattern.is_match(response))
                    .and_then(|rule| taxonomy.topic(&rule.category))
            }),
            Self::UrlHint => evidence.url_hint.cloned(),
            Self::Default => Some(taxonomy.default_category()),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The chosen category and the strategy that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub category: Category,
    pub strategy: Strategy,
}

struct Evidence<'a> {
    response: Option<&'a str>,
    cleaned: Option<String>,
    url_hint: Option<&'a Category>,
}

/// Runs the fallback chain
///
/// `ai_response` is `None` when the backend failed or was never asked; the
/// chain then falls straight through to the URL hint and the default.
pub fn decide(
    taxonomy: &Taxonomy,
    ai_response: Option<&str>,
    url_hint: Option<&Category>,
) -> Decision {
    let evidence = Evidence {
        response: ai_response,
        cleaned: ai_response.map(clean_response),
        url_hint,
    };

    CHAIN
        .iter()
        .find_map(|strategy| {
            strategy
                .apply(taxonomy, &evidence)
                .map(|category| Decision {
                    category,
                    strategy: *strategy,
                })
        })
        .unwrap_or_else(|| Decision {
            category: taxonomy.default_category(),
            strategy: Strategy::Default,
        })
}

/// Reduces a free-form model reply to a candidate label
///
/// Takes the first non-empty line, strips surrounding punctuation and
/// quotes, and keeps only the text before the first `:` or `.`.
pub fn clean_response(raw: &str) -> String {
    let line = raw
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("");

    let line = strip_wrapping(line);
    let head = line.split([':', '.']).next().unwrap_or("");
    strip_wrapping(head).to_string()
}

fn strip_wrapping(text: &str) -> &str {
    text.trim_matches(|c: char| {
        c.is_whitespace()
            || c.is_ascii_punctuation()
            || matches!(c, '“' | '”' | '‘' | '’' | '「' | '」' | '『' | '』')
    })
}

fn squash(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn fuzzy_match(taxonomy: &Taxonomy, cleaned: &str) -> Option<Category> {
    let needle = squash(cleaned);
    if needle.is_empty() {
        return None;
    }

    taxonomy
        .labels()
        .find(|label| {
            let label = squash(label);
            needle.contains(&label) || label.contains(&needle)
        })
        .and_then(|label| taxonomy.topic(label))
}
