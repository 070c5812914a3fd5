use crate::classify::taxonomy::{Category, HintRule, Taxonomy};
use crate::url::CanonicalUrl;

/// Guesses a category from the URL alone
///
/// The domain table is consulted first, then the path table. Within a table
/// rules are tried in declaration order and the first rule with a keyword
/// contained in the lowercase host (or path) wins.
pub fn url_hint(taxonomy: &Taxonomy, url: &CanonicalUrl) -> Option<Category> {
    let domain = url.domain();
    let path = url.path().to_lowercase();

    first_match(taxonomy.domain_rules(), &domain)
        .or_else(|| first_match(taxonomy.path_rules(), &path))
        .and_then(|label| taxonomy.topic(label))
}

fn first_match<'a>(rules: &'a [HintRule], haystack: &str) -> Option<&'a str> {
    rules
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| haystack.contains(k.as_str())))
        .map(|rule| rule.category.as_str())
}
