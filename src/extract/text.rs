//! Main-content text extraction and cleanup

use crate::extract::noise::{in_noise, is_noise};
use crate::extract::truncate::truncate_chars;
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::HashSet;

/// Elements that start a new line in extracted text
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption", "figure",
    "h1", "h2", "h3", "h4", "h5", "h6", "hr", "li", "main", "ol", "p", "pre", "section", "table",
    "td", "th", "tr", "ul",
];

/// Documentation-style containers, tried before the general list
pub const TECH_SELECTORS: &[&str] = &[
    ".documentation",
    ".markdown-body",
    ".readme",
    ".wiki-content",
    r#"[class*="docs"]"#,
    r#"[id*="docs"]"#,
    r#"[class*="api"]"#,
    r#"[id*="api"]"#,
    r#"[class*="tech"]"#,
    r#"[id*="tech"]"#,
    ".code-example",
    r#"[class*="tutorial"]"#,
];

/// General main-content containers
pub const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "main",
    r#"[role="main"]"#,
    "#content",
    ".content",
    r#"[class*="content-main"]"#,
    r#"[class*="main-content"]"#,
    ".post",
    ".entry",
    r#"[class*="article"]"#,
    r#"[id*="article"]"#,
    r#"[class*="post"]"#,
    r#"[id*="post"]"#,
    r#"[class*="blog-post"]"#,
    r#"[class*="content-body"]"#,
    ".documentation",
    ".markdown-body",
    ".readme",
    ".wiki-content",
    ".prose",
];

/// Composite text shorter than this falls back to the whole body
const COMPOSITE_MIN_CHARS: usize = 100;

pub(super) fn parse_selectors(list: &[&str]) -> Vec<Selector> {
    list.iter()
        .filter_map(|css| Selector::parse(css).ok())
        .collect()
}

/// Visible text of an element, skipping noise descendants
///
/// Block-level children are surrounded by newlines so that paragraphs and
/// list items do not run together.
pub fn visible_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);
    out
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                if is_noise(child.value()) {
                    continue;
                }
                let block = BLOCK_TAGS.contains(&child.value().name());
                if block {
                    line_break(out);
                }
                collect_text(child, out);
                if block {
                    line_break(out);
                }
            }
            _ => {}
        }
    }
}

fn line_break(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

/// Trimmed text of every non-noise match of a selector
///
/// A match nested inside another match of the same selector is skipped so
/// its text is not counted twice.
fn matched_texts(document: &Html, selector: &Selector) -> Vec<String> {
    let matches: Vec<ElementRef<'_>> = document
        .select(selector)
        .filter(|element| !in_noise(*element))
        .collect();
    let ids: HashSet<_> = matches.iter().map(|element| element.id()).collect();

    matches
        .into_iter()
        .filter(|element| !element.ancestors().any(|a| ids.contains(&a.id())))
        .map(|element| visible_text(element).trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}

/// Text of the first selector whose non-noise matches yield any text
pub(super) fn first_selector_text(document: &Html, selectors: &[Selector]) -> Option<String> {
    selectors.iter().find_map(|selector| {
        let texts = matched_texts(document, selector);
        if texts.is_empty() {
            None
        } else {
            tracing::debug!(selector = ?selector, "Content selector matched");
            Some(texts.join("\n\n"))
        }
    })
}

fn joined_longer_than(document: &Html, css: &str, min_chars: usize, separator: &str) -> String {
    let Ok(selector) = Selector::parse(css) else {
        return String::new();
    };
    matched_texts(document, &selector)
        .into_iter()
        .filter(|text| text.chars().count() > min_chars)
        .collect::<Vec<_>>()
        .join(separator)
}

/// Headings, paragraphs, list items and code blocks assembled in groups
pub(super) fn composite_text(document: &Html) -> String {
    let groups = [
        joined_longer_than(document, "h1, h2, h3", 5, "\n\n"),
        joined_longer_than(document, "p", 10, "\n\n"),
        joined_longer_than(document, "li", 5, "\n"),
        joined_longer_than(document, "pre, code", 5, "\n\n"),
    ];

    groups
        .into_iter()
        .filter(|group| !group.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Whole-body text, used when nothing more specific is available
pub(super) fn body_text(document: &Html) -> String {
    let Ok(selector) = Selector::parse("body") else {
        return String::new();
    };
    document
        .select(&selector)
        .next()
        .map(visible_text)
        .unwrap_or_default()
}

/// Picks the main text of a document
///
/// Order: documentation containers, general content containers, the
/// composite of headings/paragraphs/lists/code when it is substantial, and
/// finally the whole body.
pub(super) fn main_text(
    document: &Html,
    tech_selectors: &[Selector],
    content_selectors: &[Selector],
) -> String {
    if let Some(text) = first_selector_text(document, tech_selectors) {
        return text;
    }
    if let Some(text) = first_selector_text(document, content_selectors) {
        return text;
    }

    let composite = composite_text(document);
    if composite.chars().count() > COMPOSITE_MIN_CHARS {
        tracing::debug!("Using composite text");
        return composite;
    }

    body_text(document)
}

/// Normalizes whitespace and bounds the length
///
/// Tabs become spaces, runs of horizontal whitespace become one space, each
/// line is trimmed, runs of blank lines collapse to a single blank line, and
/// the result is trimmed and cut to `max_chars` characters.
///
/// # Examples
///
/// ```
/// use linkshelf::extract::clean_text;
///
/// let cleaned = clean_text("  a\t\tb  \n\n\n\n  c  ", 4000);
/// assert_eq!(cleaned, "a b\n\nc");
/// ```
pub fn clean_text(raw: &str, max_chars: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut previous_blank = true;

    for line in raw.replace('\t', " ").lines() {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() {
            if !previous_blank {
                lines.push(String::new());
                previous_blank = true;
            }
            continue;
        }
        lines.push(line);
        previous_blank = false;
    }

    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }

    truncate_chars(&lines.join("\n"), max_chars)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selectors() -> (Vec<Selector>, Vec<Selector>) {
        (
            parse_selectors(TECH_SELECTORS),
            parse_selectors(CONTENT_SELECTORS),
        )
    }

    #[test]
    fn test_all_selectors_parse() {
        assert_eq!(parse_selectors(TECH_SELECTORS).len(), TECH_SELECTORS.len());
        assert_eq!(
            parse_selectors(CONTENT_SELECTORS).len(),
            CONTENT_SELECTORS.len()
        );
    }

    #[test]
    fn test_visible_text_skips_noise_and_breaks_blocks() {
        let document = Html::parse_document(
            r#"<html><body><div id="root"><p>First</p><script>var x;</script><p>Second <b>bold</b></p><div class="ads">Buy now</div></div></body></html>"#,
        );
        let selector = Selector::parse("#root").unwrap();
        let root = document.select(&selector).next().unwrap();
        let text = clean_text(&visible_text(root), 4000);
        assert_eq!(text, "First\nSecond bold");
    }

    #[test]
    fn test_tech_selector_preferred_over_article() {
        let (tech, content) = selectors();
        let document = Html::parse_document(
            r#"<html><body>
                <article><p>General article text</p></article>
                <div class="markdown-body"><p>Readme text</p></div>
            </body></html>"#,
        );
        let text = main_text(&document, &tech, &content);
        assert_eq!(text, "Readme text");
    }

    #[test]
    fn test_selector_order_within_list() {
        let (tech, content) = selectors();
        let document = Html::parse_document(
            r#"<html><body>
                <div class="content">Content class text</div>
                <main>Main element text</main>
            </body></html>"#,
        );
        // "main" comes before ".content"
        let text = main_text(&document, &tech, &content);
        assert_eq!(text, "Main element text");
    }

    #[test]
    fn test_noise_only_match_is_skipped() {
        let (tech, content) = selectors();
        let document = Html::parse_document(
            r#"<html><body>
                <aside><article>Sidebar article</article></aside>
                <main>Real content</main>
            </body></html>"#,
        );
        let text = main_text(&document, &tech, &content);
        assert_eq!(text, "Real content");
    }

    #[test]
    fn test_nested_matches_not_duplicated() {
        let (tech, content) = selectors();
        let document = Html::parse_document(
            r#"<html><body><article>Outer <article>Inner</article></article></body></html>"#,
        );
        let text = clean_text(&main_text(&document, &tech, &content), 4000);
        assert_eq!(text, "Outer\nInner");
    }

    #[test]
    fn test_composite_when_no_container() {
        let (tech, content) = selectors();
        let document = Html::parse_document(
            r#"<html><body>
                <h1>Getting started</h1>
                <p>This paragraph is long enough to keep.</p>
                <p>Short</p>
                <p>Another paragraph with enough characters in it.</p>
                <ul><li>First item</li><li>Tiny</li></ul>
                <pre>fn main() {}</pre>
            </body></html>"#,
        );
        let text = main_text(&document, &tech, &content);
        assert_eq!(
            text,
            "Getting started\n\n\
             This paragraph is long enough to keep.\n\n\
             Another paragraph with enough characters in it.\n\n\
             First item\n\n\
             fn main() {}"
        );
    }

    #[test]
    fn test_short_composite_falls_back_to_body() {
        let (tech, content) = selectors();
        let document = Html::parse_document(
            r#"<html><body><span>Just a span</span><nav>Skip me</nav></body></html>"#,
        );
        let text = clean_text(&main_text(&document, &tech, &content), 4000);
        assert_eq!(text, "Just a span");
    }

    #[test]
    fn test_clean_text_invariants() {
        let raw = "\t\tTitle\t\there\n\n\n\n\n   body   text   \n \t \n\n\nend\t";
        let cleaned = clean_text(raw, 4000);
        assert_eq!(cleaned, "Title here\n\nbody text\n\nend");
        assert!(!cleaned.contains('\t'));
        assert!(!cleaned.contains("\n\n\n"));
    }

    #[test]
    fn test_clean_text_caps_length() {
        let raw = "가".repeat(5000);
        let cleaned = clean_text(&raw, 4000);
        assert_eq!(cleaned.chars().count(), 4000);
    }

    #[test]
    fn test_clean_text_empty() {
        assert_eq!(clean_text(" \n\t\n ", 4000), "");
    }
}
