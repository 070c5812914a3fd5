//! Preview metadata: title, description and thumbnail

use crate::extract::noise::in_noise;
use crate::extract::text::visible_text;
use crate::extract::truncate::truncate_sentence;
use scraper::{Html, Selector};
use serde::Serialize;
use url::Url;

/// Title used when the page names itself nowhere
pub const UNTITLED: &str = "제목 없음";

/// Character budget for titles
pub const TITLE_BUDGET: usize = 50;

/// Character budget for descriptions
pub const DESCRIPTION_BUDGET: usize = 100;

/// Images smaller than this in both dimensions are treated as icons
const MIN_IMAGE_DIMENSION: u32 = 100;

/// Preview data stored with a link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    /// Absolute image URL, or the configured placeholder
    pub thumbnail: String,
}

impl PageMetadata {
    /// Metadata for a page that could not be read
    pub fn placeholder(default_thumbnail: &str) -> Self {
        Self {
            title: UNTITLED.to_string(),
            description: String::new(),
            thumbnail: default_thumbnail.to_string(),
        }
    }
}

/// Extracts content from `<meta property="..." content="...">` tags
pub(super) fn meta_property(document: &Html, property: &str) -> Option<String> {
    meta_content(document, &format!("meta[property=\"{}\"]", property))
}

/// Extracts content from `<meta name="..." content="...">` tags
pub(super) fn meta_name(document: &Html, name: &str) -> Option<String> {
    meta_content(document, &format!("meta[name=\"{}\"]", name))
}

fn meta_content(document: &Html, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("content"))
        .map(collapse_whitespace)
        .find(|s| !s.is_empty())
}

/// Text of the first non-noise element matching `css` with non-empty text
pub(super) fn first_text(document: &Html, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    document
        .select(&selector)
        .filter(|el| !in_noise(*el))
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .find(|s| !s.is_empty())
}

fn first_paragraph(document: &Html) -> Option<String> {
    let selector = Selector::parse("p").ok()?;
    document
        .select(&selector)
        .filter(|el| !in_noise(*el))
        .map(|el| collapse_whitespace(&visible_text(el)))
        .find(|s| !s.is_empty())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// og:title, then `<title>`, then the first `<h1>`
pub(super) fn title(document: &Html) -> String {
    let title = meta_property(document, "og:title")
        .or_else(|| first_text(document, "title"))
        .or_else(|| first_text(document, "h1"))
        .unwrap_or_else(|| UNTITLED.to_string());
    truncate_sentence(&title, TITLE_BUDGET)
}

/// og:description, then meta description, then the first paragraph
pub(super) fn description(document: &Html) -> String {
    let description = meta_property(document, "og:description")
        .or_else(|| meta_name(document, "description"))
        .or_else(|| first_paragraph(document))
        .unwrap_or_default();
    truncate_sentence(&description, DESCRIPTION_BUDGET)
}

/// og:image, then twitter:image, then the first large `<img>`
///
/// Relative sources are resolved against `origin`. A candidate that does not
/// resolve to an http(s) URL is skipped.
pub(super) fn thumbnail(document: &Html, origin: &Url, default_thumbnail: &str) -> String {
    let candidates = meta_property(document, "og:image")
        .into_iter()
        .chain(meta_name(document, "twitter:image"))
        .chain(meta_property(document, "twitter:image"))
        .chain(large_image_src(document));

    for candidate in candidates {
        if let Some(url) = resolve(origin, &candidate) {
            return url;
        }
    }

    default_thumbnail.to_string()
}

fn large_image_src(document: &Html) -> Option<String> {
    let selector = Selector::parse("img[src]").ok()?;
    document
        .select(&selector)
        .find(|img| {
            let el = img.value();
            let exceeds = |attr: &str| {
                el.attr(attr)
                    .and_then(leading_pixels)
                    .is_some_and(|px| px > MIN_IMAGE_DIMENSION)
            };
            exceeds("width") || exceeds("height")
        })
        .and_then(|img| img.value().attr("src"))
        .map(|src| src.trim().to_string())
        .filter(|src| !src.is_empty())
}

/// Parses the integer prefix of a dimension such as `300` or `300px`
fn leading_pixels(value: &str) -> Option<u32> {
    let digits: String = value
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn resolve(origin: &Url, src: &str) -> Option<String> {
    let url = origin.join(src.trim()).ok()?;
    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}
