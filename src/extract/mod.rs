//! Content extraction from fetched markup
//!
//! Produces the bounded, whitespace-normalized text summary handed to the
//! classifier and the preview metadata stored with the link.
//!
//! # Text Extraction
//!
//! 1. Noise (scripts, navigation, ads, sidebars, ...) never contributes text
//! 2. Documentation containers are tried first, then general content
//!    containers, then a composite of headings/paragraphs/lists/code, then
//!    the whole body
//! 3. A preamble with title, description, keywords and page type is prepended
//! 4. Whitespace is normalized and the result capped at [`MAX_TEXT_CHARS`]

mod metadata;
mod noise;
mod text;
mod truncate;

pub use metadata::{PageMetadata, DESCRIPTION_BUDGET, TITLE_BUDGET, UNTITLED};
pub use noise::{in_noise, is_noise};
pub use text::{clean_text, visible_text, CONTENT_SELECTORS, TECH_SELECTORS};
pub use truncate::{truncate_chars, truncate_sentence};

use crate::config::MetadataConfig;
use crate::ExtractError;
use scraper::{Html, Selector};
use url::Url;

/// Upper bound on extracted text, in characters
pub const MAX_TEXT_CHARS: usize = 4000;

/// Text and metadata extracted from one page
#[derive(Debug, Clone)]
pub struct Extraction {
    pub text: String,
    pub metadata: PageMetadata,
}

/// Parses page markup into text and preview metadata
pub struct ContentExtractor {
    tech_selectors: Vec<Selector>,
    content_selectors: Vec<Selector>,
    default_thumbnail: String,
}

impl ContentExtractor {
    pub fn new(config: &MetadataConfig) -> Self {
        Self {
            tech_selectors: text::parse_selectors(TECH_SELECTORS),
            content_selectors: text::parse_selectors(CONTENT_SELECTORS),
            default_thumbnail: config.default_thumbnail.clone(),
        }
    }

    pub fn default_thumbnail(&self) -> &str {
        &self.default_thumbnail
    }

    /// Extracts text and metadata
    ///
    /// `origin` is the page origin used to resolve relative image paths.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::EmptyDocument`] when the markup is empty or
    /// whitespace only.
    pub fn extract(&self, html: &str, origin: &Url) -> Result<Extraction, ExtractError> {
        if html.trim().is_empty() {
            return Err(ExtractError::EmptyDocument);
        }

        let document = Html::parse_document(html);

        let metadata = PageMetadata {
            title: metadata::title(&document),
            description: metadata::description(&document),
            thumbnail: metadata::thumbnail(&document, origin, &self.default_thumbnail),
        };

        let body = text::main_text(&document, &self.tech_selectors, &self.content_selectors);
        let raw = format!("{}{}", preamble(&document), body);
        let text = clean_text(&raw, MAX_TEXT_CHARS);

        tracing::debug!(
            chars = text.chars().count(),
            title = %metadata.title,
            "Extracted page content"
        );

        Ok(Extraction { text, metadata })
    }
}

/// Title, description, keywords and page type as labelled lines
fn preamble(document: &Html) -> String {
    let title = metadata::first_text(document, "title")
        .or_else(|| metadata::first_text(document, "h1"))
        .or_else(|| metadata::meta_property(document, "og:title"))
        .unwrap_or_default();
    let description = metadata::meta_name(document, "description")
        .or_else(|| metadata::meta_property(document, "og:description"))
        .unwrap_or_default();
    let keywords = metadata::meta_name(document, "keywords").unwrap_or_default();
    let page_type = metadata::meta_property(document, "og:type").unwrap_or_default();

    format!(
        "제목: {}\n설명: {}\n키워드: {}\n타입: {}\n\n",
        title, description, keywords, page_type
    )
}
