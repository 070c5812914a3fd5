//! URL handling module for Linkshelf
//!
//! This module turns raw user input into a [`CanonicalUrl`]: a validated,
//! absolute http(s) URL that doubles as the fetch target and, through its
//! dedup key, as the per-owner uniqueness key of a saved link.

mod domain;
mod normalize;

use crate::UrlResult;
use std::fmt;
use url::Url;

// Re-export main functions
pub use domain::{extract_domain, strip_www};
pub use normalize::{dedup_key, normalize_url, MAX_URL_LENGTH};

/// A validated, normalized URL plus its de-duplication key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalUrl {
    url: Url,
    key: String,
}

impl CanonicalUrl {
    /// The full URL string, always starting with `http://` or `https://`
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.url
    }

    /// Key used to detect the same link saved twice by one owner
    pub fn dedup_key(&self) -> &str {
        &self.key
    }

    /// Lowercase host name
    pub fn domain(&self) -> String {
        extract_domain(&self.url).unwrap_or_default()
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Scheme, host and port, used to resolve relative asset paths
    pub fn origin(&self) -> Url {
        let mut origin = self.url.clone();
        origin.set_path("/");
        origin.set_query(None);
        origin.set_fragment(None);
        origin
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// Validates raw input and builds its canonical form
///
/// # Examples
///
/// ```
/// use linkshelf::url::validate_url;
///
/// let url = validate_url("www.Example.com/docs").unwrap();
/// assert_eq!(url.as_str(), "https://www.example.com/docs");
/// assert_eq!(url.dedup_key(), "example.com/docs");
/// ```
pub fn validate_url(raw: &str) -> UrlResult<CanonicalUrl> {
    let url = normalize_url(raw)?;
    let key = dedup_key(&url);
    Ok(CanonicalUrl { url, key })
}
